// # IP Source Trait
//
// Defines the interface for resolving the public IP address of this host.
//
// ## Implementations
//
// - HTTP "echo my IP" endpoint: `cping-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cping_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.current().await?;
//     println!("public IP: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// The public address resolved for a run
///
/// Holds the trimmed text exactly as the endpoint returned it. Comparison
/// against record content is plain string equality, so no canonical form is
/// produced here; the text is only checked to be an IPv4 address because
/// cping manages A records alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIp(String);

impl ResolvedIp {
    /// Build from the raw body of an IP lookup response
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAddress`] if the trimmed text is not an IPv4 address.
    pub fn from_text(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.parse::<Ipv4Addr>().is_err() {
            return Err(Error::InvalidAddress(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResolvedIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for IP source implementations
///
/// A source is asked exactly once per run. Implementations perform a single
/// attempt and return any failure as-is; there is no retry and no caching
/// across runs.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedIp)`: The current address
    /// - `Err(Error)`: [`Error::Network`], [`Error::Body`] or [`Error::InvalidAddress`]
    async fn current(&self) -> Result<ResolvedIp>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
