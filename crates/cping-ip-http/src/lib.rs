// # HTTP IP Source
//
// This crate provides the IP source cping uses to learn its public address.
//
// ## Behaviour
//
// Sends one GET to a plain-text "echo my IP" service (ipv4.icanhazip.com by
// default), reads the whole body, trims it and hands it to the core as a
// `ResolvedIp`. One attempt per call: no polling, no caching, no retries,
// and no client-side timeout beyond the transport defaults.
//
// The client binds to an IPv4 local address, so a dual-stack endpoint still
// reports the IPv4 address that belongs in an A record.

use async_trait::async_trait;
use cping_core::traits::{IpSource, ResolvedIp};
use cping_core::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};

/// Local address the client binds to: any IPv4 interface
const IPV4_ANY: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// HTTP-based IP source
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://ipv4.icanhazip.com")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .user_agent(concat!("cping/", env!("CARGO_PKG_VERSION")))
                .local_address(IPV4_ANY)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<ResolvedIp> {
        tracing::debug!("Querying current IP: GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::body(format!("{}: {}", self.url, e)))?;

        let ip = ResolvedIp::from_text(&ip_text)?;
        tracing::debug!("Current IP is {}", ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
