// # DNS Provider Trait
//
// Defines the interface for reading and editing DNS records via provider APIs.
//
// ## Implementations
//
// - Cloudflare: `cping-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cping_core::DnsProvider;
//
// let zone_id = provider.resolve_zone("example.com").await?;
// let record = provider.find_record(&zone_id, "example.com", "home.example.com").await?;
// if record.content != ip.as_str() {
//     provider.update_record(&zone_id, &record, ip.as_str()).await?;
// }
// ```

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Account;
use crate::error::{Error, Result};

/// The only record type cping manages
pub const A_RECORD: &str = "A";

/// A DNS record as held by the provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-specific)
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type ("A")
    #[serde(rename = "type")]
    pub record_type: String,
    /// Current content (the IP address text)
    pub content: String,
    /// Time-to-live
    pub ttl: u32,
    /// Cloudflare proxy flag, carried through updates unchanged
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record content already matched; nothing was sent
    Unchanged {
        /// The content found on the record
        content: String,
    },
    /// Record content was overwritten
    Updated {
        /// Content before the update
        previous: String,
        /// Content after the update
        content: String,
    },
    /// Record content differs but the provider is in dry-run mode; nothing
    /// was sent
    DryRun {
        /// Content found on the record
        previous: String,
        /// Content that would have been written
        content: String,
    },
}

/// Trait for DNS provider implementations
///
/// One instance serves one account: credentials are bound at construction by
/// a [`DnsProviderFactory`].
///
/// Providers perform API calls and nothing else. They never retry, never
/// decide whether an update is needed (the Reconciler does), and never create
/// or delete records.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name to the provider's zone identifier
    ///
    /// # Errors
    ///
    /// [`Error::ZoneNotFound`] when no zone has exactly this name.
    async fn resolve_zone(&self, zone_name: &str) -> Result<String>;

    /// List records in a zone filtered by name and type
    ///
    /// Returns every record the provider reports for the filter; an empty
    /// list is not an error here.
    async fn list_records(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: &str,
    ) -> Result<Vec<DnsRecord>>;

    /// Find the single A record named `record_name`
    ///
    /// Names compare ASCII case-insensitively, as DNS names do.
    ///
    /// # Errors
    ///
    /// - [`Error::RecordNotFound`] when nothing matches
    /// - [`Error::AmbiguousRecord`] when more than one record matches
    async fn find_record(
        &self,
        zone_id: &str,
        zone_name: &str,
        record_name: &str,
    ) -> Result<DnsRecord> {
        let mut matches: Vec<DnsRecord> = self
            .list_records(zone_id, record_name, A_RECORD)
            .await?
            .into_iter()
            .filter(|r| r.record_type == A_RECORD && r.name.eq_ignore_ascii_case(record_name))
            .collect();

        match matches.len() {
            0 => Err(Error::record_not_found(record_name, zone_name)),
            1 => Ok(matches.remove(0)),
            count => Err(Error::ambiguous_record(record_name, zone_name, count)),
        }
    }

    /// Overwrite the content of an existing record
    ///
    /// Every other field (id, name, type, ttl, proxied) is sent exactly as
    /// found on `record`.
    ///
    /// # Errors
    ///
    /// [`Error::UpdateFailed`] carrying `new_content`.
    async fn update_record(&self, zone_id: &str, record: &DnsRecord, new_content: &str)
    -> Result<()>;

    /// Whether `update_record` only logs instead of writing
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers for an account
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider bound to the account's credentials
    fn create(&self, account: &Account) -> Result<Box<dyn DnsProvider>>;
}
