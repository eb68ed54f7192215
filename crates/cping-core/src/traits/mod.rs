//! Core traits for cping
//!
//! - [`IpSource`]: Resolve the caller's public IP address
//! - [`DnsProvider`]: Look up and edit DNS records via a provider API
//! - [`DnsProviderFactory`]: Build a provider for one account's credentials

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, ResolvedIp};
pub use dns_provider::{DnsProvider, DnsProviderFactory, DnsRecord, UpdateResult, A_RECORD};
