// # cping-core
//
// Core library for the cping dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for resolving the public IP address
// - **DnsProvider**: Trait for looking up and editing DNS records via provider APIs
// - **DnsProviderFactory**: Builds a provider bound to one account's credentials
// - **AccountStore**: Named accounts loaded from the account file
// - **Reconciler**: Resolves the IP once, then compares and conditionally
//   updates the record of every account
//
// Implementations of the traits live in their own crates
// (`cping-ip-http`, `cping-provider-cloudflare`); this crate performs no I/O
// besides reading the account file.

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsProviderFactory, DnsRecord, IpSource, ResolvedIp, UpdateResult};
pub use engine::{AccountReport, Reconciler, RunReport};
pub use config::{Account, AccountStore, AuthScheme, FailurePolicy, Settings};
pub use error::{Error, Result};
