//! Reconciler
//!
//! The Reconciler is responsible for:
//! - Resolving the public IP once per run via IpSource
//! - For every account, finding its A record via DnsProvider
//! - Updating the record only when its content differs from the IP
//! - Applying the configured [`FailurePolicy`] when an account fails
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │─── ResolvedIp (once) ───┐
//! └─────────────┘                         │
//!                                         ▼
//!                                ┌──────────────┐
//!                                │  Reconciler  │── for each account (sorted)
//!                                └──────────────┘
//!                                         │
//!                                         ▼
//!                  ┌────────────────────────────────────────┐
//!                  │ DnsProvider (one per account)          │
//!                  │ resolve_zone → find_record → update?   │
//!                  └────────────────────────────────────────┘
//! ```

use crate::config::{Account, AccountStore, FailurePolicy};
use crate::error::{Error, Result};
use crate::traits::{DnsProviderFactory, IpSource, ResolvedIp, UpdateResult};
use tracing::{debug, info};

/// Outcome of one account within a run
#[derive(Debug)]
pub struct AccountReport {
    /// Section name of the account
    pub account: String,
    /// Record the account manages
    pub record: String,
    /// Terminal state for this account
    pub result: Result<UpdateResult>,
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct RunReport {
    /// Address every account was reconciled against
    pub ip: ResolvedIp,
    /// One entry per attempted account, in run order
    pub accounts: Vec<AccountReport>,
}

impl RunReport {
    /// Whether every attempted account reached `Unchanged` or `Updated`
    pub fn is_success(&self) -> bool {
        self.accounts.iter().all(|a| a.result.is_ok())
    }

    /// Accounts that failed, in run order
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.accounts
            .iter()
            .filter_map(|a| a.result.as_ref().err().map(|e| (a.account.as_str(), e)))
    }

    /// Number of records actually updated
    pub fn updated_count(&self) -> usize {
        self.accounts
            .iter()
            .filter(|a| matches!(a.result, Ok(UpdateResult::Updated { .. })))
            .count()
    }

    /// Number of records that would have been updated in dry-run mode
    pub fn dry_run_count(&self) -> usize {
        self.accounts
            .iter()
            .filter(|a| matches!(a.result, Ok(UpdateResult::DryRun { .. })))
            .count()
    }
}

/// Reconciles every configured account against the public IP
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::run()`] once per invocation of the program
///
/// Accounts are processed sequentially in section-name order.
pub struct Reconciler {
    /// IP source, asked once per run
    ip_source: Box<dyn IpSource>,

    /// Builds a provider per account
    providers: Box<dyn DnsProviderFactory>,

    /// Accounts to reconcile
    accounts: AccountStore,

    /// Behaviour when an account fails
    failure_policy: FailurePolicy,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `accounts` is empty.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        providers: Box<dyn DnsProviderFactory>,
        accounts: AccountStore,
        failure_policy: FailurePolicy,
    ) -> Result<Self> {
        if accounts.is_empty() {
            return Err(Error::config("No accounts configured"));
        }

        Ok(Self {
            ip_source,
            providers,
            accounts,
            failure_policy,
        })
    }

    /// Run one reconciliation pass over all accounts
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: every account was attempted (policy `Continue`) or
    ///   all attempted accounts succeeded (policy `Abort`)
    /// - `Err(Error)`: IP resolution failed, or an account failed under
    ///   policy `Abort`
    pub async fn run(&self) -> Result<RunReport> {
        let ip = self.ip_source.current().await?;
        info!("Public IP is {} (via {})", ip, self.ip_source.source_name());

        let mut accounts = Vec::with_capacity(self.accounts.len());
        for account in self.accounts.iter() {
            let result = match self.reconcile(account, &ip).await {
                Err(e) if self.failure_policy == FailurePolicy::Abort => {
                    info!("[{}] failed, aborting run", account.name);
                    return Err(e);
                }
                Err(e) => {
                    info!("[{}] failed, continuing with next account", account.name);
                    Err(e)
                }
                ok => ok,
            };

            accounts.push(AccountReport {
                account: account.name.clone(),
                record: account.record.clone(),
                result,
            });
        }

        Ok(RunReport { ip, accounts })
    }

    /// Reconcile a single account
    async fn reconcile(&self, account: &Account, ip: &ResolvedIp) -> Result<UpdateResult> {
        let provider = self.providers.create(account)?;

        let zone_id = match &account.zone_id {
            Some(zone_id) => {
                debug!("[{}] Using pre-configured zone ID", account.name);
                zone_id.clone()
            }
            None => provider.resolve_zone(&account.zone).await?,
        };

        let record = provider
            .find_record(&zone_id, &account.zone, &account.record)
            .await?;

        if record.content == ip.as_str() {
            info!(
                "[{}] {} already points at {}, no change needed",
                account.name, record.name, record.content
            );
            return Ok(UpdateResult::Unchanged {
                content: record.content,
            });
        }

        info!(
            "[{}] Updating {} -> {} (was: {})",
            account.name, record.name, ip, record.content
        );
        provider.update_record(&zone_id, &record, ip.as_str()).await?;

        if provider.is_dry_run() {
            return Ok(UpdateResult::DryRun {
                previous: record.content,
                content: ip.as_str().to_string(),
            });
        }
        info!("[{}] Updated {} via {}", account.name, record.name, provider.provider_name());

        Ok(UpdateResult::Updated {
            previous: record.content,
            content: ip.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accounting() {
        let report = RunReport {
            ip: ResolvedIp::from_text("1.2.3.4").unwrap(),
            accounts: vec![
                AccountReport {
                    account: "a".to_string(),
                    record: "a.example.com".to_string(),
                    result: Ok(UpdateResult::Updated {
                        previous: "5.6.7.8".to_string(),
                        content: "1.2.3.4".to_string(),
                    }),
                },
                AccountReport {
                    account: "b".to_string(),
                    record: "b.example.com".to_string(),
                    result: Err(Error::ZoneNotFound("example.net".to_string())),
                },
            ],
        };

        assert!(!report.is_success());
        assert_eq!(report.updated_count(), 1);
        let failures: Vec<&str> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["b"]);
    }
}
