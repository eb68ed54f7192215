//! Configuration types for cping
//!
//! Two sources feed a run:
//! - the account file (TOML, one top-level table per named account), loaded
//!   through [`AccountStore::load`]
//! - [`Settings`]: endpoints and policies, normally filled from CLI flags
//!
//! ```toml
//! [home]
//! email = "me@example.com"
//! token = "0123456789abcdef"
//! zone  = "example.com"
//! name  = "home.example.com"
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the account file inside the home directory
pub const DEFAULT_CONFIG_FILE: &str = ".cping";

/// Default "echo my IP" endpoint (IPv4-only host name)
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipv4.icanhazip.com";

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default location of the account file for a given home directory
pub fn default_config_path(home: impl AsRef<Path>) -> PathBuf {
    home.as_ref().join(DEFAULT_CONFIG_FILE)
}

/// How the provider authenticates an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Account email plus global API key
    #[default]
    Key,
    /// Scoped API token (bearer)
    Token,
}

/// One named account: credentials plus the record it manages
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Section name in the account file
    pub name: String,
    /// Account email
    pub email: String,
    /// API key or token
    /// ⚠️ NEVER log this value
    pub token: String,
    /// Zone the record lives in (e.g. "example.com")
    pub zone: String,
    /// Record whose A record is managed (e.g. "home.example.com")
    pub record: String,
    /// Pre-resolved zone identifier; skips the zone lookup when set
    pub zone_id: Option<String>,
    /// Authentication scheme for `token`
    pub auth: AuthScheme,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("record", &self.record)
            .field("zone_id", &self.zone_id)
            .field("auth", &self.auth)
            .finish()
    }
}

/// On-disk shape of one account section
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AccountSection {
    email: String,
    token: String,
    zone: String,
    name: String,
    #[serde(default)]
    zone_id: Option<String>,
    #[serde(default)]
    auth: AuthScheme,
}

impl AccountSection {
    fn into_account(self, section: &str) -> Result<Account> {
        for (field, value) in [
            ("email", &self.email),
            ("token", &self.token),
            ("zone", &self.zone),
            ("name", &self.name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidAccount {
                    account: section.to_string(),
                    field,
                });
            }
        }

        Ok(Account {
            name: section.to_string(),
            email: self.email,
            token: self.token,
            zone: self.zone,
            record: self.name,
            zone_id: self.zone_id.filter(|id| !id.trim().is_empty()),
            auth: self.auth,
        })
    }
}

/// Named accounts, iterated in section-name order
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: BTreeMap<String, Account>,
}

impl AccountStore {
    /// Load accounts from a file
    ///
    /// # Errors
    ///
    /// - [`Error::ConfigNotFound`] if the file does not exist
    /// - [`Error::Io`] if it cannot be read
    /// - [`Error::ConfigParse`] if it is not valid TOML or a section is malformed
    /// - [`Error::InvalidAccount`] if a required field is empty
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let store = Self::parse(&source, &path.display().to_string())?;
        tracing::debug!("Loaded {} account(s) from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse accounts from TOML text; `origin` names the source in errors
    pub fn parse(source: &str, origin: &str) -> Result<Self> {
        let table: toml::Table = source
            .parse()
            .map_err(|e: toml::de::Error| Error::config_parse(origin, e.message()))?;

        let mut accounts = BTreeMap::new();
        for (section, value) in table {
            if !value.is_table() {
                return Err(Error::config_parse(
                    origin,
                    format!("[{}] is not an account section", section),
                ));
            }

            let parsed: AccountSection = value
                .try_into()
                .map_err(|e: toml::de::Error| {
                    Error::config_parse(origin, format!("[{}] {}", section, e.message()))
                })?;

            let account = parsed.into_account(&section)?;
            accounts.insert(section, account);
        }

        Ok(Self { accounts })
    }

    /// Build a store from already constructed accounts
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.name.clone(), account))
                .collect(),
        }
    }

    /// Look up an account by section name
    pub fn get(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    /// Accounts in section-name order
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// What a run does when one account fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and move on to the next account
    #[default]
    Continue,
    /// Stop the run at the first failing account
    Abort,
}

/// Endpoints and policies for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// URL of the plain-text "echo my IP" endpoint
    pub ip_lookup_url: String,

    /// Base URL of the DNS provider API
    pub api_base_url: String,

    /// Behaviour when an account fails
    pub failure_policy: FailurePolicy,

    /// Perform lookups but skip record updates
    pub dry_run: bool,
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        for (label, url) in [
            ("IP lookup URL", &self.ip_lookup_url),
            ("API base URL", &self.api_base_url),
        ] {
            if url.is_empty() {
                return Err(Error::config(format!("{} cannot be empty", label)));
            }
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(Error::config(format!(
                    "{} must use HTTP or HTTPS scheme. Got: {}",
                    label, url
                )));
            }
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            api_base_url: CLOUDFLARE_API_BASE.to_string(),
            failure_policy: FailurePolicy::default(),
            dry_run: false,
        }
    }
}
