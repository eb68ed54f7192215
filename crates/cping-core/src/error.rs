//! Error types for cping
//!
//! Every failure in a run maps onto one variant here. Nothing is retried and
//! nothing is swallowed: errors either fail an account or the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cping operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cping
#[derive(Error, Debug)]
pub enum Error {
    /// The account file does not exist
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The account file exists but could not be parsed
    #[error("Failed to parse {path}: {message}")]
    ConfigParse {
        /// Path of the offending file
        path: String,
        /// Parser message, prefixed with the section when known
        message: String,
    },

    /// An account section is structurally valid but has an empty field
    #[error("Account '{account}': field '{field}' must not be empty")]
    InvalidAccount {
        /// Section name of the account
        account: String,
        /// Name of the empty field
        field: &'static str,
    },

    /// Run-level configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be sent or no usable response came back
    #[error("Network error: {0}")]
    Network(String),

    /// Response arrived but its body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The IP endpoint returned something that is not an IPv4 address
    #[error("Invalid address from IP lookup: '{0}'")]
    InvalidAddress(String),

    /// No zone with the configured name
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// No A record with the configured name
    #[error("Record not found: {name} [zone: {zone}]")]
    RecordNotFound {
        /// Record name that was looked up
        name: String,
        /// Zone it was looked up in
        zone: String,
    },

    /// More than one A record with the configured name
    #[error("Ambiguous record: {count} A records named {name} [zone: {zone}]")]
    AmbiguousRecord {
        /// Record name that was looked up
        name: String,
        /// Zone it was looked up in
        zone: String,
        /// Number of matching records
        count: usize,
    },

    /// The provider refused or failed the record update
    #[error("Failed to update API with new content: {content} ({message})")]
    UpdateFailed {
        /// Content the update tried to set
        content: String,
        /// Underlying reason
        message: String,
    },

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider reported a non-success result
    #[error("Provider error ({provider}): {message}")]
    Api {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a parse error for a config file
    pub fn config_parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a run-level configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a body read error
    pub fn body(msg: impl Into<String>) -> Self {
        Self::Body(msg.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(name: impl Into<String>, zone: impl Into<String>) -> Self {
        Self::RecordNotFound {
            name: name.into(),
            zone: zone.into(),
        }
    }

    /// Create an "ambiguous record" error
    pub fn ambiguous_record(name: impl Into<String>, zone: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousRecord {
            name: name.into(),
            zone: zone.into(),
            count,
        }
    }

    /// Create an update failure carrying the attempted content
    pub fn update_failed(content: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateFailed {
            content: content.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
