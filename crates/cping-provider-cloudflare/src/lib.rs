// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// ## Behaviour
//
// - One provider per account, built by `CloudflareFactory`
// - Zone lookup by name, record lookup by zone + name + type, record
//   overwrite by zone + record id
// - Every call is single-shot; errors propagate to the Reconciler unchanged
// - Dry-run mode performs the lookups and logs the PUT it would send
//
// ## Security Requirements
//
// - The API key/token NEVER appears in logs or Debug output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use cping_core::config::{Account, AuthScheme, CLOUDFLARE_API_BASE};
use cping_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord};
use cping_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const PROVIDER: &str = "cloudflare";

/// Response envelope shared by every Cloudflare API v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
    name: String,
}

fn join_messages(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "request was not successful".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} (code {})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Longest raw body excerpt carried into an error message
const MAX_BODY_EXCERPT: usize = 200;

/// First non-blank line of a non-JSON body, cut to [`MAX_BODY_EXCERPT`] chars
fn body_excerpt(body: &str) -> String {
    let line = body
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    match line.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

/// Map a non-2xx response to an error, preferring Cloudflare's own messages
fn status_error(status: reqwest::StatusCode, body: &str, context: &str) -> Error {
    let detail = serde_json::from_str::<Envelope<Value>>(body)
        .map(|envelope| join_messages(&envelope.errors))
        .unwrap_or_else(|_| body_excerpt(body));

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid credentials or insufficient permissions. Status: {} - {}",
            context, status, detail
        )),
        429 => Error::rate_limited(format!("{}: Status: {}", context, status)),
        500..=599 => Error::api(
            PROVIDER,
            format!("{}: Cloudflare server error (transient): {} - {}", context, status, detail),
        ),
        _ => Error::api(PROVIDER, format!("{}: {} - {}", context, status, detail)),
    }
}

/// Cloudflare DNS provider bound to one account
pub struct CloudflareProvider {
    /// Account email (used with `AuthScheme::Key`)
    email: String,

    /// API key or token
    /// ⚠️ NEVER log this value
    token: String,

    /// How `token` is presented
    auth: AuthScheme,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("email", &self.email)
            .field("token", &"<REDACTED>")
            .field("auth", &self.auth)
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider for an account
    ///
    /// # Parameters
    ///
    /// - `account`: Credentials to authenticate with
    /// - `api_base`: API base URL (normally [`CLOUDFLARE_API_BASE`])
    /// - `client`: Shared HTTP client
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    pub fn new(
        account: &Account,
        api_base: &str,
        client: reqwest::Client,
        dry_run: bool,
    ) -> Self {
        Self {
            email: account.email.clone(),
            token: account.token.clone(),
            auth: account.auth,
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
            dry_run,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            AuthScheme::Key => request
                .header("X-Auth-Email", &self.email)
                .header("X-Auth-Key", &self.token),
            AuthScheme::Token => request.bearer_auth(&self.token),
        }
    }

    /// Send a request and unwrap the Cloudflare envelope
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = self
            .authorize(request)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::network(format!("{}: HTTP request failed: {}", context, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::body(format!("{}: {}", context, e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body, context));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(Error::api(
                PROVIDER,
                format!("{}: {}", context, join_messages(&envelope.errors)),
            ));
        }

        envelope
            .result
            .ok_or_else(|| Error::api(PROVIDER, format!("{}: response has no result", context)))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn resolve_zone(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for: {}", zone_name);

        let url = format!("{}/zones", self.api_base);
        let zones: Vec<Zone> = self
            .call(
                self.client.get(&url).query(&[("name", zone_name)]),
                "Zone lookup",
            )
            .await?;

        let zone = zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(zone_name))
            .ok_or_else(|| Error::ZoneNotFound(zone_name.to_string()))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: &str,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Looking up record: {} (type: {})", record_name, record_type);

        let url = format!("{}/zones/{}/dns_records", self.api_base, zone_id);
        let records: Vec<DnsRecord> = self
            .call(
                self.client
                    .get(&url)
                    .query(&[("type", record_type), ("name", record_name)]),
                "Record lookup",
            )
            .await?;

        tracing::debug!("Found {} record(s) named {}", records.len(), record_name);
        Ok(records)
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A",
    ///   "name": "home.example.com",
    ///   "content": "5.6.7.8",
    ///   "ttl": 1,
    ///   "proxied": false
    /// }
    /// ```
    ///
    /// Skipped in dry-run mode.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_content: &str,
    ) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", self.api_base, zone_id, record.id);

        let mut payload = serde_json::json!({
            "type": record.record_type,
            "name": record.name,
            "content": new_content,
            "ttl": record.ttl,
        });
        if let Some(proxied) = record.proxied {
            payload["proxied"] = Value::Bool(proxied);
        }

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                payload
            );
            return Ok(());
        }

        let _: Value = self
            .call(self.client.put(&url).json(&payload), "Record update")
            .await
            .map_err(|e| Error::update_failed(new_content, e.to_string()))?;

        tracing::debug!("DNS record updated: {} -> {}", record.name, new_content);
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory {
    api_base: String,
    dry_run: bool,
    client: reqwest::Client,
}

impl CloudflareFactory {
    /// Create a factory
    ///
    /// # Parameters
    ///
    /// - `api_base`: API base URL (injectable for testing)
    /// - `dry_run`: If true, providers skip PUT updates
    pub fn new(api_base: impl Into<String>, dry_run: bool) -> Self {
        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Self {
            api_base: api_base.into(),
            dry_run,
            client: reqwest::Client::builder()
                .user_agent(concat!("cping/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for CloudflareFactory {
    fn default() -> Self {
        Self::new(CLOUDFLARE_API_BASE, false)
    }
}

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, account: &Account) -> Result<Box<dyn DnsProvider>> {
        if account.token.is_empty() {
            return Err(Error::InvalidAccount {
                account: account.name.clone(),
                field: "token",
            });
        }

        Ok(Box::new(CloudflareProvider::new(
            account,
            &self.api_base,
            self.client.clone(),
            self.dry_run,
        )))
    }
}
