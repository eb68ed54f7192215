// # cping
//
// Thin integration layer: turns CLI flags into `Settings`, builds the IP
// source and the provider factory, and runs the Reconciler once. All DNS
// logic lives in cping-core and the plugin crates.
//
// ## Configuration
//
// ### Flags (environment fallbacks in parentheses)
// - `-c`, `--config` (`CPING_CONFIG`): account file, default `$HOME/.cping`
// - `--ip-url` (`CPING_IP_URL`): "echo my IP" endpoint
// - `--api-url` (`CPING_API_URL`): Cloudflare API base URL
// - `--fail-fast`: stop at the first failing account
// - `--dry-run`: look everything up but do not change records
// - `-v`, `--verbose`: status lines; repeat for debug output
//
// Log lines and errors go to standard error; nothing is written to standard
// output.
//
// ### Environment
// - `CPING_LOG_LEVEL`: overrides the level implied by `-v` (trace, debug,
//   info, warn, error)
//
// ## Example
//
// ```bash
// cat > ~/.cping <<EOF
// [home]
// email = "me@example.com"
// token = "0123456789abcdef"
// zone  = "example.com"
// name  = "home.example.com"
// EOF
//
// cping -v
// ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use cping_core::config::{CLOUDFLARE_API_BASE, DEFAULT_IP_LOOKUP_URL, default_config_path};
use cping_core::{AccountStore, FailurePolicy, Reconciler, RunReport, Settings};
use cping_ip_http::HttpIpSource;
use cping_provider_cloudflare::CloudflareFactory;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

/// Exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpingExitCode {
    /// Every account reconciled
    Success = 0,
    /// Anything failed: configuration, IP lookup, or any account
    Failure = 1,
}

impl From<CpingExitCode> for ExitCode {
    fn from(code: CpingExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Point DNS A records at this host's public IP address
#[derive(Parser, Debug)]
#[command(name = "cping", version, about, long_about = None)]
pub struct Args {
    /// Print status lines (repeat for debug output)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Account file [default: $HOME/.cping]
    #[arg(short, long, value_name = "FILE", env = "CPING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Plain-text "echo my IP" endpoint
    #[arg(long, value_name = "URL", env = "CPING_IP_URL", default_value = DEFAULT_IP_LOOKUP_URL)]
    pub ip_url: String,

    /// DNS provider API base URL
    #[arg(long, value_name = "URL", env = "CPING_API_URL", default_value = CLOUDFLARE_API_BASE)]
    pub api_url: String,

    /// Stop at the first failing account instead of continuing
    #[arg(long)]
    pub fail_fast: bool,

    /// Look up records but do not change them
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Run settings implied by the flags
    pub fn settings(&self) -> Settings {
        Settings {
            ip_lookup_url: self.ip_url.clone(),
            api_base_url: self.api_url.clone(),
            failure_policy: if self.fail_fast {
                FailurePolicy::Abort
            } else {
                FailurePolicy::Continue
            },
            dry_run: self.dry_run,
        }
    }

    /// Account file path: the flag, or `$HOME/.cping`
    pub fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let home = std::env::var_os("HOME")
            .context("HOME is not set; pass the account file with --config")?;
        Ok(default_config_path(home))
    }

    /// Log level implied by `-v` and `CPING_LOG_LEVEL`
    pub fn log_level(&self) -> Result<Level> {
        level_for(self.verbose, std::env::var("CPING_LOG_LEVEL").ok().as_deref())
    }
}

/// Log level for a `-v` count, unless an explicit level overrides it
pub fn level_for(verbose: u8, override_level: Option<&str>) -> Result<Level> {
    if let Some(level) = override_level {
        return parse_level(level);
    }
    Ok(match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    })
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "CPING_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Load accounts and reconcile each of them once
pub async fn run(settings: &Settings, config_path: &Path) -> Result<RunReport> {
    settings.validate()?;

    let accounts = AccountStore::load(config_path)?;
    if accounts.is_empty() {
        anyhow::bail!("No accounts configured in {}", config_path.display());
    }
    tracing::info!(
        "Loaded {} account(s) from {}",
        accounts.len(),
        config_path.display()
    );

    let reconciler = Reconciler::new(
        Box::new(HttpIpSource::new(settings.ip_lookup_url.as_str())),
        Box::new(CloudflareFactory::new(
            settings.api_base_url.as_str(),
            settings.dry_run,
        )),
        accounts,
        settings.failure_policy,
    )?;

    Ok(reconciler.run().await?)
}

/// Exit code for a finished run
pub fn exit_code(outcome: &Result<RunReport>) -> CpingExitCode {
    match outcome {
        Ok(report) if report.is_success() => CpingExitCode::Success,
        _ => CpingExitCode::Failure,
    }
}
