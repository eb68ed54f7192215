// # cping - dynamic DNS updater
//
// Resolves this host's public IP once and points the A record of every
// configured account at it. See the library docs for flags and the account
// file format.

use clap::Parser;
use cping::{Args, CpingExitCode, exit_code, run};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() {
                CpingExitCode::Failure
            } else {
                CpingExitCode::Success
            };
            if let Err(print_err) = e.print() {
                eprintln!("{}", print_err);
            }
            return code.into();
        }
    };

    let log_level = match args.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return CpingExitCode::Failure.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CpingExitCode::Failure.into();
    }

    let config_path = match args.config_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return CpingExitCode::Failure.into();
        }
    };

    // Accounts are reconciled one after another; no worker threads needed
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return CpingExitCode::Failure.into();
        }
    };

    let outcome = rt.block_on(run(&args.settings(), &config_path));

    match &outcome {
        Ok(report) => {
            for (account, error) in report.failures() {
                eprintln!("{}: {}", account, error);
            }
            if args.dry_run {
                tracing::info!(
                    "{} account(s) checked, {} would be updated (dry run, nothing changed)",
                    report.accounts.len(),
                    report.dry_run_count()
                );
            } else {
                tracing::info!(
                    "{} account(s) checked, {} updated",
                    report.accounts.len(),
                    report.updated_count()
                );
            }
        }
        Err(e) => eprintln!("{:#}", e),
    }

    exit_code(&outcome).into()
}
