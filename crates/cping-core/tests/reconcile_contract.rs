//! Contract Test: Resolve → Compare → Conditionally Update
//!
//! Constraints verified:
//! - Matching content never triggers an update call
//! - Differing content triggers exactly one update carrying the resolved IP,
//!   with every other record field unchanged
//! - Zero or several matching A records fail the account without an update
//! - An IP resolution failure prevents any provider call
//! - Several accounts are updated independently with their own zone/record

mod common;

use common::*;
use cping_core::{AccountStore, Error, FailurePolicy, Reconciler, UpdateResult};
use std::sync::atomic::Ordering;
use tokio_test::{assert_err, assert_ok};

fn reconciler(ip: &str, dns: &MockDns, accounts: AccountStore) -> Reconciler {
    Reconciler::new(
        Box::new(FixedIpSource::new(ip)),
        Box::new(dns.clone()),
        accounts,
        FailurePolicy::Continue,
    )
    .expect("reconciler construction succeeds")
}

fn home_account() -> AccountStore {
    AccountStore::from_accounts([account("home", "example.com", "home.example.com")])
}

#[tokio::test]
async fn matching_content_issues_no_update() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.4"));

    let report = assert_ok!(reconciler("1.2.3.4", &dns, home_account()).run().await);

    assert!(report.is_success());
    assert_eq!(
        report.accounts[0].result.as_ref().unwrap(),
        &UpdateResult::Unchanged {
            content: "1.2.3.4".to_string()
        }
    );
    assert!(dns.updates().is_empty(), "no update expected for equal content");
}

#[tokio::test]
async fn differing_content_issues_exactly_one_update() {
    let original = a_record("rec-1", "home.example.com", "1.2.3.4");
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", original.clone());

    let report = assert_ok!(reconciler("5.6.7.8", &dns, home_account()).run().await);

    assert!(report.is_success());
    assert_eq!(report.updated_count(), 1);

    let updates = dns.updates();
    assert_eq!(updates.len(), 1);
    let update = &updates[0];
    assert_eq!(update.zone_id, "zone-1");
    assert_eq!(update.content, "5.6.7.8");
    // The provider receives the record exactly as looked up
    assert_eq!(update.record, original);
}

#[tokio::test]
async fn comparison_is_exact_text() {
    // A leading zero is the same address numerically but not textually
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.04"));

    assert_ok!(reconciler("1.2.3.4", &dns, home_account()).run().await);
    assert_eq!(dns.updates().len(), 1);
}

#[tokio::test]
async fn missing_record_fails_account_without_update() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-9", "other.example.com", "1.2.3.4"));

    let report = assert_ok!(reconciler("5.6.7.8", &dns, home_account()).run().await);

    assert!(!report.is_success());
    let err = report.accounts[0].result.as_ref().unwrap_err();
    assert!(matches!(err, Error::RecordNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Record not found: home.example.com [zone: example.com]"
    );
    assert!(dns.updates().is_empty());
}

#[tokio::test]
async fn ambiguous_record_fails_account_without_update() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.4"))
        .with_record("zone-1", a_record("rec-2", "home.example.com", "9.9.9.9"));

    let report = assert_ok!(reconciler("5.6.7.8", &dns, home_account()).run().await);

    let err = report.accounts[0].result.as_ref().unwrap_err();
    assert!(matches!(err, Error::AmbiguousRecord { count: 2, .. }));
    assert!(dns.updates().is_empty());
}

#[tokio::test]
async fn unknown_zone_fails_account() {
    let dns = MockDns::new();

    let report = assert_ok!(reconciler("5.6.7.8", &dns, home_account()).run().await);

    assert!(matches!(
        report.accounts[0].result,
        Err(Error::ZoneNotFound(ref zone)) if zone == "example.com"
    ));
    assert!(dns.updates().is_empty());
}

#[tokio::test]
async fn ip_failure_prevents_all_provider_calls() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.4"));

    let reconciler = Reconciler::new(
        Box::new(UnreachableIpSource),
        Box::new(dns.clone()),
        home_account(),
        FailurePolicy::Continue,
    )
    .unwrap();

    let err = assert_err!(reconciler.run().await);
    assert!(matches!(err, Error::Network(_)));
    assert!(dns.created_for().is_empty(), "no provider should be created");
    assert!(dns.updates().is_empty());
}

#[tokio::test]
async fn ip_is_resolved_once_per_run() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "a.example.com", "1.2.3.4"))
        .with_record("zone-1", a_record("rec-2", "b.example.com", "1.2.3.4"));

    let ip_source = FixedIpSource::new("1.2.3.4");
    let calls = ip_source.call_counter();

    let reconciler = Reconciler::new(
        Box::new(ip_source),
        Box::new(dns.clone()),
        AccountStore::from_accounts([
            account("a", "example.com", "a.example.com"),
            account("b", "example.com", "b.example.com"),
        ]),
        FailurePolicy::Continue,
    )
    .unwrap();

    assert_ok!(reconciler.run().await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn two_accounts_update_independently() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-com")
        .with_zone("example.org", "zone-org")
        .with_record("zone-com", a_record("rec-com", "home.example.com", "1.2.3.4"))
        .with_record("zone-org", a_record("rec-org", "vpn.example.org", "1.2.3.4"));

    let accounts = AccountStore::from_accounts([
        account("work", "example.org", "vpn.example.org"),
        account("home", "example.com", "home.example.com"),
    ]);

    let report = assert_ok!(reconciler("5.6.7.8", &dns, accounts).run().await);
    assert!(report.is_success());
    assert_eq!(report.updated_count(), 2);

    // Fixed order: section names sorted
    assert_eq!(dns.created_for(), vec!["home", "work"]);

    let updates = dns.updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].account, "home");
    assert_eq!(updates[0].zone_id, "zone-com");
    assert_eq!(updates[0].record.id, "rec-com");
    assert_eq!(updates[1].account, "work");
    assert_eq!(updates[1].zone_id, "zone-org");
    assert_eq!(updates[1].record.id, "rec-org");
    assert!(updates.iter().all(|u| u.content == "5.6.7.8"));
}

#[tokio::test]
async fn preconfigured_zone_id_skips_zone_lookup() {
    let dns = MockDns::new().with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.4"));

    let mut home = account("home", "example.com", "home.example.com");
    home.zone_id = Some("zone-1".to_string());

    let report = assert_ok!(
        reconciler("5.6.7.8", &dns, AccountStore::from_accounts([home]))
            .run()
            .await
    );

    assert!(report.is_success());
    assert_eq!(dns.zone_lookups(), 0);
    assert_eq!(dns.updates()[0].zone_id, "zone-1");
}

#[tokio::test]
async fn failed_update_is_reported_with_content() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.4"))
        .with_failing_updates();

    let report = assert_ok!(reconciler("5.6.7.8", &dns, home_account()).run().await);

    let err = report.accounts[0].result.as_ref().unwrap_err();
    assert!(matches!(err, Error::UpdateFailed { content, .. } if content == "5.6.7.8"));
    assert_eq!(dns.updates().len(), 1, "exactly one attempt, no retry");
}

#[tokio::test]
async fn dry_run_is_not_counted_as_updated() {
    let dns = MockDns::new()
        .with_zone("example.com", "zone-1")
        .with_record("zone-1", a_record("rec-1", "home.example.com", "1.2.3.4"))
        .with_dry_run();

    let report = assert_ok!(reconciler("5.6.7.8", &dns, home_account()).run().await);

    assert!(report.is_success());
    assert_eq!(report.updated_count(), 0);
    assert_eq!(report.dry_run_count(), 1);
    assert_eq!(
        report.accounts[0].result.as_ref().unwrap(),
        &UpdateResult::DryRun {
            previous: "1.2.3.4".to_string(),
            content: "5.6.7.8".to_string(),
        }
    );
    assert!(dns.updates().is_empty());
}
