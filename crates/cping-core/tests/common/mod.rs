//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles record every call so tests can assert on what reached the
//! provider, not just on the returned report.

#![allow(dead_code)]

use cping_core::error::{Error, Result};
use cping_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, IpSource, ResolvedIp};
use cping_core::{Account, AuthScheme};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IP source that always returns the same address
pub struct FixedIpSource {
    ip: String,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle on the number of current() calls
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<ResolvedIp> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        ResolvedIp::from_text(&self.ip)
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// An IP source whose endpoint is unreachable
pub struct UnreachableIpSource;

#[async_trait::async_trait]
impl IpSource for UnreachableIpSource {
    async fn current(&self) -> Result<ResolvedIp> {
        Err(Error::network("connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "unreachable"
    }
}

/// An update that reached the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub account: String,
    pub zone_id: String,
    pub record: DnsRecord,
    pub content: String,
}

#[derive(Default)]
struct MockState {
    zones: HashMap<String, String>,
    records: HashMap<String, Vec<DnsRecord>>,
    updates: Vec<RecordedUpdate>,
    created_for: Vec<String>,
    zone_lookups: usize,
    failing_updates: bool,
    dry_run: bool,
}

/// In-memory provider backend shared by every provider it creates
///
/// Cloning shares state, so a test keeps one handle while the Reconciler
/// owns another.
#[derive(Clone, Default)]
pub struct MockDns {
    state: Arc<Mutex<MockState>>,
}

impl MockDns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone name and its identifier
    pub fn with_zone(self, name: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .zones
            .insert(name.to_string(), id.to_string());
        self
    }

    /// Add a record to a zone (by zone identifier)
    pub fn with_record(self, zone_id: &str, record: DnsRecord) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Make every update call fail
    pub fn with_failing_updates(self) -> Self {
        self.state.lock().unwrap().failing_updates = true;
        self
    }

    /// Providers log updates instead of recording them
    pub fn with_dry_run(self) -> Self {
        self.state.lock().unwrap().dry_run = true;
        self
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Accounts a provider was created for, in order
    pub fn created_for(&self) -> Vec<String> {
        self.state.lock().unwrap().created_for.clone()
    }

    pub fn zone_lookups(&self) -> usize {
        self.state.lock().unwrap().zone_lookups
    }
}

impl DnsProviderFactory for MockDns {
    fn create(&self, account: &Account) -> Result<Box<dyn DnsProvider>> {
        self.state
            .lock()
            .unwrap()
            .created_for
            .push(account.name.clone());

        Ok(Box::new(MockDnsProvider {
            account: account.name.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

/// A provider bound to one account of a [`MockDns`]
pub struct MockDnsProvider {
    account: String,
    state: Arc<Mutex<MockState>>,
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone(&self, zone_name: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.zone_lookups += 1;
        state
            .zones
            .get(zone_name)
            .cloned()
            .ok_or_else(|| Error::ZoneNotFound(zone_name.to_string()))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: &str,
    ) -> Result<Vec<DnsRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .get(zone_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.name == record_name && r.record_type == record_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_content: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.dry_run {
            return Ok(());
        }
        state.updates.push(RecordedUpdate {
            account: self.account.clone(),
            zone_id: zone_id.to_string(),
            record: record.clone(),
            content: new_content.to_string(),
        });

        if state.failing_updates {
            return Err(Error::update_failed(new_content, "provider unavailable"));
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.state.lock().unwrap().dry_run
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to build an account
pub fn account(name: &str, zone: &str, record: &str) -> Account {
    Account {
        name: name.to_string(),
        email: format!("{}@example.com", name),
        token: "test-token".to_string(),
        zone: zone.to_string(),
        record: record.to_string(),
        zone_id: None,
        auth: AuthScheme::Key,
    }
}

/// Helper to build an A record
pub fn a_record(id: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        name: name.to_string(),
        record_type: "A".to_string(),
        content: content.to_string(),
        ttl: 120,
        proxied: Some(false),
    }
}
