//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that count calls so the tests
//! can assert exactly which provider operations a run performed.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::record::{DnsRecord, NewRecord, RecordFilter, RecordId, RecordPatch, RecordType};
use ddns_core::traits::{DnsProvider, IpSource, Notifier};
use ddns_core::{DdnsConfig, DdnsEngine, IpResolver, MemoryDnsProvider, NotificationDispatcher};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TAG: &str = "websupportsk-ddns";

/// Call counters shared between a provider and the test
#[derive(Debug, Default)]
pub struct ProviderCalls {
    pub verify: AtomicUsize,
    pub list: AtomicUsize,
    pub create: AtomicUsize,
    pub edit: AtomicUsize,
    pub delete: AtomicUsize,
    /// Every edit, in order
    pub edits: Mutex<Vec<(RecordId, RecordPatch)>>,
    /// Every deleted id, in order
    pub deletes: Mutex<Vec<RecordId>>,
}

impl ProviderCalls {
    pub fn total(&self) -> usize {
        self.verify.load(Ordering::SeqCst)
            + self.list.load(Ordering::SeqCst)
            + self.writes()
    }

    pub fn writes(&self) -> usize {
        self.create.load(Ordering::SeqCst)
            + self.edit.load(Ordering::SeqCst)
            + self.delete.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.create.load(Ordering::SeqCst)
    }

    pub fn edits(&self) -> Vec<(RecordId, RecordPatch)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<RecordId> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn verifies(&self) -> usize {
        self.verify.load(Ordering::SeqCst)
    }
}

/// How `verify_access` should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    BadCredentials,
    NoDomain,
}

/// A MemoryDnsProvider wrapper that counts calls and can inject failures
#[derive(Clone)]
pub struct CountingProvider {
    pub zone: MemoryDnsProvider,
    pub calls: Arc<ProviderCalls>,
    access: Access,
    fail_lists: Arc<AtomicBool>,
}

impl CountingProvider {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            zone: MemoryDnsProvider::with_records(records),
            calls: Arc::new(ProviderCalls::default()),
            access: Access::Granted,
            fail_lists: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Make every following list call fail with a transport error
    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<DnsRecord> {
        self.zone.snapshot().await
    }
}

#[async_trait::async_trait]
impl DnsProvider for CountingProvider {
    async fn verify_access(&self) -> Result<()> {
        self.calls.verify.fetch_add(1, Ordering::SeqCst);
        match self.access {
            Access::Granted => Ok(()),
            Access::BadCredentials => Err(Error::auth("401 Unauthorized")),
            Access::NoDomain => Err(Error::domain_access("404 Not Found")),
        }
    }

    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<DnsRecord>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Error::http("connection reset by peer"));
        }
        self.zone.list_records(filter).await
    }

    async fn create_record(&self, record: &NewRecord) -> Result<DnsRecord> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.zone.create_record(record).await
    }

    async fn edit_record(&self, id: RecordId, patch: &RecordPatch) -> Result<DnsRecord> {
        self.calls.edit.fetch_add(1, Ordering::SeqCst);
        self.calls.edits.lock().unwrap().push((id, patch.clone()));
        self.zone.edit_record(id, patch).await
    }

    async fn delete_record(&self, id: RecordId) -> Result<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.calls.deletes.lock().unwrap().push(id);
        self.zone.delete_record(id).await
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

/// What a scripted IP source answers
#[derive(Debug, Clone)]
pub enum Answer {
    Ip(Ipv4Addr),
    ConnectionFailure,
    NotAnIp(&'static str),
}

/// An IP source that replays answers, repeating the last one forever
pub struct ScriptedIpSource {
    name: &'static str,
    answers: Mutex<VecDeque<Answer>>,
    last: Mutex<Answer>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(name: &'static str, answers: Vec<Answer>) -> Self {
        let last = answers.last().cloned().unwrap_or(Answer::ConnectionFailure);
        Self {
            name,
            answers: Mutex::new(answers.into()),
            last: Mutex::new(last),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fixed(name: &'static str, ip: Ipv4Addr) -> Self {
        Self::new(name, vec![Answer::Ip(ip)])
    }

    pub fn failing(name: &'static str) -> Self {
        Self::new(name, vec![Answer::ConnectionFailure])
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.lock().unwrap().clone());

        match answer {
            Answer::Ip(ip) => Ok(ip),
            Answer::ConnectionFailure => Err(Error::http("connection refused")),
            Answer::NotAnIp(body) => body
                .trim()
                .parse()
                .map_err(|_| Error::invalid_input(format!("not an IPv4 address: {}", body))),
        }
    }

    fn source_name(&self) -> &str {
        self.name
    }
}

/// A notifier that records every message it receives
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A notifier whose transport always fails
#[derive(Clone, Default)]
pub struct FailingNotifier {
    pub attempts: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::notification("connection refused"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Build an A record
pub fn a_record(id: RecordId, name: &str, content: &str, note: &str) -> DnsRecord {
    DnsRecord {
        id,
        record_type: RecordType::A,
        name: name.to_string(),
        content: content.to_string(),
        note: note.to_string(),
        ttl: 600,
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(subdomains: &[&str]) -> DdnsConfig {
    let raw = serde_json::json!({
        "websupport": {
            "authentication": { "identifier": "test-id", "secret_key": "test-secret" },
            "registered_domain": "example.com",
            "subdomains": subdomains,
        }
    });
    serde_json::from_value(raw).expect("valid test config")
}

/// Engine over a counting provider, without notifications
pub fn engine(provider: &CountingProvider, subdomains: &[&str]) -> DdnsEngine {
    engine_with_notifier(provider, subdomains, NotificationDispatcher::disabled())
}

pub fn engine_with_notifier(
    provider: &CountingProvider,
    subdomains: &[&str],
    notifier: NotificationDispatcher,
) -> DdnsEngine {
    DdnsEngine::new(
        Box::new(provider.clone()),
        notifier,
        &minimal_config(subdomains),
    )
    .expect("engine construction succeeds")
}

pub fn resolver(primary: ScriptedIpSource, fallback: ScriptedIpSource) -> IpResolver {
    IpResolver::new(Box::new(primary), Box::new(fallback))
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().expect("valid test IP")
}
