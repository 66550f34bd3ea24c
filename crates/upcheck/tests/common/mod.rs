//! Scripted collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use upcheck::error::{AlertError, StoreError};
use upcheck::{Alerter, CheckOutcome, CheckSpec, CheckStore, Checker, MemoryCheckStore};

/// Build a valid stored record for `id` probing `http://{url}`
pub fn record(id: &str, url: &str) -> Value {
    json!({
        "id": id,
        "userPhone": "5551234567",
        "protocol": "http",
        "url": url,
        "method": "get",
        "successCodes": [200, 201],
        "timeoutSeconds": 2
    })
}

/// A 20 character check id ending in `n`
pub fn check_id(n: usize) -> String {
    format!("check{n:015}")
}

/// Checker returning a fixed outcome per URL and counting probes
#[derive(Default)]
pub struct ScriptedChecker {
    outcomes: HashMap<String, CheckOutcome>,
    delay: Duration,
    first_delay: Option<Duration>,
    probed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, outcome: CheckOutcome) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make only the very first probe take `delay`
    pub fn with_first_delay(mut self, delay: Duration) -> Self {
        self.first_delay = Some(delay);
        self
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    async fn check(&self, spec: &CheckSpec) -> CheckOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = {
            let mut probed = self.probed.lock().unwrap();
            probed.push(spec.url.clone());
            match self.first_delay {
                Some(first_delay) if probed.len() == 1 => first_delay,
                _ => self.delay,
            }
        };

        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcomes
            .get(&spec.url)
            .cloned()
            .unwrap_or(CheckOutcome::TransportError { detail: "unscripted".to_string() })
    }
}

/// Alerter remembering every notification
#[derive(Default)]
pub struct RecordingAlerter {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Alerter for RecordingAlerter {
    async fn notify(&self, subscriber: &str, message: &str) -> Result<(), AlertError> {
        self.sent.lock().unwrap().push((subscriber.to_string(), message.to_string()));
        if self.fail {
            return Err(AlertError::Delivery("sms gateway unavailable".to_string()));
        }
        Ok(())
    }
}

/// Memory store whose updates fail for selected checks
pub struct FlakyStore {
    pub inner: MemoryCheckStore,
    failing_updates: Vec<String>,
}

impl FlakyStore {
    pub fn new(inner: MemoryCheckStore, failing_updates: &[&str]) -> Self {
        Self { inner, failing_updates: failing_updates.iter().map(|id| id.to_string()).collect() }
    }
}

#[async_trait]
impl CheckStore for FlakyStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list().await
    }

    async fn read(&self, id: &str) -> Result<Value, StoreError> {
        self.inner.read(id).await
    }

    async fn update(&self, id: &str, record: &Value) -> Result<(), StoreError> {
        if self.failing_updates.iter().any(|failing| failing == id) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.update(id, record).await
    }
}
