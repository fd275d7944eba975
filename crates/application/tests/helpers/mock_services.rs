#![allow(dead_code)]

use async_trait::async_trait;
use dns_reputation_application::ports::{ReputationPayload, ReputationService, ServiceError};
use dns_reputation_domain::Domain;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

// ============================================================================
// Mock ReputationService
// ============================================================================

/// What the mock answers for one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Score(i64),
    Error(ServiceError),
    /// Never answers; only a timeout or cancellation ends the call.
    Hang,
    Panic,
}

impl MockReply {
    pub fn transport() -> Self {
        MockReply::Error(ServiceError::Transport("connection reset by peer".to_string()))
    }

    pub fn status(code: u16) -> Self {
        MockReply::Error(ServiceError::Status {
            code,
            message: "upstream unavailable".to_string(),
        })
    }

    pub fn throttled(retry_after: Option<Duration>) -> Self {
        MockReply::Error(ServiceError::RateLimited { retry_after })
    }
}

/// Scripted reputation service.
///
/// Replies are taken from the script first, then from the per-domain
/// fallback, then from the global fallback. Every call is counted and its
/// dispatch instant recorded.
#[derive(Clone)]
pub struct MockReputationService {
    script: Arc<RwLock<VecDeque<MockReply>>>,
    per_domain: Arc<RwLock<HashMap<String, MockReply>>>,
    fallback: Arc<RwLock<MockReply>>,
    latency: Arc<RwLock<Duration>>,
    calls: Arc<AtomicUsize>,
    calls_by_domain: Arc<RwLock<HashMap<String, usize>>>,
    dispatched: Arc<RwLock<Vec<Instant>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockReputationService {
    pub fn new() -> Self {
        Self::with_fallback(MockReply::Score(75))
    }

    pub fn with_fallback(reply: MockReply) -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            per_domain: Arc::new(RwLock::new(HashMap::new())),
            fallback: Arc::new(RwLock::new(reply)),
            latency: Arc::new(RwLock::new(Duration::ZERO)),
            calls: Arc::new(AtomicUsize::new(0)),
            calls_by_domain: Arc::new(RwLock::new(HashMap::new())),
            dispatched: Arc::new(RwLock::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue replies consumed one per call, in order.
    pub async fn push_script(&self, replies: Vec<MockReply>) {
        self.script.write().await.extend(replies);
    }

    pub async fn set_reply_for(&self, domain: &str, reply: MockReply) {
        self.per_domain.write().await.insert(domain.to_string(), reply);
    }

    pub async fn set_fallback(&self, reply: MockReply) {
        *self.fallback.write().await = reply;
    }

    /// Simulated network latency applied to every answered call.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn calls_for(&self, domain: &str) -> usize {
        self.calls_by_domain
            .read()
            .await
            .get(domain)
            .copied()
            .unwrap_or(0)
    }

    pub async fn dispatch_times(&self) -> Vec<Instant> {
        self.dispatched.read().await.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn next_reply(&self, domain: &str) -> MockReply {
        if let Some(reply) = self.script.write().await.pop_front() {
            return reply;
        }
        if let Some(reply) = self.per_domain.read().await.get(domain) {
            return reply.clone();
        }
        self.fallback.read().await.clone()
    }
}

impl Default for MockReputationService {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReputationService for MockReputationService {
    async fn query(&self, domain: &Domain) -> Result<ReputationPayload, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_domain
            .write()
            .await
            .entry(domain.as_str().to_string())
            .or_default() += 1;
        self.dispatched.write().await.push(Instant::now());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));

        let reply = self.next_reply(domain.as_str()).await;
        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match reply {
            MockReply::Score(score) => Ok(ReputationPayload::new(score, ["general"])),
            MockReply::Error(e) => Err(e),
            MockReply::Hang => std::future::pending().await,
            MockReply::Panic => panic!("mock reputation service panicked for {}", domain),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
