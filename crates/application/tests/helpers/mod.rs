#![allow(dead_code)]

pub mod mock_services;

pub use mock_services::{MockReply, MockReputationService};

use dns_reputation_application::services::{Backoff, LookupClient, LookupPolicy, RateLimiter};
use dns_reputation_domain::Domain;
use std::sync::Arc;
use std::time::Duration;

pub fn domain(name: &str) -> Domain {
    Domain::parse(name).unwrap()
}

/// Policy with short, deterministic delays for paused-clock tests.
pub fn fast_policy(max_retries: u32) -> LookupPolicy {
    LookupPolicy::default()
        .with_max_retries(max_retries)
        .with_attempt_timeout(Duration::from_millis(500))
        .with_backoff(Backoff::fixed(Duration::from_millis(100)))
        .with_rate_limit(Duration::from_secs(5), 3)
}

pub fn make_client(
    service: &MockReputationService,
    requests_per_second: f64,
    policy: LookupPolicy,
) -> Arc<LookupClient> {
    Arc::new(LookupClient::new(
        Arc::new(service.clone()),
        Arc::new(RateLimiter::new(requests_per_second).unwrap()),
        policy,
    ))
}
