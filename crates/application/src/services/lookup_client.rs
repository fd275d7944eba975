use crate::ports::{ReputationPayload, ReputationService, ServiceError};
use crate::services::{Backoff, RateLimiter};
use dns_reputation_domain::config::ApiConfig;
use dns_reputation_domain::{
    AttemptError, Domain, LookupErrorKind, LookupFailure, LookupResult, LookupStats, LookupSuccess,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Retry, timeout and throttling policy for one lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupPolicy {
    /// Hard limit on a single attempt.
    pub attempt_timeout: Duration,
    /// Total attempts for transport, timeout and status failures.
    pub max_retries: u32,
    /// Sleep after a throttling answer that carries no Retry-After hint.
    pub rate_limit_cooldown: Duration,
    /// Throttling answers tolerated per lookup before giving up.
    pub max_rate_limit_retries: u32,
    pub backoff: Backoff,
}

impl LookupPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            attempt_timeout: config.attempt_timeout(),
            max_retries: config.max_retries.max(1),
            rate_limit_cooldown: config.rate_limit_cooldown(),
            max_rate_limit_retries: config.max_rate_limit_retries,
            backoff: Backoff::from_config(&config.backoff),
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_rate_limit(mut self, cooldown: Duration, max_retries: u32) -> Self {
        self.rate_limit_cooldown = cooldown;
        self.max_rate_limit_retries = max_retries;
        self
    }
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

/// Outcome of one attempt, before it is folded into the lookup state.
enum Attempt {
    Done(Result<ReputationPayload, ServiceError>, Duration),
    TimedOut,
}

/// Resolves one domain's reputation against the remote service.
///
/// Every attempt first takes a slot from the shared [`RateLimiter`] and is
/// bounded by the policy's attempt timeout. Throttling answers from the
/// service are retried after a cooldown without consuming an attempt, up to
/// their own ceiling.
pub struct LookupClient {
    service: Arc<dyn ReputationService>,
    limiter: Arc<RateLimiter>,
    policy: LookupPolicy,
    remote_calls: AtomicU64,
    throttled: AtomicU64,
    retries: AtomicU64,
}

impl LookupClient {
    pub fn new(
        service: Arc<dyn ReputationService>,
        limiter: Arc<RateLimiter>,
        policy: LookupPolicy,
    ) -> Self {
        Self {
            service,
            limiter,
            policy,
            remote_calls: AtomicU64::new(0),
            throttled: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &LookupPolicy {
        &self.policy
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn stats(&self) -> LookupStats {
        LookupStats {
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
            throttled_responses: self.throttled.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }

    /// Look `domain` up with the client's configured policy.
    pub async fn lookup(&self, domain: &Domain, cancel: &CancellationToken) -> LookupResult {
        self.lookup_with(domain, &self.policy, cancel).await
    }

    /// Look `domain` up with an explicit policy. Never fails: every error
    /// ends up as a [`LookupResult::Failure`].
    #[instrument(skip(self, policy, cancel), fields(service = self.service.name()))]
    pub async fn lookup_with(
        &self,
        domain: &Domain,
        policy: &LookupPolicy,
        cancel: &CancellationToken,
    ) -> LookupResult {
        let max_attempts = policy.max_retries.max(1);
        let mut attempts: u32 = 0;
        let mut throttled: u32 = 0;
        let mut last_error: Option<AttemptError> = None;
        let mut last_timed_out = false;
        let mut last_response_time: Option<Duration> = None;

        loop {
            if self.limiter.wait(cancel).await.is_err() {
                return self.cancelled(domain, attempts, last_error);
            }

            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.cancelled(domain, attempts, last_error);
                }
                attempt = self.attempt(domain, policy.attempt_timeout) => attempt,
            };

            let error = match attempt {
                Attempt::Done(Ok(payload), elapsed) => {
                    debug!(
                        domain = %domain,
                        score = payload.score,
                        attempt = attempts + 1,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Reputation lookup succeeded"
                    );
                    return LookupSuccess::new(
                        domain.clone(),
                        payload.score,
                        payload.categories,
                        elapsed,
                    )
                    .into();
                }
                Attempt::Done(Err(ServiceError::RateLimited { retry_after }), elapsed) => {
                    self.throttled.fetch_add(1, Ordering::Relaxed);
                    throttled += 1;
                    if throttled > policy.max_rate_limit_retries {
                        warn!(
                            domain = %domain,
                            throttled,
                            "Remote service kept throttling, giving up"
                        );
                        return LookupFailure::new(domain.clone(), LookupErrorKind::RateLimited)
                            .with_last_error(AttemptError::new(
                                LookupErrorKind::RateLimited,
                                "remote service is throttling requests",
                            ))
                            .with_attempts(attempts)
                            .with_response_time(Some(elapsed))
                            .into();
                    }

                    let cooldown = retry_after.unwrap_or(policy.rate_limit_cooldown);
                    warn!(
                        domain = %domain,
                        cooldown_ms = cooldown.as_millis() as u64,
                        throttled,
                        "Remote service throttled the request, cooling down"
                    );
                    if !sleep_or_cancel(cooldown, cancel).await {
                        return self.cancelled(domain, attempts, last_error);
                    }
                    continue;
                }
                Attempt::Done(Err(e), elapsed) => {
                    last_timed_out = false;
                    last_response_time = Some(elapsed);
                    AttemptError::new(e.kind(), e.to_string())
                }
                Attempt::TimedOut => {
                    last_timed_out = true;
                    last_response_time = None;
                    AttemptError::new(
                        LookupErrorKind::Timeout,
                        format!(
                            "no response within {} ms",
                            policy.attempt_timeout.as_millis()
                        ),
                    )
                }
            };

            attempts += 1;
            debug!(
                domain = %domain,
                attempt = attempts,
                max_attempts,
                error = %error,
                "Reputation lookup attempt failed"
            );
            last_error = Some(error);

            if attempts >= max_attempts {
                break;
            }

            self.retries.fetch_add(1, Ordering::Relaxed);
            let delay = policy.backoff.delay_for(attempts);
            if !sleep_or_cancel(delay, cancel).await {
                return self.cancelled(domain, attempts, last_error);
            }
        }

        let kind = if last_timed_out {
            LookupErrorKind::Timeout
        } else {
            LookupErrorKind::RetriesExhausted
        };
        warn!(
            domain = %domain,
            attempts,
            kind = kind.as_str(),
            "Reputation lookup failed"
        );

        let mut failure = LookupFailure::new(domain.clone(), kind)
            .with_attempts(attempts)
            .with_response_time(last_response_time);
        failure.last_error = last_error;
        failure.into()
    }

    async fn attempt(&self, domain: &Domain, timeout: Duration) -> Attempt {
        self.remote_calls.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        match tokio::time::timeout(timeout, self.service.query(domain)).await {
            Ok(result) => Attempt::Done(result, started.elapsed()),
            Err(_) => Attempt::TimedOut,
        }
    }

    fn cancelled(
        &self,
        domain: &Domain,
        attempts: u32,
        last_error: Option<AttemptError>,
    ) -> LookupResult {
        debug!(domain = %domain, attempts, "Reputation lookup cancelled");
        let mut failure = LookupFailure::cancelled(domain.clone()).with_attempts(attempts);
        failure.last_error = last_error;
        failure.into()
    }
}

/// Returns false if `cancel` fired before `delay` elapsed.
async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
