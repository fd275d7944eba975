use dns_reputation_domain::ConfigError;
use governor::clock::Clock;
use governor::middleware::NoOpMiddleware;
use governor::nanos::Nanos;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Slowest accepted spacing between two requests.
const MAX_INTERVAL: Duration = Duration::from_secs(u32::MAX as u64);

/// Returned by [`RateLimiter::wait`] when the caller's token fires first.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("wait for a request slot was cancelled")]
pub struct Cancelled;

/// Governor clock reading the tokio clock, so waits follow a paused runtime.
#[derive(Debug, Clone)]
struct RuntimeClock {
    origin: Instant,
}

impl Clock for RuntimeClock {
    type Instant = Nanos;

    fn now(&self) -> Nanos {
        Nanos::from(self.origin.elapsed())
    }
}

type DirectLimiter =
    governor::RateLimiter<NotKeyed, InMemoryState, RuntimeClock, NoOpMiddleware<Nanos>>;

/// Spaces outbound requests so that no more than `requests_per_second`
/// start in any one-second window.
///
/// GCRA with a burst of one: permits are at least `1 / requests_per_second`
/// apart and idle time is never banked.
pub struct RateLimiter {
    interval: Duration,
    limiter: DirectLimiter,
    clock: RuntimeClock,
    granted: AtomicU64,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Result<Self, ConfigError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(ConfigError::invalid(
                "engine.requests_per_second",
                format!("{} is not a positive rate", requests_per_second),
            ));
        }
        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .ok()
            .filter(|interval| *interval <= MAX_INTERVAL)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "engine.requests_per_second",
                    format!("{} is too low", requests_per_second),
                )
            })?;
        let quota = Quota::with_period(interval)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "engine.requests_per_second",
                    format!("{} is too high", requests_per_second),
                )
            })?
            .allow_burst(NonZeroU32::MIN);

        let clock = RuntimeClock {
            origin: Instant::now(),
        };

        Ok(Self {
            interval,
            limiter: governor::RateLimiter::direct_with_clock(quota, clock.clone()),
            clock,
            granted: AtomicU64::new(0),
        })
    }

    /// Minimum spacing between two granted permits.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total permits handed out so far.
    pub fn permits_granted(&self) -> u64 {
        self.granted.load(Ordering::Relaxed)
    }

    /// Wait until the caller may issue one request.
    ///
    /// A cancelled wait consumes no permit.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            let not_until = match self.limiter.check() {
                Ok(()) => {
                    self.granted.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Err(not_until) => not_until,
            };

            let delay = not_until.wait_time_from(self.clock.now());
            trace!(delay_ms = delay.as_millis() as u64, "Waiting for request slot");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_rejects_invalid_rates() {
        assert!(RateLimiter::new(0.0).is_err());
        assert!(RateLimiter::new(-1.0).is_err());
        assert!(RateLimiter::new(f64::NAN).is_err());
        assert!(RateLimiter::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_rates_outside_representable_spacing() {
        assert!(RateLimiter::new(1e-19).is_err());
        assert!(RateLimiter::new(1e-12).is_err());
        assert!(RateLimiter::new(1e12).is_err());
        assert!(RateLimiter::new(1e-6).is_ok());
    }

    #[test]
    fn test_interval_from_rate() {
        assert_eq!(RateLimiter::new(4.0).unwrap().interval(), Duration::from_millis(250));
        assert_eq!(RateLimiter::new(0.5).unwrap().interval(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_permit_is_immediate() {
        let limiter = RateLimiter::new(1.0).unwrap();
        let start = Instant::now();
        limiter.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.permits_granted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_permits_are_spaced() {
        let limiter = RateLimiter::new(10.0).unwrap();
        let cancel = CancellationToken::new();
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait(&cancel).await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_share_one_budget() {
        let limiter = Arc::new(RateLimiter::new(10.0).unwrap());
        let cancel = CancellationToken::new();
        let start = Instant::now();

        let waiters: Vec<_> = (0..5)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    limiter.wait(&cancel).await.unwrap();
                    start.elapsed()
                })
            })
            .collect();

        let mut granted_at = Vec::new();
        for waiter in waiters {
            granted_at.push(waiter.await.unwrap());
        }
        granted_at.sort();

        for pair in granted_at.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
        assert_eq!(limiter.permits_granted(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_is_not_banked() {
        let limiter = RateLimiter::new(2.0).unwrap();
        let cancel = CancellationToken::new();
        limiter.wait(&cancel).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;

        let start = Instant::now();
        limiter.wait(&cancel).await.unwrap();
        limiter.wait(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_returns_immediately() {
        let limiter = RateLimiter::new(1.0).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(limiter.wait(&cancel).await, Err(Cancelled));
        assert_eq!(limiter.permits_granted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_pending_wait() {
        let limiter = Arc::new(RateLimiter::new(0.1).unwrap());
        let cancel = CancellationToken::new();
        limiter.wait(&cancel).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.wait(&cancel).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        assert_eq!(waiter.await.unwrap(), Err(Cancelled));
        assert_eq!(limiter.permits_granted(), 1);
    }
}
