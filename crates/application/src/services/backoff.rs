use dns_reputation_domain::config::{BackoffConfig, BackoffStrategy};
use std::time::Duration;

/// Delay schedule between failed attempts of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub strategy: BackoffStrategy,
    pub base: Duration,
    pub max: Duration,
    pub jitter: bool,
}

impl Backoff {
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            strategy: config.strategy,
            base: Duration::from_millis(config.base_delay_ms),
            max: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
        }
    }

    pub fn fixed(delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            base: delay,
            max: delay,
            jitter: false,
        }
    }

    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base,
            max,
            jitter: false,
        }
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Nominal delay after the `attempt`-th failure (1-based), before jitter.
    pub fn nominal(&self, attempt: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::Fixed => self.base,
            BackoffStrategy::Exponential => {
                let shift = attempt.saturating_sub(1).min(31);
                self.base
                    .checked_mul(1u32 << shift)
                    .map_or(self.max, |d| d.min(self.max))
            }
        }
    }

    /// Delay to sleep after the `attempt`-th failure.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let nominal = self.nominal(attempt);
        if !self.jitter || nominal.is_zero() {
            return nominal;
        }
        nominal.mul_f64(0.5 + fastrand::f64() * 0.5)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}
