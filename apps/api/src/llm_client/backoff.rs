//! Exponential backoff policy for rate-limited model calls.

use std::time::Duration;

use rand::Rng;

/// Attempts, base delay, multiplier, cap and jitter for retrying a call
/// the provider rejected with a rate-limit signal.
///
/// Delay before retry `n` (1-based, counting the failed attempt) is
/// `min(base * multiplier^(n-1), max_delay)`, plus up to 25% random jitter
/// when enabled. Jitter never pushes the delay past `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl BackoffPolicy {
    /// Policy with no waiting at all, for tests that only count attempts.
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Deterministic part of the delay after the `attempt`-th failure.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Delay to sleep after the `attempt`-th failure, jitter included.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay_for(attempt);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let spread = base.as_secs_f64() * 0.25;
        let jitter = rand::thread_rng().gen_range(0.0..=spread);
        let with_jitter = (base.as_secs_f64() + jitter).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(with_jitter)
    }

    /// Whether another attempt is allowed after `attempt` attempts were made.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
