use std::time::Duration;

use crate::config::ReconnectConfig;

/// Exponential reconnect delay: `initial * multiplier^failures`, capped at `max`
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    failures: u32,
}

impl Backoff {
    /// Backoff starting at `initial` and never exceeding `max`
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            initial: initial.min(max),
            max,
            multiplier: multiplier.max(1.0),
            failures: 0,
        }
    }

    /// Backoff configured from the `[reconnect]` section
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.multiplier,
        )
    }

    /// Delay before the next attempt; each call counts one more failure
    pub fn next_delay(&mut self) -> Duration {
        let exponent = i32::try_from(self.failures).unwrap_or(i32::MAX);
        self.failures = self.failures.saturating_add(1);

        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }

        Duration::from_secs_f64(secs)
    }

    /// Start over from the initial delay
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Failures counted since the last reset
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
