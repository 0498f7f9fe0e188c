use backon::ExponentialBuilder;
use std::time::Duration;

/// Default total number of attempts per call (first attempt included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default wait before the second attempt
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
/// Default growth factor between consecutive waits
pub const DEFAULT_MULTIPLIER: f32 = 2.0;

/// Retry policy attached to a gateway instance.
///
/// The wait before attempt `k + 1` is `initial_delay * multiplier^(k - 1)`.
/// There is no jitter, so the schedule is exact and monotonically
/// non-decreasing for any `multiplier >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait before the first retry
    pub initial_delay: Duration,
    /// Factor applied to the wait after every retry
    pub multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and initial delay, doubling each time
    #[must_use]
    pub const fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }

    /// Sets the growth factor
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Wait before the `retry`-th retry (1-based), i.e. before attempt `retry + 1`.
    ///
    /// Returns `None` when that retry lies outside the attempt budget.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry >= self.max_attempts {
            return None;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        Some(
            self.initial_delay
                .mul_f64(f64::from(self.multiplier).powi(exponent)),
        )
    }

    /// Every wait a failing call goes through, in order
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts)
            .filter_map(|retry| self.delay_for_retry(retry))
            .collect()
    }

    /// Sum of all backoff waits for a call that fails on every attempt
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        self.schedule().into_iter().sum()
    }

    /// Builds the backon schedule for this policy.
    ///
    /// The max delay is pinned to the last scheduled wait so backon never
    /// clamps the exponential law.
    #[must_use]
    pub fn backoff(&self) -> ExponentialBuilder {
        let retries = self.max_attempts.saturating_sub(1);
        let ceiling = self
            .delay_for_retry(retries)
            .unwrap_or(self.initial_delay)
            .max(self.initial_delay);
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(ceiling)
            .with_factor(self.multiplier)
            .with_max_times(retries as usize)
    }
}

/// Determines if an HTTP status code should trigger a retry
///
/// Retries on: 429 and 5xx. Every other 4xx is a rejection.
#[must_use]
pub const fn is_retryable_status(code: u16) -> bool {
    matches!(code, 429 | 500..=599)
}
