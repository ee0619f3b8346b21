//! Retry and backoff tuning for the request executor.

use std::time::Duration;

use crate::error::ConfigError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_MIN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default ceiling for any single backoff.
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Parameters controlling how transient failures are retried.
///
/// Only transport errors, HTTP 429 and HTTP 5xx are retried. The delay
/// before retry `i` (1-based) is `min(max_delay, min_delay * 2^(i-1))`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use cloudflare_api::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(1)).unwrap();
/// assert_eq!(policy.backoff(1), Duration::from_millis(100));
/// assert_eq!(policy.backoff(2), Duration::from_millis(200));
/// assert_eq!(policy.backoff(5), Duration::from_secs(1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay: DEFAULT_MIN_RETRY_DELAY,
            max_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a validated retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] if `min_delay` is zero or
    /// `max_delay` is smaller than `min_delay`.
    pub fn new(
        max_retries: u32,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, ConfigError> {
        if min_delay.is_zero() {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "minimum delay must be greater than zero",
            });
        }
        if max_delay < min_delay {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "maximum delay must not be smaller than minimum delay",
            });
        }
        Ok(Self {
            max_retries,
            min_delay,
            max_delay,
        })
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retries() -> Self {
        Self {
            max_retries: 0,
            min_delay: DEFAULT_MIN_RETRY_DELAY,
            max_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }

    /// Maximum number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the first retry.
    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Upper bound for any single backoff.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Returns the sleep before attempt `attempt` (0-based).
    ///
    /// Attempt 0 never waits. The doubling runs through an `f64`, so the
    /// product loses precision beyond 2^53 nanoseconds (about 104 days) and
    /// saturates to `max_delay` once it no longer fits a `Duration`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = self.min_delay.as_secs_f64() * 2f64.powi(exponent);
        Duration::try_from_secs_f64(scaled)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}
