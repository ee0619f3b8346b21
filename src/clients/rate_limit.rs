//! Token-bucket rate limiter shared by every request of one client.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::clients::context::{Context, ContextError};
use crate::error::ConfigError;

/// Default sustained rate in requests per second.
pub const DEFAULT_RATE: f64 = 4.0;

/// Default bucket size.
pub const DEFAULT_BURST: u32 = 1;

pub(crate) fn validate(rate: f64, burst: u32) -> Result<(), ConfigError> {
    if rate.is_nan() || rate <= 0.0 {
        return Err(ConfigError::InvalidRateLimit {
            reason: "rate must be greater than zero",
        });
    }
    if burst == 0 {
        return Err(ConfigError::InvalidRateLimit {
            reason: "burst must be at least 1",
        });
    }
    Ok(())
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, rate: f64, burst: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = elapsed.mul_add(rate, self.tokens).min(burst);
        self.last_refill = now;
    }
}

/// A token bucket refilled continuously at `rate` tokens per second, holding
/// at most `burst` tokens.
///
/// Waiters are served in arrival order: the bucket sits behind tokio's fair
/// mutex, and a waiter keeps the lock while it sleeps for its token.
///
/// # Example
///
/// ```rust
/// use cloudflare_api::{Context, RateLimiter};
///
/// # tokio_test::block_on(async {
/// let limiter = RateLimiter::new(10.0, 2).unwrap();
/// let ctx = Context::new();
/// limiter.wait(&ctx).await.unwrap();
/// limiter.wait(&ctx).await.unwrap();
/// # });
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: u32,
    bucket: Mutex<Bucket>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_parts(DEFAULT_RATE, DEFAULT_BURST)
    }
}

impl RateLimiter {
    /// Creates a limiter allowing `rate` requests per second with bursts of
    /// up to `burst`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRateLimit`] if `rate` is not a positive
    /// number or `burst` is zero.
    pub fn new(rate: f64, burst: u32) -> Result<Self, ConfigError> {
        validate(rate, burst)?;
        Ok(Self::with_parts(rate, burst))
    }

    /// Creates a limiter that never blocks.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::with_parts(f64::INFINITY, 1)
    }

    fn with_parts(rate: f64, burst: u32) -> Self {
        Self {
            rate,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Tokens added per second.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum tokens held at once.
    #[must_use]
    pub const fn burst(&self) -> u32 {
        self.burst
    }

    /// Takes one token, waiting for it if necessary.
    ///
    /// # Errors
    ///
    /// Returns the context's cause if it is cancelled while waiting. Returns
    /// [`ContextError::DeadlineExceeded`] without waiting if the token would
    /// only arrive after the context deadline.
    pub async fn wait(&self, ctx: &Context) -> Result<(), ContextError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        if self.rate.is_infinite() {
            return Ok(());
        }

        let burst = f64::from(self.burst);
        let mut bucket = ctx.run(self.bucket.lock()).await?;

        let now = Instant::now();
        bucket.refill(now, self.rate, burst);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        // saturates for rates so small the wait does not fit a Duration
        let wait = Duration::try_from_secs_f64((1.0 - bucket.tokens) / self.rate)
            .unwrap_or(Duration::MAX);
        if let Some(deadline) = ctx.deadline() {
            if now.checked_add(wait).map_or(true, |ready| ready > deadline) {
                return Err(ContextError::DeadlineExceeded);
            }
        }

        tracing::trace!(wait_ms = wait.as_millis(), "waiting for rate limiter token");
        ctx.sleep(wait).await?;

        bucket.refill(Instant::now(), self.rate, burst);
        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
        Ok(())
    }
}
