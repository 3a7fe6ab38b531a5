//! Request pacing and retry backoff
//!
//! One `Pacer` owns the process-wide "last request" instant. It is held by the
//! fetch client and never shared, so no locking is needed.

use rand::Rng;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Floor applied to the configured rate so the interval stays finite
const MIN_RATE: f64 = 0.001;

/// Minimum-interval pacer with uniform jitter
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    jitter: f64,
    last_request: Option<Instant>,
}

impl Pacer {
    /// Creates a pacer for `rate` requests per second with jitter in `[0, jitter]` seconds
    pub fn new(rate: f64, jitter: f64) -> Self {
        let rate = if rate.is_finite() { rate.max(MIN_RATE) } else { MIN_RATE };
        Self {
            min_interval: Duration::try_from_secs_f64(1.0 / rate).unwrap_or(Duration::MAX),
            jitter,
            last_request: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long to wait before the next request may be issued
    ///
    /// Zero when the minimum interval has already elapsed; otherwise the remaining
    /// time plus a fresh jitter sample.
    pub fn next_delay(&self) -> Duration {
        let Some(last) = self.last_request else {
            return Duration::ZERO;
        };

        let elapsed = last.elapsed();
        if elapsed >= self.min_interval {
            return Duration::ZERO;
        }

        (self.min_interval - elapsed).saturating_add(jitter_sample(self.jitter))
    }

    /// Marks the start of a network request
    pub fn record_request(&mut self) {
        self.last_request = Some(Instant::now());
    }

    /// Suspends until the next request may go out
    ///
    /// Returns false if `cancel` fired while waiting.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        sleep_or_cancel(self.next_delay(), cancel).await
    }
}

/// Exponential backoff between attempts of a single fetch
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first
    pub max_attempts: u32,
    backoff_base: f64,
    jitter: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: f64, jitter: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base: backoff_base.max(0.0),
            jitter,
        }
    }

    /// `backoff_base * 2^attempt` without jitter, for a zero-based attempt index
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let secs = self.backoff_base * 2f64.powi(attempt.min(62) as i32);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Sleep before retrying after the failed zero-based `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay(attempt).saturating_add(jitter_sample(self.jitter))
    }
}

/// Uniform sample in `[0, bound]` seconds; zero for non-positive bounds
fn jitter_sample(bound: f64) -> Duration {
    if !bound.is_finite() || bound <= 0.0 {
        return Duration::ZERO;
    }
    let secs = rand::thread_rng().gen_range(0.0..=bound);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Sleeps for `delay` unless `cancel` fires first; returns false when cancelled
pub async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
