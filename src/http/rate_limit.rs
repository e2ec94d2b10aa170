//! Rate limiting implementation
//!
//! Sliding-window request log: at most `max_requests` requests are issued in
//! any rolling `time_window`.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Configuration for rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per window
    pub max_requests: usize,
    /// Length of the rolling window
    pub time_window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            time_window: Duration::from_millis(60_000),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        Self {
            max_requests,
            time_window,
        }
    }
}

/// Sliding-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            config: RateLimiterConfig {
                max_requests: config.max_requests.max(1),
                time_window: config.time_window,
            },
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// The effective configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Suspend until one more request fits in the window, then record it.
    ///
    /// Returns the total time spent waiting.
    pub async fn wait_if_needed(&self) -> Duration {
        let mut waited = Duration::ZERO;

        loop {
            let delay = {
                let mut timestamps = self.timestamps.lock().unwrap_or_else(|e| e.into_inner());
                let now = Instant::now();
                prune(&mut timestamps, now, self.config.time_window);

                if timestamps.len() < self.config.max_requests {
                    timestamps.push_back(now);
                    return waited;
                }

                match timestamps.front() {
                    Some(oldest) => self
                        .config
                        .time_window
                        .saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            if delay.is_zero() {
                continue;
            }
            debug!(
                "Rate limit of {} requests per {:?} reached, waiting {:?}",
                self.config.max_requests, self.config.time_window, delay
            );
            tokio::time::sleep(delay).await;
            waited += delay;
        }
    }

    /// Number of requests recorded inside the current window
    pub fn in_flight_window(&self) -> usize {
        let mut timestamps = self.timestamps.lock().unwrap_or_else(|e| e.into_inner());
        prune(&mut timestamps, Instant::now(), self.config.time_window);
        timestamps.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

/// Drop every timestamp that has left the window ending at `now`
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_rate_limiter_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.time_window, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, Duration::from_secs(1)));
        assert_eq!(limiter.config().max_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_never_waits() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.wait_if_needed().await, Duration::ZERO);
        assert_eq!(limiter.in_flight_window(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_budget_do_not_wait() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(5, Duration::from_secs(10)));
        for _ in 0..5 {
            assert_eq!(limiter.wait_if_needed().await, Duration::ZERO);
        }
        assert_eq!(limiter.in_flight_window(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_over_budget_waits_for_oldest_to_expire() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(3, Duration::from_secs(10)));
        for _ in 0..3 {
            limiter.wait_if_needed().await;
        }

        tokio::time::advance(Duration::from_secs(4)).await;

        let start = Instant::now();
        let waited = limiter.wait_if_needed().await;
        assert_eq!(waited, Duration::from_secs(6));
        assert!(start.elapsed() >= Duration::from_secs(6));
        // The three original entries expired together.
        assert_eq!(limiter.in_flight_window(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_elapsed_respects_window() {
        let window = Duration::from_secs(10);
        let max = 2;
        let n = 5;
        let limiter = RateLimiter::new(&RateLimiterConfig::new(max, window));

        let start = Instant::now();
        let mut waits = Vec::new();
        for _ in 0..n {
            waits.push(limiter.wait_if_needed().await);
        }

        assert_eq!(waits[0], Duration::ZERO);
        assert_eq!(waits[1], Duration::ZERO);
        assert!(waits[max] > Duration::ZERO);

        // ceil(5 / 2 - 1) = 2 windows
        assert!(start.elapsed() >= window * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_window() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(2, Duration::from_millis(500)));
        limiter.wait_if_needed().await;
        limiter.wait_if_needed().await;

        tokio::time::advance(Duration::from_millis(500)).await;

        assert_eq!(limiter.in_flight_window(), 0);
        assert_eq!(limiter.wait_if_needed().await, Duration::ZERO);
    }
}
