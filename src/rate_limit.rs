//! Minimum spacing between outgoing requests.
//!
//! One limiter per client. The last-permit timestamp sits behind an async
//! mutex that is held across the wait, so concurrent callers are admitted
//! one at a time in arrival order and the spacing holds between any two.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_permit: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_DELAY)
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_permit: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Suspend until at least `min_interval` has passed since the previous
    /// permit, then record a new one. Returns how long the caller waited.
    pub async fn wait_if_needed(&self) -> Duration {
        let mut last = self.last_permit.lock().await;
        let mut waited = Duration::ZERO;
        if let Some(prev) = *last {
            let since = prev.elapsed();
            if since < self.min_interval {
                waited = self.min_interval - since;
                sleep(waited).await;
            }
        }
        *last = Some(Instant::now());
        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_free() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        assert_eq!(limiter.wait_if_needed().await, Duration::ZERO);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::default();
        limiter.wait_if_needed().await;
        sleep(Duration::from_millis(30)).await;

        let start = Instant::now();
        let waited = limiter.wait_if_needed().await;
        assert_eq!(waited, Duration::from_millis(70));
        assert_eq!(start.elapsed(), Duration::from_millis(70));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_never_wait() {
        let limiter = RateLimiter::default();
        limiter.wait_if_needed().await;
        sleep(Duration::from_millis(250)).await;

        let start = Instant::now();
        assert_eq!(limiter.wait_if_needed().await, Duration::ZERO);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_keep_spacing() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(100)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let l = limiter.clone();
            handles.push(tokio::spawn(async move {
                l.wait_if_needed().await;
                Instant::now()
            }));
        }
        let mut permits = Vec::new();
        for h in handles {
            permits.push(h.await.unwrap());
        }
        permits.sort();

        assert_eq!(permits[0] - start, Duration::ZERO);
        assert!(permits[1] - permits[0] >= Duration::from_millis(100));
        assert!(permits[2] - permits[1] >= Duration::from_millis(100));
    }
}
