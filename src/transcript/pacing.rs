//! Process-wide pacing for upstream fetches.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between successive transcript fetches.
///
/// The last-call timestamp sits behind a mutex that is held while sleeping, so
/// concurrent callers queue up instead of computing overlapping windows.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Limiter allowing `calls` invocations per second.
    pub fn per_second(calls: u32) -> Self {
        Self::new(Duration::from_secs(1) / calls.max(1))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleep until at least `min_interval` has passed since the previous call.
    pub async fn wait_if_needed(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Pacing upstream fetch, sleeping {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = std::time::Instant::now();
        limiter.wait_if_needed().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(150));

        let before_first = std::time::Instant::now();
        limiter.wait_if_needed().await;
        limiter.wait_if_needed().await;

        assert!(before_first.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_serialized() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(100)));
        let start = std::time::Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.wait_if_needed().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // Three calls need two full intervals between them.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_default_is_one_per_second() {
        assert_eq!(RateLimiter::default().min_interval(), Duration::from_secs(1));
        assert_eq!(RateLimiter::per_second(4).min_interval(), Duration::from_millis(250));
    }
}
