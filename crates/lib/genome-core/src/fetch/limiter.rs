use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

use super::Source;

/// NCBI allows three requests per second without an API key.
pub const NCBI_INTERVAL: Duration = Duration::from_millis(350);
/// NCBI allows ten requests per second with an API key.
pub const NCBI_KEYED_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Process-wide request pacing shared by every source client.
///
/// All sources queue on one clock, each spaced by its own interval. The lock is
/// held while waiting, so callers are released one at a time in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    default_interval: Duration,
    intervals: HashMap<Source, Duration>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL).with_interval(Source::Ncbi, NCBI_INTERVAL)
    }
}

impl RateLimiter {
    #[must_use]
    pub fn new(default_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            default_interval,
            intervals: HashMap::new(),
        }
    }

    /// Limiter tuned for NCBI with or without an API key.
    #[must_use]
    pub fn for_ncbi(has_api_key: bool) -> Self {
        let interval = if has_api_key {
            NCBI_KEYED_INTERVAL
        } else {
            NCBI_INTERVAL
        };
        Self::new(DEFAULT_INTERVAL).with_interval(Source::Ncbi, interval)
    }

    #[must_use]
    pub fn with_interval(mut self, source: Source, interval: Duration) -> Self {
        self.intervals.insert(source, interval);
        self
    }

    #[must_use]
    pub fn interval_for(&self, source: Source) -> Duration {
        self.intervals
            .get(&source)
            .copied()
            .unwrap_or(self.default_interval)
    }

    /// Waits until `source` may issue its next request and records the send time.
    ///
    /// Returns how long the caller waited once it reached the front of the queue.
    pub async fn acquire(&self, source: Source) -> Duration {
        let interval = self.interval_for(source);
        let mut last = self.last_request.lock().await;
        let mut waited = Duration::ZERO;
        if let Some(previous) = *last {
            let ready_at = previous + interval;
            let now = Instant::now();
            if ready_at > now {
                waited = ready_at - now;
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
        waited
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_spaced_by_interval() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(100)));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.acquire(Source::Ncbi).await;
                    Instant::now()
                })
            })
            .collect();

        let mut sent = Vec::new();
        for handle in handles {
            sent.push(handle.await.unwrap());
        }
        sent.sort();

        assert_eq!(sent[0] - start, Duration::ZERO);
        for pair in sent.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sources_share_one_clock() {
        let limiter = RateLimiter::new(Duration::from_millis(50))
            .with_interval(Source::Ncbi, Duration::from_millis(300));

        limiter.acquire(Source::Gnomad).await;
        let waited = limiter.acquire(Source::Ncbi).await;
        assert_eq!(waited, Duration::from_millis(300));

        let waited = limiter.acquire(Source::Reactome).await;
        assert_eq!(waited, Duration::from_millis(50));
    }

    #[test]
    fn keyed_ncbi_interval_is_shorter() {
        assert_eq!(
            RateLimiter::for_ncbi(true).interval_for(Source::Ncbi),
            NCBI_KEYED_INTERVAL
        );
        assert_eq!(
            RateLimiter::for_ncbi(false).interval_for(Source::Ncbi),
            NCBI_INTERVAL
        );
        assert_eq!(
            RateLimiter::for_ncbi(false).interval_for(Source::Gnomad),
            DEFAULT_INTERVAL
        );
    }
}
