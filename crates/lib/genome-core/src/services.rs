use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use genome_model::DiscoveryReport;
use tokio::sync::{OnceCell, RwLock};
use tokio::time::Instant;
use tracing::debug;

/// Configuration for the discovery report cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCacheConfig {
    pub ttl: Duration,
    pub sweep_interval: Duration,
    pub max_entries: Option<usize>,
}

impl Default for ReportCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            sweep_interval: Duration::from_secs(60),
            max_entries: Some(256),
        }
    }
}

impl ReportCacheConfig {
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Memoised discovery reports, keyed by normalized phenotype and gene count.
#[derive(Clone)]
pub struct ReportCache {
    inner: Arc<ReportCacheInner>,
}

struct ReportCacheInner {
    entries: RwLock<HashMap<String, Arc<ReportEntry>>>,
    config: ReportCacheConfig,
}

/// Cache slot; the cell stays empty when a build fails so the next caller retries.
struct ReportEntry {
    report: OnceCell<Arc<DiscoveryReport>>,
    created_at: Instant,
}

impl ReportEntry {
    fn new() -> Self {
        Self {
            report: OnceCell::new(),
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

impl ReportCache {
    pub fn new(config: ReportCacheConfig) -> Self {
        Self {
            inner: Arc::new(ReportCacheInner {
                entries: RwLock::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Cache key for a phenotype query.
    #[must_use]
    pub fn key(phenotype: &str, max_genes: usize) -> String {
        format!("{}|{max_genes}", phenotype.trim().to_lowercase())
    }

    /// Returns the cached report for `key`, building it at most once per live entry.
    ///
    /// Concurrent callers for the same key wait on the same build. When the cache
    /// is full the report is built without being stored.
    ///
    /// # Errors
    /// Returns whatever error `build` returns; failed builds are not cached.
    pub async fn get_or_try_init<F, Fut, E>(
        &self,
        key: &str,
        build: F,
    ) -> Result<Arc<DiscoveryReport>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DiscoveryReport, E>>,
    {
        let ttl = self.inner.config.ttl;
        let entry = {
            let map = self.inner.entries.read().await;
            map.get(key)
                .filter(|entry| !entry.is_expired(Instant::now(), ttl))
                .cloned()
        };

        let entry = match entry {
            Some(entry) => entry,
            None => {
                let mut map = self.inner.entries.write().await;
                match map.get(key).filter(|entry| !entry.is_expired(Instant::now(), ttl)) {
                    Some(entry) => entry.clone(),
                    None => {
                        map.remove(key);
                        if let Some(max_entries) = self.inner.config.max_entries
                            && map.len() >= max_entries
                        {
                            drop(map);
                            debug!(%key, max_entries, "report cache full, building uncached");
                            return build().await.map(Arc::new);
                        }
                        let entry = Arc::new(ReportEntry::new());
                        map.insert(key.to_string(), entry.clone());
                        entry
                    }
                }
            }
        };

        let report = entry
            .report
            .get_or_try_init(move || async move { build().await.map(Arc::new) })
            .await?;
        Ok(report.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let ttl = self.inner.config.ttl;
        let now = Instant::now();
        let mut map = self.inner.entries.write().await;
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired(now, ttl));
        before.saturating_sub(map.len())
    }

    pub fn spawn_sweeper(self) -> tokio::task::JoinHandle<()> {
        let interval = self.inner.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = self.evict_expired().await;
                if evicted > 0 {
                    debug!(evicted, "swept expired discovery reports");
                }
            }
        })
    }
}
