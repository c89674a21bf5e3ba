use std::sync::Arc;

use genome_core::control::GenomeControlPlane;
use genome_core::fetch::{
    Fetcher,
    FetcherConfig,
    RateLimiter,
    ReqwestTransport,
    RetryPolicy,
    TransportError,
};
use genome_core::services::{ReportCache, ReportCacheConfig};
use genome_core::sources::SourceConfig;
use tracing::info;

use crate::config::GenomeConfig;

/// Builds the shared fetcher and the control plane on top of it.
///
/// The report cache sweeper is spawned here, so this must run inside the runtime.
pub fn build_control_plane(config: &GenomeConfig) -> Result<GenomeControlPlane, TransportError> {
    let transport = ReqwestTransport::new(&config.user_agent())?;
    let limiter = RateLimiter::for_ncbi(config.ncbi_api_key.is_some());
    let retry = RetryPolicy::new(config.max_attempts, config.backoff_base, config.backoff_max);
    let fetcher = Fetcher::new(
        Arc::new(transport),
        Arc::new(limiter),
        FetcherConfig::default()
            .with_timeout(config.request_timeout)
            .with_retry(retry),
    );

    let sources = SourceConfig::default()
        .with_api_key(config.ncbi_api_key.clone())
        .with_tool(config.ncbi_tool.clone())
        .with_email(config.ncbi_email.clone());

    let mut control = GenomeControlPlane::new(Arc::new(fetcher), &sources)
        .with_literature_concurrency(config.literature_concurrency);
    if let Some(ttl) = config.cache_ttl {
        let cache = ReportCache::new(
            ReportCacheConfig::default()
                .with_ttl(ttl)
                .with_max_entries(Some(config.cache_max_entries)),
        );
        let _sweeper = cache.clone().spawn_sweeper();
        control = control.with_report_cache(cache);
    }

    info!(
        keyed = config.ncbi_api_key.is_some(),
        max_attempts = config.max_attempts,
        report_cache = config.cache_ttl.is_some(),
        "control plane ready"
    );
    Ok(control)
}
