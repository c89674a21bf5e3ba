#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use genome_core::control::GenomeControlPlane;
use genome_core::fetch::{Fetcher, FetcherConfig, RateLimiter, RetryPolicy};
use genome_core::sources::SourceConfig;
use genome_core::testing::RouteTransport;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| {
        let path_display = path.display();
        panic!("failed to read fixture at {path_display}: {err}")
    })
}

pub fn control_plane(upstream: Arc<RouteTransport>) -> GenomeControlPlane {
    let retry = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(50))
        .with_jitter(Duration::ZERO);
    let fetcher = Fetcher::new(
        upstream,
        Arc::new(RateLimiter::new(Duration::ZERO)),
        FetcherConfig::default().with_retry(retry),
    );
    control_plane_over(Arc::new(fetcher))
}

/// Control plane pointed at the test hosts, sending through `fetcher`.
pub fn control_plane_over(fetcher: Arc<Fetcher>) -> GenomeControlPlane {
    let config = SourceConfig::default()
        .with_eutils_base_url("https://eutils.test/entrez/eutils")
        .with_gnomad_url("https://gnomad.test/api")
        .with_reactome_url("https://reactome.test/ContentService");
    GenomeControlPlane::new(fetcher, &config)
}

pub fn esearch(ids: &[&str]) -> String {
    let ids: Vec<String> = ids.iter().map(|id| format!("\"{id}\"")).collect();
    format!(
        r#"{{"esearchresult": {{"count": "{}", "idlist": [{}]}}}}"#,
        ids.len(),
        ids.join(", ")
    )
}

pub fn elink_pubmed(pmids: &[&str]) -> String {
    let links: Vec<String> = pmids.iter().map(|pmid| format!("\"{pmid}\"")).collect();
    format!(
        r#"{{"linksets": [{{"linksetdbs": [{{"dbto": "pubmed", "links": [{}]}}]}}]}}"#,
        links.join(", ")
    )
}
