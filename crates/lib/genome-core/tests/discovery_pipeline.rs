mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{control_plane, control_plane_over, elink_pubmed, esearch, fixture};
use genome_core::control::{ControlError, DiscoveryRequest};
use genome_core::fetch::{
    Fetcher,
    FetcherConfig,
    HttpRequest,
    HttpResponse,
    RateLimiter,
    Transport,
    TransportFuture,
};
use genome_core::services::{ReportCache, ReportCacheConfig};
use genome_core::testing::RouteTransport;
use tokio::time::Instant;

const LYNCH: &str = "Lynch syndrome";

/// ClinVar hits for Lynch syndrome plus gene and literature routes for each candidate.
fn lynch_upstream() -> Arc<RouteTransport> {
    let upstream = RouteTransport::new();
    upstream.on_matching(
        "esearch",
        LYNCH,
        esearch(&["101", "102", "103", "104", "105", "106"]),
    );
    upstream.on_matching("esummary", "clinvar", fixture("lynch_esummary.json"));
    upstream.on_matching("esearch", "MLH1[Sym]", esearch(&["4292"]));
    upstream.on_matching("esearch", "MSH2[Sym]", esearch(&["4436"]));
    upstream.on_matching("esearch", "EPCAM[Sym]", esearch(&["4072"]));
    upstream.on_matching("elink", "4292", elink_pubmed(&["9001", "9002"]));
    upstream.on_matching(
        "elink",
        "4436",
        elink_pubmed(&["9001", "9003", "9004", "9005"]),
    );
    upstream.on_matching("elink", "4072", elink_pubmed(&[]));
    upstream
}

#[tokio::test]
async fn related_genes_rank_by_count_then_symbol() {
    let upstream = lynch_upstream();
    let control = control_plane(upstream.clone());

    let ranked = control
        .find_related_genes(LYNCH, 10)
        .await
        .expect("ranking should succeed");
    let ranked: Vec<(&str, usize)> = ranked
        .iter()
        .map(|rank| (rank.symbol.as_str(), rank.variant_count))
        .collect();
    assert_eq!(ranked, vec![("MLH1", 3), ("MSH2", 3), ("EPCAM", 1)]);

    let search = &upstream.requests_for("esearch")[0];
    assert_eq!(search.param("term"), Some(LYNCH));
    assert_eq!(search.param("retmax"), Some("50"));
}

#[tokio::test]
async fn related_genes_truncate_to_top_n() {
    let control = control_plane(lynch_upstream());
    let ranked = control.find_related_genes(LYNCH, 1).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].symbol, "MLH1");
}

#[tokio::test]
async fn evidence_fetches_each_pmid_once() {
    let upstream = lynch_upstream();
    upstream.on_matching("efetch", "pubmed", fixture("abstracts.xml"));
    let control = control_plane(upstream.clone());

    let report = control
        .get_discovery_evidence(DiscoveryRequest::new(LYNCH).with_max_genes(2))
        .await
        .expect("report should build");

    assert_eq!(report.phenotype, LYNCH);
    assert_eq!(report.ranked_genes.len(), 3);
    assert!(report.omitted.is_empty());
    assert_eq!(report.evidence.len(), 2);

    let mlh1 = &report.evidence[0];
    assert_eq!(mlh1.symbol, "MLH1");
    assert_eq!(mlh1.gene_id, "4292");
    assert_eq!(mlh1.pmids, vec!["9001", "9002"]);
    assert_eq!(mlh1.articles.len(), 2);

    let msh2 = &report.evidence[1];
    assert_eq!(msh2.pmids, vec!["9001", "9003", "9004"]);
    let found: Vec<&str> = msh2.articles.iter().map(|article| article.pmid.as_str()).collect();
    assert_eq!(found, vec!["9001", "9003"]);

    let fetches = upstream.requests_for("efetch");
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].param("id"), Some("9001,9002,9003,9004"));
    assert_eq!(fetches[0].param("retmode"), Some("xml"));
    assert_eq!(upstream.requests_for("esearch")[0].param("retmax"), Some("20"));
    assert!(upstream.requests_for("esearch").iter().all(|request| {
        request.param("term").is_none_or(|term| !term.contains("EPCAM"))
    }));
}

#[tokio::test]
async fn failing_gene_is_omitted_not_fatal() {
    let upstream = RouteTransport::new();
    upstream.on_matching(
        "esearch",
        LYNCH,
        esearch(&["101", "102", "103", "104", "105", "106"]),
    );
    upstream.on_matching("esummary", "clinvar", fixture("lynch_esummary.json"));
    upstream.on_matching("esearch", "MLH1[Sym]", esearch(&["4292"]));
    upstream.respond("esearch", Some("MSH2[Sym]"), HttpResponse::new(400, "bad request"));
    upstream.on_matching("elink", "4292", elink_pubmed(&["9002"]));
    upstream.on_matching("efetch", "pubmed", fixture("abstracts.xml"));
    let control = control_plane(upstream);

    let report = control
        .get_discovery_evidence(DiscoveryRequest::new(LYNCH).with_max_genes(2))
        .await
        .unwrap();
    assert_eq!(report.evidence.len(), 1);
    assert_eq!(report.evidence[0].symbol, "MLH1");
    assert_eq!(report.omitted.len(), 1);
    assert_eq!(report.omitted[0].symbol, "MSH2");
    assert!(report.omitted[0].reason.contains("400"));
}

#[tokio::test]
async fn failed_abstract_batch_omits_every_gene() {
    let upstream = lynch_upstream();
    upstream.respond("efetch", None, HttpResponse::new(200, "<html>maintenance</html>"));
    let control = control_plane(upstream);

    let report = control
        .get_discovery_evidence(DiscoveryRequest::new(LYNCH).with_max_genes(2))
        .await
        .unwrap();
    assert!(report.evidence.is_empty());
    let omitted: Vec<&str> = report.omitted.iter().map(|gene| gene.symbol.as_str()).collect();
    assert_eq!(omitted, vec!["MLH1", "MSH2"]);
    assert!(report.omitted.iter().all(|gene| gene.reason.starts_with("abstract batch failed")));
}

#[tokio::test]
async fn no_candidate_genes_is_an_error() {
    let upstream = RouteTransport::new();
    upstream.on("esearch", esearch(&[]));
    let control = control_plane(upstream.clone());

    let err = control
        .get_discovery_evidence(DiscoveryRequest::new("no such phenotype"))
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::NoCandidateGenes { ref phenotype } if phenotype == "no such phenotype"));
    assert!(upstream.requests_for("esummary").is_empty());

    let ranked = control.find_related_genes("no such phenotype", 5).await.unwrap();
    assert!(ranked.is_empty());
}

#[tokio::test]
async fn blank_phenotype_and_zero_genes_are_rejected() {
    let control = control_plane(RouteTransport::new());
    let blank = control.get_discovery_evidence(DiscoveryRequest::new("  ")).await;
    assert!(matches!(blank, Err(ControlError::InvalidInput(_))));
    let zero = control
        .get_discovery_evidence(DiscoveryRequest::new(LYNCH).with_max_genes(0))
        .await;
    assert!(matches!(zero, Err(ControlError::InvalidInput(_))));
}

#[tokio::test]
async fn cached_reports_skip_upstream_when_requested() {
    let upstream = lynch_upstream();
    upstream.on_matching("efetch", "pubmed", fixture("abstracts.xml"));
    let control = control_plane(upstream.clone())
        .with_report_cache(ReportCache::new(ReportCacheConfig::default()));

    let request = DiscoveryRequest::new(LYNCH).with_max_genes(2).with_cache(true);
    let first = control.get_discovery_evidence(request.clone()).await.unwrap();
    let second = control
        .get_discovery_evidence(DiscoveryRequest::new("lynch SYNDROME ").with_max_genes(2).with_cache(true))
        .await;
    // The normalized key matches, so the stored report is returned untouched.
    assert_eq!(second.unwrap(), first);
    assert_eq!(upstream.requests_for("efetch").len(), 1);

    control
        .get_discovery_evidence(request.with_cache(false))
        .await
        .unwrap();
    assert_eq!(upstream.requests_for("efetch").len(), 2);
}

/// Holds every response for a fixed latency and tracks overlapping sends.
struct SlowUpstream {
    routes: Arc<RouteTransport>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    sent_at: Mutex<Vec<Instant>>,
}

impl SlowUpstream {
    fn new(routes: Arc<RouteTransport>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            routes,
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            sent_at: Mutex::new(Vec::new()),
        })
    }
}

impl Transport for SlowUpstream {
    fn send<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(open, Ordering::SeqCst);
            self.sent_at.lock().unwrap().push(Instant::now());
            let response = self.routes.send(request).await;
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        })
    }
}

#[tokio::test(start_paused = true)]
async fn paced_lookups_overlap_up_to_the_concurrency_limit() {
    let interval = Duration::from_millis(100);
    let routes = lynch_upstream();
    routes.on_matching("efetch", "pubmed", fixture("abstracts.xml"));
    let upstream = SlowUpstream::new(routes.clone(), Duration::from_millis(500));
    let fetcher = Fetcher::new(
        upstream.clone(),
        Arc::new(RateLimiter::new(interval)),
        FetcherConfig::default(),
    );
    let control = control_plane_over(Arc::new(fetcher)).with_literature_concurrency(2);

    control
        .get_discovery_evidence(DiscoveryRequest::new(LYNCH).with_max_genes(3))
        .await
        .expect("report should build");

    // Ranking (esearch, esummary), three gene lookups (esearch, elink), one abstract batch.
    assert_eq!(routes.requests().len(), 9);
    assert_eq!(routes.count("elink"), 3);
    assert_eq!(upstream.peak.load(Ordering::SeqCst), 2);

    let mut sent_at = upstream.sent_at.lock().unwrap().clone();
    sent_at.sort();
    assert_eq!(sent_at.len(), 9);
    for pair in sent_at.windows(2) {
        assert!(pair[1] - pair[0] >= interval, "sends {:?} apart", pair[1] - pair[0]);
    }
}
