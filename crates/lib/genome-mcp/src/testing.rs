use std::sync::Arc;

use genome_core::control::GenomeControlPlane;
use genome_core::sources::SourceConfig;
use genome_core::testing::{RouteTransport, fetcher};
use rmcp::model::CallToolResult;

use crate::GenomeMcp;

pub fn server(upstream: Arc<RouteTransport>) -> GenomeMcp {
    let config = SourceConfig::default().with_eutils_base_url("https://eutils.test");
    GenomeMcp::new(GenomeControlPlane::new(fetcher(upstream), &config))
}

/// Parses the single JSON content block of a tool result.
pub fn json_body(result: &CallToolResult) -> serde_json::Value {
    assert_eq!(result.content.len(), 1, "expected one content block");
    let text = &result.content[0]
        .as_text()
        .expect("tool results are text content")
        .text;
    serde_json::from_str(text).expect("tool results are JSON")
}
