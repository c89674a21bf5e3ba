use genome_core::control::DiscoveryRequest;
use genome_core::control::discovery::DEFAULT_MAX_GENES;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{GenomeMcp, helpers};

pub const DEFAULT_RELATED_GENES: usize = 10;

/// Parameters for ranking genes by ClinVar evidence for a phenotype.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FindRelatedGenesParams {
    pub phenotype: String,
    pub top_n: Option<usize>,
}

/// Parameters for a phenotype discovery report.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetDiscoveryEvidenceParams {
    pub phenotype: String,
    pub max_genes: Option<usize>,
    /// Reuse a recent report for the same phenotype when the server keeps one.
    pub use_cache: Option<bool>,
}

#[tool_router(router = tool_router_discovery, vis = "pub")]
impl GenomeMcp {
    #[tool(description = "Rank genes by how many ClinVar records for a phenotype name them.")]
    async fn find_related_genes(
        &self,
        Parameters(params): Parameters<FindRelatedGenesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let top_n = params.top_n.unwrap_or(DEFAULT_RELATED_GENES);
        let ranked = self
            .control()
            .find_related_genes(&params.phenotype, top_n)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(ranked)?]))
    }

    #[tool(description = "Candidate genes for a phenotype with PubMed abstracts for the top genes.")]
    async fn get_discovery_evidence(
        &self,
        Parameters(params): Parameters<GetDiscoveryEvidenceParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let request = DiscoveryRequest::new(params.phenotype)
            .with_max_genes(params.max_genes.unwrap_or(DEFAULT_MAX_GENES))
            .with_cache(params.use_cache.unwrap_or(false));
        let report = self
            .control()
            .get_discovery_evidence(request)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }
}
