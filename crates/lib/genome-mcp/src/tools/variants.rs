use genome_core::control::variants::DEFAULT_LITERATURE_RESULTS;
use genome_model::GenomeBuild;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ErrorCode},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{GenomeMcp, helpers};

pub const DEFAULT_SEARCH_RESULTS: usize = 5;
/// Upper bound on `max_results` accepted from MCP callers.
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Parameters for a ClinVar search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchClinvarParams {
    /// Free text or Entrez query syntax, passed through unchanged.
    pub query: String,
    pub max_results: Option<usize>,
}

/// Parameters for fetching a ClinVar variation record.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetVariantReportParams {
    pub variant_id: String,
}

/// Parameters for listing citations linked to a variant.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetSupportingLiteratureParams {
    pub variant_id: String,
    pub max_results: Option<usize>,
}

/// Parameters for a gnomAD frequency lookup.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetPopulationStatsParams {
    /// `CHROM-POS-REF-ALT`, e.g. `17-43045712-G-A`.
    pub variant: String,
    /// `GRCh38` (default) or `GRCh37`.
    pub genome_build: Option<String>,
}

fn parse_build(value: Option<&str>) -> Result<GenomeBuild, ErrorData> {
    value.map_or(Ok(GenomeBuild::default()), |value| {
        value
            .parse()
            .map_err(|err| helpers::mcp_err(ErrorCode::INVALID_PARAMS, format!("{err}")))
    })
}

#[tool_router(router = tool_router_variants, vis = "pub")]
impl GenomeMcp {
    #[tool(description = "Search ClinVar with free text or Entrez syntax. Returns variant summaries.")]
    async fn search_clinvar(
        &self,
        Parameters(params): Parameters<SearchClinvarParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let max_results = params
            .max_results
            .unwrap_or(DEFAULT_SEARCH_RESULTS)
            .min(MAX_SEARCH_RESULTS);
        let variants = self
            .control()
            .search_clinvar(&params.query, max_results)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(variants)?]))
    }

    #[tool(description = "Fetch one ClinVar variation record by id.")]
    async fn get_variant_report(
        &self,
        Parameters(params): Parameters<GetVariantReportParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let variant = self
            .control()
            .get_variant_report(&params.variant_id)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(variant)?]))
    }

    #[tool(description = "List PubMed articles cited by a ClinVar variation record.")]
    async fn get_supporting_literature(
        &self,
        Parameters(params): Parameters<GetSupportingLiteratureParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let max_results = params.max_results.unwrap_or(DEFAULT_LITERATURE_RESULTS);
        let articles = self
            .control()
            .get_supporting_literature(&params.variant_id, max_results)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(articles)?]))
    }

    #[tool(description = "gnomAD allele counts and frequencies for a CHROM-POS-REF-ALT variant.")]
    async fn get_population_stats(
        &self,
        Parameters(params): Parameters<GetPopulationStatsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let build = parse_build(params.genome_build.as_deref())?;
        let stats = self
            .control()
            .get_population_stats(&params.variant, build)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(stats)?]))
    }
}
