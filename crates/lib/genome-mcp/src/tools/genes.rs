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

/// Parameters naming a human gene.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GeneSymbolParams {
    /// HGNC symbol, e.g. `MLH1`.
    pub gene_symbol: String,
}

/// Parameters for placing a coordinate on a gene's reference transcript.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetGenomicContextParams {
    pub gene_symbol: String,
    /// 1-based position on the RefSeq transcript.
    pub position: u64,
}

#[tool_router(router = tool_router_genes, vis = "pub")]
impl GenomeMcp {
    #[tool(description = "Resolve a human gene symbol to its NCBI Gene record.")]
    async fn get_gene_info(
        &self,
        Parameters(params): Parameters<GeneSymbolParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let gene = self
            .control()
            .get_gene_info(&params.gene_symbol)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(gene)?]))
    }

    #[tool(description = "Classify a transcript position as exon, intron, out of range or ambiguous for a gene's RefSeq mRNA.")]
    async fn get_genomic_context(
        &self,
        Parameters(params): Parameters<GetGenomicContextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let context = self
            .control()
            .get_genomic_context(&params.gene_symbol, params.position)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(context)?]))
    }

    #[tool(description = "List Reactome pathways that involve a human gene.")]
    async fn get_pathway_info(
        &self,
        Parameters(params): Parameters<GeneSymbolParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let pathways = self
            .control()
            .get_pathway_info(&params.gene_symbol)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(pathways)?]))
    }
}
