use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::GenomeMcp;

/// Payload listing the MCP commands this server answers.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List MCP commands and what they return.".to_string(),
                "health - Returns 'ok' when the server is up.".to_string(),
                "search_clinvar - Search ClinVar with free text or Entrez syntax (query, max_results=5, at most 100)."
                    .to_string(),
                "get_variant_report - Fetch one ClinVar variation record (variant_id)."
                    .to_string(),
                "get_supporting_literature - PubMed articles cited by a ClinVar record (variant_id, max_results=5)."
                    .to_string(),
                "get_population_stats - gnomAD allele counts for CHROM-POS-REF-ALT (variant, genome_build=GRCh38)."
                    .to_string(),
                "get_gene_info - NCBI Gene record for a human gene symbol (gene_symbol)."
                    .to_string(),
                "get_genomic_context - Exon/intron placement of a transcript position (gene_symbol, position)."
                    .to_string(),
                "get_pathway_info - Reactome pathways involving a gene (gene_symbol)."
                    .to_string(),
                "find_related_genes - Genes ranked by ClinVar records for a phenotype (phenotype, top_n=10)."
                    .to_string(),
                "get_discovery_evidence - Ranked genes plus abstracts for the top genes (phenotype, max_genes=3, use_cache=false)."
                    .to_string(),
            ],
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl GenomeMcp {
    #[tool(description = "List the MCP commands this server answers and their parameters.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }
}
