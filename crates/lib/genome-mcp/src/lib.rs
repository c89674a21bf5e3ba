//! MCP server implementation for genome-mcp.
//!
//! This crate wires the genomic control plane into rmcp tool handlers and
//! exposes the MCP-facing API surface for variant, gene and phenotype queries.

mod helpers;
mod tools;
pub mod server;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use genome_core::control::GenomeControlPlane;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"genome-mcp answers clinical genomics questions from public databases (ClinVar, NCBI Gene, PubMed, RefSeq, gnomAD, Reactome).

Workflow:
1. Variants:
   - `search_clinvar` takes a free-text or Entrez query (e.g. `BRCA1[gene] AND pathogenic`).
   - `get_variant_report` returns one ClinVar record by variation id.
   - `get_supporting_literature` lists PubMed citations linked to a variant.
   - `get_population_stats` returns gnomAD allele counts for `CHROM-POS-REF-ALT` (build GRCh38 or GRCh37).
2. Genes:
   - `get_gene_info` resolves a human gene symbol.
   - `get_genomic_context` places a transcript coordinate in an exon or intron of the gene's RefSeq transcript.
   - `get_pathway_info` lists Reactome pathways for the gene.
3. Phenotypes:
   - `find_related_genes` ranks genes by how many ClinVar records for the phenotype name them.
   - `get_discovery_evidence` adds abstracts for the top genes.

Notes:
- Results are JSON records; fields missing upstream are omitted, never invented.
- Genomic context is best effort against the latest RefSeq version and may report `ambiguous`.
- Upstream requests are rate limited, so discovery calls can take several seconds.
- `help` lists every tool. `health` returns `ok`.";

/// MCP server wrapper around the genomic control plane.
#[derive(Clone)]
pub struct GenomeMcp {
    tool_router: ToolRouter<Self>,
    control: Arc<GenomeControlPlane>,
}

impl GenomeMcp {
    /// Creates a new server using a control plane by value.
    #[must_use]
    pub fn new(control: GenomeControlPlane) -> Self {
        Self::with_control(Arc::new(control))
    }

    /// Creates a new server using a shared control plane handle.
    #[must_use]
    pub fn with_control(control: Arc<GenomeControlPlane>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_variants()
            + Self::tool_router_genes()
            + Self::tool_router_discovery()
            + Self::tool_router_context();
        Self {
            tool_router,
            control,
        }
    }

    pub(crate) const fn control(&self) -> &Arc<GenomeControlPlane> {
        &self.control
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl GenomeMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for GenomeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
