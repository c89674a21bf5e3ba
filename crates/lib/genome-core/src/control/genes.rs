use genome_model::{GeneSummary, Pathway};

use super::{ControlError, GenomeControlPlane, required};

impl GenomeControlPlane {
    /// NCBI Gene record for a human gene symbol.
    ///
    /// # Errors
    /// Returns `ControlError::Source` with `NotFound` for unknown symbols.
    pub async fn get_gene_info(&self, symbol: &str) -> Result<GeneSummary, ControlError> {
        let symbol = required("symbol", symbol)?;
        Ok(self.gene.gene_info(symbol).await?)
    }

    /// Reactome pathways for a human gene symbol.
    ///
    /// # Errors
    /// Returns `ControlError::Source` with `NotFound` when Reactome does not know the gene.
    pub async fn get_pathway_info(&self, symbol: &str) -> Result<Vec<Pathway>, ControlError> {
        let symbol = required("symbol", symbol)?;
        Ok(self.reactome.gene_pathways(symbol).await?)
    }
}
