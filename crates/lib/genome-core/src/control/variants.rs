use genome_model::{ArticleSummary, GenomeBuild, PopulationFrequency, VariantCoordinate, VariantSummary};

use super::{ControlError, GenomeControlPlane, required};

pub const DEFAULT_LITERATURE_RESULTS: usize = 5;

impl GenomeControlPlane {
    /// Searches ClinVar with a free-text or Entrez-syntax term.
    ///
    /// The term is passed through unchanged. No hits is an empty list.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` for a blank term and
    /// `ControlError::Source` when ClinVar cannot be queried.
    pub async fn search_clinvar(
        &self,
        term: &str,
        max_results: usize,
    ) -> Result<Vec<VariantSummary>, ControlError> {
        let term = required("term", term)?;
        let ids = self.clinvar.search(term, max_results).await?;
        Ok(self.clinvar.summarize(&ids).await?)
    }

    /// Full ClinVar summary for one variant id.
    ///
    /// # Errors
    /// Returns `ControlError::Source` with `NotFound` when ClinVar has no such record.
    pub async fn get_variant_report(&self, variant_id: &str) -> Result<VariantSummary, ControlError> {
        let variant_id = required("variant_id", variant_id)?;
        Ok(self.clinvar.variant_report(variant_id).await?)
    }

    /// Citations linked to a ClinVar variant, without duplicate PMIDs.
    ///
    /// # Errors
    /// Returns `ControlError::Source` when the link or summary call fails.
    pub async fn get_supporting_literature(
        &self,
        variant_id: &str,
        max_results: usize,
    ) -> Result<Vec<ArticleSummary>, ControlError> {
        let variant_id = required("variant_id", variant_id)?;
        let mut pmids = self.clinvar.linked_pmids(variant_id).await?;
        pmids.truncate(max_results);
        Ok(self.pubmed.summarize(&pmids).await?)
    }

    /// gnomAD allele frequencies for a `CHROM-POS-REF-ALT` variant.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` when the variant cannot be parsed and
    /// `ControlError::Source` when gnomAD fails or has no such variant.
    pub async fn get_population_stats(
        &self,
        variant: &str,
        build: GenomeBuild,
    ) -> Result<PopulationFrequency, ControlError> {
        let coordinate: VariantCoordinate = variant
            .parse()
            .map_err(|err| ControlError::InvalidInput(format!("{err}")))?;
        Ok(self.gnomad.population_frequency(&coordinate, build).await?)
    }
}
