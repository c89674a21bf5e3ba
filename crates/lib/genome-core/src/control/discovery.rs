//! Phenotype to gene to literature pipelines.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use genome_model::{
    ArticleAbstract,
    DiscoveryReport,
    GeneEvidence,
    GeneRank,
    OmittedGene,
    VariantSummary,
};
use tracing::{info, warn};

use super::{ControlError, GenomeControlPlane, required};
use crate::services::ReportCache;
use crate::sources::{GeneClient, SourceError};

/// ClinVar hits examined when ranking genes for a phenotype.
pub const RELATED_GENES_SEARCH_DEPTH: usize = 50;
/// ClinVar hits examined when building a discovery report.
pub const EVIDENCE_SEARCH_DEPTH: usize = 20;
pub const PMIDS_PER_GENE: usize = 3;
pub const DEFAULT_MAX_GENES: usize = 3;
pub const DEFAULT_LITERATURE_CONCURRENCY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub phenotype: String,
    pub max_genes: usize,
    pub use_cache: bool,
}

impl DiscoveryRequest {
    pub fn new(phenotype: impl Into<String>) -> Self {
        Self {
            phenotype: phenotype.into(),
            max_genes: DEFAULT_MAX_GENES,
            use_cache: false,
        }
    }

    #[must_use]
    pub const fn with_max_genes(mut self, max_genes: usize) -> Self {
        self.max_genes = max_genes;
        self
    }

    #[must_use]
    pub const fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

/// Counts variants per gene and ranks by count, ties broken alphabetically.
///
/// Symbols are upper-cased; a gene listed twice on one variant counts once.
#[must_use]
pub fn rank_counts(variants: &[VariantSummary]) -> Vec<GeneRank> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for variant in variants {
        let symbols: HashSet<String> = variant
            .gene_symbols
            .iter()
            .map(|symbol| symbol.trim().to_uppercase())
            .filter(|symbol| !symbol.is_empty())
            .collect();
        for symbol in symbols {
            *counts.entry(symbol).or_default() += 1;
        }
    }

    let mut ranked: Vec<GeneRank> = counts
        .into_iter()
        .map(|(symbol, variant_count)| GeneRank {
            symbol,
            variant_count,
        })
        .collect();
    ranked.sort_by(|left, right| {
        right
            .variant_count
            .cmp(&left.variant_count)
            .then_with(|| left.symbol.cmp(&right.symbol))
    });
    ranked
}

/// Gene id and linked PMIDs for one candidate gene.
struct GeneLiterature {
    rank: GeneRank,
    gene_id: String,
    pmids: Vec<String>,
}

async fn gene_literature(gene: &GeneClient, symbol: &str) -> Result<(String, Vec<String>), SourceError> {
    let gene_id = gene.search_gene(symbol).await?;
    let pmids = gene.gene_pmids(&gene_id, PMIDS_PER_GENE).await?;
    Ok((gene_id, pmids))
}

impl GenomeControlPlane {
    async fn ranked_genes(&self, phenotype: &str, depth: usize) -> Result<Vec<GeneRank>, ControlError> {
        let ids = self.clinvar.search(phenotype, depth).await?;
        let variants = self.clinvar.summarize(&ids).await?;
        Ok(rank_counts(&variants))
    }

    /// Genes most often implicated in ClinVar records matching a phenotype.
    ///
    /// An empty list means no ClinVar record named a gene.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` for a blank phenotype and
    /// `ControlError::Source` when ClinVar cannot be queried.
    pub async fn find_related_genes(
        &self,
        phenotype: &str,
        top_n: usize,
    ) -> Result<Vec<GeneRank>, ControlError> {
        let phenotype = required("phenotype", phenotype)?;
        let mut ranked = self
            .ranked_genes(phenotype, RELATED_GENES_SEARCH_DEPTH)
            .await?;
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// Candidate genes for a phenotype with literature for the top few.
    ///
    /// Genes whose lookups fail are listed as omitted rather than failing the report.
    ///
    /// # Errors
    /// Returns `ControlError::NoCandidateGenes` when ClinVar names no gene,
    /// `ControlError::InvalidInput` for a blank phenotype or zero `max_genes`,
    /// and `ControlError::Source` when the ClinVar search itself fails.
    pub async fn get_discovery_evidence(
        &self,
        request: DiscoveryRequest,
    ) -> Result<DiscoveryReport, ControlError> {
        let phenotype = required("phenotype", &request.phenotype)?;
        if request.max_genes == 0 {
            return Err(ControlError::InvalidInput(
                "max_genes must be at least 1".to_string(),
            ));
        }

        match self.reports.as_ref().filter(|_| request.use_cache) {
            Some(cache) => {
                let key = ReportCache::key(phenotype, request.max_genes);
                let report = cache
                    .get_or_try_init(&key, || self.build_report(phenotype, request.max_genes))
                    .await?;
                Ok(report.as_ref().clone())
            }
            None => self.build_report(phenotype, request.max_genes).await,
        }
    }

    async fn build_report(
        &self,
        phenotype: &str,
        max_genes: usize,
    ) -> Result<DiscoveryReport, ControlError> {
        let ranked = self.ranked_genes(phenotype, EVIDENCE_SEARCH_DEPTH).await?;
        if ranked.is_empty() {
            return Err(ControlError::NoCandidateGenes {
                phenotype: phenotype.to_string(),
            });
        }

        let gene = &self.gene;
        let lookups: Vec<(GeneRank, Result<(String, Vec<String>), SourceError>)> =
            stream::iter(ranked.iter().take(max_genes).cloned())
                .map(|rank| async move {
                    let outcome = gene_literature(gene, &rank.symbol).await;
                    (rank, outcome)
                })
                .buffered(self.literature_concurrency)
                .collect()
                .await;

        let mut found = Vec::new();
        let mut omitted = Vec::new();
        for (rank, outcome) in lookups {
            match outcome {
                Ok((gene_id, pmids)) => found.push(GeneLiterature {
                    rank,
                    gene_id,
                    pmids,
                }),
                Err(err) => {
                    warn!(%phenotype, symbol = %rank.symbol, error = %err, "omitting gene from discovery report");
                    omitted.push(OmittedGene {
                        symbol: rank.symbol,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        let unique_pmids: Vec<String> = found
            .iter()
            .flat_map(|literature| literature.pmids.iter())
            .filter(|pmid| seen.insert(pmid.as_str()))
            .cloned()
            .collect();

        let evidence = match self.pubmed.abstracts(&unique_pmids).await {
            Ok(abstracts) => attach_abstracts(found, abstracts),
            Err(err) => {
                warn!(%phenotype, error = %err, "abstract batch failed");
                omitted.extend(found.into_iter().map(|literature| OmittedGene {
                    symbol: literature.rank.symbol,
                    reason: format!("abstract batch failed: {err}"),
                }));
                Vec::new()
            }
        };
        info!(
            %phenotype,
            ranked = ranked.len(),
            with_evidence = evidence.len(),
            omitted = omitted.len(),
            "built discovery report"
        );

        Ok(DiscoveryReport {
            phenotype: phenotype.to_string(),
            ranked_genes: ranked,
            evidence,
            omitted,
        })
    }
}

fn attach_abstracts(found: Vec<GeneLiterature>, abstracts: Vec<ArticleAbstract>) -> Vec<GeneEvidence> {
    let by_pmid: HashMap<String, ArticleAbstract> = abstracts
        .into_iter()
        .map(|article| (article.pmid.clone(), article))
        .collect();
    found
        .into_iter()
        .map(|literature| GeneEvidence {
            articles: literature
                .pmids
                .iter()
                .filter_map(|pmid| by_pmid.get(pmid).cloned())
                .collect(),
            symbol: literature.rank.symbol,
            variant_count: literature.rank.variant_count,
            gene_id: literature.gene_id,
            pmids: literature.pmids,
        })
        .collect()
}
