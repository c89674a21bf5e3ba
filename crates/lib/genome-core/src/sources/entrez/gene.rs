use genome_model::GeneSummary;
use genome_model::schema::{DB_GENE, DB_PUBMED, make_gene_term};
use serde_json::Value;

use super::{EntrezClient, EntrezDatabase};
use crate::parsers::ParseError;
use crate::parsers::fields::text_at;
use crate::sources::SourceError;

pub struct Gene;

pub type GeneClient = EntrezClient<Gene>;

impl EntrezDatabase for Gene {
    const NAME: &'static str = DB_GENE;

    type Summary = GeneSummary;

    fn parse_summary(uid: &str, doc: &Value) -> Result<GeneSummary, ParseError> {
        let aliases = text_at(doc, &["otheraliases"])
            .map(|aliases| {
                aliases
                    .split(',')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(GeneSummary {
            gene_id: uid.to_string(),
            symbol: text_at(doc, &["name"]),
            name: text_at(doc, &["nomenclaturename"]),
            description: text_at(doc, &["description"]),
            summary: text_at(doc, &["summary"]),
            map_location: text_at(doc, &["maplocation"]),
            aliases,
        })
    }
}

impl EntrezClient<Gene> {
    /// NCBI Gene id of the human gene with this official symbol.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` when the search has no hits.
    pub async fn search_gene(&self, symbol: &str) -> Result<String, SourceError> {
        self.search(&make_gene_term(symbol), 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(format!("human gene {symbol}")))
    }

    /// Looks up a human gene by symbol.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` when the symbol has no hit or the summary
    /// omits the matched id.
    pub async fn gene_info(&self, symbol: &str) -> Result<GeneSummary, SourceError> {
        let gene_id = self.search_gene(symbol).await?;
        self.summarize(std::slice::from_ref(&gene_id))
            .await?
            .into_iter()
            .find(|gene| gene.gene_id == gene_id)
            .ok_or_else(|| SourceError::NotFound(format!("summary for gene {gene_id}")))
    }

    /// Up to `max_results` PubMed ids linked to a gene, in link order.
    ///
    /// # Errors
    /// Returns `SourceError` when the elink call fails.
    pub async fn gene_pmids(
        &self,
        gene_id: &str,
        max_results: usize,
    ) -> Result<Vec<String>, SourceError> {
        let mut pmids = self.link(gene_id, DB_PUBMED).await?;
        pmids.truncate(max_results);
        Ok(pmids)
    }
}
