use genome_model::VariantSummary;
use genome_model::schema::{
    CLINICAL_SIGNIFICANCE_FIELDS,
    DB_CLINVAR,
    DB_PUBMED,
    LAST_EVALUATED_FIELDS,
    VARIANT_ACCESSION_FIELDS,
};
use serde_json::Value;

use super::{EntrezClient, EntrezDatabase};
use crate::parsers::ParseError;
use crate::parsers::fields::{as_list, first_text, text_at};
use crate::sources::SourceError;

pub struct ClinVar;

pub type ClinVarClient = EntrezClient<ClinVar>;

impl EntrezDatabase for ClinVar {
    const NAME: &'static str = DB_CLINVAR;

    type Summary = VariantSummary;

    fn parse_summary(uid: &str, doc: &Value) -> Result<VariantSummary, ParseError> {
        Ok(VariantSummary {
            uid: uid.to_string(),
            title: text_at(doc, &["title"]),
            clinical_significance: first_text(doc, CLINICAL_SIGNIFICANCE_FIELDS),
            gene_symbols: gene_symbols(doc),
            accession: first_text(doc, VARIANT_ACCESSION_FIELDS),
            last_updated: first_text(doc, LAST_EVALUATED_FIELDS),
        })
    }
}

/// Gene symbols listed on a record, in order, without repeats.
fn gene_symbols(doc: &Value) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    let genes = doc.get("genes").unwrap_or(&Value::Null);
    for symbol in as_list(genes)
        .into_iter()
        .filter_map(|gene| text_at(gene, &["symbol"]))
    {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    if symbols.is_empty() {
        symbols.extend(text_at(doc, &["gene_sort"]));
    }
    symbols
}

impl EntrezClient<ClinVar> {
    /// Full summary of a single ClinVar record.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` when NCBI has no document for `variant_id`.
    pub async fn variant_report(&self, variant_id: &str) -> Result<VariantSummary, SourceError> {
        let records = self.summarize(&[variant_id.to_string()]).await?;
        records
            .into_iter()
            .find(|record| record.uid == variant_id)
            .ok_or_else(|| SourceError::NotFound(format!("ClinVar variant {variant_id}")))
    }

    /// PubMed ids linked to a ClinVar record.
    ///
    /// # Errors
    /// Returns `SourceError` when the elink call fails.
    pub async fn linked_pmids(&self, variant_id: &str) -> Result<Vec<String>, SourceError> {
        self.link(variant_id, DB_PUBMED).await
    }
}
