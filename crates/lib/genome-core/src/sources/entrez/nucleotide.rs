use genome_model::ReferenceSequence;
use genome_model::schema::{DB_NUCLEOTIDE, NUCLEOTIDE_ACCESSION_FIELDS, make_refseq_terms};
use serde_json::Value;
use tracing::debug;

use super::{EntrezClient, EntrezDatabase};
use crate::parsers::fields::first_text;
use crate::parsers::{FeatureTableParse, FeatureTableParser, ParseError};
use crate::sources::SourceError;

pub struct Nucleotide;

pub type NucleotideClient = EntrezClient<Nucleotide>;

impl EntrezDatabase for Nucleotide {
    const NAME: &'static str = DB_NUCLEOTIDE;

    type Summary = ReferenceSequence;

    fn parse_summary(uid: &str, doc: &Value) -> Result<ReferenceSequence, ParseError> {
        first_text(doc, NUCLEOTIDE_ACCESSION_FIELDS)
            .map(|accession| ReferenceSequence::parse(&accession))
            .ok_or_else(|| ParseError::new(format!("nucleotide summary {uid} has no accession")))
    }
}

impl EntrezClient<Nucleotide> {
    /// Current RefSeq mRNA accession for a human gene.
    ///
    /// Search terms go from RefSeq Select to any mRNA; the first term with a hit wins.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` when no term matches.
    pub async fn resolve_refseq(&self, symbol: &str) -> Result<ReferenceSequence, SourceError> {
        for term in make_refseq_terms(symbol) {
            let ids = self.search(&term, 1).await?;
            let Some(id) = ids.into_iter().next() else {
                debug!(%symbol, %term, "no nucleotide hits for term");
                continue;
            };
            let reference = self
                .summarize(std::slice::from_ref(&id))
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| SourceError::NotFound(format!("nucleotide summary {id}")))?;
            debug!(%symbol, %term, %reference, "resolved reference sequence");
            return Ok(reference);
        }
        Err(SourceError::NotFound(format!("RefSeq mRNA for {symbol}")))
    }

    /// Feature table of a reference sequence.
    ///
    /// # Errors
    /// Returns `SourceError::Fetch` on transport failure and `SourceError::Parse`
    /// when the table is malformed.
    pub async fn feature_table(
        &self,
        reference: &ReferenceSequence,
    ) -> Result<FeatureTableParse, SourceError> {
        let text = self
            .fetch_detail(&reference.to_string(), "ft", "text")
            .await?;
        Ok(FeatureTableParser::parse(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::sources::EntrezConfig;
    use crate::testing::{RouteTransport, fetcher};

    fn client(transport: Arc<RouteTransport>) -> NucleotideClient {
        let config = EntrezConfig {
            base_url: "https://eutils.test".to_string(),
            api_key: None,
            tool: None,
            email: None,
        };
        EntrezClient::new(fetcher(transport), Arc::new(config))
    }

    #[test]
    fn accession_falls_back_to_caption() {
        let doc = json!({ "caption": "NM_000059" });
        let reference = Nucleotide::parse_summary("1", &doc).unwrap();
        assert_eq!(reference.accession, "NM_000059");
        assert_eq!(reference.version, None);
        assert!(Nucleotide::parse_summary("1", &json!({})).is_err());
    }

    #[tokio::test]
    async fn falls_through_search_terms_until_a_hit() {
        let transport = RouteTransport::new();
        transport.on_matching("esearch", "refseq_select", r#"{"esearchresult": {"idlist": []}}"#);
        transport.on_matching("esearch", "RefSeq[Filter]", r#"{"esearchresult": {"idlist": ["119395733"]}}"#);
        transport.on(
            "esummary",
            r#"{"result": {"uids": ["119395733"], "119395733": {"accessionversion": "NM_000059.4", "caption": "NM_000059"}}}"#,
        );

        let reference = client(transport.clone()).resolve_refseq("BRCA2").await.unwrap();
        assert_eq!(reference.to_string(), "NM_000059.4");
        assert_eq!(reference.version, Some(4));
        assert_eq!(transport.count("esearch"), 2);
    }

    #[tokio::test]
    async fn no_reference_is_not_found() {
        let transport = RouteTransport::new();
        transport.on("esearch", r#"{"esearchresult": {"idlist": []}}"#);
        let err = client(transport.clone()).resolve_refseq("NOPE").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.count("esearch"), 3);
    }

    #[tokio::test]
    async fn fetches_feature_table_as_text() {
        let transport = RouteTransport::new();
        transport.on("efetch", ">Feature ref|NM_000059.4|\n1\t100\texon\n201\t300\texon\n");
        let reference = ReferenceSequence::parse("NM_000059.4");
        let parsed = client(transport.clone()).feature_table(&reference).await.unwrap();
        assert!(matches!(parsed, FeatureTableParse::Table(ref table) if table.exons().len() == 2));

        let request = &transport.requests()[0];
        assert_eq!(request.param("id"), Some("NM_000059.4"));
        assert_eq!(request.param("rettype"), Some("ft"));
        assert_eq!(request.param("retmode"), Some("text"));
    }
}
