use std::sync::Arc;

use genome_model::Pathway;
use genome_model::schema::{
    HUMAN_TAXON_ID,
    PATHWAY_KIND_FIELDS,
    PATHWAY_NAME_FIELDS,
    REACTOME_DB_UNIPROT,
    REACTOME_SCHEMA_PATHWAY,
    REACTOME_SPECIES,
};
use serde_json::Value;
use tracing::debug;

use super::{SourceError, join_url};
use crate::fetch::{Fetcher, HttpRequest, Source};
use crate::parsers::ParseError;
use crate::parsers::fields::{as_list, first_text, text_at};

/// Reactome Content Service client.
#[derive(Clone)]
pub struct ReactomeClient {
    fetcher: Arc<Fetcher>,
    base_url: String,
}

impl ReactomeClient {
    pub fn new(fetcher: Arc<Fetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Pathways a human gene product takes part in.
    ///
    /// The symbol is matched to a UniProt entry first; an empty list means the
    /// protein is known but mapped to no pathway.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` when Reactome has no UniProt entry for the symbol.
    pub async fn gene_pathways(&self, symbol: &str) -> Result<Vec<Pathway>, SourceError> {
        let accession = self.uniprot_accession(symbol).await?;
        debug!(%symbol, %accession, "mapped gene to UniProt entry");

        let url = join_url(
            &self.base_url,
            &format!("data/mapping/{REACTOME_DB_UNIPROT}/{accession}/pathways"),
        );
        let request = HttpRequest::get(Source::Reactome, "reactome_pathways", url)
            .with_param("species", HUMAN_TAXON_ID);
        let response = match self.fetcher.fetch(&request).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let doc: Value = response.json()?;
        let Some(events) = doc.as_array() else {
            return Err(ParseError::new("Reactome pathway mapping is not a list").into());
        };

        Ok(events
            .iter()
            .filter(|event| text_at(event, &["schemaClass"]).as_deref() == Some(REACTOME_SCHEMA_PATHWAY))
            .filter_map(|event| {
                Some(Pathway {
                    st_id: text_at(event, &["stId"])?,
                    name: first_text(event, PATHWAY_NAME_FIELDS)?,
                    kind: first_text(event, PATHWAY_KIND_FIELDS),
                })
            })
            .collect())
    }

    async fn uniprot_accession(&self, symbol: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(
            Source::Reactome,
            "reactome_search",
            join_url(&self.base_url, "search/query"),
        )
        .with_param("query", symbol)
        .with_param("species", REACTOME_SPECIES)
        .with_param("types", "Protein")
        .with_param("cluster", "true");

        let not_found = || SourceError::NotFound(format!("Reactome protein for {symbol}"));
        let response = match self.fetcher.fetch(&request).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => return Err(not_found()),
            Err(err) => return Err(err.into()),
        };
        let doc: Value = response.json()?;

        let entries: Vec<&Value> = doc
            .get("results")
            .and_then(|groups| as_list(groups).into_iter().next())
            .and_then(|group| group.get("entries"))
            .map(as_list)
            .unwrap_or_default();

        pick_uniprot_entry(&entries, symbol)
            .and_then(|entry| text_at(entry, &["referenceIdentifier"]))
            .ok_or_else(not_found)
    }
}

/// Exact symbol match on a UniProt entry, otherwise the first UniProt entry.
fn pick_uniprot_entry<'a>(entries: &[&'a Value], symbol: &str) -> Option<&'a Value> {
    let uniprot = |entry: &&&'a Value| {
        text_at(entry, &["databaseName"]).as_deref() == Some(REACTOME_DB_UNIPROT)
    };
    let exact = entries.iter().filter(uniprot).find(|entry| {
        ["name", "referenceName"].into_iter().any(|field| {
            text_at(entry, &[field])
                .is_some_and(|name| strip_highlighting(&name).eq_ignore_ascii_case(symbol))
        })
    });
    exact
        .or_else(|| entries.iter().find(uniprot))
        .copied()
}

/// Removes the search-hit markup Reactome wraps around matched terms.
fn strip_highlighting(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('<') {
        output.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    output.push_str(rest);
    output.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RouteTransport, fetcher};

    const SEARCH: &str = r#"{"results": [{"typeName": "Protein", "entries": [
        {"name": "<span class=\"highlighting\" >TP53</span>-like", "databaseName": "UniProt", "referenceIdentifier": "Q00000"},
        {"name": "<span class=\"highlighting\" >TP53</span>", "databaseName": "UniProt", "referenceIdentifier": "P04637"}
    ]}]}"#;

    const PATHWAYS: &str = r#"[
        {"stId": "R-HSA-69541", "displayName": "Stabilization of p53", "schemaClass": "Pathway"},
        {"stId": "R-HSA-6804756", "displayName": "Regulation of TP53 Activity", "schemaClass": "TopLevelPathway"},
        {"stId": "R-HSA-3700989", "displayName": "Transcriptional Regulation by TP53", "schemaClass": "Pathway", "className": "Pathway"}
    ]"#;

    fn client(transport: Arc<RouteTransport>) -> ReactomeClient {
        ReactomeClient::new(fetcher(transport), "https://reactome.test/ContentService")
    }

    #[test]
    fn strips_highlight_spans() {
        assert_eq!(
            strip_highlighting("<span class=\"highlighting\" >BRCA1</span>"),
            "BRCA1"
        );
        assert_eq!(strip_highlighting("plain"), "plain");
    }

    #[tokio::test]
    async fn maps_symbol_to_pathways() {
        let transport = RouteTransport::new();
        transport.on("reactome_search", SEARCH);
        transport.on("reactome_pathways", PATHWAYS);

        let pathways = client(transport.clone()).gene_pathways("tp53").await.unwrap();
        let ids: Vec<_> = pathways.iter().map(|pathway| pathway.st_id.as_str()).collect();
        assert_eq!(ids, vec!["R-HSA-69541", "R-HSA-3700989"]);
        assert_eq!(pathways[1].kind.as_deref(), Some("Pathway"));

        let mapping = &transport.requests()[1];
        assert_eq!(
            mapping.url,
            "https://reactome.test/ContentService/data/mapping/UniProt/P04637/pathways"
        );
        assert_eq!(mapping.param("species"), Some("9606"));
    }

    #[tokio::test]
    async fn falls_back_to_first_uniprot_entry() {
        let transport = RouteTransport::new();
        transport.on(
            "reactome_search",
            r#"{"results": [{"entries": [
                {"name": "other", "databaseName": "ENSEMBL", "referenceIdentifier": "ENSG1"},
                {"name": "other", "databaseName": "UniProt", "referenceIdentifier": "P11111"}
            ]}]}"#,
        );
        transport.on("reactome_pathways", "[]");
        client(transport.clone()).gene_pathways("ABC").await.unwrap();
        assert!(transport.requests()[1].url.contains("/UniProt/P11111/"));
    }

    #[tokio::test]
    async fn search_miss_is_not_found() {
        let transport = RouteTransport::new();
        transport.on_status("reactome_search", None, 404);
        let err = client(transport).gene_pathways("ZZZ").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unmapped_protein_has_no_pathways() {
        let transport = RouteTransport::new();
        transport.on("reactome_search", SEARCH);
        transport.on_status("reactome_pathways", None, 404);
        let pathways = client(transport).gene_pathways("TP53").await.unwrap();
        assert!(pathways.is_empty());
    }
}
