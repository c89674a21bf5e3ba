//! Generic NCBI E-utilities client.
//!
//! One [`EntrezClient`] per database; the database type decides how an
//! esummary document becomes a record. Database-specific operations live in
//! the sibling modules as inherent impls on the concrete client aliases.

mod clinvar;
mod gene;
mod nucleotide;
mod pubmed;

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use genome_model::schema::{ENDPOINT_EFETCH, ENDPOINT_ELINK, ENDPOINT_ESEARCH, ENDPOINT_ESUMMARY};
use serde_json::Value;
use tracing::warn;

use super::{SourceError, join_url};
use crate::fetch::{Fetcher, HttpRequest, Source};
use crate::parsers::ParseError;
use crate::parsers::fields::{as_list, first_text, id_list, lookup, text_at};

pub use clinvar::{ClinVar, ClinVarClient};
pub use gene::{Gene, GeneClient};
pub use nucleotide::{Nucleotide, NucleotideClient};
pub use pubmed::{Pubmed, PubmedClient};

const ESEARCH_ERROR_FIELDS: &[&[&str]] = &[&["esearchresult", "ERROR"], &["error"]];
// Older elink payloads name the target database `db`.
const LINK_TARGET_FIELDS: &[&[&str]] = &[&["dbto"], &["db"]];

/// E-utilities base URL plus the identification NCBI asks callers to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrezConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub tool: Option<String>,
    pub email: Option<String>,
}

impl EntrezConfig {
    fn identify(&self, mut request: HttpRequest) -> HttpRequest {
        for (key, value) in [
            ("api_key", &self.api_key),
            ("tool", &self.tool),
            ("email", &self.email),
        ] {
            if let Some(value) = value {
                request = request.with_param(key, value.clone());
            }
        }
        request
    }
}

/// An Entrez database and the shape of its esummary records.
pub trait EntrezDatabase: Send + Sync + 'static {
    const NAME: &'static str;

    type Summary: Send;

    /// Normalizes one esummary document.
    ///
    /// # Errors
    /// Returns `ParseError` when the document lacks a field the record cannot do without.
    fn parse_summary(uid: &str, doc: &Value) -> Result<Self::Summary, ParseError>;
}

pub struct EntrezClient<D> {
    fetcher: Arc<Fetcher>,
    config: Arc<EntrezConfig>,
    database: PhantomData<fn() -> D>,
}

impl<D> Clone for EntrezClient<D> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            config: self.config.clone(),
            database: PhantomData,
        }
    }
}

impl<D: EntrezDatabase> EntrezClient<D> {
    pub fn new(fetcher: Arc<Fetcher>, config: Arc<EntrezConfig>) -> Self {
        Self {
            fetcher,
            config,
            database: PhantomData,
        }
    }

    fn request(&self, operation: &'static str, endpoint: &str) -> HttpRequest {
        let request = HttpRequest::get(
            Source::Ncbi,
            operation,
            join_url(&self.config.base_url, endpoint),
        );
        self.config.identify(request)
    }

    /// Runs esearch and returns matching ids in relevance order. No hits is an empty list.
    ///
    /// # Errors
    /// Returns `SourceError::Fetch` on transport failure and `SourceError::Parse`
    /// when the response carries no id list.
    pub async fn search(&self, term: &str, max_results: usize) -> Result<Vec<String>, SourceError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let request = self
            .request("esearch", ENDPOINT_ESEARCH)
            .with_param("db", D::NAME)
            .with_param("term", term)
            .with_param("retmax", max_results.to_string())
            .with_param("retmode", "json");
        let doc: Value = self.fetcher.fetch(&request).await?.json()?;

        let Some(ids) = lookup(&doc, &["esearchresult", "idlist"]) else {
            let reason = first_text(&doc, ESEARCH_ERROR_FIELDS)
                .unwrap_or_else(|| "missing esearchresult.idlist".to_string());
            return Err(ParseError::new(format!("esearch {}: {reason}", D::NAME)).into());
        };
        let mut ids = id_list(ids);
        ids.truncate(max_results);
        Ok(ids)
    }

    /// Runs esummary for `ids` and returns records in the order NCBI lists them.
    ///
    /// Documents flagged with an `error` field are skipped with a warning.
    ///
    /// # Errors
    /// Returns `SourceError::Fetch` on transport failure and `SourceError::Parse`
    /// when the response or a document cannot be read.
    pub async fn summarize(&self, ids: &[String]) -> Result<Vec<D::Summary>, SourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request("esummary", ENDPOINT_ESUMMARY)
            .with_param("db", D::NAME)
            .with_param("id", ids.join(","))
            .with_param("retmode", "json");
        let doc: Value = self.fetcher.fetch(&request).await?.json()?;

        let Some(result) = doc.get("result") else {
            let reason = text_at(&doc, &["error"])
                .unwrap_or_else(|| "missing result object".to_string());
            return Err(ParseError::new(format!("esummary {}: {reason}", D::NAME)).into());
        };

        let mut records = Vec::new();
        for uid in id_list(result.get("uids").unwrap_or(&Value::Null)) {
            let Some(entry) = result.get(uid.as_str()) else {
                warn!(database = D::NAME, %uid, "esummary listed a uid without a document");
                continue;
            };
            if let Some(error) = entry.get("error") {
                warn!(database = D::NAME, %uid, %error, "skipping esummary document with error");
                continue;
            }
            records.push(D::parse_summary(&uid, entry)?);
        }
        Ok(records)
    }

    /// Runs elink from this database to `target_db`.
    ///
    /// Links from every linkset are merged, first-seen order, without duplicates.
    ///
    /// # Errors
    /// Returns `SourceError::Fetch` on transport failure and `SourceError::Parse`
    /// when the response carries no linksets.
    pub async fn link(&self, id: &str, target_db: &str) -> Result<Vec<String>, SourceError> {
        let request = self
            .request("elink", ENDPOINT_ELINK)
            .with_param("dbfrom", D::NAME)
            .with_param("db", target_db)
            .with_param("id", id)
            .with_param("retmode", "json");
        let doc: Value = self.fetcher.fetch(&request).await?.json()?;

        let Some(linksets) = doc.get("linksets") else {
            let reason = text_at(&doc, &["ERROR"])
                .unwrap_or_else(|| "missing linksets".to_string());
            return Err(ParseError::new(format!("elink {}: {reason}", D::NAME)).into());
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for linkset in as_list(linksets) {
            let databases = linkset.get("linksetdbs").unwrap_or(&Value::Null);
            for database in as_list(databases) {
                let dbto = first_text(database, LINK_TARGET_FIELDS);
                if dbto.as_deref() != Some(target_db) {
                    continue;
                }
                let ids = id_list(database.get("links").unwrap_or(&Value::Null));
                links.extend(ids.into_iter().filter(|id| seen.insert(id.clone())));
            }
        }
        Ok(links)
    }

    /// Runs efetch and returns the raw payload. `id` may be a comma-separated list.
    ///
    /// # Errors
    /// Returns `SourceError::Fetch` on transport failure.
    pub async fn fetch_detail(
        &self,
        id: &str,
        rettype: &str,
        retmode: &str,
    ) -> Result<String, SourceError> {
        let request = self
            .request("efetch", ENDPOINT_EFETCH)
            .with_param("db", D::NAME)
            .with_param("id", id)
            .with_param("rettype", rettype)
            .with_param("retmode", retmode);
        Ok(self.fetcher.fetch(&request).await?.body)
    }
}
