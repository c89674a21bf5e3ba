//! Source clients for the upstream genomic databases.
//!
//! E-utilities databases share one generic [`EntrezClient`]; gnomAD and
//! Reactome have their own clients. All of them go through the shared
//! [`Fetcher`](crate::fetch::Fetcher).

pub mod entrez;
pub mod gnomad;
pub mod reactome;

use std::{error::Error, fmt};

use genome_model::schema::{EUTILS_BASE_URL, GNOMAD_API_URL, REACTOME_CONTENT_URL};

use crate::fetch::FetchError;
use crate::parsers::ParseError;

pub use entrez::{
    ClinVar,
    ClinVarClient,
    EntrezClient,
    EntrezConfig,
    EntrezDatabase,
    Gene,
    GeneClient,
    Nucleotide,
    NucleotideClient,
    Pubmed,
    PubmedClient,
};
pub use gnomad::GnomadClient;
pub use reactome::ReactomeClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Fetch(FetchError),
    NotFound(String),
    Parse(ParseError),
}

impl SourceError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Parse(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SourceError {}

impl From<FetchError> for SourceError {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

impl From<ParseError> for SourceError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.into())
    }
}

/// Upstream endpoints and NCBI identification shared by the source clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub eutils_base_url: String,
    pub gnomad_url: String,
    pub reactome_url: String,
    pub api_key: Option<String>,
    pub tool: Option<String>,
    pub email: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            eutils_base_url: EUTILS_BASE_URL.to_string(),
            gnomad_url: GNOMAD_API_URL.to_string(),
            reactome_url: REACTOME_CONTENT_URL.to_string(),
            api_key: None,
            tool: None,
            email: None,
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn with_eutils_base_url(mut self, url: impl Into<String>) -> Self {
        self.eutils_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_gnomad_url(mut self, url: impl Into<String>) -> Self {
        self.gnomad_url = url.into();
        self
    }

    #[must_use]
    pub fn with_reactome_url(mut self, url: impl Into<String>) -> Self {
        self.reactome_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: Option<String>) -> Self {
        self.tool = tool;
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    #[must_use]
    pub fn entrez(&self) -> EntrezConfig {
        EntrezConfig {
            base_url: self.eutils_base_url.clone(),
            api_key: self.api_key.clone(),
            tool: self.tool.clone(),
            email: self.email.clone(),
        }
    }
}

/// Joins a base URL and a path without doubling the separator.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
