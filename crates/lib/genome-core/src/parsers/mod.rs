//! Parsers for upstream response payloads.
//!
//! Each parser turns one semi-structured wire format into normalized records:
//! esummary JSON documents (via ordered field lookup), NCBI five-column
//! feature tables, and PubMed efetch XML.

pub mod feature_table;
pub mod fields;
pub mod pubmed_xml;

use std::{error::Error, fmt};

pub use feature_table::{FeatureTableParse, FeatureTableParser};
pub use pubmed_xml::PubmedXmlParser;

/// Error type for unrecognized response shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<roxmltree::Error> for ParseError {
    fn from(err: roxmltree::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ParseError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(err.to_string())
    }
}
