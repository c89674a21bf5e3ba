//! MCP tool modules.
//!
//! Tools are grouped by domain: ClinVar variant queries, gene-level lookups,
//! phenotype discovery, and contextual help.

pub mod discovery;
pub mod genes;
pub mod variants;
mod context;
