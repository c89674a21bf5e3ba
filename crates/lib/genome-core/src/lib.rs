//! Core query layer for genome-mcp.
//!
//! This crate owns the rate-limited fetcher every upstream call goes through,
//! the ClinVar/Gene/PubMed/Nucleotide, gnomAD and Reactome source clients,
//! feature-table parsing with coordinate classification, and the control plane
//! that composes them into discovery pipelines.

pub mod classify;
pub mod control;
pub mod fetch;
pub mod parsers;
pub mod services;
pub mod sources;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
