//! Normalized records and schema helpers for genome-mcp.
//!
//! This crate defines the canonical data model shared by the fetcher, source
//! clients, coordinate classifier, and the MCP surface.

pub mod models;
pub mod schema;

pub use models::*;
