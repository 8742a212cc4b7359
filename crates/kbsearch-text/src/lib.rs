//! kbsearch-text
//!
//! Tantivy-backed index store for the entity search: the flat multi-kind
//! schema, a bulk loader, query compilation and the per-call searcher.

pub mod collector;
pub mod compile;
pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use index::EntityIndexWriter;
pub use search::IndexSearcher;
pub use tantivy_utils::SCHEMA_NAME;
