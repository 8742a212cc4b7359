#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod identifier;
pub mod kinds;
pub mod pipeline;
pub mod query;
pub mod scoring;
pub mod search;
pub mod traits;
pub mod types;
pub mod unique_list;

pub use kinds::EntityKind;
pub use search::KnowledgeSearch;
pub use types::{EntityTable, Hit, Row, SearchRequest, SearchResponse};
