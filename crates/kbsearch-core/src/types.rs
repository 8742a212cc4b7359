//! Request, hit and result-table types of the query path.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::kinds::EntityKind;

/// Per-kind cap applied when a request does not set one.
pub const DEFAULT_TOP_RESULTS: usize = 50;

/// One query call.
///
/// - `limit`: cap on raw hits fetched from the index (unset = all matches)
/// - `drop_duplicated`: run identifier deduplication per kind
/// - `n_top_results`: rows kept per kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default = "default_true")]
    pub drop_duplicated: bool,
    #[serde(default = "default_top_results")]
    pub n_top_results: usize,
}

fn default_true() -> bool {
    true
}

fn default_top_results() -> usize {
    DEFAULT_TOP_RESULTS
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            drop_duplicated: true,
            n_top_results: DEFAULT_TOP_RESULTS,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn keep_duplicates(mut self) -> Self {
        self.drop_duplicated = false;
        self
    }

    pub fn top(mut self, n: usize) -> Self {
        self.n_top_results = n;
        self
    }
}

/// A matched document: flat `field -> value` map plus its rounded score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub fields: BTreeMap<String, String>,
    pub score: f64,
}

impl Hit {
    pub fn new(score: f64) -> Self {
        Self { fields: BTreeMap::new(), score }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Value of `field`; empty strings count as absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// One row of an [`EntityTable`], attributes already prefix-stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub identifier: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub score: f64,
}

impl Row {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Rows of a single kind, ordered by non-increasing score.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTable {
    pub kind: EntityKind,
    pub rows: Vec<Row>,
}

impl EntityTable {
    pub fn empty(kind: EntityKind) -> Self {
        Self { kind, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(|r| r.identifier.as_deref())
    }
}

impl Serialize for EntityTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.rows)
    }
}

/// One table per kind, always all six, in [`EntityKind::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    tables: Vec<EntityTable>,
}

impl SearchResponse {
    pub(crate) fn from_tables(mut tables: Vec<EntityTable>) -> Self {
        tables.sort_by_key(|t| t.kind);
        Self { tables }
    }

    pub fn empty() -> Self {
        Self::from_tables(EntityKind::ALL.into_iter().map(EntityTable::empty).collect())
    }

    pub fn table(&self, kind: EntityKind) -> &EntityTable {
        // Every kind is present by construction.
        &self.tables[EntityKind::ALL.iter().position(|k| *k == kind).unwrap_or_default()]
    }

    pub fn tables(&self) -> &[EntityTable] {
        &self.tables
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(EntityTable::len).sum()
    }
}

impl Serialize for SearchResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(table.kind.name(), table)?;
        }
        map.end()
    }
}
