//! Shaping of a flat, ranked hit stream into bounded per-kind tables.
//!
//! Order of stages: one global sort, per-kind projection, optional
//! identifier dedup, unconditional purge of rows without identifier,
//! truncation. Kinds never influence each other after the sort.

use std::collections::BTreeMap;

use tracing::debug;

use crate::kinds::{EntityKind, KindRegistry, IDENTIFIER_ATTRIBUTE};
use crate::types::{EntityTable, Hit, Row, SearchResponse};
use crate::unique_list::UniqueList;

/// Sort all hits by descending score, then project one table per kind.
pub fn demultiplex(mut hits: Vec<Hit>, registry: &KindRegistry) -> Vec<EntityTable> {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    EntityKind::ALL.into_iter().map(|kind| project(kind, &hits, registry)).collect()
}

fn project(kind: EntityKind, hits: &[Hit], registry: &KindRegistry) -> EntityTable {
    let fields = registry.fields(kind);
    if fields.is_empty() {
        return EntityTable::empty(kind);
    }
    let rows = hits
        .iter()
        .filter_map(|hit| {
            let mut identifier = None;
            let mut attributes = BTreeMap::new();
            for field in fields {
                let Some(value) = hit.get(&field.indexed) else { continue };
                if field.attribute == IDENTIFIER_ATTRIBUTE {
                    identifier = Some(value.to_string());
                } else {
                    attributes.insert(field.attribute.clone(), value.to_string());
                }
            }
            (identifier.is_some() || !attributes.is_empty()).then_some(Row { identifier, attributes, score: hit.score })
        })
        .collect();
    EntityTable { kind, rows }
}

/// Keep the first (highest-ranked) row per identifier when `drop_duplicated`,
/// then drop rows without identifier regardless of the flag.
///
/// Rows lacking an identifier share one key during dedup, so only the first
/// of them survives that step before the purge removes it too.
pub fn dedupe(table: EntityTable, drop_duplicated: bool) -> EntityTable {
    let EntityTable { kind, rows } = table;
    let before = rows.len();
    let mut rows = if drop_duplicated {
        rows.into_iter()
            .map(|row| (row.identifier.clone(), row))
            .collect::<UniqueList<_, _>>()
            .into_vec()
    } else {
        rows
    };
    rows.retain(|row| row.identifier.as_deref().is_some_and(|id| !id.is_empty()));
    debug!(kind = %kind, before, after = rows.len(), "deduplicated");
    EntityTable { kind, rows }
}

pub fn truncate(mut table: EntityTable, n: usize) -> EntityTable {
    table.rows.truncate(n);
    table
}

/// Run every shaping stage over one query's hits.
pub fn shape(hits: Vec<Hit>, registry: &KindRegistry, drop_duplicated: bool, n_top_results: usize) -> SearchResponse {
    let tables = demultiplex(hits, registry)
        .into_iter()
        .map(|table| truncate(dedupe(table, drop_duplicated), n_top_results))
        .collect();
    SearchResponse::from_tables(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KindRegistry {
        KindRegistry::from_field_names([
            "organism_protrend_id",
            "organism_name",
            "gene_protrend_id",
            "gene_locus_tag",
            "gene_name",
        ])
    }

    fn gene(id: &str, score: f64) -> Hit {
        Hit::new(score).with("gene_protrend_id", id).with("gene_locus_tag", "b4043")
    }

    #[test]
    fn global_sort_precedes_projection() {
        let hits = vec![gene("G.1", 0.2), gene("G.2", 0.9), gene("G.3", 0.5)];
        let tables = demultiplex(hits, &registry());
        let scores: Vec<f64> = tables[1].rows.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
    }

    #[test]
    fn projection_keeps_rows_with_any_owned_value() {
        let hits = vec![
            Hit::new(0.5).with("organism_name", "Bacillus subtilis"),
            Hit::new(0.4).with("gene_locus_tag", "b4043"),
        ];
        let tables = demultiplex(hits, &registry());
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[0].rows[0].identifier, None);
        assert_eq!(tables[1].len(), 1);
        assert!(tables[2..].iter().all(EntityTable::is_empty));
    }

    #[test]
    fn dedupe_keeps_highest_ranked_occurrence() {
        let table = demultiplex(vec![gene("G.0000002", 0.4), gene("G.0000002", 0.9)], &registry()).remove(1);
        let table = dedupe(table, true);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].score, 0.9);
    }

    #[test]
    fn missing_identifiers_are_purged_even_without_dedup() {
        let hits = vec![
            gene("G.1", 0.9),
            Hit::new(0.8).with("gene_name", "lexA"),
            gene("G.1", 0.7),
        ];
        let table = demultiplex(hits, &registry()).remove(1);
        let kept = dedupe(table.clone(), false);
        assert_eq!(kept.identifiers().collect::<Vec<_>>(), vec![Some("G.1"), Some("G.1")]);
        let deduped = dedupe(table, true);
        assert_eq!(deduped.identifiers().collect::<Vec<_>>(), vec![Some("G.1")]);
    }

    #[test]
    fn truncate_keeps_leading_rows() {
        let hits = (0..5).map(|i| gene(&format!("G.{i}"), f64::from(i) / 10.0)).collect();
        let table = truncate(demultiplex(hits, &registry()).remove(1), 2);
        let ids: Vec<_> = table.identifiers().flatten().collect();
        assert_eq!(ids, vec!["G.4", "G.3"]);
        assert_eq!(truncate(EntityTable::empty(EntityKind::Gene), 2).len(), 0);
    }

    #[test]
    fn shape_always_returns_six_tables() {
        let response = shape(Vec::new(), &registry(), true, 50);
        assert_eq!(response.tables().len(), 6);
        assert_eq!(response.total_rows(), 0);
    }
}
