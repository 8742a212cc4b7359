use std::fs;
use tempfile::TempDir;

use kbsearch_core::config::Config;
use kbsearch_core::error::{Error, Result};
use kbsearch_core::identifier;
use kbsearch_core::query::ParsedQuery;
use kbsearch_core::traits::HitSource;
use kbsearch_core::{EntityKind, Hit, KnowledgeSearch, SearchRequest};

const FIELDS: [&str; 8] = [
    "organism_protrend_id",
    "organism_name",
    "gene_protrend_id",
    "gene_locus_tag",
    "gene_name",
    "regulator_protrend_id",
    "regulator_name",
    "regulatory_family_protrend_id",
];

/// Returns canned hits, in the given order, for any non-empty query.
struct CannedSource {
    hits: Vec<Hit>,
}

impl CannedSource {
    fn new(hits: Vec<Hit>) -> Self {
        Self { hits }
    }
}

impl HitSource for CannedSource {
    fn field_names(&self) -> Vec<String> {
        FIELDS.iter().map(|f| f.to_string()).collect()
    }

    fn search(&self, query: &ParsedQuery, limit: Option<usize>) -> Result<Vec<Hit>> {
        if query.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.hits.iter().take(limit.unwrap_or(usize::MAX)).cloned().collect())
    }
}

fn gene(id: &str, score: f64) -> Hit {
    Hit::new(score).with("gene_protrend_id", id).with("gene_locus_tag", "b4043")
}

#[test]
fn unmatched_query_returns_six_empty_tables() {
    let search = KnowledgeSearch::new(CannedSource::new(vec![]));
    let response = search.query(&SearchRequest::new("zzzzqqqqxxxx")).expect("query");
    assert_eq!(response.tables().len(), 6);
    for kind in EntityKind::ALL {
        assert!(response.table(kind).is_empty(), "{kind} should be empty");
    }
}

#[test]
fn single_organism_hit_lands_in_organism_table_only() {
    let hit = Hit::new(0.87)
        .with("organism_name", "Escherichia coli")
        .with("organism_protrend_id", "ORG.0000001");
    let search = KnowledgeSearch::new(CannedSource::new(vec![hit]));
    let response = search.query(&SearchRequest::new("escherichia")).expect("query");

    let value = serde_json::to_value(&response).expect("json");
    assert_eq!(
        value,
        serde_json::json!({
            "organism": [{ "identifier": "ORG.0000001", "name": "Escherichia coli", "score": 0.87 }],
            "gene": [], "regulator": [], "effector": [], "pathway": [], "regulatory_family": []
        })
    );
}

#[test]
fn prefix_is_stripped_and_hit_stays_in_its_kind() {
    let hit = Hit::new(0.5).with("gene_locus_tag", "dnaA").with("gene_protrend_id", "G.0000001");
    let search = KnowledgeSearch::new(CannedSource::new(vec![hit]));
    let response = search.query(&SearchRequest::new("dnaa")).expect("query");

    let genes = response.table(EntityKind::Gene);
    assert_eq!(genes.len(), 1);
    assert_eq!(genes.rows[0].identifier.as_deref(), Some("G.0000001"));
    assert_eq!(genes.rows[0].attribute("locus_tag"), Some("dnaA"));
    assert_eq!(response.total_rows(), 1);
}

#[test]
fn duplicate_identifiers_keep_highest_score() {
    let search = KnowledgeSearch::new(CannedSource::new(vec![gene("G.0000002", 0.4), gene("G.0000002", 0.9)]));
    let response = search.query(&SearchRequest::new("lexa")).expect("query");
    let genes = response.table(EntityKind::Gene);
    assert_eq!(genes.len(), 1);
    assert_eq!(genes.rows[0].score, 0.9);

    let kept = search.query(&SearchRequest::new("lexa").keep_duplicates()).expect("query");
    assert_eq!(kept.table(EntityKind::Gene).len(), 2);
}

#[test]
fn top_n_keeps_highest_scoring_rows() {
    let hits = vec![
        gene("G.0000001", 0.3),
        gene("G.0000002", 0.9),
        gene("G.0000003", 0.1),
        gene("G.0000004", 0.7),
        gene("G.0000005", 0.5),
    ];
    let search = KnowledgeSearch::new(CannedSource::new(hits));
    let response = search.query(&SearchRequest::new("b4043").top(2)).expect("query");
    let ids: Vec<_> = response.table(EntityKind::Gene).identifiers().flatten().collect();
    assert_eq!(ids, vec!["G.0000002", "G.0000004"]);
}

#[test]
fn response_invariants_hold_for_mixed_stream() {
    let mut hits = Vec::new();
    for i in 0..40u32 {
        let score = f64::from((i * 37) % 23) / 23.0;
        hits.push(gene(&format!("G.{:07}", i % 11), score));
        hits.push(
            Hit::new(score)
                .with("regulator_name", format!("reg{i}"))
                .with("regulator_protrend_id", if i % 5 == 0 { String::new() } else { format!("R.{:07}", i % 7) })
                .with("organism_protrend_id", "ORG.0000001"),
        );
    }
    let search = KnowledgeSearch::new(CannedSource::new(hits));
    let top = 6;
    let response = search.query(&SearchRequest::new("anything").top(top)).expect("query");

    for table in response.tables() {
        assert!(table.len() <= top);
        assert!(table.rows.windows(2).all(|w| w[0].score >= w[1].score));
        let ids: Vec<_> = table.identifiers().collect();
        assert!(ids.iter().all(|id| id.is_some_and(|s| !s.is_empty())));
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
    assert_eq!(response.table(EntityKind::Organism).len(), 1);
}

#[test]
fn limit_is_forwarded_to_the_source() {
    let source = CannedSource::new(vec![gene("G.1", 0.9), gene("G.2", 0.8), gene("G.3", 0.7)]);
    let search = KnowledgeSearch::new(source);
    let response = search.query(&SearchRequest::new("x").limit(2)).expect("query");
    assert_eq!(response.table(EntityKind::Gene).len(), 2);
}

#[test]
fn malformed_query_fails_before_searching() {
    let search = KnowledgeSearch::new(CannedSource::new(vec![gene("G.1", 0.9)]));
    let err = search.query(&SearchRequest::new("(lexa")).expect_err("parse error");
    assert!(matches!(err, Error::QueryParse { .. }));
}

#[test]
fn identifier_codec_round_trip() {
    assert_eq!(identifier::decode("ORG.0000123").expect("decode"), 123);
    assert_eq!(identifier::encode("ORG", 123), "ORG.0000123");
    let id = EntityKind::Gene.identifier(2);
    assert_eq!(identifier::decode(&id).expect("decode"), 2);
}

#[test]
fn config_reads_search_section_relative_to_base() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[search]\nindex_root = \"indexes\"\nn_top_results = 10\n",
    )
    .unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[search]\ntimeout_ms = 250\n").unwrap();

    let config = Config::load_from(tmp.path(), "test").expect("config");
    let settings = config.search_settings().expect("settings");
    assert_eq!(settings.n_top_results, 10);
    assert_eq!(settings.timeout_ms, Some(250));
    assert_eq!(settings.index_dir(), tmp.path().join("indexes").join("protrendschema_index"));
}

#[test]
fn config_without_search_section_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = Config::load_from(tmp.path(), "dev").expect("config");
    let settings = config.search_settings().expect("settings");
    assert_eq!(settings.n_top_results, 50);
    assert_eq!(settings.schema_name, "ProtrendSchema");
}

#[test]
fn config_rejects_invalid_search_values() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[search]\ncoordination = 2.0\n").unwrap();
    let config = Config::load_from(tmp.path(), "dev").expect("config");
    assert!(matches!(config.search_settings(), Err(Error::InvalidConfig(_))));
}
