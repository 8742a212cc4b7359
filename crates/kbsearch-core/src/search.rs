use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::kinds::KindRegistry;
use crate::pipeline;
use crate::query;
use crate::traits::HitSource;
use crate::types::{SearchRequest, SearchResponse};

/// Query facade: parse, search, shape. Holds no per-query state.
pub struct KnowledgeSearch<S> {
    source: S,
    registry: KindRegistry,
}

impl<S: HitSource> KnowledgeSearch<S> {
    /// Resolves the kind registry from the source's schema once.
    pub fn new(source: S) -> Self {
        let registry = KindRegistry::from_field_names(source.field_names());
        Self { source, registry }
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn query(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();
        let parsed = query::parse(&request.query)?;
        debug!(clauses = parsed.len(), "parsed query");

        let hits = self.source.search(&parsed, request.limit)?;
        let hit_count = hits.len();
        let response = pipeline::shape(hits, &self.registry, request.drop_duplicated, request.n_top_results);

        info!(
            query = %request.query,
            hits = hit_count,
            rows = response.total_rows(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query complete"
        );
        Ok(response)
    }
}
