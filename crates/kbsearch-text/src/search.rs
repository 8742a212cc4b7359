use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tantivy::schema::Value;
use tantivy::{DocAddress, Index, IndexReader, ReloadPolicy, TantivyDocument};
use tracing::debug;

use kbsearch_core::config::SearchSettings;
use kbsearch_core::error::{Error, Result};
use kbsearch_core::query::ParsedQuery;
use kbsearch_core::scoring::{round_score, Coordination, ScoringPolicy};
use kbsearch_core::traits::HitSource;
use kbsearch_core::Hit;

use crate::collector::ScoredDocs;
use crate::compile::QueryCompiler;
use crate::tantivy_utils::{register_tokenizer, FIELDS};

/// Executes parsed queries against the on-disk index.
///
/// Holds configuration only: each search opens the index, reads it through
/// a manual-reload reader and drops every handle before returning.
pub struct IndexSearcher {
	index_dir: PathBuf,
	policy: Box<dyn ScoringPolicy>,
	fuzzy_distance: u8,
	timeout: Option<Duration>,
}

impl IndexSearcher {
	pub fn new(index_dir: impl Into<PathBuf>) -> Self {
		Self { index_dir: index_dir.into(), policy: Box::new(Coordination::default()), fuzzy_distance: 1, timeout: None }
	}

	pub fn from_settings(settings: &SearchSettings) -> Self {
		Self {
			index_dir: settings.index_dir(),
			policy: Box::new(Coordination::new(settings.coordination)),
			fuzzy_distance: settings.fuzzy_distance,
			timeout: settings.timeout(),
		}
	}

	pub fn with_policy(mut self, policy: impl ScoringPolicy + 'static) -> Self {
		self.policy = Box::new(policy);
		self
	}

	pub fn with_fuzzy_distance(mut self, distance: u8) -> Self {
		self.fuzzy_distance = distance;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn index_dir(&self) -> &Path {
		&self.index_dir
	}

	fn open(&self) -> Result<(Index, IndexReader)> {
		if !self.index_dir.is_dir() {
			return Err(Error::unavailable(&self.index_dir, "directory does not exist"));
		}
		let index = Index::open_in_dir(&self.index_dir).map_err(|e| Error::unavailable(&self.index_dir, e))?;
		register_tokenizer(&index);
		let reader = index
			.reader_builder()
			.reload_policy(ReloadPolicy::Manual)
			.try_into()
			.map_err(|e| Error::unavailable(&self.index_dir, e))?;
		Ok((index, reader))
	}
}

impl HitSource for IndexSearcher {
	fn field_names(&self) -> Vec<String> {
		FIELDS.iter().map(|f| f.to_string()).collect()
	}

	fn search(&self, parsed: &ParsedQuery, limit: Option<usize>) -> Result<Vec<Hit>> {
		let deadline = Deadline::start(self.timeout);
		let (index, reader) = self.open()?;
		if parsed.is_empty() || limit == Some(0) {
			return Ok(Vec::new());
		}
		let searcher = reader.searcher();
		let clauses = QueryCompiler::new(&index, self.fuzzy_distance)?.compile(parsed);
		if clauses.is_empty() {
			return Ok(Vec::new());
		}

		// Every clause collects all of its matches so the policy sees which
		// clauses each document matched.
		let mut clause_scores: HashMap<(u32, u32), Vec<Option<f32>>> = HashMap::new();
		for (i, clause) in clauses.iter().enumerate() {
			let matches = searcher.search(clause.as_ref(), &ScoredDocs).map_err(operation)?;
			debug!(clause = i, matches = matches.len(), "clause executed");
			for (score, addr) in matches {
				clause_scores.entry(addr).or_insert_with(|| vec![None; clauses.len()])[i] = Some(score);
			}
			deadline.check()?;
		}

		let mut ranked: Vec<(f32, (u32, u32))> =
			clause_scores.into_iter().map(|(addr, scores)| (self.policy.combine(&scores), addr)).collect();
		ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
		if let Some(limit) = limit { ranked.truncate(limit); }

		let schema = index.schema();
		let stored: Vec<_> = schema.fields().filter(|(_, entry)| entry.is_stored()).map(|(field, entry)| (field, entry.name().to_string())).collect();
		let mut hits = Vec::with_capacity(ranked.len());
		for (score, (segment_ord, doc_id)) in ranked {
			let doc: TantivyDocument = searcher.doc(DocAddress::new(segment_ord, doc_id)).map_err(operation)?;
			let mut hit = Hit::new(round_score(score));
			for (field, name) in &stored {
				if let Some(value) = doc.get_first(*field).and_then(|v| v.as_str()) {
					hit.fields.insert(name.clone(), value.to_string());
				}
			}
			hits.push(hit);
			deadline.check()?;
		}
		debug!(hits = hits.len(), "hits materialised");
		Ok(hits)
	}
}

struct Deadline {
	started: Instant,
	budget: Option<Duration>,
}

impl Deadline {
	fn start(budget: Option<Duration>) -> Self {
		Self { started: Instant::now(), budget }
	}

	fn check(&self) -> Result<()> {
		match self.budget {
			Some(budget) if self.started.elapsed() >= budget => Err(Error::QueryTimeout(budget)),
			_ => Ok(()),
		}
	}
}

fn operation(e: tantivy::TantivyError) -> Error {
	Error::Operation(e.to_string())
}
