//! Lowering of a [`ParsedQuery`] into one tantivy query per top-level clause.
//!
//! Every unrestricted term is searched in every indexed field. Each token
//! becomes `exact OR fuzzy`, so an exact hit keeps its BM25 score and a
//! typo still matches with the fuzzy query's constant score.

use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::{Field, FieldType, IndexRecordOption};
use tantivy::tokenizer::TextAnalyzer;
use tantivy::{Index, Term};

use kbsearch_core::error::{Error, Result};
use kbsearch_core::query::{Clause, ParsedQuery};

/// Largest edit distance tantivy builds automata for.
pub const MAX_FUZZY_DISTANCE: u8 = 2;

/// Tokens shorter than this are matched exactly only.
const MIN_FUZZY_LEN: usize = 3;

struct SearchField {
	field: Field,
	name: String,
	analyzer: TextAnalyzer,
}

pub struct QueryCompiler {
	fields: Vec<SearchField>,
	default_distance: u8,
}

impl QueryCompiler {
	pub fn new(index: &Index, default_distance: u8) -> Result<Self> {
		let schema = index.schema();
		let mut fields = Vec::new();
		for (field, entry) in schema.fields() {
			if !entry.is_indexed() || !matches!(entry.field_type(), FieldType::Str(_)) {
				continue;
			}
			let analyzer = index
				.tokenizer_for_field(field)
				.map_err(|e| Error::Operation(format!("tokenizer for '{}': {e}", entry.name())))?;
			fields.push(SearchField { field, name: entry.name().to_string(), analyzer });
		}
		Ok(Self { fields, default_distance: default_distance.min(MAX_FUZZY_DISTANCE) })
	}

	/// Clauses that analyze to nothing (e.g. only stop words) are dropped.
	pub fn compile(&self, parsed: &ParsedQuery) -> Vec<Box<dyn Query>> {
		parsed.clauses.iter().filter_map(|clause| self.clause(clause)).collect()
	}

	fn clause(&self, clause: &Clause) -> Option<Box<dyn Query>> {
		let query = match clause {
			Clause::Term { field, text, distance, .. } => {
				let distance = distance.unwrap_or(self.default_distance).min(MAX_FUZZY_DISTANCE);
				union(self.targets(field.as_deref()).filter_map(|target| self.term(target, text, distance)).collect())
			}
			Clause::Phrase { field, words, slop, .. } => {
				let text = words.join(" ");
				union(self.targets(field.as_deref()).filter_map(|target| phrase(target, &text, *slop)).collect())
			}
			Clause::Group { clauses, .. } => union(clauses.iter().filter_map(|c| self.clause(c)).collect()),
		}?;
		Some(boosted(query, clause.boost()))
	}

	/// The named field when the schema has it, otherwise every field.
	fn targets<'a>(&'a self, restriction: Option<&'a str>) -> Box<dyn Iterator<Item = &'a SearchField> + 'a> {
		match restriction {
			Some(name) if self.fields.iter().any(|f| f.name == name) => Box::new(self.fields.iter().filter(move |f| f.name == name)),
			_ => Box::new(self.fields.iter()),
		}
	}

	fn term(&self, target: &SearchField, text: &str, distance: u8) -> Option<Box<dyn Query>> {
		let per_token = analyze(target, text)
			.into_iter()
			.map(|token| {
				let term = Term::from_field_text(target.field, &token);
				let exact: Box<dyn Query> = Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));
				if distance == 0 || token.chars().count() < MIN_FUZZY_LEN {
					return exact;
				}
				let fuzzy: Box<dyn Query> = Box::new(FuzzyTermQuery::new(term, distance, true));
				Box::new(BooleanQuery::new(vec![(Occur::Should, exact), (Occur::Should, fuzzy)])) as Box<dyn Query>
			})
			.collect();
		union(per_token)
	}
}

fn phrase(target: &SearchField, text: &str, slop: u32) -> Option<Box<dyn Query>> {
	let terms: Vec<Term> = analyze(target, text).iter().map(|t| Term::from_field_text(target.field, t)).collect();
	match terms.len() {
		0 => None,
		1 => Some(Box::new(TermQuery::new(terms[0].clone(), IndexRecordOption::WithFreqs))),
		_ => {
			let mut query = PhraseQuery::new(terms);
			query.set_slop(slop);
			Some(Box::new(query))
		}
	}
}

fn analyze(target: &SearchField, text: &str) -> Vec<String> {
	let mut analyzer = target.analyzer.clone();
	let mut stream = analyzer.token_stream(text);
	let mut tokens = Vec::new();
	while stream.advance() {
		tokens.push(stream.token().text.clone());
	}
	tokens
}

fn union(mut queries: Vec<Box<dyn Query>>) -> Option<Box<dyn Query>> {
	match queries.len() {
		0 => None,
		1 => queries.pop(),
		_ => Some(Box::new(BooleanQuery::new(queries.into_iter().map(|q| (Occur::Should, q)).collect()))),
	}
}

fn boosted(query: Box<dyn Query>, boost: f32) -> Box<dyn Query> {
	if (boost - 1.0).abs() < f32::EPSILON { query } else { Box::new(BoostQuery::new(query, boost)) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tantivy_utils::{build_schema, register_tokenizer};
	use kbsearch_core::query::parse;

	fn compiler() -> QueryCompiler {
		let index = Index::create_in_ram(build_schema());
		register_tokenizer(&index);
		QueryCompiler::new(&index, 1).expect("compiler")
	}

	#[test]
	fn every_schema_field_is_searchable() {
		assert_eq!(compiler().fields.len(), crate::tantivy_utils::FIELDS.len());
	}

	#[test]
	fn one_query_per_top_level_clause() {
		let parsed = parse("lexa \"escherichia coli\" (dnaa recA)^2").expect("parse");
		assert_eq!(compiler().compile(&parsed).len(), 3);
	}

	#[test]
	fn stop_word_only_clauses_still_hit_keyword_fields() {
		// "the" is dropped by prose fields but kept by keyword fields.
		let parsed = parse("the").expect("parse");
		assert_eq!(compiler().compile(&parsed).len(), 1);
	}

	#[test]
	fn keyword_analysis_lowercases_whole_tokens() {
		let c = compiler();
		let target = c.fields.iter().find(|f| f.name == "gene_locus_tag").expect("field");
		assert_eq!(analyze(target, "B4043 LexA"), vec!["b4043", "lexa"]);
	}

	#[test]
	fn unknown_field_restriction_falls_back_to_all_fields() {
		let c = compiler();
		assert_eq!(c.targets(Some("operon_name")).count(), c.fields.len());
		assert_eq!(c.targets(Some("gene_name")).count(), 1);
	}
}
