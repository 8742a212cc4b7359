use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

/// Name the index directory is derived from (`protrendschema_index`).
pub const SCHEMA_NAME: &str = "ProtrendSchema";

pub const KEYWORD_TOKENIZER: &str = "keyword_lowercase";
pub const TEXT_TOKENIZER: &str = "text_with_stopwords";

/// Fields holding free prose; everything else is a whitespace-split keyword list.
const PROSE_FIELDS: [&str; 2] = ["regulator_function", "gene_function"];

/// The flat multi-kind schema, every name prefixed by its owning kind.
pub const FIELDS: [&str; 36] = [
	"organism_protrend_id",
	"organism_name",
	"organism_ncbi_taxonomy",
	"organism_refseq_accession",
	"organism_genbank_accession",
	"organism_ncbi_assembly",
	"organism_assembly_accession",
	"regulator_protrend_id",
	"regulator_locus_tag",
	"regulator_name",
	"regulator_uniprot_accession",
	"regulator_synonyms",
	"regulator_function",
	"regulator_ncbi_gene",
	"regulator_ncbi_protein",
	"regulator_genbank_accession",
	"regulator_refseq_accession",
	"gene_protrend_id",
	"gene_locus_tag",
	"gene_name",
	"gene_uniprot_accession",
	"gene_synonyms",
	"gene_function",
	"gene_ncbi_gene",
	"gene_ncbi_protein",
	"gene_genbank_accession",
	"gene_refseq_accession",
	"effector_protrend_id",
	"effector_name",
	"effector_kegg_compounds",
	"pathway_protrend_id",
	"pathway_name",
	"pathway_kegg_pathways",
	"regulatory_family_protrend_id",
	"regulatory_family_name",
	"regulatory_family_rfam",
];

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	for name in FIELDS {
		let tokenizer = if PROSE_FIELDS.contains(&name) { TEXT_TOKENIZER } else { KEYWORD_TOKENIZER };
		let indexing = TextFieldIndexing::default().set_tokenizer(tokenizer).set_index_option(IndexRecordOption::WithFreqsAndPositions);
		let options = TextOptions::default().set_indexing_options(indexing).set_stored();
		schema_builder.add_text_field(name, options);
	}
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let prose = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TEXT_TOKENIZER, prose);

	let keyword = TextAnalyzer::builder(WhitespaceTokenizer::default()).filter(LowerCaser).build();
	index.tokenizers().register(KEYWORD_TOKENIZER, keyword);
}
