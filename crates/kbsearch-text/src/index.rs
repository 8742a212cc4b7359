use std::collections::BTreeMap;
use std::path::Path;

use tantivy::schema::Field;
use tantivy::{Index, IndexWriter, TantivyDocument};
use tracing::info;

use kbsearch_core::error::{Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer};

/// Bulk loader for a fresh index with the fixed multi-kind schema.
///
/// Documents are flat `field -> value` maps using the `<kind>_<attribute>`
/// names; a document may carry fields of several kinds.
pub struct EntityIndexWriter {
	index: Index,
	fields: BTreeMap<String, Field>,
}

impl EntityIndexWriter {
	/// Create the index at `index_dir`, replacing whatever was there.
	pub fn create(index_dir: &Path) -> Result<Self> {
		let schema = build_schema();
		if index_dir.exists() { std::fs::remove_dir_all(index_dir).map_err(io_error)?; }
		std::fs::create_dir_all(index_dir).map_err(io_error)?;
		let index = Index::create_in_dir(index_dir, schema.clone()).map_err(operation)?;
		register_tokenizer(&index);
		let fields = schema.fields().map(|(field, entry)| (entry.name().to_string(), field)).collect();
		Ok(Self { index, fields })
	}

	/// Write and commit all documents. Unknown field names abort the batch.
	pub fn add_documents<'a, I>(&self, documents: I) -> Result<usize>
	where
		I: IntoIterator<Item = &'a BTreeMap<String, String>>,
	{
		let mut index_writer: IndexWriter = self.index.writer(50_000_000).map_err(operation)?;
		let mut count = 0;
		for document in documents {
			let mut doc = TantivyDocument::default();
			for (name, value) in document {
				let field = self.fields.get(name).ok_or_else(|| Error::Operation(format!("unknown field '{name}'")))?;
				doc.add_text(*field, value);
			}
			index_writer.add_document(doc).map_err(operation)?;
			count += 1;
		}
		index_writer.commit().map_err(operation)?;
		info!(documents = count, "index committed");
		Ok(count)
	}
}

fn operation(e: tantivy::TantivyError) -> Error {
	Error::Operation(e.to_string())
}

fn io_error(e: std::io::Error) -> Error {
	Error::Operation(e.to_string())
}
