//! Shared plumbing for the `kbsearch` binaries.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

pub type Document = BTreeMap<String, String>;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// `path` itself when it is a file, else every `*.jsonl` below it, sorted.
pub fn list_jsonl_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jsonl"))
        .collect();
    files.sort();
    files
}

/// One flat JSON object per line. Strings are kept, numbers and booleans
/// are stringified, nulls are skipped; blank lines are ignored.
pub fn read_documents(file: &Path) -> anyhow::Result<Vec<Document>> {
    let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let mut documents = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid JSON", file.display(), line_no + 1))?;
        let Value::Object(object) = value else {
            return Err(anyhow!("{}:{}: expected a JSON object", file.display(), line_no + 1));
        };
        let document = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        documents.push(document);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_flat_objects_and_skips_nulls() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("genes.jsonl");
        fs::write(
            &file,
            "{\"gene_protrend_id\":\"PRT.GEN.0000001\",\"gene_name\":\"lexA\",\"gene_ncbi_gene\":948544,\"gene_synonyms\":null}\n\n",
        )
        .unwrap();
        let documents = read_documents(&file).expect("documents");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].get("gene_ncbi_gene").map(String::as_str), Some("948544"));
        assert!(!documents[0].contains_key("gene_synonyms"));
    }

    #[test]
    fn rejects_non_object_lines() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bad.jsonl");
        fs::write(&file, "[1, 2]\n").unwrap();
        assert!(read_documents(&file).is_err());
    }

    #[test]
    fn lists_only_jsonl_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("b.jsonl"), "").unwrap();
        fs::write(tmp.path().join("nested/a.jsonl"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        let files = list_jsonl_files(tmp.path());
        assert_eq!(files, vec![tmp.path().join("b.jsonl"), tmp.path().join("nested/a.jsonl")]);
    }
}
