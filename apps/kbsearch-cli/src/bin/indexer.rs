use std::{env, path::PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use kbsearch_cli::{list_jsonl_files, read_documents};
use kbsearch_core::config::Config;
use kbsearch_text::EntityIndexWriter;

fn main() -> anyhow::Result<()> {
    kbsearch_cli::init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.search_settings()?;

    let Some(source) = env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: kbsearch-indexer <documents.jsonl | dir-of-jsonl>");
        std::process::exit(1);
    };
    let files = list_jsonl_files(&source);
    if files.is_empty() {
        eprintln!("No .jsonl files found under {}.", source.display());
        std::process::exit(1);
    }

    let index_dir = settings.index_dir();
    println!("Entity index loader\n===================");
    println!("Source   : {}", source.display());
    println!("Index dir: {}", index_dir.display());

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")?);
    let mut documents = Vec::new();
    for file in &files {
        progress.set_message(file.display().to_string());
        documents.extend(read_documents(file)?);
        progress.inc(1);
    }
    progress.finish_with_message("read");

    let writer = EntityIndexWriter::create(&index_dir)?;
    let count = writer.add_documents(&documents)?;
    println!("Done. Indexed {} documents from {} files.", count, files.len());
    Ok(())
}
