use std::env;

use kbsearch_core::config::Config;
use kbsearch_core::{KnowledgeSearch, SearchRequest};
use kbsearch_text::IndexSearcher;

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} [-n <top_per_kind>] [-l <raw_hit_limit>] [--keep-duplicates] <query...>", prog);
    eprintln!("Examples:");
    eprintln!("  {} lexa escherichi coli", prog);
    eprintln!("  {} -n 5 '\"bacillus subtilis\" gene_name:spo0a'", prog);
    std::process::exit(1);
}

fn number(args: &[String], i: usize, flag: &str) -> usize {
    args.get(i + 1).and_then(|v| v.parse().ok()).unwrap_or_else(|| {
        eprintln!("Error: {} requires a number", flag);
        std::process::exit(1);
    })
}

fn main() -> anyhow::Result<()> {
    kbsearch_cli::init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.search_settings()?;

    let args: Vec<String> = env::args().collect();
    let prog = args.first().cloned().unwrap_or_else(|| "kbsearch".to_string());
    let mut request = SearchRequest::new(String::new()).top(settings.n_top_results);
    let mut words = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" => { request.n_top_results = number(&args, i, "-n"); i += 2; }
            "-l" => { request.limit = Some(number(&args, i, "-l")); i += 2; }
            "--keep-duplicates" => { request.drop_duplicated = false; i += 1; }
            "-h" | "--help" => usage(&prog),
            _ => { words.push(args[i].clone()); i += 1; }
        }
    }
    if words.is_empty() { usage(&prog); }
    request.query = words.join(" ");

    tracing::debug!(index = %settings.index_dir().display(), "opening search");
    let search = KnowledgeSearch::new(IndexSearcher::from_settings(&settings));
    let response = search.query(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
