use anyhow::Result;
use clap::{Parser, Subcommand};
use findex_core::indexer::Indexer;
use findex_core::query::build_query;
use findex_core::search::search;
use findex_core::snippet::{render_document_link, render_snippet};
use findex_core::store::Store;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One extracted page, as produced by the external HTML-processing step.
#[derive(Debug, Deserialize)]
struct InputDoc {
    path: String,
    title: String,
    body: String,
}

#[derive(Parser)]
#[command(name = "findex")]
#[command(about = "Build and query a synonym-aware full-text page index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index extracted pages from JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Synonym heuristic language ("spanish", "english"; anything else disables expansion)
        #[arg(long, default_value = "english")]
        language: String,
    },
    /// Run a conjunctive query against an existing index
    Query {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Query terms
        terms: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, language } => build(&input, &output, &language),
        Commands::Query { index, terms } => run_query(&index, &terms),
    }
}

fn build(input: &str, output: &str, language: &str) -> Result<()> {
    let out_dir = PathBuf::from(output);
    let store = Store::open(out_dir.join("store"))?;
    if store.load_configuration()?.is_none() {
        store.insert_configuration(language)?;
    }
    let indexer = Indexer::new(&store, out_dir.join("texts"));

    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }

    let mut indexed = 0usize;
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            indexed += index_jsonl(&file, &indexer)?;
        } else {
            indexed += index_json(&file, &indexer)?;
        }
    }

    let stats = store.stats();
    tracing::info!(
        indexed,
        documents = stats.documents,
        words = stats.words,
        instances = stats.instances,
        "index build complete"
    );
    Ok(())
}

fn index_jsonl(file: &Path, indexer: &Indexer) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let mut indexed = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)?;
        indexer.index_document(&doc.path, &doc.title, &doc.body)?;
        indexed += 1;
    }
    Ok(indexed)
}

fn index_json(file: &Path, indexer: &Indexer) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let mut indexed = 0;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)?;
                indexer.index_document(&doc.path, &doc.title, &doc.body)?;
                indexed += 1;
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)?;
            indexer.index_document(&doc.path, &doc.title, &doc.body)?;
            indexed += 1;
        }
        _ => {}
    }
    Ok(indexed)
}

fn run_query(index: &str, terms: &[String]) -> Result<()> {
    let dir = PathBuf::from(index);
    let store = Store::open(dir.join("store"))?;

    let Some(query) = build_query(&store, terms)? else {
        println!("no results");
        return Ok(());
    };
    let results = search(&store, &query)?;
    if results.is_empty() {
        println!("no results");
        return Ok(());
    }

    let highlight = query.highlight_terms();
    let texts_dir = dir.join("texts");
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}",
            rank + 1,
            result.total_instance_count,
            render_document_link(result)
        );
        let snippet = render_snippet(&texts_dir, result, &highlight);
        if !snippet.is_empty() {
            println!("     {snippet}");
        }
    }
    Ok(())
}
