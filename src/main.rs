use log::{error, info};
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use doc_summarizer_rust::extract::extract_document;
use doc_summarizer_rust::{load_summarizer_config, OpenAiCompatProvider, Summarizer};

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file> [max_chunk_tokens]", args[0]);
        eprintln!("  <file>              text or PDF document to summarize");
        eprintln!("  [max_chunk_tokens]  optional per-chunk token budget override");
        process::exit(1);
    }
    let path = PathBuf::from(&args[1]);

    // Load configuration from sumapiconf.txt before touching anything else
    let config = match load_summarizer_config().await {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Failed to load summarizer configuration: {}", e);
            eprintln!("Configuration error: {}\n\nMake sure `sumapiconf.txt` exists and contains all required settings. Check `example_sumapiconf.txt` for reference.", e);
            process::exit(1);
        }
    };

    let max_chunk_tokens = match args.get(2) {
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Invalid max_chunk_tokens value: {}", raw);
                process::exit(1);
            }
        },
        None => config.max_chunk_tokens,
    };

    info!("📂 Reading input document: {}", path.display());
    let document = match extract_document(&path) {
        Ok(document) => document,
        Err(e) => {
            error!("❌ Failed to extract text: {}", e);
            eprintln!("Extraction error: {}", e);
            process::exit(1);
        }
    };

    // Build the provider and pipeline once; this is the only place clients
    // are constructed
    let provider = match OpenAiCompatProvider::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.default_model.clone(),
        config.default_temperature,
        config.timeout,
    ) {
        Ok(provider) => provider,
        Err(e) => {
            error!("❌ Failed to build completion provider: {}", e);
            eprintln!("Provider error: {}", e);
            process::exit(1);
        }
    };

    let summarizer = match Summarizer::new(config, Arc::new(provider)) {
        Ok(summarizer) => summarizer,
        Err(e) => {
            error!("❌ Invalid summarizer configuration: {}", e);
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    match summarizer.summarize(&document, max_chunk_tokens).await {
        Ok(report) => {
            println!("{}", report.render());
        }
        Err(e) => {
            error!("❌ Summarization failed: {}", e);
            eprintln!("Summarization error: {}", e);
            process::exit(1);
        }
    }
}
