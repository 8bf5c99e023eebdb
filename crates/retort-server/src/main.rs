//! Retort server binary
//!
//! Starts the HTTP server for paper ingestion.

use anyhow::Context;
use retort_server::{config::ServerConfig, start_server};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ServerConfig::from_file(config_path)
            .with_context(|| format!("loading {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        return Ok(());
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: retort-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    start_server(config).await.context("server stopped")?;

    Ok(())
}

fn print_help() {
    println!("Retort Server - chemistry paper ingestion");
    println!();
    println!("USAGE:");
    println!("    retort-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    bind_address, bind_port    Listen address");
    println!("    jwt_secret                 Secret for session tokens");
    println!("    token_expiry_secs          Session lifetime (default: 3600)");
    println!("    database_path              SQLite file (default: retort.db)");
    println!("    upload_dir                 Where PDFs are kept (default: uploads/papers)");
    println!("    [llm]                      kind = openai | ollama | mock, model, endpoint");
    println!("    [ingest]                   Upload limit, prompt budget, AI timeout");
    println!();
    println!("Set RUST_LOG to adjust logging (default: info).");
}
