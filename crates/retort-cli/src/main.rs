//! Retort CLI - parse, review and commit chemistry papers from the shell.

use clap::Parser;
use retort_cli::commands;
use retort_cli::{Cli, CliConfig, Command, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> retort_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);
    let ingestor = commands::build_ingestor(&config)?;

    match cli.command {
        Command::Parse(args) => commands::execute_parse(args, &ingestor, &formatter).await?,
        Command::Commit(args) => {
            commands::execute_commit(args, config.contributor.clone(), &ingestor, &formatter)
                .await?
        }
        Command::Papers(args) => commands::execute_papers(args, &ingestor, &formatter).await?,
        Command::Show(args) => commands::execute_show(args, &ingestor, &formatter).await?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays parseable with `--format json`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
