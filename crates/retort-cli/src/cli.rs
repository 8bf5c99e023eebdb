//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Retort CLI - Turn chemistry papers into reviewed compound records.
#[derive(Debug, Parser)]
#[command(name = "retort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log pipeline activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RETORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract candidates from a PDF into a review file
    Parse(ParseArgs),

    /// Save a reviewed file
    Commit(CommitArgs),

    /// List saved papers, newest first
    Papers(PapersArgs),

    /// Show one paper with its compounds
    Show(ShowArgs),
}

/// Arguments for the parse command.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// PDF to parse
    pub file: PathBuf,

    /// Where to write the review file (default: <file stem>.review.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the commit command.
#[derive(Debug, Parser)]
pub struct CommitArgs {
    /// Review file written by `parse`, edited as needed
    pub file: PathBuf,

    /// Contributor recorded on the paper and its routes
    #[arg(long, env = "RETORT_CONTRIBUTOR")]
    pub contributor: Option<String>,
}

/// Arguments for the papers command.
#[derive(Debug, Parser)]
pub struct PapersArgs {
    /// Maximum number of papers
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Only papers from this contributor
    #[arg(long)]
    pub contributor: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Paper id
    pub id: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
