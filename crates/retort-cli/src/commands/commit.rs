//! Commit command implementation.

use super::CliIngestor;
use crate::cli::CommitArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use retort_ingest::{CommitRequest, IngestContext};

/// Execute the commit command.
///
/// The review file is the JSON written by `parse`; fields other than the
/// candidates and the stored document path are ignored.
pub async fn execute_commit(
    args: CommitArgs,
    default_contributor: Option<String>,
    ingestor: &CliIngestor,
    formatter: &Formatter,
) -> Result<()> {
    let contents = tokio::fs::read_to_string(&args.file).await?;
    let request: CommitRequest = serde_json::from_str(&contents).map_err(|e| {
        CliError::InvalidInput(format!("{} is not a review file: {}", args.file.display(), e))
    })?;

    let ctx = IngestContext {
        contributor: args.contributor.or(default_contributor),
    };
    let outcome = ingestor.commit(&ctx, request)?;

    println!("{}", formatter.commit_outcome(&outcome)?);
    Ok(())
}
