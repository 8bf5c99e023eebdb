//! Papers command implementation.

use super::{with_store, CliIngestor};
use crate::cli::PapersArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use retort_domain::{EntityStore, PaperQuery};
use retort_ingest::views::PaperView;

/// Execute the papers command.
pub async fn execute_papers(
    args: PapersArgs,
    ingestor: &CliIngestor,
    formatter: &Formatter,
) -> Result<()> {
    if args.limit == 0 {
        return Err(CliError::InvalidInput("--limit must be at least 1".to_string()));
    }

    let query = PaperQuery {
        contributor: args.contributor,
        offset: 0,
        limit: Some(args.limit),
    };
    let papers = with_store(ingestor, |store| store.list_papers(&query))?;
    let views: Vec<PaperView> = papers.iter().map(PaperView::from).collect();

    println!("{}", formatter.papers(&views)?);
    Ok(())
}
