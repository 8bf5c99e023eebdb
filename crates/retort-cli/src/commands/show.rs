//! Show command implementation.

use super::{with_store, CliIngestor};
use crate::cli::ShowArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use retort_domain::{EntityStore, PaperId};
use retort_ingest::views::PaperDetail;

/// Execute the show command.
pub async fn execute_show(
    args: ShowArgs,
    ingestor: &CliIngestor,
    formatter: &Formatter,
) -> Result<()> {
    let id: PaperId = args
        .id
        .parse()
        .map_err(|_| CliError::InvalidInput(format!("'{}' is not a valid paper id", args.id)))?;

    let detail = with_store(ingestor, |store| {
        let Some(paper) = store.get_paper(id)? else {
            return Ok(None);
        };
        let compounds = store.get_compounds(&paper.related_compounds)?;
        Ok(Some(PaperDetail::new(&paper, &compounds)))
    })?
    .ok_or_else(|| CliError::NotFound(format!("paper {}", id)))?;

    println!("{}", formatter.paper_detail(&detail)?);
    Ok(())
}
