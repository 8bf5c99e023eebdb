//! Parse command implementation.

use super::CliIngestor;
use crate::cli::ParseArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use retort_ingest::IngestContext;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute the parse command.
pub async fn execute_parse(
    args: ParseArgs,
    ingestor: &CliIngestor,
    formatter: &Formatter,
) -> Result<()> {
    check_extension(&args.file)?;

    let filename = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    let bytes = tokio::fs::read(&args.file).await?;

    let parsed = ingestor
        .parse(&IngestContext::default(), &filename, bytes)
        .await?;

    let review_path = args.output.unwrap_or_else(|| review_path_for(&args.file));
    let review = serde_json::to_string_pretty(&parsed)?;
    tokio::fs::write(&review_path, review).await?;
    info!("Wrote review file {}", review_path.display());

    println!("{}", formatter.parsed_document(&parsed, &review_path)?);
    Ok(())
}

/// Only `.pdf` files are accepted.
fn check_extension(path: &Path) -> Result<()> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if !is_pdf {
        return Err(CliError::InvalidInput(format!(
            "'{}' is not a .pdf file",
            path.display()
        )));
    }
    Ok(())
}

/// `dir/paper.pdf` -> `dir/paper.review.json`
fn review_path_for(pdf: &Path) -> PathBuf {
    pdf.with_extension("review.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("paper.pdf")).is_ok());
        assert!(check_extension(Path::new("dir/Paper.PDF")).is_ok());
        assert!(matches!(
            check_extension(Path::new("paper.docx")),
            Err(CliError::InvalidInput(_))
        ));
        assert!(check_extension(Path::new("paper")).is_err());
    }

    #[test]
    fn test_review_path_for() {
        assert_eq!(
            review_path_for(Path::new("papers/quinazolinones.pdf")),
            PathBuf::from("papers/quinazolinones.review.json")
        );
    }
}
