//! PDF text extraction

use crate::error::IngestError;
use lopdf::Document;
use tracing::{debug, warn};

/// How far into the buffer the `%PDF-` marker may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Plain text pulled from a PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts in page order, separated by a blank line
    pub text: String,
    /// Number of pages in the document
    pub page_count: usize,
}

/// Extract the text layer of a PDF held in memory
///
/// Encrypted and non-PDF input is rejected. A page whose content cannot be
/// decoded contributes no text; the document as a whole still counts as
/// readable.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText, IngestError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if !window.windows(5).any(|w| w == b"%PDF-") {
        return Err(IngestError::Parse("missing %PDF header".to_string()));
    }

    let document = Document::load_mem(bytes)
        .map_err(|e| IngestError::Parse(format!("failed to load document: {}", e)))?;

    if document.is_encrypted() {
        return Err(IngestError::Parse("document is encrypted".to_string()));
    }

    let pages = document.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());

    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => page_texts.push(text.trim().to_string()),
            Err(e) => {
                warn!("Skipping unreadable text on page {}: {}", page_number, e);
                page_texts.push(String::new());
            }
        }
    }

    let text = page_texts
        .iter()
        .filter(|t| !t.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n");

    debug!("Extracted {} chars from {} pages", text.chars().count(), pages.len());

    Ok(ExtractedText {
        text,
        page_count: pages.len(),
    })
}
