//! PDF text extraction utilities.
//!
//! Pages are extracted one at a time with lopdf. Documents lopdf cannot
//! load are handed to pdf-extract as a whole before giving up.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during PDF extraction
#[derive(Debug, Error)]
pub enum PdfExtractError {
    #[error("File not found or not a valid PDF: {0}")]
    InvalidFile(String),

    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),
}

/// Extract the text of every page, in page order.
///
/// Pages whose content cannot be decoded come back as empty strings, so the
/// result always has one entry per page.
pub fn extract_pages(path: &Path) -> Result<Vec<String>, PdfExtractError> {
    if !path.exists() {
        return Err(PdfExtractError::InvalidFile(format!(
            "File not found: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(PdfExtractError::InvalidFile(format!(
            "Not a file: {}",
            path.display()
        )));
    }

    match lopdf::Document::load(path) {
        Ok(document) => {
            let pages = document.get_pages();
            let mut texts = Vec::with_capacity(pages.len());

            for page_number in pages.keys() {
                match document.extract_text(&[*page_number]) {
                    Ok(text) => texts.push(text),
                    Err(e) => {
                        tracing::debug!(
                            "Could not extract page {} of {}: {}",
                            page_number,
                            path.display(),
                            e
                        );
                        texts.push(String::new());
                    }
                }
            }

            Ok(texts)
        }
        Err(load_error) => {
            tracing::debug!(
                "lopdf could not load {} ({}), trying pdf-extract",
                path.display(),
                load_error
            );
            pdf_extract::extract_text(path)
                .map(|text| vec![text])
                .map_err(|e| PdfExtractError::ExtractionFailed(e.to_string()))
        }
    }
}
