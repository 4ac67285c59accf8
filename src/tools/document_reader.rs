use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{require_input, Tool, ToolError};
use crate::utils::{extract_pages, PdfExtractError};

pub const DOCUMENT_READER: &str = "document_reader";

/// Source of per-page document text
pub trait TextExtractor: Send + Sync + std::fmt::Debug {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, PdfExtractError>;
}

/// Extracts PDF pages from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, PdfExtractError> {
        extract_pages(path)
    }
}

/// Reads a local PDF and returns its text, truncated to a character budget
#[derive(Debug, Clone)]
pub struct DocumentReaderTool {
    extractor: Arc<dyn TextExtractor>,
    max_chars: usize,
}

impl DocumentReaderTool {
    pub fn new(max_chars: usize) -> Self {
        Self::with_extractor(Arc::new(PdfTextExtractor), max_chars)
    }

    pub fn with_extractor(extractor: Arc<dyn TextExtractor>, max_chars: usize) -> Self {
        Self {
            extractor,
            max_chars,
        }
    }
}

/// Keep the first `max_chars` characters, appending a notice when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!(
            "{}\n\n[Truncated: document exceeds {} characters]",
            &text[..cut],
            max_chars
        ),
        None => text.to_string(),
    }
}

fn clean_path(input: &str) -> PathBuf {
    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
    PathBuf::from(trimmed.trim())
}

#[async_trait]
impl Tool for DocumentReaderTool {
    fn name(&self) -> &str {
        DOCUMENT_READER
    }

    fn description(&self) -> &str {
        "Read the text of a local PDF document. Input: the file path."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let path = clean_path(&require_input(input, "a file path")?);
        tracing::debug!("Reading document {}", path.display());

        let extractor = self.extractor.clone();
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&path))
            .await
            .map_err(|e| ToolError::DocumentUnreadable(e.to_string()))?
            .map_err(|e| ToolError::DocumentUnreadable(e.to_string()))?;

        let text: String = pages.concat();
        if text.trim().is_empty() {
            return Err(ToolError::DocumentUnreadable(
                "no readable text in document".to_string(),
            ));
        }

        Ok(truncate_text(&text, self.max_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedPages(Vec<String>);

    impl TextExtractor for FixedPages {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, PdfExtractError> {
            Ok(self.0.clone())
        }
    }

    fn reader(pages: Vec<String>) -> DocumentReaderTool {
        DocumentReaderTool::with_extractor(Arc::new(FixedPages(pages)), 4000)
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "é".repeat(10);
        let cut = truncate_text(&text, 4);
        assert!(cut.starts_with("éééé\n\n[Truncated"));
        assert_eq!(truncate_text("short", 4000), "short");
        assert_eq!(truncate_text("abcd", 4), "abcd");
    }

    #[tokio::test]
    async fn test_long_document_truncated_to_budget() {
        let tool = reader(vec!["a".repeat(3000), "b".repeat(3000)]);
        let text = tool.invoke("paper.pdf").await.unwrap();

        let head: String = text.chars().take(4000).collect();
        assert_eq!(head, format!("{}{}", "a".repeat(3000), "b".repeat(1000)));
        assert_eq!(
            &text[4000..],
            "\n\n[Truncated: document exceeds 4000 characters]"
        );
    }

    #[tokio::test]
    async fn test_short_document_returned_whole() {
        let tool = reader(vec!["Page one. ".to_string(), "Page two.".to_string()]);
        assert_eq!(tool.invoke("paper.pdf").await.unwrap(), "Page one. Page two.");
    }

    #[tokio::test]
    async fn test_empty_text_is_unreadable() {
        let tool = reader(vec!["".to_string(), "  \n".to_string()]);
        assert!(matches!(
            tool.invoke("scan.pdf").await,
            Err(ToolError::DocumentUnreadable(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let tool = DocumentReaderTool::new(4000);
        let err = tool.invoke("\"/nonexistent/paper.pdf\"").await.unwrap_err();
        assert!(matches!(err, ToolError::DocumentUnreadable(_)));
        assert!(err.to_string().starts_with("Failed to read PDF:"));
    }

    #[test]
    fn test_clean_path_strips_quotes() {
        assert_eq!(clean_path("  '/tmp/a b.pdf' "), PathBuf::from("/tmp/a b.pdf"));
    }
}
