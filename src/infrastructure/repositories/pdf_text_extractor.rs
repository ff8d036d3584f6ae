use super::text_extractor_repository::{ExtractionError, TextExtractorRepository};
use async_trait::async_trait;
use lopdf::Document;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// `lopdf` based text extraction. No OCR: image-only pages yield no text.
#[derive(Debug, Default, Clone)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_blocking(path: PathBuf) -> Result<String, ExtractionError> {
        let document = Document::load(&path).map_err(|e| ExtractionError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let pages = document.get_pages();
        if pages.is_empty() {
            return Ok(String::new());
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) => {
                    let normalized = normalize_whitespace(&text);
                    if !normalized.is_empty() {
                        page_texts.push(normalized);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        page = page_number,
                        path = %path.display(),
                        error = %e,
                        "Failed to extract text from page, skipping"
                    );
                }
            }
        }

        Ok(page_texts.join("\n"))
    }
}

/// Collapse runs of whitespace (PDF text operators emit many line breaks)
fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[async_trait]
impl TextExtractorRepository for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || Self::extract_blocking(owned))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;

        tracing::info!(
            path = %path.display(),
            text_length = text.len(),
            "Text extracted from PDF"
        );
        Ok(text)
    }
}
