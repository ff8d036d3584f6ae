use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to open PDF file {path} for extraction: {message}")]
    Open { path: String, message: String },
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Pulls the readable text out of a local document.
///
/// Implementations skip pages they cannot read and return whatever text the
/// remaining pages produced; they never fail only because some pages are unreadable.
#[async_trait]
pub trait TextExtractorRepository: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}
