use super::error::ProcessingError;
use crate::domain::document::{EventFilter, InputNotification, ProcessingDecision, RejectReason};
use crate::domain::synthesis::{OutputLocation, SynthesisOperationPoller};
use crate::infrastructure::config::PipelineSettings;
use crate::infrastructure::repositories::{StorageRepository, TextExtractorRepository};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How a successful `process` call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Notification did not denote a new input document
    Skipped(RejectReason),
    /// Document had no extractable text
    NoText,
    Synthesized { output: OutputLocation },
}

pub struct PipelineService {
    filter: EventFilter,
    settings: PipelineSettings,
    storage: Arc<dyn StorageRepository>,
    extractor: Arc<dyn TextExtractorRepository>,
    poller: SynthesisOperationPoller,
    shutdown: CancellationToken,
}

impl PipelineService {
    pub fn new(
        settings: PipelineSettings,
        storage: Arc<dyn StorageRepository>,
        extractor: Arc<dyn TextExtractorRepository>,
        poller: SynthesisOperationPoller,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            filter: EventFilter::new(),
            settings,
            storage,
            extractor,
            poller,
            shutdown,
        }
    }
}

#[async_trait]
pub trait PipelineServiceApi: Send + Sync {
    /// Turn one stored PDF into speech
    ///
    /// This operation:
    /// - Skips notifications that are not new input documents
    /// - Downloads the PDF to a temporary file, removed on every exit path
    /// - Extracts its text, skipping documents without any
    /// - Runs long audio synthesis into the output folder and waits for it
    ///
    /// No stage is retried; redelivery is up to the trigger.
    async fn process(
        &self,
        notification: InputNotification,
    ) -> Result<ProcessingOutcome, ProcessingError>;
}

#[async_trait]
impl PipelineServiceApi for PipelineService {
    async fn process(
        &self,
        notification: InputNotification,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        tracing::info!(
            bucket = %notification.bucket,
            key = %notification.key,
            content_type = notification.content_type.as_deref().unwrap_or("unknown"),
            "Received storage notification"
        );

        // 1. Filter
        let output_key = match self.filter.decide(&notification) {
            ProcessingDecision::Accept { output_key } => output_key,
            ProcessingDecision::Reject { reason } => {
                tracing::info!(key = %notification.key, reason = %reason, "Skipping object");
                return Ok(ProcessingOutcome::Skipped(reason));
            }
        };
        let output = OutputLocation::new(notification.bucket.clone(), output_key);

        // 2. Resolve configuration
        let resolved = self
            .settings
            .resolve()
            .map_err(ProcessingError::Configuration)?;

        tracing::info!(
            key = %notification.key,
            output = %output,
            project = %resolved.target.project,
            location = %resolved.target.location,
            voice = %resolved.voice.name,
            "Processing PDF"
        );

        // 3. Download; the temp file is released when `local_file` drops
        let local_file = self
            .storage
            .download(&notification.bucket, &notification.key)
            .await
            .map_err(|source| ProcessingError::Download {
                bucket: notification.bucket.clone(),
                key: notification.key.clone(),
                source,
            })?;

        // 4. Extract
        let text = self
            .extractor
            .extract(local_file.path())
            .await
            .map_err(|source| ProcessingError::Extraction {
                bucket: notification.bucket.clone(),
                key: notification.key.clone(),
                source,
            })?;

        if text.trim().is_empty() {
            tracing::info!(key = %notification.key, "No text extracted from PDF, skipping synthesis");
            return Ok(ProcessingOutcome::NoText);
        }
        tracing::info!(text_length = text.len(), "Text extracted from PDF");

        // 5. Synthesize and wait
        self.poller
            .run(
                resolved.target,
                text,
                output.clone(),
                resolved.voice,
                &self.shutdown,
            )
            .await
            .map_err(|source| ProcessingError::Synthesis {
                bucket: notification.bucket.clone(),
                key: notification.key.clone(),
                source,
            })?;

        tracing::info!(key = %notification.key, output = %output, "Successfully processed PDF");
        Ok(ProcessingOutcome::Synthesized { output })
    }
}
