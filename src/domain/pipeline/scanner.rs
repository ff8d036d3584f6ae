use super::service::PipelineServiceApi;
use crate::domain::document::{EventFilter, InputNotification, ProcessingDecision};
use crate::infrastructure::repositories::{StorageError, StorageRepository};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Counters for one pass over the input folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub listed: usize,
    pub ignored: usize,
    pub already_processed: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Polling deployment: periodically lists the input folder and processes
/// every document whose audio does not exist yet.
///
/// An input counts as processed once its derived output object exists, so a
/// document whose synthesis failed is picked up again on the next pass.
pub struct StorageScanner {
    pipeline: Arc<dyn PipelineServiceApi>,
    storage: Arc<dyn StorageRepository>,
    filter: EventFilter,
    bucket: String,
    interval: Duration,
    shutdown: CancellationToken,
}

impl StorageScanner {
    pub fn new(
        pipeline: Arc<dyn PipelineServiceApi>,
        storage: Arc<dyn StorageRepository>,
        bucket: String,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pipeline,
            storage,
            filter: EventFilter::new(),
            bucket,
            interval,
            shutdown,
        }
    }

    /// Scan until shutdown. Listing failures are logged and retried next pass.
    pub async fn run(&self) {
        tracing::info!(
            bucket = %self.bucket,
            prefix = self.filter.input_prefix(),
            interval_secs = self.interval.as_secs(),
            "Starting storage scanner"
        );

        loop {
            match self.scan_once().await {
                Ok(report) => tracing::info!(report = ?report, "Scan pass finished"),
                Err(e) => tracing::error!(error = %e, bucket = %self.bucket, "Scan pass failed"),
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Storage scanner stopped");
    }

    /// One pass: process every unprocessed document, one at a time
    pub async fn scan_once(&self) -> Result<ScanReport, StorageError> {
        let inputs = self
            .storage
            .list(&self.bucket, self.filter.input_prefix())
            .await?;
        let existing_outputs: HashSet<String> = self
            .storage
            .list(&self.bucket, self.filter.output_prefix())
            .await?
            .into_iter()
            .map(|object| object.key)
            .collect();

        let mut report = ScanReport {
            listed: inputs.len(),
            ..Default::default()
        };

        for object in inputs {
            if self.shutdown.is_cancelled() {
                break;
            }

            let notification = InputNotification::new(self.bucket.clone(), object.key);
            let output_key = match self.filter.decide(&notification) {
                ProcessingDecision::Accept { output_key } => output_key,
                ProcessingDecision::Reject { .. } => {
                    report.ignored += 1;
                    continue;
                }
            };

            if existing_outputs.contains(&output_key) {
                tracing::debug!(key = %notification.key, output = %output_key, "Already processed");
                report.already_processed += 1;
                continue;
            }

            let key = notification.key.clone();
            match self.pipeline.process(notification).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, kind = ?e.kind(), "Failed to process PDF");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
