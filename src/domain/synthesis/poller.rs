use super::error::SynthesisError;
use super::model::{
    AudioSettings, BackendTarget, OperationHandle, OutputLocation, SynthesisMetadata,
    SynthesisRequest, VoiceConfig,
};
use crate::infrastructure::repositories::SpeechSynthesizerRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Suspension between status polls. Swapped out in tests so many poll
/// cycles run without real elapsed time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// States of one long-audio synthesis job as seen from this side.
#[derive(Debug)]
enum PollerState {
    Submitting(SynthesisRequest),
    Polling(OperationHandle),
    Waiting(OperationHandle),
    Succeeded(OperationHandle),
    Failed(SynthesisError),
}

/// Submits a synthesis request and polls the resulting operation until the
/// backend reports a terminal state or the caller cancels.
///
/// There is no deadline: a job the backend never finishes keeps this loop
/// alive until the cancellation token fires.
pub struct SynthesisOperationPoller {
    synthesizer: Arc<dyn SpeechSynthesizerRepository>,
    sleeper: Arc<dyn Sleeper>,
    poll_interval: Duration,
}

impl SynthesisOperationPoller {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizerRepository>,
        sleeper: Arc<dyn Sleeper>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            synthesizer,
            sleeper,
            poll_interval,
        }
    }

    pub async fn run(
        &self,
        target: BackendTarget,
        text: String,
        output: OutputLocation,
        voice: VoiceConfig,
        cancel: &CancellationToken,
    ) -> Result<(), SynthesisError> {
        let request = SynthesisRequest {
            target,
            text,
            output,
            voice,
            audio: AudioSettings::default(),
        };

        let mut state = PollerState::Submitting(request);
        loop {
            state = match state {
                PollerState::Submitting(request) => self.submit(request, cancel).await,
                PollerState::Polling(handle) => self.poll(handle).await,
                PollerState::Waiting(handle) => self.wait(handle, cancel).await,
                PollerState::Succeeded(handle) => {
                    tracing::info!(
                        operation = %handle,
                        output = %handle.output,
                        "Long audio synthesis operation completed successfully"
                    );
                    return Ok(());
                }
                PollerState::Failed(err) => return Err(err),
            };
        }
    }

    async fn submit(&self, request: SynthesisRequest, cancel: &CancellationToken) -> PollerState {
        // A job submitted now would run remotely with nobody waiting for it
        if cancel.is_cancelled() {
            tracing::warn!(output = %request.output, "Cancelled before submitting synthesis");
            return PollerState::Failed(SynthesisError::CancelledBeforeSubmission);
        }

        tracing::info!(
            voice = %request.voice.name,
            language = %request.voice.language_code,
            encoding = request.audio.encoding.as_str(),
            sample_rate_hertz = request.audio.sample_rate_hertz,
            text_length = request.text.len(),
            output = %request.output,
            "Initiating long audio synthesis"
        );

        match self.synthesizer.submit(&request).await {
            Ok(handle) => {
                tracing::info!(
                    operation = %handle,
                    "Long audio synthesis operation started, waiting for completion"
                );
                PollerState::Polling(handle)
            }
            Err(e) => PollerState::Failed(SynthesisError::Submission(e)),
        }
    }

    async fn poll(&self, handle: OperationHandle) -> PollerState {
        let outcome = match self.synthesizer.poll(&handle).await {
            Ok(outcome) => outcome,
            Err(message) => {
                return PollerState::Failed(SynthesisError::StatusFetch {
                    operation: handle.name,
                    message,
                })
            }
        };

        if !outcome.done {
            return PollerState::Waiting(handle);
        }

        if let Some(message) = outcome.error {
            return PollerState::Failed(SynthesisError::Remote {
                operation: handle.name,
                message,
            });
        }

        if let Some(raw) = outcome.metadata {
            match serde_json::from_value::<SynthesisMetadata>(raw) {
                Ok(metadata) => tracing::info!(
                    operation = %handle,
                    metadata = ?metadata,
                    "Long audio synthesis complete"
                ),
                Err(e) => tracing::warn!(
                    operation = %handle,
                    error = %e,
                    "Could not decode operation metadata"
                ),
            }
        }

        PollerState::Succeeded(handle)
    }

    async fn wait(&self, handle: OperationHandle, cancel: &CancellationToken) -> PollerState {
        tracing::info!(
            operation = %handle,
            retry_in_secs = self.poll_interval.as_secs(),
            "Operation not yet complete"
        );

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::warn!(operation = %handle, "Polling cancelled");
                PollerState::Failed(SynthesisError::Cancelled { operation: handle.name })
            }
            _ = self.sleeper.sleep(self.poll_interval) => PollerState::Polling(handle),
        }
    }
}
