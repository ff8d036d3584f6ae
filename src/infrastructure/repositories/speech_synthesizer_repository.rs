use crate::domain::synthesis::{OperationHandle, OperationOutcome, SynthesisRequest};
use async_trait::async_trait;

/// Long-running speech synthesis backend.
/// Abstracts the underlying provider (Google Cloud Text-to-Speech, AWS Polly)
///
/// The backend writes the audio to the requested output location itself;
/// callers never see the audio bytes.
#[async_trait]
pub trait SpeechSynthesizerRepository: Send + Sync {
    /// Start a synthesis job and return a handle that can be polled
    async fn submit(&self, request: &SynthesisRequest) -> Result<OperationHandle, String>;

    /// Fetch the current state of a previously submitted job
    ///
    /// # Errors
    /// Returns error only when the status itself could not be fetched; a job
    /// the backend reports as failed is `Ok` with `error` set.
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationOutcome, String>;
}
