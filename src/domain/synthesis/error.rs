#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("failed to initiate long audio synthesis: {0}")]
    Submission(String),
    #[error("failed to get operation status for {operation}: {message}")]
    StatusFetch { operation: String, message: String },
    #[error("long audio synthesis operation failed for {operation}: {message}")]
    Remote { operation: String, message: String },
    #[error("long audio synthesis cancelled before submission")]
    CancelledBeforeSubmission,
    #[error("polling of operation {operation} was cancelled")]
    Cancelled { operation: String },
}
