use crate::domain::synthesis::SynthesisError;
use crate::error::AppError;
use crate::infrastructure::repositories::{ExtractionError, StorageError};

/// Kind of failure, independent of which stage wrapped it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Download,
    Extraction,
    Submission,
    StatusFetch,
    RemoteSynthesis,
    Cancellation,
}

/// Single failure reported for one input notification
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to download PDF {key} from bucket {bucket}: {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },
    #[error("failed to extract text from PDF {key} in bucket {bucket}: {source}")]
    Extraction {
        bucket: String,
        key: String,
        #[source]
        source: ExtractionError,
    },
    #[error("failed to synthesize speech for {key} in bucket {bucket}: {source}")]
    Synthesis {
        bucket: String,
        key: String,
        #[source]
        source: SynthesisError,
    },
}

impl ProcessingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::Configuration(_) => ErrorKind::Configuration,
            ProcessingError::Download { .. } => ErrorKind::Download,
            ProcessingError::Extraction { .. } => ErrorKind::Extraction,
            ProcessingError::Synthesis { source, .. } => match source {
                SynthesisError::Submission(_) => ErrorKind::Submission,
                SynthesisError::StatusFetch { .. } => ErrorKind::StatusFetch,
                SynthesisError::Remote { .. } => ErrorKind::RemoteSynthesis,
                SynthesisError::Cancelled { .. } | SynthesisError::CancelledBeforeSubmission => {
                    ErrorKind::Cancellation
                }
            },
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err.kind() {
            ErrorKind::Configuration => AppError::Configuration(err.to_string()),
            ErrorKind::Cancellation => AppError::Unavailable(err.to_string()),
            ErrorKind::Download | ErrorKind::Extraction => AppError::Internal(err.to_string()),
            ErrorKind::Submission | ErrorKind::StatusFetch | ErrorKind::RemoteSynthesis => {
                AppError::ExternalService(err.to_string())
            }
        }
    }
}
