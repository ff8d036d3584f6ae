pub mod error;
pub mod scanner;
pub mod service;

pub use error::{ErrorKind, ProcessingError};
pub use scanner::{ScanReport, StorageScanner};
pub use service::{PipelineService, PipelineServiceApi, ProcessingOutcome};
