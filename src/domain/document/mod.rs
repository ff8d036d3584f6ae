pub mod filter;
pub mod model;

pub use filter::{EventFilter, AUDIO_EXTENSION, INPUT_PREFIX, OUTPUT_PREFIX};
pub use model::{InputNotification, ProcessingDecision, RejectReason};
