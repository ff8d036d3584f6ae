pub mod error;
pub mod model;
pub mod poller;

pub use error::SynthesisError;
pub use model::{
    AudioEncoding, AudioSettings, BackendTarget, OperationHandle, OperationOutcome,
    OutputLocation, SynthesisMetadata, SynthesisRequest, VoiceConfig, VoiceGender,
    DEFAULT_VOICE_NAME,
};
pub use poller::{Sleeper, SynthesisOperationPoller, TokioSleeper, DEFAULT_POLL_INTERVAL};
