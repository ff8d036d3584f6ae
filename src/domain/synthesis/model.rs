use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_VOICE_NAME: &str = "en-US-Wavenet-D";
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";
pub const DEFAULT_SAMPLE_RATE_HERTZ: u32 = 16000;

/// Where the backend should write the synthesized audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub bucket: String,
    pub key: String,
}

impl OutputLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn gcs_uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Uncompressed 16-bit signed little-endian samples
    Linear16,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceGender {
    Neutral,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Neutral => "NEUTRAL",
        }
    }
}

/// Voice selection. Only the name is configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    pub name: String,
    pub language_code: String,
    pub gender: VoiceGender,
}

impl VoiceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            gender: VoiceGender::Neutral,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HERTZ,
        }
    }
}

/// Project and location the synthesis job is billed to and run in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub project: String,
    pub location: String,
}

impl BackendTarget {
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.location)
    }
}

/// Everything the backend needs to start one long-audio job
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub target: BackendTarget,
    pub text: String,
    pub output: OutputLocation,
    pub voice: VoiceConfig,
    pub audio: AudioSettings,
}

/// Transient handle to a remote long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub name: String,
    pub output: OutputLocation,
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Snapshot of an operation, superseded by the next poll until `done`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationOutcome {
    pub done: bool,
    pub error: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl OperationOutcome {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn succeeded(metadata: Option<serde_json::Value>) -> Self {
        Self {
            done: true,
            error: None,
            metadata,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            done: true,
            error: Some(message.into()),
            metadata: None,
        }
    }
}

/// Completion metadata reported by the backend. Logged, never acted upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisMetadata {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    #[serde(default)]
    pub output_uri: Option<String>,
}
