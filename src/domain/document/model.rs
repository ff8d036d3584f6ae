use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage-finalization notification for a single object.
///
/// Field names follow the storage event payload (`bucket`, `name`, `contentType`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputNotification {
    pub bucket: String,
    #[serde(rename = "name")]
    pub key: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl InputNotification {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Why a notification was not accepted for processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    WrongSuffix,
    OutsideInputPrefix,
    EmptyBaseName,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::WrongSuffix => "not a PDF document",
            RejectReason::OutsideInputPrefix => "outside the input folder",
            RejectReason::EmptyBaseName => "empty file name",
        };
        f.write_str(reason)
    }
}

/// Outcome of filtering a notification. Pure value, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingDecision {
    Accept { output_key: String },
    Reject { reason: RejectReason },
}

impl ProcessingDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ProcessingDecision::Accept { .. })
    }

    pub fn output_key(&self) -> Option<&str> {
        match self {
            ProcessingDecision::Accept { output_key } => Some(output_key),
            ProcessingDecision::Reject { .. } => None,
        }
    }
}
