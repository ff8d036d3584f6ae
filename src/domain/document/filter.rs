use super::model::{InputNotification, ProcessingDecision, RejectReason};

pub const INPUT_PREFIX: &str = "pdf-input/";
pub const OUTPUT_PREFIX: &str = "mp3-output/";
pub const DOCUMENT_SUFFIX: &str = ".pdf";
pub const AUDIO_EXTENSION: &str = "mp3";

/// Decides which storage notifications denote a new input document and
/// where its audio should land.
#[derive(Debug, Clone)]
pub struct EventFilter {
    input_prefix: String,
    output_prefix: String,
    document_suffix: String,
    audio_extension: String,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            input_prefix: INPUT_PREFIX.to_string(),
            output_prefix: OUTPUT_PREFIX.to_string(),
            document_suffix: DOCUMENT_SUFFIX.to_string(),
            audio_extension: AUDIO_EXTENSION.to_string(),
        }
    }
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_prefix(&self) -> &str {
        &self.input_prefix
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    /// Accept or reject a notification. Malformed keys reject, they never error.
    pub fn decide(&self, notification: &InputNotification) -> ProcessingDecision {
        let key = notification.key.as_str();

        if !key
            .to_lowercase()
            .ends_with(&self.document_suffix.to_lowercase())
        {
            return ProcessingDecision::Reject {
                reason: RejectReason::WrongSuffix,
            };
        }

        if !key.starts_with(&self.input_prefix) {
            return ProcessingDecision::Reject {
                reason: RejectReason::OutsideInputPrefix,
            };
        }

        match self.output_key_for(key) {
            Some(output_key) => ProcessingDecision::Accept { output_key },
            None => ProcessingDecision::Reject {
                reason: RejectReason::EmptyBaseName,
            },
        }
    }

    /// `pdf-input/report.pdf` -> `mp3-output/report.mp3`
    pub fn output_key_for(&self, key: &str) -> Option<String> {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        let stem = match file_name.rfind('.') {
            Some(0) | None => file_name,
            Some(index) => &file_name[..index],
        };

        // A bare extension (".pdf") leaves nothing to name the output after
        if stem.is_empty() || stem.eq_ignore_ascii_case(&self.document_suffix) {
            return None;
        }

        Some(format!(
            "{}{}.{}",
            self.output_prefix, stem, self.audio_extension
        ))
    }
}
