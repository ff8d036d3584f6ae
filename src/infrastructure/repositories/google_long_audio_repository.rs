use super::speech_synthesizer_repository::SpeechSynthesizerRepository;
use crate::domain::synthesis::{OperationHandle, OperationOutcome, SynthesisRequest};
use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const GOOGLE_TTS_API_URL: &str = "https://texttospeech.googleapis.com/v1";
pub const GOOGLE_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Metadata server tokens live for an hour; refresh well before that
const TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Where bearer tokens for the Text-to-Speech API come from
#[derive(Debug, Clone)]
pub enum TokenSource {
    Static(String),
    MetadataServer { url: String },
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// `google.longrunning.Operation` as returned by the REST API
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationStatus>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Google Cloud Text-to-Speech long audio synthesis (`synthesizeLongAudio`).
///
/// Audio is written by Google straight to the `gs://` output URI.
pub struct GoogleLongAudioRepository {
    api_url: String,
    token_source: TokenSource,
    tokens: Cache<&'static str, String>,
    http_client: reqwest::Client,
}

impl GoogleLongAudioRepository {
    pub fn new(token_source: TokenSource) -> Self {
        Self::with_api_url(GOOGLE_TTS_API_URL, token_source)
    }

    pub fn with_api_url(api_url: impl Into<String>, token_source: TokenSource) -> Self {
        Self {
            api_url: api_url.into(),
            token_source,
            tokens: Cache::builder().max_capacity(1).time_to_live(TOKEN_TTL).build(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn access_token(&self) -> Result<String, String> {
        match &self.token_source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::MetadataServer { url } => self
                .tokens
                .try_get_with("default", self.fetch_metadata_token(url))
                .await
                .map_err(|e| e.to_string()),
        }
    }

    async fn fetch_metadata_token(&self, url: &str) -> Result<String, String> {
        let response = self
            .http_client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| format!("Metadata server token request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Metadata server token request failed with status {}",
                response.status()
            ));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse metadata server token: {}", e))?;

        tracing::debug!("Fetched access token from metadata server");
        Ok(token.access_token)
    }

    /// Send an authorized request and decode the operation it returns
    async fn send_for_operation(&self, request: reqwest::RequestBuilder) -> Result<Operation, String> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("Text-to-Speech request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!(
                "Text-to-Speech API returned {}: {}",
                status, error_text
            ));
        }

        response
            .json::<Operation>()
            .await
            .map_err(|e| format!("Failed to parse operation: {}", e))
    }

    fn request_body(request: &SynthesisRequest) -> serde_json::Value {
        json!({
            "parent": request.target.parent(),
            "input": { "text": request.text },
            "audioConfig": {
                "audioEncoding": request.audio.encoding.as_str(),
                "sampleRateHertz": request.audio.sample_rate_hertz,
            },
            "voice": {
                "languageCode": request.voice.language_code,
                "ssmlGender": request.voice.gender.as_str(),
                "name": request.voice.name,
            },
            "outputGcsUri": request.output.gcs_uri(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizerRepository for GoogleLongAudioRepository {
    async fn submit(&self, request: &SynthesisRequest) -> Result<OperationHandle, String> {
        let url = format!("{}/{}:synthesizeLongAudio", self.api_url, request.target.parent());
        let operation = self
            .send_for_operation(self.http_client.post(url).json(&Self::request_body(request)))
            .await?;

        Ok(OperationHandle {
            name: operation.name,
            output: request.output.clone(),
        })
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<OperationOutcome, String> {
        let url = format!("{}/{}", self.api_url, handle.name);
        let operation = self.send_for_operation(self.http_client.get(url)).await?;

        Ok(OperationOutcome {
            done: operation.done,
            error: operation
                .error
                .map(|status| format!("{} (code {})", status.message, status.code)),
            metadata: operation.metadata,
        })
    }
}
