use super::speech_synthesizer_repository::SpeechSynthesizerRepository;
use super::storage_repository::StorageRepository;
use crate::domain::synthesis::{
    AudioEncoding, OperationHandle, OperationOutcome, OutputLocation, SynthesisRequest,
};
use async_trait::async_trait;
use aws_sdk_polly::{
    primitives::DateTimeFormat,
    types::{LanguageCode, OutputFormat, SynthesisTask, TaskStatus, VoiceId},
    Client as PollyClient,
};
use serde_json::json;
use std::sync::Arc;

/// AWS Polly asynchronous synthesis tasks (`StartSpeechSynthesisTask`).
///
/// Polly names its output `<prefix><task id>.<format>`; once a task completes
/// the object is renamed to the requested output key.
pub struct PollySynthesisTaskRepository {
    polly_client: Arc<PollyClient>,
    storage: Arc<dyn StorageRepository>,
}

impl PollySynthesisTaskRepository {
    pub fn new(polly_client: Arc<PollyClient>, storage: Arc<dyn StorageRepository>) -> Self {
        Self {
            polly_client,
            storage,
        }
    }

    /// `mp3-output/report.mp3` -> `mp3-output/report.`
    fn key_prefix(output: &OutputLocation) -> String {
        match output.key.rfind('.') {
            Some(index) => output.key[..=index].to_string(),
            None => format!("{}.", output.key),
        }
    }

    fn output_format(encoding: AudioEncoding) -> OutputFormat {
        match encoding {
            AudioEncoding::Linear16 => OutputFormat::Pcm,
        }
    }

    /// Completed task: move the task-named object to the requested key
    async fn relocate(&self, task: &SynthesisTask, handle: &OperationHandle) -> OperationOutcome {
        let Some(uri) = task.output_uri() else {
            return OperationOutcome::failed("Polly task completed without an output URI");
        };

        let Some(task_key) = object_key_from_uri(uri, &handle.output.bucket) else {
            return OperationOutcome::failed(format!(
                "Polly output URI {} is not in bucket {}",
                uri, handle.output.bucket
            ));
        };

        if task_key != handle.output.key {
            if let Err(e) = self
                .storage
                .rename(&handle.output.bucket, &task_key, &handle.output.key)
                .await
            {
                return OperationOutcome::failed(format!(
                    "Failed to move Polly output {} to {}: {}",
                    task_key, handle.output.key, e
                ));
            }
        }

        let start_time = task
            .creation_time()
            .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok());

        OperationOutcome::succeeded(Some(json!({
            "startTime": start_time,
            "progressPercentage": 100.0,
            "outputUri": format!("s3://{}/{}", handle.output.bucket, handle.output.key),
        })))
    }
}

/// Extract the object key from a Polly output URI, for both path-style
/// (`https://s3.<region>.amazonaws.com/<bucket>/<key>`) and virtual-hosted
/// (`https://<bucket>.s3.<region>.amazonaws.com/<key>`) forms.
fn object_key_from_uri(uri: &str, bucket: &str) -> Option<String> {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    let (host, path) = without_scheme.split_once('/')?;

    let key = if host.starts_with(&format!("{}.", bucket)) {
        path
    } else {
        path.strip_prefix(bucket)?.strip_prefix('/')?
    };

    if key.is_empty() {
        return None;
    }

    urlencoding::decode(key).ok().map(|k| k.into_owned())
}

#[async_trait]
impl SpeechSynthesizerRepository for PollySynthesisTaskRepository {
    async fn submit(&self, request: &SynthesisRequest) -> Result<OperationHandle, String> {
        let voice_id = VoiceId::from(request.voice.name.as_str());
        let key_prefix = Self::key_prefix(&request.output);

        tracing::info!(
            voice_id = ?voice_id,
            bucket = %request.output.bucket,
            key_prefix = %key_prefix,
            text_length = request.text.len(),
            "Calling AWS Polly start_speech_synthesis_task"
        );

        let result = self
            .polly_client
            .start_speech_synthesis_task()
            .text(&request.text)
            .voice_id(voice_id)
            .language_code(LanguageCode::from(request.voice.language_code.as_str()))
            .output_format(Self::output_format(request.audio.encoding))
            .sample_rate(request.audio.sample_rate_hertz.to_string())
            .output_s3_bucket_name(&request.output.bucket)
            .output_s3_key_prefix(key_prefix)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    "AWS Polly start_speech_synthesis_task failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        let task_id = result
            .synthesis_task()
            .and_then(|task| task.task_id())
            .ok_or_else(|| "AWS Polly returned no task id".to_string())?;

        Ok(OperationHandle {
            name: task_id.to_string(),
            output: request.output.clone(),
        })
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<OperationOutcome, String> {
        let result = self
            .polly_client
            .get_speech_synthesis_task()
            .task_id(&handle.name)
            .send()
            .await
            .map_err(|e| format!("AWS Polly error: {}", e))?;

        let task = result
            .synthesis_task()
            .ok_or_else(|| format!("AWS Polly returned no task for {}", handle.name))?;

        let outcome = match task.task_status() {
            Some(TaskStatus::Completed) => self.relocate(task, handle).await,
            Some(TaskStatus::Failed) => OperationOutcome::failed(
                task.task_status_reason()
                    .unwrap_or("Polly task failed without a reason"),
            ),
            _ => OperationOutcome::pending(),
        };

        Ok(outcome)
    }
}
