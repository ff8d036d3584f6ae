use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::{
        document::InputNotification,
        pipeline::{PipelineServiceApi, ProcessingOutcome},
    },
    error::{AppError, AppResult},
    infrastructure::http::RequestId,
};

/// Storage event body: a structured-mode CloudEvent wraps the object in
/// `data`, binary mode sends the object itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StorageEventPayload {
    Structured { data: InputNotification },
    Binary(InputNotification),
}

impl StorageEventPayload {
    pub fn into_notification(self) -> InputNotification {
        match self {
            StorageEventPayload::Structured { data } => data,
            StorageEventPayload::Binary(notification) => notification,
        }
    }
}

pub struct EventsController {
    pipeline: Arc<dyn PipelineServiceApi>,
}

impl EventsController {
    pub fn new(pipeline: Arc<dyn PipelineServiceApi>) -> Self {
        Self { pipeline }
    }

    /// POST / and POST /events/storage - Process a storage-finalization event
    pub async fn handle_storage_event(
        State(controller): State<Arc<EventsController>>,
        Extension(request_id): Extension<RequestId>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<StatusCode> {
        let payload: StorageEventPayload = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("failed to parse event data: {}", e)))?;
        let notification = payload.into_notification();

        tracing::info!(
            request_id = %request_id.0,
            event_id = headers.get("ce-id").and_then(|v| v.to_str().ok()).unwrap_or("-"),
            event_type = headers.get("ce-type").and_then(|v| v.to_str().ok()).unwrap_or("-"),
            bucket = %notification.bucket,
            key = %notification.key,
            "Storage event received"
        );

        let outcome = controller.pipeline.process(notification).await?;

        if let ProcessingOutcome::Synthesized { output } = &outcome {
            tracing::info!(request_id = %request_id.0, output = %output, "Audio synthesized");
        }

        Ok(StatusCode::NO_CONTENT)
    }
}
