pub mod request_id;

use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    events::EventsController,
    health::{self, Readiness},
};
use crate::infrastructure::config::Config;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router
pub fn build_router(events_controller: Arc<EventsController>, readiness: Arc<Readiness>) -> Router {
    // Eventarc delivers to the service root; /events/storage for explicit wiring
    let event_routes = Router::new()
        .route("/", post(EventsController::handle_storage_event))
        .route("/events/storage", post(EventsController::handle_storage_event))
        .with_state(events_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(readiness)
        .merge(event_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server, returning once `shutdown` fires and in-flight requests finish
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}
