use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_to_speech::controllers::{events::EventsController, health::Readiness};
use pdf_to_speech::domain::pipeline::{PipelineService, StorageScanner};
use pdf_to_speech::domain::synthesis::{SynthesisOperationPoller, TokioSleeper};
use pdf_to_speech::infrastructure::config::{Config, LogFormat, RunMode, SynthesisProvider};
use pdf_to_speech::infrastructure::http::{build_router, start_http_server};
use pdf_to_speech::infrastructure::repositories::{
    google_long_audio_repository::GOOGLE_METADATA_TOKEN_URL, CloudStorageRepository,
    GoogleLongAudioRepository, PdfTextExtractor, PollySynthesisTaskRepository,
    SpeechSynthesizerRepository, StorageRepository, TextExtractorRepository, TokenSource,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        run_mode = ?config.run_mode,
        storage = %config.storage_provider,
        synthesis = %config.synthesis_provider,
        "Starting pdf-to-speech"
    );

    if config.pipeline.resolve().is_err() {
        tracing::warn!(
            "PROJECT_NUMBER or GCP_LOCATION not set; every invocation will fail until they are"
        );
    }

    let config = Arc::new(config);
    let shutdown = CancellationToken::new();

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Collaborators
    tracing::info!("Instantiating repositories...");
    let storage: Arc<dyn StorageRepository> =
        Arc::new(CloudStorageRepository::new(config.storage_provider.clone()));
    let extractor: Arc<dyn TextExtractorRepository> = Arc::new(PdfTextExtractor::new());
    let synthesizer = create_synthesizer(&config, storage.clone()).await;

    // 2. Services
    tracing::info!("Instantiating services...");
    let poller = SynthesisOperationPoller::new(
        synthesizer,
        Arc::new(TokioSleeper),
        config.pipeline.poll_interval,
    );
    let pipeline = Arc::new(PipelineService::new(
        config.pipeline.clone(),
        storage.clone(),
        extractor,
        poller,
        shutdown.clone(),
    ));

    tokio::spawn(cancel_on_signal(shutdown.clone()));

    match config.run_mode {
        RunMode::Server => {
            let events_controller = Arc::new(EventsController::new(pipeline));
            let readiness = Arc::new(Readiness {
                storage: config.storage_provider.to_string(),
                synthesis: config.synthesis_provider.to_string(),
                pipeline_configured: config.pipeline.resolve().is_ok(),
            });

            let app = build_router(events_controller, readiness);
            start_http_server(config.clone(), app, shutdown).await?;
        }
        RunMode::Scan => {
            let bucket = config
                .scan_bucket
                .clone()
                .ok_or("SCAN_BUCKET must be set when RUN_MODE=scan")?;
            let scanner = StorageScanner::new(
                pipeline,
                storage,
                bucket,
                config.scan_interval,
                shutdown,
            );
            scanner.run().await;
        }
    }

    Ok(())
}

async fn create_synthesizer(
    config: &Config,
    storage: Arc<dyn StorageRepository>,
) -> Arc<dyn SpeechSynthesizerRepository> {
    match config.synthesis_provider {
        SynthesisProvider::Google => {
            let token_source = match &config.google_access_token {
                Some(token) => TokenSource::Static(token.clone()),
                None => TokenSource::MetadataServer {
                    url: GOOGLE_METADATA_TOKEN_URL.to_string(),
                },
            };
            tracing::info!(
                static_token = config.google_access_token.is_some(),
                "Google Text-to-Speech client initialized"
            );
            Arc::new(GoogleLongAudioRepository::new(token_source))
        }
        SynthesisProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;

            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Arc::new(PollySynthesisTaskRepository::new(polly_client, storage))
        }
    }
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "pdf_to_speech=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "pdf_to_speech=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
