use pdf_to_speech::controllers::{events::EventsController, health::Readiness};
use pdf_to_speech::domain::pipeline::PipelineService;
use pdf_to_speech::domain::synthesis::{Sleeper, SynthesisOperationPoller};
use pdf_to_speech::infrastructure::config::PipelineSettings;
use pdf_to_speech::infrastructure::http::build_router;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;


use api_client::TestClient;
use stubs::{RecordingSleeper, ScriptedSynthesizer, StalledSleeper, StubExtractor, StubStorage};

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Settings with the required project and location present
pub fn configured_settings() -> PipelineSettings {
    PipelineSettings {
        project: Some("1234".to_string()),
        location: Some("global".to_string()),
        voice_name: None,
        poll_interval: POLL_INTERVAL,
    }
}

/// A pipeline wired to stub collaborators, with handles to inspect them
pub struct Harness {
    pub storage: Arc<StubStorage>,
    pub extractor: Arc<StubExtractor>,
    pub synthesizer: Arc<ScriptedSynthesizer>,
    pub sleeper: Arc<RecordingSleeper>,
    pub shutdown: CancellationToken,
    pub pipeline: Arc<PipelineService>,
}

impl Harness {
    pub fn new(
        storage: StubStorage,
        extractor: StubExtractor,
        synthesizer: ScriptedSynthesizer,
    ) -> Self {
        Self::with_settings(storage, extractor, synthesizer, configured_settings())
    }

    pub fn with_settings(
        storage: StubStorage,
        extractor: StubExtractor,
        synthesizer: ScriptedSynthesizer,
        settings: PipelineSettings,
    ) -> Self {
        let sleeper = Arc::new(RecordingSleeper::new());
        Self::assemble(
            storage,
            extractor,
            synthesizer,
            settings,
            sleeper.clone(),
            sleeper,
        )
    }

    /// Pipeline whose poll waits never end, so only shutdown stops it
    pub fn stalled(
        storage: StubStorage,
        extractor: StubExtractor,
        synthesizer: ScriptedSynthesizer,
    ) -> (Self, Arc<StalledSleeper>) {
        let stalled = Arc::new(StalledSleeper::default());
        let harness = Self::assemble(
            storage,
            extractor,
            synthesizer,
            configured_settings(),
            Arc::new(RecordingSleeper::new()),
            stalled.clone(),
        );
        (harness, stalled)
    }

    fn assemble(
        storage: StubStorage,
        extractor: StubExtractor,
        synthesizer: ScriptedSynthesizer,
        settings: PipelineSettings,
        sleeper: Arc<RecordingSleeper>,
        poll_sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let storage = Arc::new(storage);
        let extractor = Arc::new(extractor);
        let synthesizer = Arc::new(synthesizer);
        let shutdown = CancellationToken::new();

        let poller =
            SynthesisOperationPoller::new(synthesizer.clone(), poll_sleeper, settings.poll_interval);
        let pipeline = Arc::new(PipelineService::new(
            settings,
            storage.clone(),
            extractor.clone(),
            poller,
            shutdown.clone(),
        ));

        Self {
            storage,
            extractor,
            synthesizer,
            sleeper,
            shutdown,
            pipeline,
        }
    }

    /// Happy path: one PDF with text, synthesis finishing on first poll
    pub fn succeeding() -> Self {
        Self::new(
            StubStorage::new(),
            StubExtractor::returning("Hello from the report."),
            ScriptedSynthesizer::succeeding(),
        )
    }

    /// Serve this harness over HTTP on an ephemeral port
    pub async fn serve(&self) -> TestClient {
        let events_controller = Arc::new(EventsController::new(self.pipeline.clone()));
        let readiness = Arc::new(Readiness {
            storage: "stub".to_string(),
            synthesis: "stub".to_string(),
            pipeline_configured: true,
        });
        let app = build_router(events_controller, readiness);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestClient::new(&format!("http://{}", addr))
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub harness: Harness,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let harness = Harness::succeeding();
            let client = harness.serve().await;

            Self { client, harness }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.harness.shutdown.cancel();
        }
    }
}
