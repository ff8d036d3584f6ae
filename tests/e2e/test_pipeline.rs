use crate::e2e::helpers;

use helpers::stubs::{ScriptedSynthesizer, StubExtractor, StubStorage};
use helpers::{configured_settings, Harness};
use pdf_to_speech::domain::document::{InputNotification, RejectReason};
use pdf_to_speech::domain::pipeline::{ErrorKind, PipelineServiceApi, ProcessingOutcome};
use pdf_to_speech::domain::synthesis::{AudioEncoding, OperationOutcome, OutputLocation};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn report() -> InputNotification {
    InputNotification::new("docs", "pdf-input/report.pdf").with_content_type("application/pdf")
}

/// The temp file was downloaded once, present during extraction, and released once
fn assert_released_once(harness: &Harness) {
    assert_eq!(harness.storage.downloads(), 1);
    assert_eq!(harness.storage.releases(), 1);
    for path in harness.storage.downloaded_paths() {
        assert!(!path.exists(), "temp file {} was not removed", path.display());
    }
}

#[tokio::test]
async fn it_should_skip_keys_without_pdf_suffix_or_input_prefix() {
    let harness = Harness::succeeding();

    for (key, reason) in [
        ("pdf-input/notes.txt", RejectReason::WrongSuffix),
        ("uploads/report.pdf", RejectReason::OutsideInputPrefix),
        ("mp3-output/report.mp3", RejectReason::WrongSuffix),
        ("pdf-input/.pdf", RejectReason::EmptyBaseName),
    ] {
        let outcome = harness
            .pipeline
            .process(InputNotification::new("docs", key))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessingOutcome::Skipped(reason), "key {}", key);
    }

    // A skip touches nothing
    assert_eq!(harness.storage.downloads(), 0);
    assert_eq!(harness.extractor.calls(), 0);
    assert_eq!(harness.synthesizer.submits(), 0);
}

#[tokio::test]
async fn it_should_synthesize_into_derived_output_key() {
    let harness = Harness::succeeding();

    let outcome = harness.pipeline.process(report()).await.unwrap();

    assert_eq!(
        outcome,
        ProcessingOutcome::Synthesized {
            output: OutputLocation::new("docs", "mp3-output/report.mp3")
        }
    );

    let requests = harness.synthesizer.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.text, "Hello from the report.");
    assert_eq!(request.output.gcs_uri(), "gs://docs/mp3-output/report.mp3");
    assert_eq!(request.target.parent(), "projects/1234/locations/global");
    assert_eq!(request.voice.name, "en-US-Wavenet-D");
    assert_eq!(request.voice.language_code, "en-US");
    assert_eq!(request.audio.encoding, AudioEncoding::Linear16);
    assert_eq!(request.audio.sample_rate_hertz, 16000);

    assert_eq!(harness.extractor.file_existed(), vec![true]);
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_use_configured_voice() {
    let mut settings = configured_settings();
    settings.voice_name = Some("en-GB-Wavenet-B".to_string());
    let harness = Harness::with_settings(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::succeeding(),
        settings,
    );

    harness.pipeline.process(report()).await.unwrap();

    assert_eq!(harness.synthesizer.requests()[0].voice.name, "en-GB-Wavenet-B");
}

#[tokio::test]
async fn it_should_skip_synthesis_when_text_is_whitespace() {
    let harness = Harness::new(
        StubStorage::new(),
        StubExtractor::returning("  \n\t \n"),
        ScriptedSynthesizer::succeeding(),
    );

    let outcome = harness.pipeline.process(report()).await.unwrap();

    assert_eq!(outcome, ProcessingOutcome::NoText);
    assert_eq!(harness.synthesizer.submits(), 0);
    assert_eq!(harness.synthesizer.polls(), 0);
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_fail_with_configuration_error_before_touching_storage() {
    let mut settings = configured_settings();
    settings.location = None;
    let harness = Harness::with_settings(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::succeeding(),
        settings,
    );

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(harness.storage.downloads(), 0);
}

#[tokio::test]
async fn it_should_still_skip_rejected_keys_when_unconfigured() {
    let harness = Harness::with_settings(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::succeeding(),
        Default::default(),
    );

    let outcome = harness
        .pipeline
        .process(InputNotification::new("docs", "pdf-input/image.png"))
        .await
        .unwrap();

    assert_eq!(outcome, ProcessingOutcome::Skipped(RejectReason::WrongSuffix));
}

#[tokio::test]
async fn it_should_report_download_failure_with_key_and_bucket() {
    let harness = Harness::new(
        StubStorage::failing_download(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::succeeding(),
    );

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Download);
    let message = err.to_string();
    assert!(message.contains("pdf-input/report.pdf"));
    assert!(message.contains("docs"));
    assert_eq!(harness.extractor.calls(), 0);
    assert_eq!(harness.storage.releases(), 0);
}

#[tokio::test]
async fn it_should_release_temp_file_when_extraction_fails() {
    let harness = Harness::new(
        StubStorage::new(),
        StubExtractor::failing("xref table is corrupt"),
        ScriptedSynthesizer::succeeding(),
    );

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Extraction);
    assert!(err.to_string().contains("xref table is corrupt"));
    assert_eq!(harness.synthesizer.submits(), 0);
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_release_temp_file_when_submission_fails() {
    let harness = Harness::new(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::rejecting_submit("quota exceeded"),
    );

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Submission);
    assert_eq!(harness.synthesizer.polls(), 0);
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_release_temp_file_when_remote_synthesis_fails() {
    let harness = Harness::new(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::new(vec![
            Ok(OperationOutcome::pending()),
            Ok(OperationOutcome::failed("voice not found")),
        ]),
    );

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteSynthesis);
    assert!(err.to_string().contains("voice not found"));
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_release_temp_file_when_status_fetch_fails() {
    let harness = Harness::new(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::new(vec![Err("connection refused".to_string())]),
    );

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StatusFetch);
    assert!(harness.sleeper.sleeps().is_empty());
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_release_temp_file_when_shutdown_cancels_polling() {
    let (harness, stalled) = Harness::stalled(
        StubStorage::new(),
        StubExtractor::returning("Some text"),
        ScriptedSynthesizer::new(Vec::new()),
    );

    let run = {
        let pipeline = harness.pipeline.clone();
        tokio::spawn(async move { pipeline.process(report()).await })
    };
    while stalled.entered() == 0 {
        tokio::task::yield_now().await;
    }
    harness.shutdown.cancel();

    let err = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("pipeline did not stop after shutdown")
        .unwrap()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancellation);
    assert_eq!(harness.synthesizer.submits(), 1);
    assert_released_once(&harness);
}

#[tokio::test]
async fn it_should_not_submit_after_shutdown() {
    let harness = Harness::succeeding();
    harness.shutdown.cancel();

    let err = harness.pipeline.process(report()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancellation);
    assert_eq!(harness.synthesizer.submits(), 0);
    assert_released_once(&harness);
}
