use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ready_status(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ready"));
    assert_eq!(body.get("storage").and_then(|v| v.as_str()), Some("stub"));
    assert!(body.get("tts").is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_attach_request_id_to_health_checks(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_route(ctx: &TestContext) {
    let response = ctx.client.get("/events/unknown").await.unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}
