use axum::http::StatusCode;
use serde_json::{Value, json};

use super::support::{
    LIST_PATH, ListResponse, MockUpstream, UNMATCHED_LIST_PATH, UNREACHABLE_BASE_URL, UpstreamCall,
    donation_payload, spawn_server_with, use_upstream,
};

fn error_text(payload: &Value) -> &str {
    assert_eq!(payload["success"], false, "expected failure: {payload}");
    payload["error"].as_str().expect("error should be a string")
}

fn has_list_write(calls: &[UpstreamCall]) -> bool {
    calls
        .iter()
        .any(|call| matches!(call, UpstreamCall::ListWrite { .. }))
}

fn written_list(call: &UpstreamCall) -> Vec<Value> {
    let UpstreamCall::ListWrite { body, .. } = call else {
        panic!("expected list write, got {call:?}");
    };
    let content = body["files"]["kofi.json"]["content"]
        .as_str()
        .expect("file content should be a string");
    serde_json::from_str(content).expect("file content should be a json list")
}

#[tokio::test]
async fn donation_is_appended_to_supporter_list() {
    let mut upstream = MockUpstream::builder().spawn().await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(payload, json!({ "success": true }));

    let calls = upstream.drain_calls();
    assert_eq!(calls.len(), 3, "unexpected upstream calls: {calls:?}");
    assert!(matches!(&calls[0], UpstreamCall::Telegram(_)));
    assert!(matches!(&calls[1], UpstreamCall::ListRead(path) if path == LIST_PATH));

    let UpstreamCall::ListWrite {
        gist_id,
        authorization,
        api_version,
        body,
    } = &calls[2]
    else {
        panic!("expected list write, got {calls:?}");
    };
    assert_eq!(gist_id, "abc123");
    assert_eq!(authorization.as_deref(), Some("Bearer gist-token"));
    assert_eq!(api_version.as_deref(), Some("2022-11-28"));
    assert!(
        body["description"]
            .as_str()
            .is_some_and(|description| description.starts_with("Last updated at "))
    );

    let list = written_list(&calls[2]);
    assert_eq!(list.len(), 1);
    let record = &list[0];
    assert_eq!(record["verification_token"], "*****");
    assert_eq!(record["email"], "*****");
    assert_eq!(record["kofi_transaction_id"], "*****");
    assert_eq!(record["shipping"], Value::Null);
    assert_eq!(record["from_name"], "Ann");
    assert_eq!(record["message_id"], "m1");
    assert_eq!(record["amount"], "5.00");

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn existing_supporters_are_kept_in_order() {
    let mut upstream = MockUpstream::builder()
        .list(ListResponse::Items(json!([
            { "from_name": "Earlier", "message_id": "m0" }
        ])))
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(payload["success"], true);

    let calls = upstream.drain_calls();
    let list = written_list(calls.last().expect("list write expected"));
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["from_name"], "Earlier");
    assert_eq!(list[1]["message_id"], "m1");

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn empty_list_body_starts_a_new_list() {
    let mut upstream = MockUpstream::builder()
        .list(ListResponse::EmptyBody)
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(payload["success"], true);

    let calls = upstream.drain_calls();
    let list = written_list(calls.last().expect("list write expected"));
    assert_eq!(list.len(), 1);

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn missing_list_fails_the_request() {
    let mut upstream = MockUpstream::builder()
        .list(ListResponse::NotFound)
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(
        payload,
        json!({ "success": false, "error": "Gist not found." })
    );

    let calls = upstream.drain_calls();
    assert_eq!(calls.len(), 2, "no write expected: {calls:?}");
    assert!(
        !calls
            .iter()
            .any(|call| matches!(call, UpstreamCall::ListWrite { .. }))
    );

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn list_url_without_gist_id_is_never_written() {
    let mut upstream = MockUpstream::builder().spawn().await;
    let server = spawn_server_with(|config| {
        use_upstream(config, &upstream, Some(UNMATCHED_LIST_PATH));
    })
    .await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(
        payload,
        json!({ "success": false, "error": "Could not get Gist ID from URL." })
    );
    assert!(
        !upstream
            .drain_calls()
            .iter()
            .any(|call| matches!(call, UpstreamCall::ListWrite { .. }))
    );

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn failed_list_write_is_reported() {
    let mut upstream = MockUpstream::builder()
        .write_status(StatusCode::UNPROCESSABLE_ENTITY)
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(
        payload,
        json!({ "success": false, "error": "Update gist failed: 422" })
    );
    assert_eq!(upstream.drain_calls().len(), 3);

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn telegram_failure_does_not_block_list_update() {
    let mut upstream = MockUpstream::builder()
        .telegram_status(StatusCode::INTERNAL_SERVER_ERROR)
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(
        payload,
        json!({ "success": false, "error": "Telegram API error: 500" })
    );

    let calls = upstream.drain_calls();
    assert_eq!(calls.len(), 3, "list should still be updated: {calls:?}");
    assert_eq!(written_list(&calls[2]).len(), 1);

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn unreachable_telegram_does_not_block_list_update() {
    let mut upstream = MockUpstream::builder().spawn().await;
    let server = spawn_server_with(|config| {
        use_upstream(config, &upstream, Some(LIST_PATH));
        config.telegram_api_base_url = UNREACHABLE_BASE_URL.to_owned();
    })
    .await;

    let payload = server.post_donation(&donation_payload()).await;
    let error = error_text(&payload);
    assert!(error.starts_with("Telegram request failed: "), "{error}");
    assert!(!error.contains("test-token"), "bot token leaked: {error}");

    let calls = upstream.drain_calls();
    assert_eq!(calls.len(), 2, "list should still be read and written: {calls:?}");
    assert!(matches!(&calls[0], UpstreamCall::ListRead(_)));
    assert_eq!(written_list(&calls[1]).len(), 1);

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn unreachable_list_fails_the_request() {
    let mut upstream = MockUpstream::builder().spawn().await;
    let server = spawn_server_with(|config| {
        use_upstream(config, &upstream, Some(LIST_PATH));
        config.gist_url = Some(format!("{UNREACHABLE_BASE_URL}{LIST_PATH}"));
    })
    .await;

    let payload = server.post_donation(&donation_payload()).await;
    let error = error_text(&payload);
    assert!(error.starts_with("Problem retrieving gist content: "), "{error}");

    let calls = upstream.drain_calls();
    assert_eq!(calls.len(), 1, "only telegram should be reached: {calls:?}");
    assert!(matches!(&calls[0], UpstreamCall::Telegram(_)));

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn list_server_error_fails_the_request() {
    let mut upstream = MockUpstream::builder()
        .list(ListResponse::ServerError)
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(
        payload,
        json!({
            "success": false,
            "error": "Problem retrieving gist content: unexpected status 500",
        })
    );
    assert!(!has_list_write(&upstream.drain_calls()));

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn non_list_gist_content_fails_the_request() {
    let mut upstream = MockUpstream::builder()
        .list(ListResponse::NotAList)
        .spawn()
        .await;
    let server = spawn_server_with(|config| use_upstream(config, &upstream, Some(LIST_PATH))).await;

    let payload = server.post_donation(&donation_payload()).await;
    assert_eq!(
        payload,
        json!({ "success": false, "error": "Gist content is not a list." })
    );
    assert!(!has_list_write(&upstream.drain_calls()));

    server.stop().await;
    upstream.stop().await;
}

#[tokio::test]
async fn unreachable_gist_api_reports_update_failure() {
    let mut upstream = MockUpstream::builder().spawn().await;
    let server = spawn_server_with(|config| {
        use_upstream(config, &upstream, Some(LIST_PATH));
        config.github_api_base_url = UNREACHABLE_BASE_URL.to_owned();
    })
    .await;

    let payload = server.post_donation(&donation_payload()).await;
    let error = error_text(&payload);
    assert!(error.starts_with("Update gist failed: "), "{error}");
    assert!(!error.contains("gist-token"), "gist token leaked: {error}");

    let calls = upstream.drain_calls();
    assert_eq!(calls.len(), 2, "telegram and list read expected: {calls:?}");
    assert!(!has_list_write(&calls));

    server.stop().await;
    upstream.stop().await;
}
