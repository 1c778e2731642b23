use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use crate::application::{relay, state::SharedState};

/// The envelope Ko-fi posts: one `data` field holding the payload as a JSON
/// string.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookSubmission {
    #[serde(default)]
    pub data: Option<String>,
}

pub async fn webhook_handler(State(state): State<SharedState>, request: Request) -> impl IntoResponse {
    let submission = read_submission(request).await;
    let reply = relay::process_submission(&state, submission.data).await;
    (StatusCode::OK, Json(reply.into_body()))
}

/// Reads the envelope from a JSON or form-urlencoded body. Anything
/// unreadable is treated as an empty submission.
/// GET and HEAD carry no body and their query string is never read.
async fn read_submission(request: Request) -> WebhookSubmission {
    if matches!(*request.method(), Method::GET | Method::HEAD) {
        return WebhookSubmission::default();
    }

    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"));

    let parsed = if is_json {
        Json::<WebhookSubmission>::from_request(request, &())
            .await
            .map(|Json(submission)| submission)
            .map_err(|rejection| rejection.body_text())
    } else {
        Form::<WebhookSubmission>::from_request(request, &())
            .await
            .map(|Form(submission)| submission)
            .map_err(|rejection| rejection.body_text())
    };

    parsed.unwrap_or_else(|error| {
        warn!("ignoring unreadable webhook body: {error}");
        WebhookSubmission::default()
    })
}
