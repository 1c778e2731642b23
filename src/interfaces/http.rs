use std::future::Future;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get, post},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    application::state::SharedState, domain::error::StartupError, interfaces::webhook,
};

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", any(webhook::webhook_handler))
        .route("/webhook", post(webhook::webhook_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
}

pub async fn serve(
    listener: TcpListener,
    state: SharedState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    let local_addr = listener.local_addr().map_err(|error| {
        StartupError::Server(format!("failed to read listener address: {error}"))
    })?;

    info!(
        "kofi-relay listening on http://{}:{}, telegram_configured={}, supporter_list_configured={}",
        local_addr.ip(),
        local_addr.port(),
        state.config().telegram_configured(),
        state.config().supporter_list_configured(),
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|error| StartupError::Server(format!("server runtime error: {error}")))
}

async fn healthz_handler(State(state): State<SharedState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.health_payload()))
}
