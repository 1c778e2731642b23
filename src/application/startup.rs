use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    application::{
        config::{Args, RuntimeConfig},
        state::SharedState,
    },
    domain::error::StartupError,
    interfaces::http,
};

pub async fn run(args: Args) -> Result<(), StartupError> {
    let config = RuntimeConfig::from_args(args).map_err(StartupError::Config)?;

    init_logging(&config.log_filter, config.json_logs)?;
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .map_err(|error| StartupError::Server(format!("failed to bind listener: {error}")))?;

    let signal = shutdown_signal();
    run_with_listener(listener, config, signal).await
}

pub async fn run_with_listener(
    listener: TcpListener,
    config: RuntimeConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    info!(
        "starting kofi-relay host={} port={} version={}",
        config.host, config.port, config.runtime_version
    );
    if !config.telegram_configured() || config.kofi_token.is_none() {
        warn!("relay secrets incomplete, webhooks will be answered with a configuration error");
    }

    let state = SharedState::new(config)?;
    http::serve(listener, state, shutdown).await
}

fn init_logging(filter: &str, json_logs: bool) -> Result<(), StartupError> {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(env_filter).with_target(false);

    if json_logs {
        builder
            .json()
            .try_init()
            .map_err(|error| StartupError::Logging(error.to_string()))?;
    } else {
        builder
            .compact()
            .try_init()
            .map_err(|error| StartupError::Logging(error.to_string()))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
