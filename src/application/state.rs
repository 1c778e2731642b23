use std::{sync::Arc, time::Instant};

use serde_json::{Value, json};

use crate::{application::config::RuntimeConfig, domain::error::StartupError};

#[derive(Clone)]
pub struct SharedState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: RuntimeConfig,
    http: reqwest::Client,
    started_at: Instant,
}

impl SharedState {
    pub fn new(config: RuntimeConfig) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|error| StartupError::HttpClient(error.to_string()))?;

        Ok(Self {
            inner: Arc::new(InnerState {
                config,
                http,
                started_at: Instant::now(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn http_client(&self) -> &reqwest::Client {
        &self.inner.http
    }

    #[must_use]
    pub fn uptime_ms(&self) -> u64 {
        u64::try_from(self.inner.started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn health_payload(&self) -> Value {
        json!({
            "ok": true,
            "version": self.config().runtime_version,
            "uptimeMs": self.uptime_ms(),
            "telegramConfigured": self.config().telegram_configured(),
            "verificationConfigured": self.config().kofi_token.is_some(),
            "supporterListConfigured": self.config().supporter_list_configured(),
        })
    }
}
