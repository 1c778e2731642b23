use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use clap::Parser;

use crate::domain::{
    error::RelayError,
    notification::{DEFAULT_NOTIFICATION_FOOTER, DEFAULT_NOTIFICATION_TITLE, NotificationTemplate},
};

pub const DEFAULT_GIST_FILENAME: &str = "kofi.json";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kofi-relay",
    version,
    about = "Relays Ko-fi donation webhooks to Telegram and an optional supporter Gist"
)]
pub struct Args {
    #[arg(long, env = "KOFI_RELAY_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    #[arg(long, env = "KOFI_TOKEN")]
    pub kofi_token: Option<String>,

    #[arg(long, env = "GIST_URL")]
    pub gist_url: Option<String>,

    #[arg(long, env = "GIST_TOKEN")]
    pub gist_token: Option<String>,

    #[arg(long, env = "GIST_FILENAME", default_value = DEFAULT_GIST_FILENAME)]
    pub gist_filename: String,

    #[arg(
        long,
        env = "TELEGRAM_API_BASE_URL",
        default_value = "https://api.telegram.org"
    )]
    pub telegram_api_base_url: String,

    #[arg(
        long,
        env = "GITHUB_API_BASE_URL",
        default_value = "https://api.github.com"
    )]
    pub github_api_base_url: String,

    #[arg(
        long,
        env = "KOFI_RELAY_NOTIFICATION_TITLE",
        default_value = DEFAULT_NOTIFICATION_TITLE
    )]
    pub notification_title: String,

    #[arg(
        long,
        env = "KOFI_RELAY_NOTIFICATION_FOOTER",
        default_value = DEFAULT_NOTIFICATION_FOOTER
    )]
    pub notification_footer: String,

    #[arg(long, env = "KOFI_RELAY_HTTP_TIMEOUT_MS", default_value_t = 10_000)]
    pub http_timeout_ms: u64,

    #[arg(long, env = "KOFI_RELAY_RUNTIME_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub runtime_version: String,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    #[arg(long, env = "KOFI_RELAY_JSON_LOGS", default_value_t = false)]
    pub json_logs: bool,
}

/// Process-wide configuration. Secrets stay optional here: a relay with a
/// missing token still starts and answers every webhook with a configuration
/// failure instead of refusing to boot.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub host: IpAddr,
    pub port: u16,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub kofi_token: Option<String>,
    pub gist_url: Option<String>,
    pub gist_token: Option<String>,
    pub gist_filename: String,
    pub telegram_api_base_url: String,
    pub github_api_base_url: String,
    pub notification: NotificationTemplate,
    pub http_timeout: Duration,
    pub runtime_version: String,
    pub log_filter: String,
    pub json_logs: bool,
}

impl RuntimeConfig {
    pub fn from_args(args: Args) -> Result<Self, String> {
        if args.port == 0 {
            return Err("port must be greater than 0".to_owned());
        }
        if args.http_timeout_ms == 0 {
            return Err("http_timeout_ms must be greater than 0".to_owned());
        }
        let gist_filename = args.gist_filename.trim().to_owned();
        if gist_filename.is_empty() {
            return Err("gist_filename must not be empty".to_owned());
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            telegram_bot_token: normalize_secret(args.telegram_bot_token),
            telegram_chat_id: normalize_secret(args.telegram_chat_id),
            kofi_token: normalize_secret(args.kofi_token),
            gist_url: normalize_secret(args.gist_url),
            gist_token: normalize_secret(args.gist_token),
            gist_filename,
            telegram_api_base_url: args.telegram_api_base_url,
            github_api_base_url: args.github_api_base_url,
            notification: NotificationTemplate {
                title: args.notification_title,
                footer: args.notification_footer,
            },
            http_timeout: Duration::from_millis(args.http_timeout_ms),
            runtime_version: args.runtime_version,
            log_filter: args.log_filter,
            json_logs: args.json_logs,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub fn telegram_configured(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    #[must_use]
    pub fn supporter_list_configured(&self) -> bool {
        self.gist_url.is_some() && self.gist_token.is_some()
    }

    #[must_use]
    pub fn for_test(host: IpAddr, port: u16) -> Self {
        Self {
            host,
            port,
            telegram_bot_token: Some("test-token".to_owned()),
            telegram_chat_id: Some("4242".to_owned()),
            kofi_token: Some("T".to_owned()),
            gist_url: None,
            gist_token: None,
            gist_filename: DEFAULT_GIST_FILENAME.to_owned(),
            telegram_api_base_url: "http://127.0.0.1:9".to_owned(),
            github_api_base_url: "http://127.0.0.1:9".to_owned(),
            notification: NotificationTemplate::default(),
            http_timeout: Duration::from_millis(3_000),
            runtime_version: "test".to_owned(),
            log_filter: "warn".to_owned(),
            json_logs: false,
        }
    }
}

/// Where the supporter list lives and how to write it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupporterListTarget {
    pub url: String,
    pub token: String,
    pub filename: String,
}

/// Settings for a single webhook invocation, resolved from [`RuntimeConfig`]
/// before the request body is looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub bot_token: String,
    pub chat_id: String,
    pub verification_token: String,
    pub supporter_list: Option<SupporterListTarget>,
}

impl RelaySettings {
    pub fn resolve(config: &RuntimeConfig) -> Result<Self, RelayError> {
        let (Some(bot_token), Some(chat_id)) =
            (&config.telegram_bot_token, &config.telegram_chat_id)
        else {
            return Err(RelayError::MissingTelegramConfig);
        };
        let Some(verification_token) = &config.kofi_token else {
            return Err(RelayError::MissingVerificationToken);
        };

        let supporter_list = match (&config.gist_url, &config.gist_token) {
            (Some(url), Some(token)) => Some(SupporterListTarget {
                url: url.clone(),
                token: token.clone(),
                filename: config.gist_filename.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            bot_token: bot_token.clone(),
            chat_id: chat_id.clone(),
            verification_token: verification_token.clone(),
            supporter_list,
        })
    }
}

fn normalize_secret(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}
