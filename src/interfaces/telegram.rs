use reqwest::StatusCode;
use serde::Serialize;

use crate::domain::error::RelayError;

const TELEGRAM_PARSE_MODE: &str = "Markdown";

#[derive(Debug, Serialize)]
struct TelegramSendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Outbound side of the Telegram Bot API.
pub struct TelegramClient<'a> {
    http: &'a reqwest::Client,
    base_url: &'a str,
    bot_token: &'a str,
}

impl<'a> TelegramClient<'a> {
    #[must_use]
    pub fn new(http: &'a reqwest::Client, base_url: &'a str, bot_token: &'a str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/'),
            bot_token,
        }
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), RelayError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let body = TelegramSendMessageBody {
            chat_id,
            text,
            parse_mode: TELEGRAM_PARSE_MODE,
        };

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            // The request URL embeds the bot token, keep it out of the message.
            .map_err(|error| {
                RelayError::Telegram(format!(
                    "Telegram request failed: {}",
                    error.without_url()
                ))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RelayError::Telegram(format!(
                "Telegram API error: {}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}
