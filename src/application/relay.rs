use chrono::Utc;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    application::{
        config::{RelaySettings, SupporterListTarget},
        state::SharedState,
    },
    domain::{
        donation::{DonationPayload, RedactedDonation},
        error::RelayError,
        notification::format_notification,
    },
    interfaces::telegram::TelegramClient,
    protocol::{PLACEHOLDER_REPLY, RelayOutcome},
    security::auth::verify_payload_token,
    storage::{GistStore, extract_gist_id},
};

/// What the webhook answers for one submission.
#[derive(Debug)]
pub enum RelayReply {
    /// No `data` field: nothing to relay.
    Acknowledged,
    Completed,
    Failed(RelayError),
}

impl RelayReply {
    #[must_use]
    pub fn outcome(&self) -> Option<RelayOutcome> {
        match self {
            Self::Acknowledged => None,
            Self::Completed => Some(RelayOutcome::succeeded()),
            Self::Failed(error) => Some(RelayOutcome::failed(error.to_string())),
        }
    }

    #[must_use]
    pub fn into_body(self) -> Value {
        match self.outcome() {
            Some(outcome) => json!(outcome),
            None => Value::String(PLACEHOLDER_REPLY.to_owned()),
        }
    }
}

/// Runs one webhook submission to completion: authenticate, redact, notify
/// Telegram, then append to the supporter list when one is configured.
///
/// Steps run strictly in that order. A Telegram failure does not stop the
/// list update, but any list failure ends the request.
pub async fn process_submission(state: &SharedState, data: Option<String>) -> RelayReply {
    let settings = match RelaySettings::resolve(state.config()) {
        Ok(settings) => settings,
        Err(error) => {
            error!("relay configuration incomplete: {error}");
            return RelayReply::Failed(error);
        }
    };

    let Some(data) = data.filter(|data| !data.trim().is_empty()) else {
        info!("webhook called without data, nothing to relay");
        return RelayReply::Acknowledged;
    };

    match relay_donation(state, &settings, &data).await {
        Ok(()) => RelayReply::Completed,
        Err(error) => RelayReply::Failed(error),
    }
}

async fn relay_donation(
    state: &SharedState,
    settings: &RelaySettings,
    data: &str,
) -> Result<(), RelayError> {
    let raw: Value = serde_json::from_str(data).map_err(|error| {
        error!("webhook data is not valid json: {error}");
        RelayError::InvalidPayload
    })?;

    let message_id = raw
        .get("message_id")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();

    if let Err(reason) = verify_payload_token(&raw, &settings.verification_token) {
        error!("rejected webhook payload {message_id}: {reason:?}");
        return Err(reason.into());
    }

    let donation = DonationPayload::from_value(raw)
        .inspect_err(|_| error!("webhook payload {message_id} has an unexpected shape"))?
        .redact();
    info!("received donation payload {}", donation.message_id());

    let dispatched = notify_telegram(state, settings, &donation).await;

    let Some(target) = &settings.supporter_list else {
        info!(
            "skipping supporter list update for payload {}: not configured",
            donation.message_id()
        );
        return dispatched;
    };

    if let Err(error) = append_supporter(state, target, &donation).await {
        error!(
            "supporter list update failed for payload {}: {error}",
            donation.message_id()
        );
        return Err(error);
    }

    dispatched
}

async fn notify_telegram(
    state: &SharedState,
    settings: &RelaySettings,
    donation: &RedactedDonation,
) -> Result<(), RelayError> {
    let config = state.config();
    let text = format_notification(donation, &config.notification);
    let client = TelegramClient::new(
        state.http_client(),
        &config.telegram_api_base_url,
        &settings.bot_token,
    );

    match client.send_message(&settings.chat_id, &text).await {
        Ok(()) => {
            info!("dispatched telegram notification for payload {}", donation.message_id());
            Ok(())
        }
        Err(error) => {
            error!(
                "telegram notification failed for payload {}: {error}",
                donation.message_id()
            );
            Err(error)
        }
    }
}

async fn append_supporter(
    state: &SharedState,
    target: &SupporterListTarget,
    donation: &RedactedDonation,
) -> Result<(), RelayError> {
    let store = GistStore::new(
        state.http_client(),
        &state.config().github_api_base_url,
        &target.token,
    );

    let mut supporters = store.fetch_supporters(&target.url).await?;
    supporters.push(donation.to_value()?);

    let gist_id = extract_gist_id(&target.url).ok_or(RelayError::GistIdMissing)?;
    let description = format!(
        "Last updated at {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    store
        .write_supporters(gist_id, &target.filename, &description, &supporters)
        .await?;

    info!(
        "updated supporter list for payload {} ({} supporters)",
        donation.message_id(),
        supporters.len()
    );
    Ok(())
}
