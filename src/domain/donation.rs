use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::RelayError;

pub const REDACTION_MASK: &str = "*****";

/// A Ko-fi webhook payload as received, before redaction.
///
/// Fields the relay does not interpret are kept in `extra` so the persisted
/// record mirrors what Ko-fi sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationPayload {
    verification_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    from_name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(deserialize_with = "string_or_number")]
    amount: Value,
    currency: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    kofi_transaction_id: Option<String>,
    #[serde(default)]
    shipping: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl DonationPayload {
    pub fn from_value(value: Value) -> Result<Self, RelayError> {
        serde_json::from_value(value).map_err(|_| RelayError::InvalidPayload)
    }

    #[must_use]
    pub fn redact(mut self) -> RedactedDonation {
        self.verification_token = REDACTION_MASK.to_owned();
        self.email = Some(REDACTION_MASK.to_owned());
        self.kofi_transaction_id = Some(REDACTION_MASK.to_owned());
        self.shipping = None;
        RedactedDonation(self)
    }
}

/// A payload whose secrets have been masked. Only this type is formatted,
/// logged, or persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RedactedDonation(DonationPayload);

impl RedactedDonation {
    #[must_use]
    pub fn message_id(&self) -> &str {
        self.0.message_id.as_deref().unwrap_or("unknown")
    }

    #[must_use]
    pub fn from_name(&self) -> &str {
        &self.0.from_name
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.0.kind
    }

    /// The amount as Ko-fi sent it, string or number, rendered as text.
    #[must_use]
    pub fn amount(&self) -> String {
        match &self.0.amount {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.0.currency
    }

    /// The donor's message, unless Ko-fi left it empty or sent the literal
    /// string `"null"`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.0
            .message
            .as_deref()
            .filter(|message| !message.is_empty() && *message != "null")
    }

    pub fn to_value(&self) -> Result<Value, RelayError> {
        serde_json::to_value(self).map_err(|_| RelayError::InvalidPayload)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Amount::deserialize(deserializer)? {
        Amount::Text(text) => Value::String(text),
        Amount::Number(number) => Value::Number(number),
    })
}
