use thiserror::Error;

/// Every way a webhook invocation can fail. The `Display` text is what the
/// caller receives in the `error` field of the response body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Telegram bot token or chat ID is missing.")]
    MissingTelegramConfig,
    #[error("Ko-fi token required.")]
    MissingVerificationToken,
    #[error("Ko-fi token does not match.")]
    TokenMismatch,
    #[error("Payload data invalid.")]
    InvalidPayload,
    #[error("{0}")]
    Telegram(String),
    #[error("Gist not found.")]
    GistNotFound,
    #[error("Problem retrieving gist content: {0}")]
    GistFetch(String),
    #[error("Gist content is not a list.")]
    GistNotAList,
    #[error("Could not get Gist ID from URL.")]
    GistIdMissing,
    #[error("Update gist failed: {0}")]
    GistUpdate(String),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to initialize logger: {0}")]
    Logging(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
    #[error("{0}")]
    Server(String),
}
