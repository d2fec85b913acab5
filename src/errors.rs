//! Error types for the classifieds client

use thiserror::Error;

/// Errors that can occur while resolving items, building listings or talking to the API
#[derive(Error, Debug)]
pub enum Error {
    #[error("No token provided, set a token to use this method")]
    MissingToken,

    #[error("No API key provided, set an API key to use this method")]
    MissingApiKey,

    #[error("{0} must be buy or sell")]
    InvalidIntent(String),

    #[error("Amount for {0} must be a finite number")]
    InvalidAmount(String),

    #[error("Invalid listing id '{0}'")]
    InvalidListingId(String),

    #[error("Could not resolve sku {sku}: {reason}")]
    Resolution { sku: String, reason: String },

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("User {steam_id} not found")]
    UserNotFound { steam_id: String },

    #[error("Batch row {index} failed: {detail}")]
    RowFailed { index: usize, detail: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn resolution(sku: &str, reason: impl Into<String>) -> Self {
        Error::Resolution {
            sku: sku.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_intent_message() {
        let err = Error::InvalidIntent("trade".to_string());
        assert_eq!(err.to_string(), "trade must be buy or sell");
    }

    #[test]
    fn test_resolution_message() {
        let err = Error::resolution("1;x", "bad quality");
        assert_eq!(err.to_string(), "Could not resolve sku 1;x: bad quality");
    }
}
