use thiserror::Error;

/// Errors from the media library backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Text suitable for showing to the user.
    ///
    /// For non-success responses this is the server's own `error` message
    /// (or `HTTP <status>` when it sent none).
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
