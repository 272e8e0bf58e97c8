use thiserror::Error;

/// FCM Client Error Types
#[derive(Error, Debug)]
pub enum FCMError {
    #[error("Invalid service account JSON: {0}")]
    InvalidServiceAccount(String),

    #[error("Failed to parse private key: {0}")]
    KeyParseError(String),

    #[error("Failed to encode JWT: {0}")]
    JwtEncodeError(String),

    #[error("Failed to get access token: {0}")]
    TokenError(String),

    #[error("Token request failed with status {status}: {body}")]
    TokenRequestFailed { status: u16, body: String },

    #[error("Failed to parse token response: {0}")]
    TokenParseError(String),

    #[error("FCM send request failed: {0}")]
    SendRequestError(String),

    #[error("FCM API error: {status} - {body}")]
    ApiError {
        status: u16,
        body: serde_json::Value,
    },
}

impl FCMError {
    /// Error detail suitable for a per-token delivery outcome.
    ///
    /// Provider rejections keep the provider's JSON body; everything else
    /// collapses to the display string.
    pub fn detail(&self) -> serde_json::Value {
        match self {
            FCMError::ApiError { body, .. } => body.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}
