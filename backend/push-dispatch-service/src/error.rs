/// Error types for the push dispatch service
///
/// Every variant is a whole-request failure. Per-token delivery failures
/// never surface here; they are recorded in the dispatch outcome list.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    ConfigurationMissing(Vec<&'static str>),

    /// Carries the parser message, which already names the document.
    #[error("{0}")]
    InvalidCredentialDocument(String),

    #[error("Failed to fetch device tokens: {0}")]
    RecipientQueryFailed(String),

    #[error("No valid device token found")]
    NoValidRecipients,

    #[error("OAuth2 access token exchange failed: {0}")]
    CredentialExchangeFailed(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::ConfigurationMissing(_) => "CONFIGURATION_MISSING",
            DispatchError::InvalidCredentialDocument(_) => "INVALID_CREDENTIAL_DOCUMENT",
            DispatchError::RecipientQueryFailed(_) => "RECIPIENT_QUERY_FAILED",
            DispatchError::NoValidRecipients => "NO_VALID_RECIPIENTS",
            DispatchError::CredentialExchangeFailed(_) => "CREDENTIAL_EXCHANGE_FAILED",
            DispatchError::BadRequest(_) => "INVALID_REQUEST",
        }
    }
}

/// Error body returned for whole-request failures
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::NoValidRecipients | DispatchError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::ConfigurationMissing(_)
            | DispatchError::InvalidCredentialDocument(_)
            | DispatchError::RecipientQueryFailed(_)
            | DispatchError::CredentialExchangeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.to_string(),
            code: self.code(),
        })
    }
}
