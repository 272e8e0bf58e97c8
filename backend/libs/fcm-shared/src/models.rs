use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::FCMError;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Accepted FCM message; rejections surface as `FCMError::ApiError`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FCMSendResult {
    /// `projects/{project}/messages/{id}` as returned by FCM
    pub message_id: Option<String>,
}

/// Firebase Service Account Key
///
/// Only `client_email` and `private_key` take part in the token exchange;
/// the other fields are accepted so a downloaded key file parses as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse a service account JSON document.
    pub fn from_json(document: &str) -> Result<Self, FCMError> {
        serde_json::from_str(document).map_err(|e| FCMError::InvalidServiceAccount(e.to_string()))
    }
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Bearer token returned by the OAuth2 exchange.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

/// Title, body and data shared by every message of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// FCM Message Request
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: FcmMessageContent,
}

/// FCM Message Content
#[derive(Debug, Serialize)]
pub struct FcmMessageContent {
    pub token: String,
    pub notification: FcmNotification,
    pub data: HashMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

/// FCM Notification Payload
#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct AndroidConfig {
    pub priority: String,
}

#[derive(Debug, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Serialize)]
pub struct Aps {
    pub sound: String,
    pub badge: u32,
}

/// FCM API Response
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}
