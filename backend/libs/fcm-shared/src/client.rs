use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tracing::debug;

use crate::errors::FCMError;
use crate::models::*;

pub const DEFAULT_FCM_API_BASE: &str = "https://fcm.googleapis.com";
pub const FCM_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Firebase Cloud Messaging Client
///
/// Signs service-account assertions, exchanges them for OAuth2 access
/// tokens and delivers HTTP v1 messages. Access tokens are never cached:
/// callers fetch one per dispatch and pass it to [`FCMClient::send`].
#[derive(Clone)]
pub struct FCMClient {
    pub project_id: String,
    pub credentials: Arc<ServiceAccountKey>,
    api_base: String,
    http_client: reqwest::Client,
}

impl FCMClient {
    /// Create new FCM client
    ///
    /// # Arguments
    /// * `project_id` - Firebase project ID
    /// * `credentials` - Service account key with OAuth2 credentials
    pub fn new(project_id: String, credentials: ServiceAccountKey) -> Self {
        Self {
            project_id,
            credentials: Arc::new(credentials),
            api_base: DEFAULT_FCM_API_BASE.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Reuse an existing connection pool.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Point message delivery at a different FCM host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.api_base, self.project_id
        )
    }

    /// Build the HTTP v1 payload for a single device.
    pub fn build_message(device_token: &str, notification: &PushNotification) -> FcmMessage {
        FcmMessage {
            message: FcmMessageContent {
                token: device_token.to_string(),
                notification: FcmNotification {
                    title: notification.title.clone(),
                    body: notification.body.clone(),
                },
                data: notification.data.clone(),
                android: AndroidConfig {
                    priority: "high".to_string(),
                },
                apns: ApnsConfig {
                    payload: ApnsPayload {
                        aps: Aps {
                            sound: "default".to_string(),
                            badge: 1,
                        },
                    },
                },
            },
        }
    }

    /// Send notification via FCM to a single device
    pub async fn send(
        &self,
        access_token: &str,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<FCMSendResult, FCMError> {
        let message = Self::build_message(device_token, notification);

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&message)
            .send()
            .await
            .map_err(|e| FCMError::SendRequestError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FCMError::SendRequestError(e.to_string()))?;
        let body = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value,
            Err(_) => serde_json::Value::String(text),
        };

        if !status.is_success() {
            return Err(FCMError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let fcm_response: FcmApiResponse =
            serde_json::from_value(body).unwrap_or(FcmApiResponse { name: None });
        debug!(message_id = ?fcm_response.name, "FCM accepted message");

        Ok(FCMSendResult {
            message_id: fcm_response.name,
        })
    }

    /// Sign the JWT-bearer assertion for the token exchange.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, FCMError> {
        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: FCM_MESSAGING_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| FCMError::KeyParseError(e.to_string()))?;

        encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| FCMError::JwtEncodeError(e.to_string()))
    }

    /// Exchange a freshly signed assertion for an OAuth2 access token.
    pub async fn fetch_access_token(&self) -> Result<AccessToken, FCMError> {
        let assertion = self.sign_assertion(Utc::now())?;

        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FCMError::TokenError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FCMError::TokenParseError(e.to_string()))?;

        if !status.is_success() {
            return Err(FCMError::TokenRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: GoogleTokenResponse = serde_json::from_str(&body)
            .map_err(|e| FCMError::TokenParseError(e.to_string()))?;

        match token_response.access_token {
            Some(access_token) if !access_token.is_empty() => {
                debug!(
                    token_type = ?token_response.token_type,
                    expires_in = ?token_response.expires_in,
                    "Obtained FCM access token"
                );
                Ok(AccessToken {
                    access_token,
                    expires_in: token_response.expires_in,
                })
            }
            _ => Err(FCMError::TokenRequestFailed {
                status: status.as_u16(),
                body,
            }),
        }
    }
}
