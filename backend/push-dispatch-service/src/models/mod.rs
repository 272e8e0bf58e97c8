use fcm_shared::PushNotification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of leading token characters kept in responses and logs
pub const TOKEN_DISPLAY_PREFIX: usize = 20;

/// Inbound notification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
    #[serde(default)]
    pub target_user_id: Option<RecipientId>,
}

/// User id as sent by callers, either a JSON string or a JSON number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientId {
    Text(String),
    Number(serde_json::Number),
}

impl RecipientId {
    /// `""` and `0` select every device.
    pub fn is_blank(&self) -> bool {
        match self {
            RecipientId::Text(id) => id.is_empty(),
            RecipientId::Number(id) => id.as_f64() == Some(0.0),
        }
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientId::Text(id) => f.write_str(id),
            RecipientId::Number(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for RecipientId {
    fn from(id: &str) -> Self {
        RecipientId::Text(id.to_string())
    }
}

impl NotificationRequest {
    /// Single recipient filter, rendered for the `user_id=eq.` query.
    pub fn recipient(&self) -> Option<String> {
        self.target_user_id
            .as_ref()
            .filter(|id| !id.is_blank())
            .map(RecipientId::to_string)
    }

    pub fn to_push_notification(&self) -> PushNotification {
        PushNotification {
            title: self.title.clone(),
            body: self.body.clone(),
            data: self.data.clone().unwrap_or_default(),
        }
    }
}

/// Per-token delivery result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub token: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl DeliveryOutcome {
    pub fn delivered(token: &str) -> Self {
        Self {
            token: display_token(token),
            success: true,
            error: None,
        }
    }

    pub fn failed(token: &str, error: serde_json::Value) -> Self {
        Self {
            token: display_token(token),
            success: false,
            error: Some(error),
        }
    }
}

/// Response envelope for a completed dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub sent: usize,
    pub total: usize,
    pub results: Vec<DeliveryOutcome>,
}

impl DispatchResponse {
    pub fn from_outcomes(results: Vec<DeliveryOutcome>) -> Self {
        Self {
            success: true,
            sent: results.iter().filter(|r| r.success).count(),
            total: results.len(),
            results,
        }
    }
}

/// Truncated form of a device token, safe to echo back and log.
pub fn display_token(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_DISPLAY_PREFIX).collect();
    format!("{}...", prefix)
}
