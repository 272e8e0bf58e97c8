/// Device token lookup
///
/// Tokens live in the `user_tokens` table and are read through the
/// PostgREST endpoint that fronts the database.
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token store unreachable: {0}")]
    Unreachable(String),

    #[error("token store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response from user_tokens: {0}")]
    UnexpectedShape(String),
}

/// Source of device tokens
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Raw `fcm_token` column values, one per row, filtered to `recipient`
    /// when given. Rows without a string token come back as `None`.
    async fn fetch_tokens(
        &self,
        recipient: Option<&str>,
    ) -> Result<Vec<Option<String>>, TokenStoreError>;
}

/// Keep only non-empty tokens, in store order.
pub fn valid_tokens(raw: Vec<Option<String>>) -> Vec<String> {
    raw.into_iter()
        .flatten()
        .filter(|token| !token.is_empty())
        .collect()
}

pub struct SupabaseTokenStore {
    base_url: String,
    service_key: String,
    http_client: reqwest::Client,
}

impl SupabaseTokenStore {
    pub fn new(base_url: String, service_key: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            http_client,
        }
    }

    pub fn tokens_url(&self) -> String {
        format!("{}/rest/v1/user_tokens", self.base_url)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl TokenStore for SupabaseTokenStore {
    async fn fetch_tokens(
        &self,
        recipient: Option<&str>,
    ) -> Result<Vec<Option<String>>, TokenStoreError> {
        let mut query = vec![("select", "fcm_token".to_string())];
        if let Some(user_id) = recipient {
            query.push(("user_id", format!("eq.{}", user_id)));
        }

        let response = self
            .http_client
            .get(self.tokens_url())
            .query(&query)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| TokenStoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenStoreError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(TokenStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(rows)) => rows,
            Ok(other) => {
                return Err(TokenStoreError::UnexpectedShape(format!(
                    "expected an array of rows, got {}",
                    json_kind(&other)
                )))
            }
            Err(e) => return Err(TokenStoreError::UnexpectedShape(e.to_string())),
        };

        debug!(rows = rows.len(), "Fetched user_tokens rows");

        Ok(rows
            .iter()
            .map(|row| {
                row.get("fcm_token")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tokens_drops_null_and_empty() {
        let raw = vec![
            Some(String::new()),
            Some("abc".to_string()),
            None,
            Some("xyz".to_string()),
        ];

        assert_eq!(valid_tokens(raw), vec!["abc".to_string(), "xyz".to_string()]);
    }

    #[test]
    fn test_valid_tokens_keeps_duplicates() {
        let raw = vec![Some("abc".to_string()), Some("abc".to_string())];
        assert_eq!(valid_tokens(raw).len(), 2);
    }

    #[test]
    fn test_tokens_url_strips_trailing_slash() {
        let store = SupabaseTokenStore::new(
            "https://abc.supabase.co/".to_string(),
            "key".to_string(),
            reqwest::Client::new(),
        );
        assert_eq!(store.tokens_url(), "https://abc.supabase.co/rest/v1/user_tokens");
    }
}
