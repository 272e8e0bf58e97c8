use fcm_shared::DEFAULT_FCM_API_BASE;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub push: PushConfig,
    pub dispatch: DispatchEnv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Base URL of the FCM HTTP v1 API
    #[serde(default = "default_fcm_api_base")]
    pub fcm_api_base: String,
    /// Maximum number of in-flight deliveries per dispatch
    #[serde(default = "default_delivery_concurrency")]
    pub delivery_concurrency: usize,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            fcm_api_base: default_fcm_api_base(),
            delivery_concurrency: default_delivery_concurrency(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Variables the dispatch function needs on every invocation.
///
/// They are captured at startup but only validated when a request comes
/// in, so a misconfigured deployment still answers with an error body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchEnv {
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub firebase_service_account_json: Option<String>,
    pub firebase_project_id: Option<String>,
}

/// Validated per-invocation settings.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub supabase_url: String,
    pub supabase_key: String,
    pub service_account_json: String,
    pub project_id: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl DispatchEnv {
    /// Names of the variables that are unset or empty.
    pub fn missing_variables(&self) -> Vec<&'static str> {
        [
            ("SUPABASE_URL", &self.supabase_url),
            ("SUPABASE_SERVICE_ROLE_KEY", &self.supabase_service_role_key),
            (
                "FIREBASE_SERVICE_ACCOUNT_JSON",
                &self.firebase_service_account_json,
            ),
            ("FIREBASE_PROJECT_ID", &self.firebase_project_id),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn resolve(&self) -> Result<DispatchSettings, DispatchError> {
        match (
            present(&self.supabase_url),
            present(&self.supabase_service_role_key),
            present(&self.firebase_service_account_json),
            present(&self.firebase_project_id),
        ) {
            (Some(url), Some(key), Some(service_account_json), Some(project_id)) => {
                Ok(DispatchSettings {
                    supabase_url: url.trim_end_matches('/').to_string(),
                    supabase_key: key.to_string(),
                    service_account_json: service_account_json.to_string(),
                    project_id: project_id.to_string(),
                })
            }
            _ => Err(DispatchError::ConfigurationMissing(self.missing_variables())),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: envy::prefixed("APP_").from_env()?,
            push: envy::prefixed("PUSH_").from_env()?,
            dispatch: envy::from_env()?,
        })
    }
}

fn default_env() -> String {
    "development".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_fcm_api_base() -> String {
    DEFAULT_FCM_API_BASE.to_string()
}

fn default_delivery_concurrency() -> usize {
    4
}

fn default_http_timeout_secs() -> u64 {
    30
}
