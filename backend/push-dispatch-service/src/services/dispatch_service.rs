use std::time::Duration;

use fcm_shared::{FCMClient, ServiceAccountKey};
use tracing::error;

use crate::config::{Config, DispatchEnv, PushConfig};
use crate::error::{DispatchError, Result};
use crate::models::{DispatchResponse, NotificationRequest};
use crate::services::dispatcher::NotificationDispatcher;
use crate::services::token_store::SupabaseTokenStore;

/// Per-request entry point shared by the HTTP handlers.
///
/// Settings and credentials are resolved on every call; only the HTTP
/// connection pool outlives a request.
pub struct DispatchService {
    env: DispatchEnv,
    push: PushConfig,
    http_client: reqwest::Client,
}

impl DispatchService {
    pub fn new(env: DispatchEnv, push: PushConfig, http_client: reqwest::Client) -> Self {
        Self {
            env,
            push,
            http_client,
        }
    }

    pub fn from_config(config: &Config) -> std::result::Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.push.http_timeout_secs))
            .build()?;

        Ok(Self::new(
            config.dispatch.clone(),
            config.push.clone(),
            http_client,
        ))
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchResponse> {
        let settings = self.env.resolve()?;

        let credentials =
            ServiceAccountKey::from_json(&settings.service_account_json).map_err(|e| {
                error!(error = %e, "Rejected FIREBASE_SERVICE_ACCOUNT_JSON");
                DispatchError::InvalidCredentialDocument(e.to_string())
            })?;

        let store = SupabaseTokenStore::new(
            settings.supabase_url,
            settings.supabase_key,
            self.http_client.clone(),
        );
        let gateway = FCMClient::new(settings.project_id, credentials)
            .with_http_client(self.http_client.clone())
            .with_api_base(self.push.fcm_api_base.clone());

        NotificationDispatcher::new(store, gateway, self.push.delivery_concurrency)
            .dispatch(request)
            .await
    }
}
