/// Notification fan-out
///
/// fetch tokens -> filter -> obtain access token -> deliver per token.
/// Everything before the fan-out is all-or-nothing; individual deliveries
/// are recorded and never abort the remaining ones.
use fcm_shared::PushNotification;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::error::{DispatchError, Result};
use crate::metrics;
use crate::models::{display_token, DeliveryOutcome, DispatchResponse, NotificationRequest};
use crate::services::push_gateway::PushGateway;
use crate::services::token_store::{valid_tokens, TokenStore};

pub struct NotificationDispatcher<S, P> {
    store: S,
    gateway: P,
    concurrency: usize,
}

impl<S, P> NotificationDispatcher<S, P>
where
    S: TokenStore,
    P: PushGateway,
{
    pub fn new(store: S, gateway: P, concurrency: usize) -> Self {
        Self {
            store,
            gateway,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchResponse> {
        let recipient = request.recipient();

        let raw_tokens = self.store.fetch_tokens(recipient.as_deref()).await.map_err(|e| {
            error!(error = %e, "Failed to fetch device tokens");
            DispatchError::RecipientQueryFailed(e.to_string())
        })?;

        let tokens = valid_tokens(raw_tokens);
        info!(
            valid_tokens = tokens.len(),
            target_user_id = recipient.as_deref().unwrap_or("*"),
            "Resolved device tokens"
        );

        if tokens.is_empty() {
            return Err(DispatchError::NoValidRecipients);
        }

        let access_token = self.gateway.authorize().await.map_err(|e| {
            error!(error = %e, "Failed to obtain FCM access token");
            DispatchError::CredentialExchangeFailed(e.to_string())
        })?;

        let bearer = access_token.access_token.as_str();
        let notification = &request.to_push_notification();

        // buffered() keeps results in token order
        let results: Vec<DeliveryOutcome> = stream::iter(tokens.iter())
            .map(|token| self.deliver_one(bearer, token, notification))
            .buffered(self.concurrency)
            .collect()
            .await;

        let response = DispatchResponse::from_outcomes(results);
        info!(
            sent = response.sent,
            total = response.total,
            "Notifications dispatched"
        );

        Ok(response)
    }

    async fn deliver_one(
        &self,
        access_token: &str,
        token: &str,
        notification: &PushNotification,
    ) -> DeliveryOutcome {
        match self.gateway.deliver(access_token, token, notification).await {
            Ok(_) => {
                metrics::record_delivery(true);
                DeliveryOutcome::delivered(token)
            }
            Err(e) => {
                warn!(token = %display_token(token), error = %e, "FCM delivery failed");
                metrics::record_delivery(false);
                DeliveryOutcome::failed(token, e.detail())
            }
        }
    }
}
