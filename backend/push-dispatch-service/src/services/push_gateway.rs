/// Push delivery seam
///
/// The dispatcher talks to FCM through this trait so the fan-out logic
/// can run against an in-memory gateway in tests.
use async_trait::async_trait;
use fcm_shared::{AccessToken, FCMClient, FCMError, FCMSendResult, PushNotification};

#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Obtain a bearer token for this dispatch.
    async fn authorize(&self) -> Result<AccessToken, FCMError>;

    /// Deliver one message to one device.
    async fn deliver(
        &self,
        access_token: &str,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<FCMSendResult, FCMError>;
}

#[async_trait]
impl PushGateway for FCMClient {
    async fn authorize(&self) -> Result<AccessToken, FCMError> {
        self.fetch_access_token().await
    }

    async fn deliver(
        &self,
        access_token: &str,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<FCMSendResult, FCMError> {
        self.send(access_token, device_token, notification).await
    }
}
