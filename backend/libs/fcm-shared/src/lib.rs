/// FCM Shared Library
///
/// Firebase Cloud Messaging (FCM) HTTP v1 client used by the push dispatch
/// service.
///
/// It handles:
/// - Service account key parsing
/// - OAuth2 access tokens via a signed JWT-bearer assertion
/// - Single-device message delivery with Android and APNs hints

pub mod client;
pub mod errors;
pub mod models;

pub use client::{FCMClient, DEFAULT_FCM_API_BASE, FCM_MESSAGING_SCOPE};
pub use errors::FCMError;
pub use models::{AccessToken, FCMSendResult, FcmMessage, PushNotification, ServiceAccountKey};
