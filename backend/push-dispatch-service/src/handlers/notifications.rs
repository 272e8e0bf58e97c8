//! Push dispatch handlers
use crate::error::DispatchError;
use crate::metrics;
use crate::models::NotificationRequest;
use crate::services::DispatchService;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Fan a notification out to every matching device
///
/// POST /functions/v1/send-push-notification
pub async fn send_push_notification(
    service: web::Data<Arc<DispatchService>>,
    req: web::Json<NotificationRequest>,
) -> Result<HttpResponse, DispatchError> {
    match service.dispatch(&req).await {
        Ok(response) => {
            metrics::record_dispatch("ok");
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            metrics::record_dispatch(e.code());
            Err(e)
        }
    }
}

/// Bodies are parsed as JSON whatever the Content-Type header says;
/// malformed ones get the same JSON error shape as dispatch failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            metrics::record_dispatch("INVALID_REQUEST");
            DispatchError::BadRequest(err.to_string()).into()
        })
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route(
            "/functions/v1/send-push-notification",
            web::post().to(send_push_notification),
        )
        .route(
            "/send-push-notification",
            web::post().to(send_push_notification),
        );
}
