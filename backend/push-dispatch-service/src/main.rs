use actix_web::{middleware, web, App, HttpServer};
use push_dispatch_service::{
    handlers::register_routes as register_notifications, metrics, Config, DispatchService,
};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting push dispatch service");

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let missing = config.dispatch.missing_variables();
    if !missing.is_empty() {
        // Requests will answer with CONFIGURATION_MISSING until these are set
        tracing::warn!(
            missing = ?missing,
            "Dispatch configuration incomplete"
        );
    }

    let dispatch_service = Arc::new(
        DispatchService::from_config(&config)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?,
    );

    let addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(env = %config.app.env, "Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(dispatch_service.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::from_fn(metrics::track_http_metrics))
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(register_notifications)
    })
    .bind(&addr)?
    .run()
    .await
}
