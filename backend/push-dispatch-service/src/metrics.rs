use std::time::{Duration, Instant};

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    Error, HttpResponse,
};
use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder};

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "push_dispatch_http_requests_total",
            "Total HTTP requests handled by push-dispatch-service",
        ),
        &["method", "path", "status"],
    )
    .expect("failed to create push_dispatch_http_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register push_dispatch_http_requests_total");
    counter
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "push_dispatch_http_request_duration_seconds",
            "HTTP request latency for push-dispatch-service",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["method", "path", "status"],
    )
    .expect("failed to create push_dispatch_http_request_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register push_dispatch_http_request_duration_seconds");
    histogram
});

static DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "push_dispatch_deliveries_total",
            "Per-token FCM delivery attempts by outcome",
        ),
        &["outcome"],
    )
    .expect("failed to create push_dispatch_deliveries_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register push_dispatch_deliveries_total");
    counter
});

static DISPATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "push_dispatch_requests_total",
            "Dispatch requests by result code",
        ),
        &["result"],
    )
    .expect("failed to create push_dispatch_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register push_dispatch_requests_total");
    counter
});

pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status_label = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status_label])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status_label])
        .observe(elapsed.as_secs_f64());
}

pub fn record_delivery(success: bool) {
    let outcome = if success { "delivered" } else { "failed" };
    DELIVERIES_TOTAL.with_label_values(&[outcome]).inc();
}

/// `result` is `"ok"` or a `DispatchError` code.
pub fn record_dispatch(result: &str) {
    DISPATCHES_TOTAL.with_label_values(&[result]).inc();
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

/// Records request count and latency, labelled by matched route.
pub async fn track_http_metrics(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().as_str().to_string();
    // Unmatched paths collapse into one label
    let path = req
        .match_pattern()
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let result = next.call(req).await;
    let status = match &result {
        Ok(response) => response.status().as_u16(),
        Err(err) => err.as_response_error().status_code().as_u16(),
    };
    observe_http_request(&method, &path, status, start.elapsed());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{middleware, test, web, App};

    fn requests_for(method: &str, path: &str, status: &str) -> u64 {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[method, path, status])
            .get()
    }

    #[actix_web::test]
    async fn test_requests_are_labelled_by_route_pattern() {
        let app = test::init_service(
            App::new()
                .wrap(middleware::from_fn(track_http_metrics))
                .route("/items/{id}", web::get().to(|| async { "ok" })),
        )
        .await;
        let before = requests_for("GET", "/items/{id}", "200");

        let req = test::TestRequest::get().uri("/items/42").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(requests_for("GET", "/items/{id}", "200"), before + 1);
        assert_eq!(requests_for("GET", "/items/42", "200"), 0);
    }

    #[actix_web::test]
    async fn test_metrics_endpoint_exposes_counters() {
        record_dispatch("ok");
        record_delivery(false);

        let app = test::init_service(App::new().route("/metrics", web::get().to(serve_metrics))).await;
        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.contains("push_dispatch_requests_total{result=\"ok\"}"));
        assert!(text.contains("push_dispatch_deliveries_total{outcome=\"failed\"}"));
    }
}
