//! # Request Metrics
//!
//! Records `waypost_http_requests_total` and
//! `waypost_http_request_duration_seconds` through the `metrics` facade.
//! Labels use the matched route template, not the raw URI, so ids do not
//! explode label cardinality. Without an installed recorder the macros are
//! no-ops.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};

/// Middleware that counts requests and observes their latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "waypost_http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "waypost_http_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(started.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn passes_response_through() {
        let app = Router::new()
            .route("/items/{id}", get(|| async { "item" }))
            .layer(from_fn(metrics_middleware));
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/items/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
