//! # waypost-api: HTTP Surface for Waypost
//!
//! Axum routes over the engine services. Handlers translate HTTP into
//! engine calls and [`EngineError`](waypost_engine::EngineError)s into
//! status codes. They contain no business rules of their own.
//!
//! ## Routes
//!
//! | Prefix | Module |
//! |---|---|
//! | `/packages` | [`routes::packages`] |
//! | `/trips` | [`routes::trips`] |
//! | `/assignments` | [`routes::assignments`] |
//! | `/health/*`, `/metrics`, `/openapi.json` | unauthenticated |
//!
//! Every JSON response uses the [`ApiResponse`](error::ApiResponse)
//! envelope `{success, data, message}`.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Build the complete Axum application.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::packages::router())
        .merge(routes::trips::router())
        .merge(routes::assignments::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(auth_config));

    // Unauthenticated probes, metrics and the API document.
    let public = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics))
        .merge(openapi::router());

    Router::new().merge(public).merge(api).with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// Prometheus text exposition. Empty when no recorder is installed.
async fn render_metrics(State(state): State<AppState>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
