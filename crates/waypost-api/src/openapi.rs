//! # OpenAPI Document
//!
//! Assembles the utoipa-annotated handlers into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::state::AppState;

/// Schema of the `{success, data, message}` envelope. Documentation only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct EnvelopeDoc {
    /// Whether the operation succeeded.
    success: bool,
    /// The payload; `null` on failure.
    #[schema(value_type = Object)]
    data: serde_json::Value,
    /// Human-readable summary.
    message: String,
    /// Machine-readable error code, present only on failure.
    code: Option<String>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Bearer {role}:{user_id}:{secret}. Set the secret via AUTH_TOKEN.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// The assembled API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Waypost API",
        description = "Peer-to-peer package delivery: senders post packages, travelers post trips, and the two are matched under safety confirmations.\n\nAll endpoints except `/health/*`, `/metrics` and `/openapi.json` require `Authorization: Bearer <token>`."
    ),
    security(("bearer_auth" = [])),
    paths(
        // ── Packages ─────────────────────────────────────────────────
        crate::routes::packages::create_package,
        crate::routes::packages::list_packages,
        crate::routes::packages::get_package,
        crate::routes::packages::update_package,
        crate::routes::packages::delete_package,
        crate::routes::packages::update_package_status,
        crate::routes::packages::unassign_package,
        crate::routes::packages::trip_candidates,
        crate::routes::packages::package_confirmations,
        // ── Trips ────────────────────────────────────────────────────
        crate::routes::trips::create_trip,
        crate::routes::trips::list_trips,
        crate::routes::trips::get_trip,
        crate::routes::trips::update_trip,
        crate::routes::trips::delete_trip,
        crate::routes::trips::update_trip_status,
        crate::routes::trips::package_candidates,
        // ── Assignments ──────────────────────────────────────────────
        crate::routes::assignments::create_assignment,
    ),
    components(schemas(EnvelopeDoc)),
    modifiers(&SecurityAddon),
    tags(
        (name = "packages", description = "Package lifecycle and trip search"),
        (name = "trips", description = "Trip lifecycle and package search"),
        (name = "assignments", description = "Package-to-trip commits"),
    )
)]
pub struct ApiDoc;

/// Router serving `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/packages",
            "/packages/{id}",
            "/packages/{id}/status",
            "/packages/{id}/unassign",
            "/packages/{id}/candidates",
            "/packages/{id}/confirmations",
            "/trips",
            "/trips/{id}",
            "/trips/{id}/status",
            "/trips/{id}/candidates",
            "/assignments",
        ] {
            assert!(
                doc.paths.paths.contains_key(expected),
                "{expected} missing from {paths:?}"
            );
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
