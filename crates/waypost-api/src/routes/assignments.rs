//! # Assignment API
//!
//! `POST /assignments` submits a completed wizard: anchor, candidate,
//! direction and the five safety attestations. A committed assignment
//! returns 201 even when channel provisioning failed; the failure is
//! listed in `data.warnings`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use waypost_engine::{AssignmentOutcome, AssignmentRequest};

use crate::auth::CallerIdentity;
use crate::error::{ApiResponse, AppError};
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the assignments router.
pub fn router() -> Router<AppState> {
    Router::new().route("/assignments", post(create_assignment))
}

/// POST /assignments: Bind a package to a trip.
#[utoipa::path(
    post,
    path = "/assignments",
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Assignment committed", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Malformed body or trip not accepting packages", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller does not own the anchor", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Package or trip not found", body = crate::openapi::EnvelopeDoc),
        (status = 409, description = "Already matched or capacity exceeded", body = crate::openapi::EnvelopeDoc),
        (status = 422, description = "Safety confirmations incomplete", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "assignments"
)]
pub(crate) async fn create_assignment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AssignmentOutcome>>), AppError> {
    let request = extract_json(body)?;
    let outcome = state
        .coordinator
        .request_assignment(request, &caller.principal())?;
    let message = if outcome.warnings.is_empty() {
        "assignment committed".to_string()
    } else {
        format!("assignment committed with warnings: {}", outcome.warnings.join("; "))
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome, message))))
}
