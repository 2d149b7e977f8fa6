//! # Trip API
//!
//! Trip CRUD, status changes, and package candidates.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use waypost_core::TripId;
use waypost_match::Candidate;
use waypost_state::{Package, Trip, TripDraft, TripPatch, TripStatus};

use crate::auth::CallerIdentity;
use crate::error::{ApiResponse, ApiResult, AppError};
use crate::extractors::{extract_json, extract_path, extract_query, extract_validated_json};
use crate::routes::StatusChange;
use crate::state::AppState;

/// Query parameters for `GET /trips`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TripQuery {
    /// Only trips in this status.
    pub status: Option<TripStatus>,
}

/// Build the trips router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", post(create_trip).get(list_trips))
        .route(
            "/trips/{id}",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/trips/{id}/status", put(update_trip_status))
        .route("/trips/{id}/candidates", get(package_candidates))
}

fn trip_id(path: Result<Path<Uuid>, PathRejection>) -> Result<TripId, AppError> {
    extract_path(path).map(TripId::from_uuid)
}

/// POST /trips: Create a trip owned by the caller.
#[utoipa::path(
    post,
    path = "/trips",
    request_body = TripDraft,
    responses(
        (status = 201, description = "Trip created", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Malformed body", body = crate::openapi::EnvelopeDoc),
        (status = 422, description = "Validation failed", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn create_trip(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<TripDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Trip>>), AppError> {
    let draft = extract_validated_json(body)?;
    let trip = state.guard.create_trip(draft, &caller.principal())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(trip, "trip created"))))
}

/// GET /trips: List trips, oldest first.
#[utoipa::path(
    get,
    path = "/trips",
    params(TripQuery),
    responses(
        (status = 200, description = "Trips", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn list_trips(
    State(state): State<AppState>,
    query: Result<Query<TripQuery>, QueryRejection>,
) -> ApiResult<Vec<Trip>> {
    let query = extract_query(query)?;
    let trips = state.guard.list_trips(query.status);
    let message = format!("{} trips", trips.len());
    Ok(Json(ApiResponse::ok(trips, message)))
}

/// GET /trips/{id}: Fetch one trip.
#[utoipa::path(
    get,
    path = "/trips/{id}",
    params(("id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip found", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn get_trip(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Trip> {
    let id = trip_id(path)?;
    let trip = state.guard.trip(&id)?;
    Ok(Json(ApiResponse::ok(trip, "trip found")))
}

/// PUT /trips/{id}: Edit a trip's fields.
#[utoipa::path(
    put,
    path = "/trips/{id}",
    params(("id" = Uuid, Path, description = "Trip ID")),
    request_body = TripPatch,
    responses(
        (status = 200, description = "Trip updated", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Not editable in current status", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not the traveler", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
        (status = 422, description = "Validation failed", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn update_trip(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<TripPatch>, JsonRejection>,
) -> ApiResult<Trip> {
    let id = trip_id(path)?;
    let patch = extract_json(body)?;
    let trip = state.guard.update_trip(&id, &patch, &caller.principal())?;
    Ok(Json(ApiResponse::ok(trip, "trip updated")))
}

/// DELETE /trips/{id}: Delete a trip with no committed capacity.
#[utoipa::path(
    delete,
    path = "/trips/{id}",
    params(("id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip deleted", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Not deletable in current state", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not the traveler", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn delete_trip(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Trip> {
    let id = trip_id(path)?;
    let trip = state.guard.delete_trip(&id, &caller.principal())?;
    Ok(Json(ApiResponse::ok(trip, "trip deleted")))
}

/// PUT /trips/{id}/status: Move a trip along a status edge.
#[utoipa::path(
    put,
    path = "/trips/{id}/status",
    params(("id" = Uuid, Path, description = "Trip ID")),
    request_body = StatusChange<TripStatus>,
    responses(
        (status = 200, description = "Status changed", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Transition not allowed", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not the traveler", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn update_trip_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusChange<TripStatus>>, JsonRejection>,
) -> ApiResult<Trip> {
    let id = trip_id(path)?;
    let change = extract_json(body)?;
    let trip = state
        .guard
        .update_trip_status(&id, change.status, &caller.principal())?;
    let message = format!("trip is now {}", trip.status);
    Ok(Json(ApiResponse::ok(trip, message)))
}

/// GET /trips/{id}/candidates: Packages this trip could carry.
#[utoipa::path(
    get,
    path = "/trips/{id}/candidates",
    params(("id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Compatible packages", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "trips"
)]
pub(crate) async fn package_candidates(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<Candidate<Package>>> {
    let id = trip_id(path)?;
    let candidates = state.coordinator.package_candidates(&id)?;
    let message = format!("{} compatible packages", candidates.len());
    Ok(Json(ApiResponse::ok(candidates, message)))
}
