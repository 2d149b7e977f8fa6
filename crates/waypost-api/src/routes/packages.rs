//! # Package API
//!
//! Package CRUD, status changes, unassignment, trip candidates, and the
//! safety confirmations sealed when the package was assigned.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use waypost_core::PackageId;
use waypost_match::Candidate;
use waypost_state::{
    Package, PackageDraft, PackagePatch, PackageStatus, SafetyConfirmationRecord, Trip,
};

use crate::auth::CallerIdentity;
use crate::error::{ApiResponse, ApiResult, AppError};
use crate::extractors::{extract_json, extract_path, extract_query, extract_validated_json};
use crate::routes::StatusChange;
use crate::state::AppState;

/// Query parameters for `GET /packages`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PackageQuery {
    /// Only packages in this status.
    pub status: Option<PackageStatus>,
}

/// Build the packages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/packages", post(create_package).get(list_packages))
        .route(
            "/packages/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
        .route("/packages/{id}/status", put(update_package_status))
        .route("/packages/{id}/unassign", post(unassign_package))
        .route("/packages/{id}/candidates", get(trip_candidates))
        .route("/packages/{id}/confirmations", get(package_confirmations))
}

fn package_id(path: Result<Path<Uuid>, PathRejection>) -> Result<PackageId, AppError> {
    extract_path(path).map(PackageId::from_uuid)
}

/// POST /packages: Create a package owned by the caller.
#[utoipa::path(
    post,
    path = "/packages",
    request_body = PackageDraft,
    responses(
        (status = 201, description = "Package created", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Malformed body", body = crate::openapi::EnvelopeDoc),
        (status = 422, description = "Validation failed", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn create_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<PackageDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Package>>), AppError> {
    let draft = extract_validated_json(body)?;
    let package = state.guard.create_package(draft, &caller.principal())?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(package, "package created")),
    ))
}

/// GET /packages: List packages, oldest first.
#[utoipa::path(
    get,
    path = "/packages",
    params(PackageQuery),
    responses(
        (status = 200, description = "Packages", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn list_packages(
    State(state): State<AppState>,
    query: Result<Query<PackageQuery>, QueryRejection>,
) -> ApiResult<Vec<Package>> {
    let query = extract_query(query)?;
    let packages = state.guard.list_packages(query.status);
    let message = format!("{} packages", packages.len());
    Ok(Json(ApiResponse::ok(packages, message)))
}

/// GET /packages/{id}: Fetch one package.
#[utoipa::path(
    get,
    path = "/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package found", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn get_package(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Package> {
    let id = package_id(path)?;
    let package = state.guard.package(&id)?;
    Ok(Json(ApiResponse::ok(package, "package found")))
}

/// PUT /packages/{id}: Edit a package's fields.
#[utoipa::path(
    put,
    path = "/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    request_body = PackagePatch,
    responses(
        (status = 200, description = "Package updated", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Not editable in current status", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not the sender", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
        (status = 422, description = "Validation failed", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn update_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<PackagePatch>, JsonRejection>,
) -> ApiResult<Package> {
    let id = package_id(path)?;
    let patch = extract_json(body)?;
    let package = state
        .guard
        .update_package(&id, &patch, &caller.principal())?;
    Ok(Json(ApiResponse::ok(package, "package updated")))
}

/// DELETE /packages/{id}: Delete a package.
#[utoipa::path(
    delete,
    path = "/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package deleted", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Not deletable in current status", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not the sender", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn delete_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Package> {
    let id = package_id(path)?;
    let package = state.guard.delete_package(&id, &caller.principal())?;
    Ok(Json(ApiResponse::ok(package, "package deleted")))
}

/// PUT /packages/{id}/status: Move a package along a status edge.
#[utoipa::path(
    put,
    path = "/packages/{id}/status",
    params(("id" = Uuid, Path, description = "Package ID")),
    request_body = StatusChange<PackageStatus>,
    responses(
        (status = 200, description = "Status changed", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Transition not allowed", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller may not make this change", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn update_package_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusChange<PackageStatus>>, JsonRejection>,
) -> ApiResult<Package> {
    let id = package_id(path)?;
    let change = extract_json(body)?;
    let package = state
        .guard
        .update_package_status(&id, change.status, &caller.principal())?;
    let message = format!("package is now {}", package.status);
    Ok(Json(ApiResponse::ok(package, message)))
}

/// POST /packages/{id}/unassign: Return a MATCHED package to POSTED.
#[utoipa::path(
    post,
    path = "/packages/{id}/unassign",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package unassigned", body = crate::openapi::EnvelopeDoc),
        (status = 400, description = "Package is not MATCHED", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not a participant", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn unassign_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Package> {
    let id = package_id(path)?;
    let package = state.guard.unassign_package(&id, &caller.principal())?;
    Ok(Json(ApiResponse::ok(package, "package unassigned")))
}

/// GET /packages/{id}/candidates: Trips that could carry this package.
#[utoipa::path(
    get,
    path = "/packages/{id}/candidates",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Compatible trips", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn trip_candidates(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<Candidate<Trip>>> {
    let id = package_id(path)?;
    let candidates = state.coordinator.trip_candidates(&id)?;
    let message = format!("{} compatible trips", candidates.len());
    Ok(Json(ApiResponse::ok(candidates, message)))
}

/// GET /packages/{id}/confirmations: Sealed safety attestations.
#[utoipa::path(
    get,
    path = "/packages/{id}/confirmations",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Confirmation records", body = crate::openapi::EnvelopeDoc),
        (status = 403, description = "Caller is not a participant", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::openapi::EnvelopeDoc),
    ),
    tag = "packages"
)]
pub(crate) async fn package_confirmations(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<SafetyConfirmationRecord>> {
    let id = package_id(path)?;
    let records = state.guard.confirmations(&id, &caller.principal())?;
    let message = format!("{} confirmation records", records.len());
    Ok(Json(ApiResponse::ok(records, message)))
}
