//! # Integration Tests for waypost-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot`: health
//! probes, authentication, the response envelope, package and trip
//! lifecycles, candidate search, and assignment outcomes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use waypost_api::state::{AppConfig, AppState};

const SECRET: &str = "test-secret";

/// Helper: build the test app with auth disabled.
fn test_app() -> axum::Router {
    waypost_api::app(AppState::new())
}

/// Helper: build the test app with auth enabled, returning the state so
/// several requests can share one ledger.
fn test_state_with_auth(token: &str) -> AppState {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..Default::default()
    };
    AppState::with_config(config, None)
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// A member of the marketplace with a bearer token.
#[derive(Clone)]
struct Member {
    id: Uuid,
    bearer: String,
}

impl Member {
    fn new() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            bearer: format!("Bearer member:{id}:{SECRET}"),
        }
    }
}

/// Helper: send one request against `state` and return status and JSON body.
async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    caller: Option<&Member>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(member) = caller {
        builder = builder.header("authorization", member.bearer.as_str());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = waypost_api::app(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

fn package_body(weight_kg: f64) -> Value {
    json!({
        "title": "Textbooks",
        "description": "Two hardcover books",
        "pickup_address": {"city": "Kumasi", "state": "Ashanti", "country": "Ghana"},
        "delivery_address": {"city": "Accra", "country": "Ghana"},
        "weight_kg": weight_kg,
        "value": 80.0,
        "category": "books",
        "publish": true
    })
}

fn trip_body(max_weight_kg: f64) -> Value {
    json!({
        "origin_address": {"city": "Kumasi", "state": "Ashanti", "country": "Ghana"},
        "destination_address": {"city": "Accra", "country": "Ghana"},
        "max_weight_kg": max_weight_kg,
        "price_per_kg": 2.5,
        "departure_date": "2026-11-03",
        "arrival_date": "2026-11-03",
        "publish": true
    })
}

fn all_confirmed() -> Value {
    json!({
        "legal_compliance": true,
        "damage_inspection": true,
        "accurate_description": true,
        "safety_measures": true,
        "terms_acceptance": true
    })
}

async fn create_package(state: &AppState, sender: &Member, weight_kg: f64) -> String {
    let (status, body) = send(state, "POST", "/packages", Some(sender), Some(package_body(weight_kg))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_trip(state: &AppState, traveler: &Member, max_weight_kg: f64) -> String {
    let (status, body) = send(state, "POST", "/trips", Some(traveler), Some(trip_body(max_weight_kg))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn assign(
    state: &AppState,
    sender: &Member,
    package_id: &str,
    trip_id: &str,
    confirmations: Value,
) -> (StatusCode, Value) {
    send(
        state,
        "POST",
        "/assignments",
        Some(sender),
        Some(json!({
            "anchor_id": package_id,
            "candidate_id": trip_id,
            "direction": "assign-trip-to-package",
            "confirmations": confirmations
        })),
    )
    .await
}

// ── Health Probes ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/readiness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_probes_skip_auth() {
    let app = waypost_api::app(test_state_with_auth(SECRET));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    let app = waypost_api::app(test_state_with_auth(SECRET));
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(doc["info"]["title"], "Waypost API");
    assert!(doc["paths"]["/assignments"]["post"].is_object());
    for path in ["/packages", "/trips", "/assignments"] {
        assert!(doc["paths"][path]["post"]["requestBody"].is_object(), "{path}");
    }
    assert!(doc["paths"]["/packages/{id}/status"]["put"]["requestBody"].is_object());
}

// ── Authentication ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_token_is_401_envelope() {
    let state = test_state_with_auth(SECRET);
    let (status, body) = send(&state, "GET", "/packages", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_wrong_secret_is_401() {
    let state = test_state_with_auth(SECRET);
    let impostor = Member {
        id: Uuid::new_v4(),
        bearer: format!("Bearer member:{}:wrong", Uuid::new_v4()),
    };
    let (status, _) = send(&state, "GET", "/packages", Some(&impostor), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Packages ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_package_returns_envelope() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let (status, body) = send(&state, "POST", "/packages", Some(&sender), Some(package_body(2.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "package created");
    assert_eq!(body["data"]["status"], "POSTED");
    assert_eq!(body["data"]["sender_id"], sender.id.to_string());
    assert!(body["data"]["trip_id"].is_null());
}

#[tokio::test]
async fn test_create_package_with_zero_weight_is_422() {
    let state = test_state_with_auth(SECRET);
    let (status, body) = send(&state, "POST", "/packages", Some(&Member::new()), Some(package_body(0.0))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let request = Request::builder()
        .method("POST")
        .uri("/packages")
        .header("authorization", sender.bearer.as_str())
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = waypost_api::app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_unknown_package_is_404() {
    let state = test_state_with_auth(SECRET);
    let uri = format!("/packages/{}", Uuid::new_v4());
    let (status, body) = send(&state, "GET", &uri, Some(&Member::new()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_package_with_bad_id_is_400() {
    let state = test_state_with_auth(SECRET);
    let (status, body) = send(&state, "GET", "/packages/not-a-uuid", Some(&Member::new()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_update_package_by_sender_and_stranger() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let uri = format!("/packages/{package_id}");

    let (status, body) = send(&state, "PUT", &uri, Some(&sender), Some(json!({"title": "Novels"}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "Novels");

    let (status, body) = send(&state, "PUT", &uri, Some(&Member::new()), Some(json!({"title": "Mine"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_delete_draft_package() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let mut draft = package_body(1.0);
    draft["publish"] = json!(false);
    let (status, body) = send(&state, "POST", "/packages", Some(&sender), Some(draft)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "DRAFT");
    let uri = format!("/packages/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = send(&state, "DELETE", &uri, Some(&sender), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, "GET", &uri, Some(&sender), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_packages_filters_by_status() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    create_package(&state, &sender, 1.0).await;
    let mut draft = package_body(1.0);
    draft["publish"] = json!(false);
    send(&state, "POST", "/packages", Some(&sender), Some(draft)).await;

    let (status, body) = send(&state, "GET", "/packages", Some(&sender), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(&state, "GET", "/packages?status=DRAFT", Some(&sender), None).await;
    assert_eq!(status, StatusCode::OK);
    let drafts = body["data"].as_array().unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0]["status"], "DRAFT");

    let (status, _) = send(&state, "GET", "/packages?status=LOST", Some(&sender), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_endpoint_refuses_matched() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 1.0).await;
    let uri = format!("/packages/{package_id}/status");
    let (status, body) = send(&state, "PUT", &uri, Some(&sender), Some(json!({"status": "MATCHED"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");
}

// ── Candidates & Assignment ──────────────────────────────────────────────

#[tokio::test]
async fn test_accra_scenario_end_to_end() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let traveler = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &traveler, 10.0).await;

    let uri = format!("/packages/{package_id}/candidates");
    let (status, body) = send(&state, "GET", &uri, Some(&sender), None).await;
    assert_eq!(status, StatusCode::OK);
    let candidates = body["data"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["id"], trip_id.as_str());
    assert_eq!(candidates[0]["compatibility"]["compatible"], true);

    let (status, body) = assign(&state, &sender, &package_id, &trip_id, all_confirmed()).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "assignment committed");
    assert_eq!(body["data"]["package"]["status"], "MATCHED");
    assert_eq!(body["data"]["package"]["trip_id"], trip_id.as_str());
    assert_eq!(body["data"]["package"]["traveler_id"], traveler.id.to_string());
    assert_eq!(body["data"]["trip"]["available_space_kg"], 8.0);
    assert!(body["data"]["channel"].is_object());
    assert_eq!(body["data"]["warnings"].as_array().unwrap().len(), 0);

    let uri = format!("/packages/{package_id}/confirmations");
    let (status, body) = send(&state, "GET", &uri, Some(&sender), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["role"], "SENDER");

    let (status, _) = send(&state, "GET", &uri, Some(&Member::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_second_assignment_is_409_already_matched() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let first = create_trip(&state, &Member::new(), 10.0).await;
    let second = create_trip(&state, &Member::new(), 10.0).await;

    let (status, _) = assign(&state, &sender, &package_id, &first, all_confirmed()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = assign(&state, &sender, &package_id, &second, all_confirmed()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_MATCHED");

    let (_, body) = send(&state, "GET", &format!("/trips/{second}"), Some(&sender), None).await;
    assert_eq!(body["data"]["available_space_kg"], 10.0);
}

#[tokio::test]
async fn test_incomplete_confirmations_are_422() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &Member::new(), 10.0).await;

    let mut confirmations = all_confirmed();
    confirmations["terms_acceptance"] = json!(false);
    let (status, body) = assign(&state, &sender, &package_id, &trip_id, confirmations).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("terms_acceptance"));

    let (_, body) = send(&state, "GET", &format!("/packages/{package_id}"), Some(&sender), None).await;
    assert_eq!(body["data"]["status"], "POSTED");
}

#[tokio::test]
async fn test_assignment_without_candidate_is_422() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;

    for body in [
        json!({
            "anchor_id": package_id,
            "direction": "assign-trip-to-package",
            "confirmations": all_confirmed()
        }),
        json!({
            "anchor_id": package_id,
            "candidate_id": null,
            "direction": "assign-trip-to-package",
            "confirmations": all_confirmed()
        }),
    ] {
        let (status, body) = send(&state, "POST", "/assignments", Some(&sender), Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["message"].as_str().unwrap().contains("no candidate selected"));
    }
}

#[tokio::test]
async fn test_capacity_exceeded_is_409() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &Member::new(), 1.0).await;

    let (status, body) = assign(&state, &sender, &package_id, &trip_id, all_confirmed()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn test_assignment_by_non_owner_is_403() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &Member::new(), 10.0).await;

    let (status, _) = assign(&state, &Member::new(), &package_id, &trip_id, all_confirmed()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_assignment_with_unknown_trip_is_404() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let missing = Uuid::new_v4().to_string();

    let (status, body) = assign(&state, &sender, &package_id, &missing, all_confirmed()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// ── Lifecycle after assignment ───────────────────────────────────────────

#[tokio::test]
async fn test_matched_package_cannot_be_deleted() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &Member::new(), 10.0).await;
    assign(&state, &sender, &package_id, &trip_id, all_confirmed()).await;

    let (status, body) = send(&state, "DELETE", &format!("/packages/{package_id}"), Some(&sender), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_in_transit_package_cannot_be_edited_and_cancel_restores_capacity() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let traveler = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &traveler, 10.0).await;
    assign(&state, &sender, &package_id, &trip_id, all_confirmed()).await;

    let status_uri = format!("/packages/{package_id}/status");
    let (status, body) = send(&state, "PUT", &status_uri, Some(&traveler), Some(json!({"status": "IN_TRANSIT"}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "IN_TRANSIT");

    let package_uri = format!("/packages/{package_id}");
    let (status, _) = send(&state, "PUT", &package_uri, Some(&sender), Some(json!({"title": "Late edit"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&state, "PUT", &status_uri, Some(&sender), Some(json!({"status": "CANCELLED"}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["trip_id"].is_null());

    let (_, body) = send(&state, "GET", &format!("/trips/{trip_id}"), Some(&traveler), None).await;
    assert_eq!(body["data"]["available_space_kg"], 10.0);
}

#[tokio::test]
async fn test_unassign_returns_package_to_posted() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let traveler = Member::new();
    let package_id = create_package(&state, &sender, 2.0).await;
    let trip_id = create_trip(&state, &traveler, 10.0).await;
    assign(&state, &sender, &package_id, &trip_id, all_confirmed()).await;

    let uri = format!("/packages/{package_id}/unassign");
    let (status, _) = send(&state, "POST", &uri, Some(&Member::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&state, "POST", &uri, Some(&traveler), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "POSTED");

    let (_, body) = send(&state, "GET", &format!("/trips/{trip_id}"), Some(&traveler), None).await;
    assert_eq!(body["data"]["available_space_kg"], 10.0);

    let (status, _) = send(&state, "POST", &uri, Some(&sender), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Trips ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_trip_lifecycle() {
    let state = test_state_with_auth(SECRET);
    let traveler = Member::new();
    let trip_id = create_trip(&state, &traveler, 10.0).await;
    let status_uri = format!("/trips/{trip_id}/status");

    let (status, _) = send(&state, "PUT", &status_uri, Some(&Member::new()), Some(json!({"status": "CANCELLED"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&state, "PUT", &status_uri, Some(&traveler), Some(json!({"status": "CANCELLED"}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "CANCELLED");

    let (status, _) = send(&state, "DELETE", &format!("/trips/{trip_id}"), Some(&traveler), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_trip_with_committed_capacity_cannot_shrink_or_cancel() {
    let state = test_state_with_auth(SECRET);
    let sender = Member::new();
    let traveler = Member::new();
    let package_id = create_package(&state, &sender, 4.0).await;
    let trip_id = create_trip(&state, &traveler, 10.0).await;
    assign(&state, &sender, &package_id, &trip_id, all_confirmed()).await;

    let trip_uri = format!("/trips/{trip_id}");
    let (status, _) = send(&state, "PUT", &trip_uri, Some(&traveler), Some(json!({"max_weight_kg": 3.0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&state, "PUT", &trip_uri, Some(&traveler), Some(json!({"max_weight_kg": 6.0}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["available_space_kg"], 2.0);

    let (status, _) = send(&state, "PUT", &format!("{trip_uri}/status"), Some(&traveler), Some(json!({"status": "CANCELLED"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&state, "DELETE", &trip_uri, Some(&traveler), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trip_candidates_exclude_own_packages() {
    let state = test_state_with_auth(SECRET);
    let traveler = Member::new();
    let sender = Member::new();
    let trip_id = create_trip(&state, &traveler, 10.0).await;

    // Package-to-trip pairing compares package pickup with trip destination.
    let mut body = package_body(1.0);
    body["pickup_address"] = json!({"city": "Accra", "country": "Ghana"});
    let (_, created) = send(&state, "POST", "/packages", Some(&sender), Some(body.clone())).await;
    send(&state, "POST", "/packages", Some(&traveler), Some(body)).await;

    let (status, response) = send(&state, "GET", &format!("/trips/{trip_id}/candidates"), Some(&traveler), None).await;
    assert_eq!(status, StatusCode::OK);
    let candidates = response["data"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["id"], created["data"]["id"]);
}
