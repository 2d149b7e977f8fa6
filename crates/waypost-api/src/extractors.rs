//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for request bodies and helpers that turn
//! extractor rejections into [`AppError`]s.
//!
//! Only creation payloads are validated up front. Patches and assignment
//! requests are checked by the engine after ownership and status, so a
//! stranger's malformed edit is a 403 rather than a 422.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use waypost_core::ValidationError;
use waypost_state::{PackageDraft, TripDraft};

use crate::error::AppError;

/// Request types that check business rules beyond what serde enforces.
pub trait Validate {
    /// Validate business rules.
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for PackageDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        PackageDraft::validate(self)
    }
}

impl Validate for TripDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        TripDraft::validate(self)
    }
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate()?;
    Ok(value)
}

/// Extract a query string, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a path parameter, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use waypost_core::Address;

    fn trip_draft(departure: NaiveDate, arrival: NaiveDate) -> TripDraft {
        TripDraft {
            origin_address: Address::new("Kumasi", "Ashanti", "Ghana"),
            destination_address: Address::new("Accra", "", "Ghana"),
            max_weight_kg: 10.0,
            price_per_kg: 2.5,
            departure_date: departure,
            arrival_date: arrival,
            publish: true,
        }
    }

    #[test]
    fn inverted_trip_dates_are_a_validation_error() {
        let early = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        assert!(extract_validated_json(Ok(Json(trip_draft(early, late)))).is_ok());
        let err = extract_validated_json(Ok(Json(trip_draft(late, early)))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
