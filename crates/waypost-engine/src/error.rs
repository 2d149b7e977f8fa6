//! # Engine Errors
//!
//! The taxonomy callers translate into user-facing responses. Lower-level
//! errors from the state machines, the safety gate, and the ledger all
//! convert into [`EngineError`] with `From`, so services propagate them
//! with `?`.

use thiserror::Error;

use waypost_core::{PackageId, TripId, ValidationError};
use waypost_state::{GateError, LifecycleError};

use crate::ledger::Missing;

/// Failures from the assignment coordinator and the lifecycle guard.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// "package" or "trip".
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The principal does not own the record or lacks the role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation is not allowed in the record's current status.
    #[error("{0}")]
    InvalidState(String),

    /// The package is no longer POSTED.
    #[error("package {0} is already matched or no longer available")]
    AlreadyMatched(PackageId),

    /// The trip cannot absorb the package's weight.
    #[error("trip {trip_id} has {available_kg} kg available but {required_kg} kg is required")]
    CapacityExceeded {
        /// The trip.
        trip_id: TripId,
        /// Remaining capacity.
        available_kg: f64,
        /// Weight requested.
        required_kg: f64,
    },

    /// Input or attestations failed validation.
    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl EngineError {
    /// Stable snake_case name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidState(_) => "invalid_state",
            Self::AlreadyMatched(_) => "already_matched",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::ValidationFailed(_) => "validation_failed",
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }
}

impl From<Missing> for EngineError {
    fn from(missing: Missing) -> Self {
        match missing {
            Missing::Package(id) => Self::NotFound {
                entity: "package",
                id: id.to_string(),
            },
            Missing::Trip(id) => Self::NotFound {
                entity: "trip",
                id: id.to_string(),
            },
        }
    }
}

impl From<LifecycleError> for EngineError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidState { .. } | LifecycleError::InvalidTransition { .. } => {
                Self::InvalidState(err.to_string())
            }
            LifecycleError::Forbidden(reason) => Self::Forbidden(reason),
            LifecycleError::Validation(inner) => Self::from(inner),
            LifecycleError::CapacityExceeded {
                trip_id,
                available_kg,
                required_kg,
            } => Self::CapacityExceeded {
                trip_id,
                available_kg,
                required_kg,
            },
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}

impl From<GateError> for EngineError {
    fn from(err: GateError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}
