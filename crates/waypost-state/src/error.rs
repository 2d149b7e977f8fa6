//! # Lifecycle Errors

use thiserror::Error;

use waypost_core::{TripId, ValidationError};

/// Errors raised by the package and trip state machines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The operation is not permitted in the entity's current status.
    #[error("{entity} {id} is {status}; cannot {operation}")]
    InvalidState {
        /// "package" or "trip".
        entity: &'static str,
        /// Entity identifier.
        id: String,
        /// Current status name.
        status: String,
        /// What was attempted.
        operation: String,
    },

    /// The requested status change is not an edge of the state machine.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// "package" or "trip".
        entity: &'static str,
        /// Current status name.
        from: String,
        /// Requested status name.
        to: String,
    },

    /// The principal does not own the entity or lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// A field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The trip cannot absorb the requested weight.
    #[error("trip {trip_id} has {available_kg} kg available, {required_kg} kg required")]
    CapacityExceeded {
        /// The trip that is too full.
        trip_id: TripId,
        /// Remaining capacity.
        available_kg: f64,
        /// Weight that was requested.
        required_kg: f64,
    },
}
