//! # Trip Lifecycle and Capacity
//!
//! ```text
//!   DRAFT ──▶ POSTED ──▶ IN_PROGRESS ──▶ COMPLETED
//!     │        ▲  │
//!     └──▶ CANCELLED ◀┘   (only with no committed capacity)
//! ```
//!
//! Capacity is tracked as `available_space_kg`, which always satisfies
//! `0 ≤ available_space_kg ≤ max_weight_kg`. Assignments reserve, and
//! unassignment or cancellation of a linked package releases.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use waypost_core::{Address, Principal, TripId, UserId, ValidationError};

use crate::error::LifecycleError;
use crate::record::TransitionRecord;

/// Tolerance for floating-point capacity comparisons, in kilograms.
pub const CAPACITY_EPSILON_KG: f64 = 1e-9;

/// The lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    /// Created but not visible to senders.
    Draft,
    /// Visible and accepting packages.
    Posted,
    /// The traveler has departed.
    InProgress,
    /// Arrived. Terminal.
    Completed,
    /// Withdrawn by the traveler.
    Cancelled,
}

impl TripStatus {
    /// Every status, in declaration order.
    pub const ALL: [TripStatus; 5] = [
        Self::Draft,
        Self::Posted,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Posted => "POSTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The statuses reachable from this one.
    pub fn valid_transitions(&self) -> &'static [TripStatus] {
        match self {
            Self::Draft => &[Self::Posted, Self::Cancelled],
            Self::Posted => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed],
            Self::Completed => &[],
            Self::Cancelled => &[Self::Posted],
        }
    }

    /// Whether `target` is a legal next status.
    pub fn can_transition_to(&self, target: TripStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Whether field edits are permitted.
    pub fn allows_edit(&self) -> bool {
        !matches!(self, Self::InProgress | Self::Completed)
    }

    /// Whether new packages may be assigned.
    pub fn accepts_packages(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields supplied by the traveler when creating a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TripDraft {
    /// Where the trip starts.
    pub origin_address: Address,
    /// Where the trip ends.
    pub destination_address: Address,
    /// Total carrying capacity in kilograms.
    pub max_weight_kg: f64,
    /// Asking price per kilogram.
    #[serde(default)]
    pub price_per_kg: f64,
    /// Departure day.
    pub departure_date: NaiveDate,
    /// Arrival day.
    pub arrival_date: NaiveDate,
    /// Create directly in POSTED instead of DRAFT.
    #[serde(default)]
    pub publish: bool,
}

impl TripDraft {
    /// Validate every field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.origin_address.validate()?;
        self.destination_address.validate()?;
        ValidationError::require_positive("max_weight_kg", self.max_weight_kg)?;
        ValidationError::require_non_negative("price_per_kg", self.price_per_kg)?;
        validate_dates(self.departure_date, self.arrival_date)
    }
}

fn validate_dates(departure: NaiveDate, arrival: NaiveDate) -> Result<(), ValidationError> {
    if arrival < departure {
        return Err(ValidationError::InvertedRange {
            start_field: "departure_date",
            end_field: "arrival_date",
        });
    }
    Ok(())
}

/// A partial trip update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TripPatch {
    /// New origin.
    #[serde(default)]
    pub origin_address: Option<Address>,
    /// New destination.
    #[serde(default)]
    pub destination_address: Option<Address>,
    /// New total capacity.
    #[serde(default)]
    pub max_weight_kg: Option<f64>,
    /// New price per kilogram.
    #[serde(default)]
    pub price_per_kg: Option<f64>,
    /// New departure day.
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    /// New arrival day.
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
}

/// A traveler's trip and its remaining capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique trip identifier.
    pub id: TripId,
    /// The traveler, who owns the trip.
    pub traveler_id: UserId,
    /// Current lifecycle status.
    pub status: TripStatus,
    /// Start address.
    pub origin_address: Address,
    /// End address.
    pub destination_address: Address,
    /// Total carrying capacity in kilograms.
    pub max_weight_kg: f64,
    /// Capacity not yet reserved.
    pub available_space_kg: f64,
    /// Asking price per kilogram.
    pub price_per_kg: f64,
    /// Departure day.
    pub departure_date: NaiveDate,
    /// Arrival day.
    pub arrival_date: NaiveDate,
    /// When the trip was created.
    pub created_at: DateTime<Utc>,
    /// When the trip was last modified.
    pub updated_at: DateTime<Utc>,
    /// Ordered log of status changes.
    pub transitions: Vec<TransitionRecord<TripStatus>>,
}

impl Trip {
    /// Create a trip owned by `traveler` with its full capacity available.
    pub fn create(traveler: UserId, draft: TripDraft) -> Result<Self, LifecycleError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: TripId::new(),
            traveler_id: traveler,
            status: if draft.publish {
                TripStatus::Posted
            } else {
                TripStatus::Draft
            },
            origin_address: draft.origin_address,
            destination_address: draft.destination_address,
            max_weight_kg: draft.max_weight_kg,
            available_space_kg: draft.max_weight_kg,
            price_per_kg: draft.price_per_kg,
            departure_date: draft.departure_date,
            arrival_date: draft.arrival_date,
            created_at: now,
            updated_at: now,
            transitions: Vec::new(),
        })
    }

    /// Weight currently reserved by assigned packages.
    pub fn committed_kg(&self) -> f64 {
        (self.max_weight_kg - self.available_space_kg).max(0.0)
    }

    /// Whether any capacity is reserved.
    pub fn has_commitments(&self) -> bool {
        self.committed_kg() > CAPACITY_EPSILON_KG
    }

    /// Whether `weight_kg` fits in the remaining capacity.
    pub fn can_carry(&self, weight_kg: f64) -> bool {
        weight_kg <= self.available_space_kg + CAPACITY_EPSILON_KG
    }

    /// Require that `principal` is the traveler.
    pub fn ensure_traveler(&self, principal: &Principal) -> Result<(), LifecycleError> {
        if principal.is(&self.traveler_id) {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden(format!(
                "only the traveler may modify trip {}",
                self.id
            )))
        }
    }

    /// Require a status in which new packages may be assigned.
    pub fn ensure_accepting(&self) -> Result<(), LifecycleError> {
        if self.status.accepts_packages() {
            Ok(())
        } else {
            Err(self.invalid_state("accept packages"))
        }
    }

    /// Require a status in which edits are permitted.
    pub fn ensure_editable(&self) -> Result<(), LifecycleError> {
        if self.status.allows_edit() {
            Ok(())
        } else {
            Err(self.invalid_state("edit"))
        }
    }

    /// Require that the trip may be deleted.
    pub fn ensure_deletable(&self) -> Result<(), LifecycleError> {
        if !self.status.allows_edit() {
            return Err(self.invalid_state("delete"));
        }
        if self.has_commitments() {
            return Err(self.invalid_state("delete while packages are assigned"));
        }
        Ok(())
    }

    /// Reserve `weight_kg` for an assigned package.
    pub fn reserve(&mut self, weight_kg: f64) -> Result<(), LifecycleError> {
        if !self.can_carry(weight_kg) {
            return Err(LifecycleError::CapacityExceeded {
                trip_id: self.id,
                available_kg: self.available_space_kg,
                required_kg: weight_kg,
            });
        }
        self.available_space_kg = (self.available_space_kg - weight_kg).max(0.0);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return `weight_kg` to the trip. Never exceeds the maximum.
    pub fn release(&mut self, weight_kg: f64) {
        self.available_space_kg = (self.available_space_kg + weight_kg).min(self.max_weight_kg);
        self.updated_at = Utc::now();
    }

    /// Apply a partial update.
    ///
    /// Changing the maximum shifts the available space by the same amount.
    /// The new maximum must still cover the committed weight.
    pub fn apply_patch(&mut self, patch: &TripPatch) -> Result<(), LifecycleError> {
        self.ensure_editable()?;

        if let Some(address) = &patch.origin_address {
            address.validate()?;
        }
        if let Some(address) = &patch.destination_address {
            address.validate()?;
        }
        if let Some(price) = patch.price_per_kg {
            ValidationError::require_non_negative("price_per_kg", price)?;
        }
        let departure = patch.departure_date.unwrap_or(self.departure_date);
        let arrival = patch.arrival_date.unwrap_or(self.arrival_date);
        validate_dates(departure, arrival)?;

        if let Some(max) = patch.max_weight_kg {
            ValidationError::require_positive("max_weight_kg", max)?;
            let committed = self.committed_kg();
            if max + CAPACITY_EPSILON_KG < committed {
                return Err(ValidationError::Constraint(format!(
                    "max_weight_kg {max} is below the {committed} kg already committed"
                ))
                .into());
            }
            self.max_weight_kg = max;
            self.available_space_kg = (max - committed).max(0.0);
        }
        if let Some(address) = &patch.origin_address {
            self.origin_address = address.clone();
        }
        if let Some(address) = &patch.destination_address {
            self.destination_address = address.clone();
        }
        if let Some(price) = patch.price_per_kg {
            self.price_per_kg = price;
        }
        self.departure_date = departure;
        self.arrival_date = arrival;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move to `target` along a legal edge.
    pub fn transition(
        &mut self,
        target: TripStatus,
        actor: Option<UserId>,
        reason: &str,
    ) -> Result<(), LifecycleError> {
        if !self.status.can_transition_to(target) {
            return Err(LifecycleError::InvalidTransition {
                entity: "trip",
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        if target == TripStatus::Cancelled && self.has_commitments() {
            return Err(self.invalid_state("cancel while packages are assigned"));
        }
        let now = Utc::now();
        self.transitions.push(TransitionRecord {
            from_state: self.status,
            to_state: target,
            actor,
            timestamp: now,
            reason: reason.to_string(),
        });
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    fn invalid_state(&self, operation: &str) -> LifecycleError {
        LifecycleError::InvalidState {
            entity: "trip",
            id: self.id.to_string(),
            status: self.status.to_string(),
            operation: operation.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(max: f64) -> TripDraft {
        TripDraft {
            origin_address: Address::new("Lagos", "Lagos", "Nigeria"),
            destination_address: Address::new("Accra", "", "Ghana"),
            max_weight_kg: max,
            price_per_kg: 5.0,
            departure_date: date("2026-11-01"),
            arrival_date: date("2026-11-02"),
            publish: true,
        }
    }

    fn trip(max: f64) -> Trip {
        Trip::create(UserId::new(), draft(max)).unwrap()
    }

    #[test]
    fn new_trip_has_full_capacity() {
        let t = trip(10.0);
        assert_eq!(t.status, TripStatus::Posted);
        assert_eq!(t.available_space_kg, 10.0);
        assert_eq!(t.committed_kg(), 0.0);
    }

    #[test]
    fn inverted_dates_rejected() {
        let mut d = draft(10.0);
        d.arrival_date = date("2026-10-30");
        assert!(matches!(
            Trip::create(UserId::new(), d),
            Err(LifecycleError::Validation(ValidationError::InvertedRange { .. }))
        ));
    }

    #[test]
    fn reserve_and_release() {
        let mut t = trip(10.0);
        t.reserve(2.0).unwrap();
        assert_eq!(t.available_space_kg, 8.0);
        assert!(t.has_commitments());
        t.release(2.0);
        assert_eq!(t.available_space_kg, 10.0);
    }

    #[test]
    fn reserve_beyond_capacity_fails_without_mutation() {
        let mut t = trip(1.0);
        let err = t.reserve(2.0).unwrap_err();
        assert!(matches!(err, LifecycleError::CapacityExceeded { .. }));
        assert_eq!(t.available_space_kg, 1.0);
    }

    #[test]
    fn exact_fit_reserves_to_zero() {
        let mut t = trip(0.3);
        t.reserve(0.1).unwrap();
        t.reserve(0.2).unwrap();
        assert_eq!(t.available_space_kg, 0.0);
    }

    #[test]
    fn release_is_capped_at_max() {
        let mut t = trip(5.0);
        t.release(3.0);
        assert_eq!(t.available_space_kg, 5.0);
    }

    #[test]
    fn shrinking_below_committed_is_validation_error() {
        let mut t = trip(10.0);
        t.reserve(6.0).unwrap();
        let patch = TripPatch {
            max_weight_kg: Some(5.0),
            ..Default::default()
        };
        assert!(matches!(
            t.apply_patch(&patch),
            Err(LifecycleError::Validation(_))
        ));
        assert_eq!(t.max_weight_kg, 10.0);
    }

    #[test]
    fn growing_max_grows_available() {
        let mut t = trip(10.0);
        t.reserve(4.0).unwrap();
        let patch = TripPatch {
            max_weight_kg: Some(12.0),
            ..Default::default()
        };
        t.apply_patch(&patch).unwrap();
        assert_eq!(t.available_space_kg, 8.0);
    }

    #[test]
    fn patch_rejects_inverted_dates_against_existing() {
        let mut t = trip(10.0);
        let patch = TripPatch {
            departure_date: Some(date("2026-12-01")),
            ..Default::default()
        };
        assert!(t.apply_patch(&patch).is_err());
    }

    #[test]
    fn cancel_refused_while_committed() {
        let mut t = trip(10.0);
        t.reserve(1.0).unwrap();
        assert!(matches!(
            t.transition(TripStatus::Cancelled, None, "cancel"),
            Err(LifecycleError::InvalidState { .. })
        ));
        t.release(1.0);
        t.transition(TripStatus::Cancelled, None, "cancel").unwrap();
        assert_eq!(t.status, TripStatus::Cancelled);
    }

    #[test]
    fn in_progress_is_locked() {
        let mut t = trip(10.0);
        t.transition(TripStatus::InProgress, None, "departed").unwrap();
        assert!(t.ensure_editable().is_err());
        assert!(t.ensure_deletable().is_err());
        assert!(t.ensure_accepting().is_err());
    }

    #[test]
    fn delete_refused_while_committed() {
        let mut t = trip(10.0);
        assert!(t.ensure_deletable().is_ok());
        t.reserve(1.0).unwrap();
        assert!(t.ensure_deletable().is_err());
    }

    #[test]
    fn completed_is_terminal() {
        for status in TripStatus::ALL {
            assert_eq!(status.is_terminal(), status == TripStatus::Completed);
        }
        assert!(TripStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn only_traveler_passes_owner_check() {
        let t = trip(1.0);
        assert!(t.ensure_traveler(&Principal::user(t.traveler_id)).is_ok());
        assert!(t.ensure_traveler(&Principal::user(UserId::new())).is_err());
    }
}
