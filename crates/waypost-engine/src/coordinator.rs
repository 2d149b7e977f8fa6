//! # Assignment Coordinator
//!
//! Binds a package to a trip. Steps 1 to 3 are all-or-nothing; steps 4
//! and 5 run only after the commit.
//!
//! 1. Require a selected candidate, reload both records, check the
//!    principal owns the anchor, and check the safety attestations and
//!    that sender and traveler differ.
//! 2. Check the package is POSTED, the trip is POSTED, and the trip has
//!    room for the package.
//! 3. Under one write lock over both records, re-check step 2 against the
//!    current values, then mark the package MATCHED and reserve capacity.
//! 4. Create-or-get the chat channel. Failure becomes a warning.
//! 5. Store the safety confirmation record, sealed before step 3.
//!
//! Step 2 on snapshots lets most rejections return without taking the
//! write lock. Step 3 is what guarantees at most one assignment per
//! package and non-negative capacity under contention.

use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use waypost_core::{MatchDirection, PackageId, Principal, TripId};
use waypost_match::{Candidate, CandidateFinder};
use waypost_state::{
    AssignmentSubmission, GateError, Package, PackageStatus, SafetyConfirmationRecord,
    SafetyConfirmationSet, Trip, TripStatus,
};

use crate::channel::{Channel, ChannelProvisioner};
use crate::error::EngineError;
use crate::ledger::{Ledger, Missing};

/// An assignment attempt as submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentRequest {
    /// The entity the search started from.
    pub anchor_id: Uuid,
    /// The selected candidate. A submission without one fails validation.
    #[serde(default)]
    pub candidate_id: Option<Uuid>,
    /// Which side is the anchor.
    pub direction: MatchDirection,
    /// The five attestations.
    #[serde(default)]
    pub confirmations: SafetyConfirmationSet,
}

impl From<AssignmentSubmission> for AssignmentRequest {
    fn from(submission: AssignmentSubmission) -> Self {
        Self {
            anchor_id: submission.anchor_id,
            candidate_id: Some(submission.candidate_id),
            direction: submission.direction,
            confirmations: submission.confirmations,
        }
    }
}

/// The committed result of a successful assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOutcome {
    /// The package, now MATCHED.
    pub package: Package,
    /// The trip, with capacity reserved.
    pub trip: Trip,
    /// The chat channel, or `None` when provisioning failed.
    pub channel: Option<Channel>,
    /// The sealed attestation record.
    pub confirmation: SafetyConfirmationRecord,
    /// Non-fatal problems encountered after the commit.
    pub warnings: Vec<String>,
}

/// Executes assignments and answers candidate searches.
#[derive(Debug, Clone)]
pub struct AssignmentCoordinator {
    ledger: Ledger,
    finder: Arc<CandidateFinder>,
    channels: Arc<dyn ChannelProvisioner>,
}

impl AssignmentCoordinator {
    /// Create a coordinator over `ledger`.
    pub fn new(
        ledger: Ledger,
        finder: CandidateFinder,
        channels: Arc<dyn ChannelProvisioner>,
    ) -> Self {
        Self {
            ledger,
            finder: Arc::new(finder),
            channels,
        }
    }

    // ── Candidate search ─────────────────────────────────────────────

    /// Trips that could carry `package_id`.
    ///
    /// The pool is every POSTED trip not owned by the package's sender,
    /// oldest first.
    pub fn trip_candidates(
        &self,
        package_id: &PackageId,
    ) -> Result<Vec<Candidate<Trip>>, EngineError> {
        let anchor = self
            .ledger
            .package(package_id)
            .ok_or(Missing::Package(*package_id))?;
        let pool = self
            .ledger
            .trips()
            .into_iter()
            .filter(|t| t.status == TripStatus::Posted && t.traveler_id != anchor.sender_id);
        Ok(self.finder.trips_for_package(&anchor, pool))
    }

    /// Packages that `trip_id` could carry.
    ///
    /// The pool is every POSTED package not owned by the traveler, oldest
    /// first.
    pub fn package_candidates(
        &self,
        trip_id: &TripId,
    ) -> Result<Vec<Candidate<Package>>, EngineError> {
        let anchor = self.ledger.trip(trip_id).ok_or(Missing::Trip(*trip_id))?;
        let pool = self
            .ledger
            .packages()
            .into_iter()
            .filter(|p| p.status == PackageStatus::Posted && p.sender_id != anchor.traveler_id);
        Ok(self.finder.packages_for_trip(&anchor, pool))
    }

    // ── Assignment ───────────────────────────────────────────────────

    /// Bind the package and trip named by `request`.
    pub fn request_assignment(
        &self,
        request: AssignmentRequest,
        principal: &Principal,
    ) -> Result<AssignmentOutcome, EngineError> {
        let result = self.commit(request, principal);
        let outcome = match &result {
            Ok(_) => "committed",
            Err(err) => err.kind(),
        };
        counter!("waypost_assignments_total", "outcome" => outcome).increment(1);
        result
    }

    fn commit(
        &self,
        request: AssignmentRequest,
        principal: &Principal,
    ) -> Result<AssignmentOutcome, EngineError> {
        let candidate_id = request.candidate_id.ok_or(GateError::NoCandidate)?;
        let pair = request.direction.pair(request.anchor_id, candidate_id);

        // Step 1: reload and check preconditions.
        let package = self
            .ledger
            .package(&pair.package_id)
            .ok_or(Missing::Package(pair.package_id))?;
        let trip = self
            .ledger
            .trip(&pair.trip_id)
            .ok_or(Missing::Trip(pair.trip_id))?;

        match request.direction {
            MatchDirection::AssignTripToPackage => package.ensure_sender(principal)?,
            MatchDirection::AssignPackageToTrip => trip.ensure_traveler(principal)?,
        }
        request.confirmations.require_satisfied()?;
        if package.sender_id == trip.traveler_id {
            return Err(EngineError::ValidationFailed(
                "sender and traveler must be different users".to_string(),
            ));
        }

        // Step 2: availability on snapshots.
        check_assignable(&package, &trip)?;

        // Sealed ahead of the commit so nothing after it can fail.
        let confirmation = SafetyConfirmationRecord::seal(
            *principal,
            request.direction.confirming_role(),
            package.id,
            trip.id,
            request.confirmations,
        )?;

        // Step 3: compare-and-set under one write lock.
        let actor = principal.user_id;
        let (package, trip) = self
            .ledger
            .try_update_pair(&pair.package_id, &pair.trip_id, |package, trip| {
                check_assignable(package, trip)?;
                trip.reserve(package.weight_kg)?;
                package.bind_to_trip(trip.id, trip.traveler_id, actor)?;
                Ok::<_, EngineError>((package.clone(), trip.clone()))
            })
            .map_err(|err| {
                debug!(
                    package_id = %pair.package_id,
                    trip_id = %pair.trip_id,
                    error = %err,
                    "assignment rejected at commit"
                );
                err
            })?;

        info!(
            package_id = %package.id,
            trip_id = %trip.id,
            weight_kg = package.weight_kg,
            available_space_kg = trip.available_space_kg,
            direction = request.direction.as_str(),
            "assignment committed"
        );

        // Step 4: best-effort channel.
        let mut warnings = Vec::new();
        let channel = match self.channels.create_or_get(&package, &trip) {
            Ok(channel) => Some(channel),
            Err(err) => {
                warn!(
                    package_id = %package.id,
                    trip_id = %trip.id,
                    error = %err,
                    "channel provisioning failed; assignment stands"
                );
                warnings.push(format!("chat channel could not be created: {err}"));
                None
            }
        };

        // Step 5: persist the attestation.
        self.ledger.record_confirmation(confirmation.clone());

        Ok(AssignmentOutcome {
            package,
            trip,
            channel,
            confirmation,
            warnings,
        })
    }
}

/// Package POSTED, trip accepting, and enough room.
fn check_assignable(package: &Package, trip: &Trip) -> Result<(), EngineError> {
    if package.status != PackageStatus::Posted {
        return Err(EngineError::AlreadyMatched(package.id));
    }
    trip.ensure_accepting()?;
    if !trip.can_carry(package.weight_kg) {
        return Err(EngineError::CapacityExceeded {
            trip_id: trip.id,
            available_kg: trip.available_space_kg,
            required_kg: package.weight_kg,
        });
    }
    Ok(())
}
