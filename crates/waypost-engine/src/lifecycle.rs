//! # Lifecycle Guard
//!
//! The service every package and trip mutation goes through. Each
//! operation reads the authoritative record under the ledger's write lock,
//! checks ownership and status, and mutates in the same critical section,
//! so no status change can slip in between the check and the write.
//!
//! Check order is ownership, then status, then field validation.

use metrics::counter;
use tracing::info;

use waypost_core::{PackageId, Principal, TripId, UserId};
use waypost_state::{
    Package, PackageDraft, PackagePatch, PackageStatus, SafetyConfirmationRecord, Trip, TripDraft,
    TripPatch, TripStatus,
};

use crate::error::EngineError;
use crate::ledger::{Ledger, Missing};

/// Guarded create/update/delete/status operations.
#[derive(Debug, Clone)]
pub struct LifecycleGuard {
    ledger: Ledger,
}

fn require_user(principal: &Principal) -> Result<UserId, EngineError> {
    principal
        .user_id
        .ok_or_else(|| EngineError::forbidden("a user identity is required to create records"))
}

fn record_transition(entity: &'static str, to: &'static str) {
    counter!("waypost_transitions_total", "entity" => entity, "to" => to).increment(1);
}

impl LifecycleGuard {
    /// Create a guard over `ledger`.
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    // ── Packages ─────────────────────────────────────────────────────

    /// Create a package owned by the principal.
    pub fn create_package(
        &self,
        draft: PackageDraft,
        principal: &Principal,
    ) -> Result<Package, EngineError> {
        let sender = require_user(principal)?;
        let package = Package::create(sender, draft)?;
        self.ledger.insert_package(package.clone());
        info!(package_id = %package.id, status = %package.status, "package created");
        Ok(package)
    }

    /// Fetch a package.
    pub fn package(&self, id: &PackageId) -> Result<Package, EngineError> {
        Ok(self.ledger.package(id).ok_or(Missing::Package(*id))?)
    }

    /// All packages, oldest first, optionally narrowed to one status.
    pub fn list_packages(&self, status: Option<PackageStatus>) -> Vec<Package> {
        let mut packages = self.ledger.packages();
        if let Some(status) = status {
            packages.retain(|p| p.status == status);
        }
        packages
    }

    /// Safety confirmations sealed for a package. Participants and admins.
    pub fn confirmations(
        &self,
        id: &PackageId,
        principal: &Principal,
    ) -> Result<Vec<SafetyConfirmationRecord>, EngineError> {
        let package = self.package(id)?;
        if !principal.admin {
            package.ensure_participant(principal)?;
        }
        Ok(self.ledger.confirmations_for(id))
    }

    /// Edit a package's fields. Sender only; not while IN_TRANSIT or
    /// DELIVERED.
    pub fn update_package(
        &self,
        id: &PackageId,
        patch: &PackagePatch,
        principal: &Principal,
    ) -> Result<Package, EngineError> {
        self.ledger.try_update_package(id, |package| {
            package.ensure_sender(principal)?;
            package.apply_patch(patch)?;
            Ok::<_, EngineError>(package.clone())
        })
    }

    /// Delete a package. Sender only; not while MATCHED, IN_TRANSIT,
    /// DELIVERED, or otherwise linked to a trip.
    pub fn delete_package(
        &self,
        id: &PackageId,
        principal: &Principal,
    ) -> Result<Package, EngineError> {
        let removed = self.ledger.remove_package_if(id, |package| {
            package.ensure_sender(principal)?;
            package.ensure_deletable()?;
            Ok::<_, EngineError>(())
        })?;
        info!(package_id = %id, "package deleted");
        Ok(removed)
    }

    /// Move a package along a status edge.
    ///
    /// Entering POSTED or CANCELLED from a linked status returns the
    /// package's weight to its trip in the same critical section.
    pub fn update_package_status(
        &self,
        id: &PackageId,
        target: PackageStatus,
        principal: &Principal,
    ) -> Result<Package, EngineError> {
        let package = self.ledger.try_update_package_linked(id, |package, trip| {
            package.authorize_transition(target, principal)?;
            transition_package(package, trip, target, principal, "status update")?;
            Ok::<_, EngineError>(package.clone())
        })?;
        record_transition("package", target.as_str());
        info!(package_id = %id, status = %target, "package status changed");
        Ok(package)
    }

    /// Undo an assignment (MATCHED → POSTED), releasing trip capacity.
    /// Sender or assigned traveler.
    pub fn unassign_package(
        &self,
        id: &PackageId,
        principal: &Principal,
    ) -> Result<Package, EngineError> {
        let package = self.ledger.try_update_package_linked(id, |package, trip| {
            package.ensure_participant(principal)?;
            if package.status != PackageStatus::Matched {
                return Err(EngineError::InvalidState(format!(
                    "package {} is {}; only MATCHED packages can be unassigned",
                    package.id, package.status
                )));
            }
            transition_package(package, trip, PackageStatus::Posted, principal, "unassigned")?;
            Ok::<_, EngineError>(package.clone())
        })?;
        record_transition("package", PackageStatus::Posted.as_str());
        info!(package_id = %id, "package unassigned");
        Ok(package)
    }

    // ── Trips ────────────────────────────────────────────────────────

    /// Create a trip owned by the principal.
    pub fn create_trip(
        &self,
        draft: TripDraft,
        principal: &Principal,
    ) -> Result<Trip, EngineError> {
        let traveler = require_user(principal)?;
        let trip = Trip::create(traveler, draft)?;
        self.ledger.insert_trip(trip.clone());
        info!(trip_id = %trip.id, status = %trip.status, "trip created");
        Ok(trip)
    }

    /// Fetch a trip.
    pub fn trip(&self, id: &TripId) -> Result<Trip, EngineError> {
        Ok(self.ledger.trip(id).ok_or(Missing::Trip(*id))?)
    }

    /// All trips, oldest first, optionally narrowed to one status.
    pub fn list_trips(&self, status: Option<TripStatus>) -> Vec<Trip> {
        let mut trips = self.ledger.trips();
        if let Some(status) = status {
            trips.retain(|t| t.status == status);
        }
        trips
    }

    /// Edit a trip's fields. Traveler only; not while IN_PROGRESS or
    /// COMPLETED.
    pub fn update_trip(
        &self,
        id: &TripId,
        patch: &TripPatch,
        principal: &Principal,
    ) -> Result<Trip, EngineError> {
        self.ledger.try_update_trip(id, |trip| {
            trip.ensure_traveler(principal)?;
            trip.apply_patch(patch)?;
            Ok::<_, EngineError>(trip.clone())
        })
    }

    /// Delete a trip. Traveler only; refused while capacity is committed.
    pub fn delete_trip(&self, id: &TripId, principal: &Principal) -> Result<Trip, EngineError> {
        let removed = self.ledger.remove_trip_if(id, |trip| {
            trip.ensure_traveler(principal)?;
            trip.ensure_deletable()?;
            Ok::<_, EngineError>(())
        })?;
        info!(trip_id = %id, "trip deleted");
        Ok(removed)
    }

    /// Move a trip along a status edge. Traveler or admin.
    pub fn update_trip_status(
        &self,
        id: &TripId,
        target: TripStatus,
        principal: &Principal,
    ) -> Result<Trip, EngineError> {
        let trip = self.ledger.try_update_trip(id, |trip| {
            if !principal.admin {
                trip.ensure_traveler(principal)?;
            }
            trip.transition(target, principal.user_id, "status update")?;
            Ok::<_, EngineError>(trip.clone())
        })?;
        record_transition("trip", target.as_str());
        info!(trip_id = %id, status = %target, "trip status changed");
        Ok(trip)
    }
}

fn transition_package(
    package: &mut Package,
    trip: Option<&mut Trip>,
    target: PackageStatus,
    principal: &Principal,
    reason: &str,
) -> Result<(), EngineError> {
    let released = package.transition(target, principal.user_id, reason)?;
    if let (Some(released), Some(trip)) = (released, trip) {
        if trip.id == released {
            trip.release(package.weight_kg);
        }
    }
    Ok(())
}
