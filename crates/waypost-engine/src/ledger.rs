//! # Ledger
//!
//! Thread-safe, cloneable in-memory record of packages, trips, and sealed
//! safety confirmations.
//!
//! Both entity tables sit behind one `parking_lot::RwLock`, so a single
//! write guard covers a package and its trip together. Every mutating
//! method follows clone-mutate-commit: the closure works on copies, and
//! the copies are written back only when it returns `Ok`. A rejected
//! operation therefore leaves both records untouched.
//!
//! The lock is never held across `.await` points.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use waypost_core::{PackageId, TripId};
use waypost_state::{Package, SafetyConfirmationRecord, Trip};

/// A record the ledger was asked for but does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No such package.
    Package(PackageId),
    /// No such trip.
    Trip(TripId),
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Package(id) => write!(f, "package {id} not found"),
            Self::Trip(id) => write!(f, "trip {id} not found"),
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    packages: HashMap<PackageId, Package>,
    trips: HashMap<TripId, Trip>,
    confirmations: Vec<SafetyConfirmationRecord>,
}

/// Shared store for every engine service.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    tables: Arc<RwLock<Tables>>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Snapshot of one package.
    pub fn package(&self, id: &PackageId) -> Option<Package> {
        self.tables.read().packages.get(id).cloned()
    }

    /// Snapshot of one trip.
    pub fn trip(&self, id: &TripId) -> Option<Trip> {
        self.tables.read().trips.get(id).cloned()
    }

    /// Snapshot of all packages, oldest first.
    pub fn packages(&self) -> Vec<Package> {
        let mut packages: Vec<Package> = self.tables.read().packages.values().cloned().collect();
        packages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        packages
    }

    /// Snapshot of all trips, oldest first.
    pub fn trips(&self) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self.tables.read().trips.values().cloned().collect();
        trips.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        trips
    }

    /// Sealed confirmations for a package, oldest first.
    pub fn confirmations_for(&self, package_id: &PackageId) -> Vec<SafetyConfirmationRecord> {
        self.tables
            .read()
            .confirmations
            .iter()
            .filter(|record| &record.package_id == package_id)
            .cloned()
            .collect()
    }

    /// Number of packages held.
    pub fn package_count(&self) -> usize {
        self.tables.read().packages.len()
    }

    /// Number of trips held.
    pub fn trip_count(&self) -> usize {
        self.tables.read().trips.len()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert or replace a package.
    pub fn insert_package(&self, package: Package) {
        self.tables.write().packages.insert(package.id, package);
    }

    /// Insert or replace a trip.
    pub fn insert_trip(&self, trip: Trip) {
        self.tables.write().trips.insert(trip.id, trip);
    }

    /// Append a sealed confirmation.
    pub fn record_confirmation(&self, record: SafetyConfirmationRecord) {
        self.tables.write().confirmations.push(record);
    }

    /// Atomically read-validate-update one package.
    pub fn try_update_package<R, E>(
        &self,
        id: &PackageId,
        f: impl FnOnce(&mut Package) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<Missing>,
    {
        let mut tables = self.tables.write();
        let mut draft = tables
            .packages
            .get(id)
            .cloned()
            .ok_or(Missing::Package(*id))?;
        let result = f(&mut draft)?;
        tables.packages.insert(*id, draft);
        Ok(result)
    }

    /// Atomically read-validate-update one trip.
    pub fn try_update_trip<R, E>(
        &self,
        id: &TripId,
        f: impl FnOnce(&mut Trip) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<Missing>,
    {
        let mut tables = self.tables.write();
        let mut draft = tables.trips.get(id).cloned().ok_or(Missing::Trip(*id))?;
        let result = f(&mut draft)?;
        tables.trips.insert(*id, draft);
        Ok(result)
    }

    /// Atomically read-validate-update a package and a trip together.
    pub fn try_update_pair<R, E>(
        &self,
        package_id: &PackageId,
        trip_id: &TripId,
        f: impl FnOnce(&mut Package, &mut Trip) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<Missing>,
    {
        let mut tables = self.tables.write();
        let mut package = tables
            .packages
            .get(package_id)
            .cloned()
            .ok_or(Missing::Package(*package_id))?;
        let mut trip = tables
            .trips
            .get(trip_id)
            .cloned()
            .ok_or(Missing::Trip(*trip_id))?;
        let result = f(&mut package, &mut trip)?;
        tables.packages.insert(*package_id, package);
        tables.trips.insert(*trip_id, trip);
        Ok(result)
    }

    /// Atomically update a package together with whatever trip it is
    /// linked to at the moment the lock is taken.
    ///
    /// The closure receives `None` when the package is unlinked.
    pub fn try_update_package_linked<R, E>(
        &self,
        id: &PackageId,
        f: impl FnOnce(&mut Package, Option<&mut Trip>) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<Missing>,
    {
        let mut tables = self.tables.write();
        let mut package = tables
            .packages
            .get(id)
            .cloned()
            .ok_or(Missing::Package(*id))?;
        let mut trip = package
            .trip_id
            .and_then(|trip_id| tables.trips.get(&trip_id).cloned());
        let result = f(&mut package, trip.as_mut())?;
        tables.packages.insert(*id, package);
        if let Some(trip) = trip {
            tables.trips.insert(trip.id, trip);
        }
        Ok(result)
    }

    /// Remove a package if `check` approves it under the write lock.
    pub fn remove_package_if<E>(
        &self,
        id: &PackageId,
        check: impl FnOnce(&Package) -> Result<(), E>,
    ) -> Result<Package, E>
    where
        E: From<Missing>,
    {
        let mut tables = self.tables.write();
        let package = tables.packages.get(id).ok_or(Missing::Package(*id))?;
        check(package)?;
        tables.packages.remove(id).ok_or_else(|| Missing::Package(*id).into())
    }

    /// Remove a trip if `check` approves it under the write lock.
    pub fn remove_trip_if<E>(
        &self,
        id: &TripId,
        check: impl FnOnce(&Trip) -> Result<(), E>,
    ) -> Result<Trip, E>
    where
        E: From<Missing>,
    {
        let mut tables = self.tables.write();
        let trip = tables.trips.get(id).ok_or(Missing::Trip(*id))?;
        check(trip)?;
        tables.trips.remove(id).ok_or_else(|| Missing::Trip(*id).into())
    }
}
