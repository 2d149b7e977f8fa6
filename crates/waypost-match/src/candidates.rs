//! # Candidate Search
//!
//! Filters a pool of opposite-type entities against an anchor. The pool's
//! order is preserved; the finder never sorts, ranks, or fails.
//!
//! | Direction | Anchor | Pool | Compared addresses |
//! |---|---|---|---|
//! | `assign-trip-to-package` | Package | Trips | trip destination vs package delivery |
//! | `assign-package-to-trip` | Trip | Packages | package pickup vs trip destination |
//!
//! The second row is the rule the platform has always applied. It is kept
//! behind [`AddressPairing`] so an alternative rule can be injected
//! without touching the finder.

use serde::Serialize;

use waypost_core::Address;
use waypost_state::{Package, Trip};

use crate::geo::{Compatibility, GeoMatcher};

/// Chooses which two addresses decide compatibility for each direction.
///
/// Both methods return `(candidate_address, anchor_address)`.
pub trait AddressPairing: Send + Sync + std::fmt::Debug {
    /// Addresses compared when a package looks for trips.
    fn trip_for_package<'a>(&self, anchor: &'a Package, candidate: &'a Trip)
        -> (&'a Address, &'a Address);

    /// Addresses compared when a trip looks for packages.
    fn package_for_trip<'a>(&self, anchor: &'a Trip, candidate: &'a Package)
        -> (&'a Address, &'a Address);
}

/// The pairing rule in production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedPairing;

impl AddressPairing for ObservedPairing {
    fn trip_for_package<'a>(
        &self,
        anchor: &'a Package,
        candidate: &'a Trip,
    ) -> (&'a Address, &'a Address) {
        (&candidate.destination_address, &anchor.delivery_address)
    }

    fn package_for_trip<'a>(
        &self,
        anchor: &'a Trip,
        candidate: &'a Package,
    ) -> (&'a Address, &'a Address) {
        (&candidate.pickup_address, &anchor.destination_address)
    }
}

/// A pool member that passed the filter, with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate<T> {
    /// The matching entity.
    #[serde(flatten)]
    pub entity: T,
    /// Why it matched, including the distance when known.
    pub compatibility: Compatibility,
}

/// Filters pools against anchors.
#[derive(Debug, Clone)]
pub struct CandidateFinder<P = ObservedPairing> {
    matcher: GeoMatcher,
    pairing: P,
}

impl CandidateFinder<ObservedPairing> {
    /// A finder using the production pairing rule.
    pub fn new(matcher: GeoMatcher) -> Self {
        Self::with_pairing(matcher, ObservedPairing)
    }
}

impl Default for CandidateFinder<ObservedPairing> {
    fn default() -> Self {
        Self::new(GeoMatcher::default())
    }
}

impl<P: AddressPairing> CandidateFinder<P> {
    /// A finder using a custom pairing rule.
    pub fn with_pairing(matcher: GeoMatcher, pairing: P) -> Self {
        Self { matcher, pairing }
    }

    /// The underlying matcher.
    pub fn matcher(&self) -> &GeoMatcher {
        &self.matcher
    }

    /// Trips in `pool` compatible with `anchor`, in pool order.
    pub fn trips_for_package<I>(&self, anchor: &Package, pool: I) -> Vec<Candidate<Trip>>
    where
        I: IntoIterator<Item = Trip>,
    {
        pool.into_iter()
            .filter_map(|trip| {
                let (ours, theirs) = self.pairing.trip_for_package(anchor, &trip);
                let compatibility = self.matcher.compatible(ours, theirs);
                compatibility.compatible.then_some(Candidate {
                    entity: trip,
                    compatibility,
                })
            })
            .collect()
    }

    /// Packages in `pool` compatible with `anchor`, in pool order.
    pub fn packages_for_trip<I>(&self, anchor: &Trip, pool: I) -> Vec<Candidate<Package>>
    where
        I: IntoIterator<Item = Package>,
    {
        pool.into_iter()
            .filter_map(|package| {
                let (ours, theirs) = self.pairing.package_for_trip(anchor, &package);
                let compatibility = self.matcher.compatible(ours, theirs);
                compatibility.compatible.then_some(Candidate {
                    entity: package,
                    compatibility,
                })
            })
            .collect()
    }
}
