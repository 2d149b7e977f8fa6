//! # Match Directions
//!
//! A candidate search starts from an anchor entity and looks at a pool of
//! the opposite type. The direction names which side is the anchor, and
//! with it which owner is confirming the safety attestations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::identity::{PackageId, TripId};

/// Which side of the pairing the search is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MatchDirection {
    /// Anchor is a Package; the pool holds Trips.
    AssignTripToPackage,
    /// Anchor is a Trip; the pool holds Packages.
    AssignPackageToTrip,
}

impl MatchDirection {
    /// Return the wire name of this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignTripToPackage => "assign-trip-to-package",
            Self::AssignPackageToTrip => "assign-package-to-trip",
        }
    }

    /// Resolve an `(anchor, candidate)` id pair into a `(package, trip)` pair.
    pub fn pair(&self, anchor: Uuid, candidate: Uuid) -> AssignmentPair {
        match self {
            Self::AssignTripToPackage => AssignmentPair {
                package_id: PackageId::from_uuid(anchor),
                trip_id: TripId::from_uuid(candidate),
            },
            Self::AssignPackageToTrip => AssignmentPair {
                package_id: PackageId::from_uuid(candidate),
                trip_id: TripId::from_uuid(anchor),
            },
        }
    }

    /// The role of the anchor's owner, who signs the attestations.
    pub fn confirming_role(&self) -> ConfirmationRole {
        match self {
            Self::AssignTripToPackage => ConfirmationRole::Sender,
            Self::AssignPackageToTrip => ConfirmationRole::Traveler,
        }
    }
}

impl std::fmt::Display for MatchDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(package, trip)` pair an assignment binds together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentPair {
    /// The package being carried.
    pub package_id: PackageId,
    /// The trip carrying it.
    pub trip_id: TripId,
}

/// The side of the pairing a principal acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationRole {
    /// Owner of the package.
    Sender,
    /// Owner of the trip.
    Traveler,
}

impl ConfirmationRole {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sender => "SENDER",
            Self::Traveler => "TRAVELER",
        }
    }
}
