//! # waypost-match: Candidate Matching
//!
//! Decides which trips could carry a package and which packages a trip
//! could carry. Matching is a pure function of its inputs: it never fails,
//! never mutates, and an empty result is a valid answer.
//!
//! - [`GeoMatcher`] (`geo.rs`): administrative match on city, state and
//!   country, AND a great-circle distance check when both sides carry
//!   coordinates.
//! - [`CandidateFinder`] (`candidates.rs`): filters a pool against an
//!   anchor, preserving pool order. Which addresses are compared is
//!   delegated to an [`AddressPairing`] strategy.

pub mod candidates;
pub mod geo;

pub use candidates::{AddressPairing, Candidate, CandidateFinder, ObservedPairing};
pub use geo::{haversine_km, Compatibility, GeoMatcher, DEFAULT_THRESHOLD_KM, EARTH_RADIUS_KM};
