#![deny(missing_docs)]

//! # waypost-core: Foundational Types for Waypost
//!
//! This crate defines the primitives every other crate in the workspace
//! depends on. It has no internal crate dependencies: only `serde`,
//! `thiserror`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** You cannot pass a [`TripId`]
//!    where a [`PackageId`] is expected.
//!
//! 2. **Coordinates are explicitly optional.** [`Address::coordinates`]
//!    returns `Option<Coordinates>`, so the permissive distance fallback in
//!    the matcher is a visible `match` arm rather than a falsy check.
//!
//! 3. **Direction decides the pair.** [`MatchDirection::pair`] is the single
//!    place that turns an `(anchor, candidate)` id pair into a
//!    `(package, trip)` pair.

pub mod address;
pub mod direction;
pub mod error;
pub mod identity;
pub mod principal;

pub use address::{Address, Coordinates};
pub use direction::{AssignmentPair, ConfirmationRole, MatchDirection};
pub use error::ValidationError;
pub use identity::{ChannelId, ConfirmationId, PackageId, TripId, UserId};
pub use principal::Principal;
