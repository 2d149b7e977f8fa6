//! # API Route Modules
//!
//! - `packages`: package CRUD, status changes, unassignment, trip
//!   candidates, and stored safety confirmations.
//! - `trips`: trip CRUD, status changes, and package candidates.
//! - `assignments`: the atomic package-to-trip commit.

use serde::Deserialize;
use utoipa::ToSchema;

pub mod assignments;
pub mod packages;
pub mod trips;

/// Body of the `PUT /{entity}/{id}/status` endpoints.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct StatusChange<S> {
    pub status: S,
}
