//! # waypost-state: Lifecycle State Machines
//!
//! Implements the state machines that guard every mutation of a Package or
//! Trip, plus the safety gate that must be satisfied before two of them are
//! bound together.
//!
//! ## State Machines
//!
//! - **Package** (`package.rs`): `DRAFT → POSTED → MATCHED → IN_TRANSIT →
//!   DELIVERED` with `CANCELLED` and `DISPUTED` branches. Owns the edit and
//!   delete guards and the trip-link invariant.
//!
//! - **Trip** (`trip.rs`): `DRAFT → POSTED → IN_PROGRESS → COMPLETED` with a
//!   `CANCELLED` branch. Owns capacity accounting
//!   (`0 ≤ available_space_kg ≤ max_weight_kg`).
//!
//! - **Safety gate** (`safety.rs`): five boolean attestations, satisfied
//!   only when all five hold.
//!
//! - **Assignment wizard** (`wizard.rs`): the select → confirm → submit
//!   interaction as an explicit finite-state value object.
//!
//! ## Design
//!
//! Both entity machines use a status enum with a `valid_transitions()` table
//! rather than typestate types. Statuses arrive from storage and HTTP at
//! runtime, so every guard has to be a runtime check that returns a
//! structured [`LifecycleError`].

pub mod error;
pub mod package;
pub mod record;
pub mod safety;
pub mod trip;
pub mod wizard;

pub use error::LifecycleError;
pub use package::{Package, PackageDraft, PackagePatch, PackagePriority, PackageStatus};
pub use record::TransitionRecord;
pub use safety::{GateError, SafetyConcern, SafetyConfirmationRecord, SafetyConfirmationSet};
pub use trip::{Trip, TripDraft, TripPatch, TripStatus};
pub use wizard::{AssignmentSubmission, AssignmentWizard, WizardStage};
