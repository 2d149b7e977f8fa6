//! # waypost-engine: Assignment and Lifecycle Services
//!
//! The stateful half of Waypost. Everything here operates on a shared
//! [`Ledger`] whose single write lock is the only critical section in the
//! system.
//!
//! - [`AssignmentCoordinator`]: candidate search over ledger snapshots and
//!   the atomic package-to-trip commit.
//! - [`LifecycleGuard`]: create, edit, delete and status changes for
//!   packages and trips, each checked and applied under the write lock.
//! - [`ChannelProvisioner`]: the chat-channel seam. Provisioning happens
//!   after commit and can only produce warnings.
//!
//! All services are synchronous. They never hold the lock across an
//! `.await`, so async callers may invoke them directly.

pub mod channel;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod lifecycle;

pub use channel::{Channel, ChannelError, ChannelProvisioner, InMemoryChannels};
pub use coordinator::{AssignmentCoordinator, AssignmentOutcome, AssignmentRequest};
pub use error::EngineError;
pub use ledger::{Ledger, Missing};
pub use lifecycle::LifecycleGuard;
