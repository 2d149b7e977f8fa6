//! # Transition Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waypost_core::UserId;

/// A record of one status change, kept on the entity for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord<S> {
    /// Status before the transition.
    pub from_state: S,
    /// Status after the transition.
    pub to_state: S,
    /// Who caused it, when known.
    pub actor: Option<UserId>,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Short explanation, e.g. "assigned to trip".
    pub reason: String,
}
