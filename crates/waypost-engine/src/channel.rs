//! # Communication Channels
//!
//! Each assigned `(package, trip)` pair gets one chat channel shared by
//! the sender and the traveler. Transcript storage lives elsewhere; the
//! engine only needs create-or-get semantics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use waypost_core::{AssignmentPair, ChannelId, PackageId, TripId, UserId};
use waypost_state::{Package, Trip};

/// A conversation scoped to one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier.
    pub id: ChannelId,
    /// The package side of the pair.
    pub package_id: PackageId,
    /// The trip side of the pair.
    pub trip_id: TripId,
    /// Sender and traveler.
    pub participants: Vec<UserId>,
    /// When the channel was first provisioned.
    pub created_at: DateTime<Utc>,
}

/// Channel provisioning failures. Never fatal to an assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The chat backend could not be reached or refused the request.
    #[error("channel service unavailable: {0}")]
    Unavailable(String),
}

/// Creates, or returns the existing, channel for a pair.
///
/// Implementations must be idempotent per `(package_id, trip_id)`.
pub trait ChannelProvisioner: Send + Sync + std::fmt::Debug {
    /// Create-or-get the channel for `package` and `trip`.
    fn create_or_get(&self, package: &Package, trip: &Trip) -> Result<Channel, ChannelError>;
}

/// Process-local provisioner.
#[derive(Debug, Default)]
pub struct InMemoryChannels {
    channels: Mutex<HashMap<AssignmentPair, Channel>>,
}

impl InMemoryChannels {
    /// Create an empty provisioner.
    pub fn new() -> Self {
        Self::default()
    }

    /// The channel for a pair, if one exists.
    pub fn get(&self, pair: &AssignmentPair) -> Option<Channel> {
        self.channels.lock().get(pair).cloned()
    }

    /// Number of channels provisioned.
    pub fn len(&self) -> usize {
        self.channels.lock().len()
    }

    /// Whether no channels exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChannelProvisioner for InMemoryChannels {
    fn create_or_get(&self, package: &Package, trip: &Trip) -> Result<Channel, ChannelError> {
        let pair = AssignmentPair {
            package_id: package.id,
            trip_id: trip.id,
        };
        let channel = self
            .channels
            .lock()
            .entry(pair)
            .or_insert_with(|| Channel {
                id: ChannelId::new(),
                package_id: package.id,
                trip_id: trip.id,
                participants: vec![package.sender_id, trip.traveler_id],
                created_at: Utc::now(),
            })
            .clone();
        Ok(channel)
    }
}
