//! # Package Lifecycle State Machine
//!
//! ## States
//!
//! ```text
//!   DRAFT ──publish──▶ POSTED ──assign──▶ MATCHED ──pick up──▶ IN_TRANSIT ──▶ DELIVERED
//!                       ▲  │  ◀─unassign──┘   │                   │  │
//!                       │  │                  │                   │  │
//!            reactivate │  └──cancel──▶ CANCELLED ◀──cancel───────┘  │
//!                       └───────────────────┘                        │
//!                                     MATCHED / IN_TRANSIT ──▶ DISPUTED
//! ```
//!
//! `POSTED → MATCHED` is reserved for the assignment coordinator; the
//! generic status endpoint refuses it. `DISPUTED` is entered only by an
//! administrator acting for the dispute process.
//!
//! ## Trip Link Invariant
//!
//! `trip_id` is set exactly when the package is MATCHED, IN_TRANSIT, or
//! DELIVERED, or DISPUTED after being linked. `traveler_id` is set exactly
//! when `trip_id` is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use waypost_core::{Address, PackageId, Principal, TripId, UserId, ValidationError};

use crate::error::LifecycleError;
use crate::record::TransitionRecord;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Created but not yet visible to travelers.
    Draft,
    /// Visible and waiting for a trip.
    Posted,
    /// Bound to a trip; capacity reserved.
    Matched,
    /// Picked up by the traveler.
    InTransit,
    /// Handed over at the destination. Terminal.
    Delivered,
    /// Withdrawn by the sender or an administrator.
    Cancelled,
    /// Under dispute; raised externally.
    Disputed,
}

impl PackageStatus {
    /// Every status, in declaration order.
    pub const ALL: [PackageStatus; 7] = [
        Self::Draft,
        Self::Posted,
        Self::Matched,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
        Self::Disputed,
    ];

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Posted => "POSTED",
            Self::Matched => "MATCHED",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Disputed => "DISPUTED",
        }
    }

    /// Whether this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// The statuses reachable from this one.
    pub fn valid_transitions(&self) -> &'static [PackageStatus] {
        match self {
            Self::Draft => &[Self::Posted],
            Self::Posted => &[Self::Matched, Self::Cancelled],
            Self::Matched => &[Self::InTransit, Self::Posted, Self::Disputed],
            Self::InTransit => &[Self::Delivered, Self::Cancelled, Self::Disputed],
            Self::Delivered => &[],
            Self::Cancelled => &[Self::Posted],
            Self::Disputed => &[Self::InTransit, Self::Delivered, Self::Cancelled],
        }
    }

    /// Whether `target` is a legal next status.
    pub fn can_transition_to(&self, target: PackageStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Whether field edits are permitted in this status.
    pub fn allows_edit(&self) -> bool {
        !matches!(self, Self::InTransit | Self::Delivered)
    }

    /// Whether the package may be deleted in this status.
    pub fn allows_delete(&self) -> bool {
        !matches!(self, Self::Matched | Self::InTransit | Self::Delivered)
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery urgency chosen by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackagePriority {
    /// No time pressure.
    Low,
    /// Default.
    #[default]
    Normal,
    /// Should travel on the next suitable trip.
    High,
    /// Time critical.
    Urgent,
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Fields supplied by the sender when creating a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PackageDraft {
    /// Short title.
    pub title: String,
    /// What is inside and how it is packed.
    #[serde(default)]
    pub description: String,
    /// Where the traveler collects the package.
    pub pickup_address: Address,
    /// Where the package must arrive.
    pub delivery_address: Address,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Declared value.
    #[serde(default)]
    pub value: f64,
    /// Free-form category, e.g. "documents".
    pub category: String,
    /// Delivery urgency.
    #[serde(default)]
    pub priority: PackagePriority,
    /// Create directly in POSTED instead of DRAFT.
    #[serde(default)]
    pub publish: bool,
}

impl PackageDraft {
    /// Validate every field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_text("title", &self.title)?;
        ValidationError::require_text("category", &self.category)?;
        self.pickup_address.validate()?;
        self.delivery_address.validate()?;
        ValidationError::require_positive("weight_kg", self.weight_kg)?;
        ValidationError::require_non_negative("value", self.value)?;
        Ok(())
    }
}

/// A partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PackagePatch {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New pickup address.
    #[serde(default)]
    pub pickup_address: Option<Address>,
    /// New delivery address.
    #[serde(default)]
    pub delivery_address: Option<Address>,
    /// New weight in kilograms.
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// New declared value.
    #[serde(default)]
    pub value: Option<f64>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<PackagePriority>,
}

impl PackagePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validate the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            ValidationError::require_text("title", title)?;
        }
        if let Some(category) = &self.category {
            ValidationError::require_text("category", category)?;
        }
        if let Some(address) = &self.pickup_address {
            address.validate()?;
        }
        if let Some(address) = &self.delivery_address {
            address.validate()?;
        }
        if let Some(weight) = self.weight_kg {
            ValidationError::require_positive("weight_kg", weight)?;
        }
        if let Some(value) = self.value {
            ValidationError::require_non_negative("value", value)?;
        }
        Ok(())
    }
}

// ─── Package ─────────────────────────────────────────────────────────

/// A delivery package and its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Unique package identifier.
    pub id: PackageId,
    /// The sender, who owns the package.
    pub sender_id: UserId,
    /// The traveler carrying it, once matched.
    pub traveler_id: Option<UserId>,
    /// The trip carrying it, once matched.
    pub trip_id: Option<TripId>,
    /// Current lifecycle status.
    pub status: PackageStatus,
    /// Short title.
    pub title: String,
    /// Contents description.
    pub description: String,
    /// Collection address.
    pub pickup_address: Address,
    /// Destination address.
    pub delivery_address: Address,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Declared value.
    pub value: f64,
    /// Free-form category.
    pub category: String,
    /// Delivery urgency.
    pub priority: PackagePriority,
    /// When the package was created.
    pub created_at: DateTime<Utc>,
    /// When the package was last modified.
    pub updated_at: DateTime<Utc>,
    /// Ordered log of status changes.
    pub transitions: Vec<TransitionRecord<PackageStatus>>,
}

impl Package {
    /// Create a package owned by `sender` from a validated draft.
    pub fn create(sender: UserId, draft: PackageDraft) -> Result<Self, LifecycleError> {
        draft.validate()?;
        let now = Utc::now();
        let status = if draft.publish {
            PackageStatus::Posted
        } else {
            PackageStatus::Draft
        };
        Ok(Self {
            id: PackageId::new(),
            sender_id: sender,
            traveler_id: None,
            trip_id: None,
            status,
            title: draft.title.trim().to_string(),
            description: draft.description,
            pickup_address: draft.pickup_address,
            delivery_address: draft.delivery_address,
            weight_kg: draft.weight_kg,
            value: draft.value,
            category: draft.category.trim().to_string(),
            priority: draft.priority,
            created_at: now,
            updated_at: now,
            transitions: Vec::new(),
        })
    }

    /// Whether the package currently holds a trip link.
    pub fn is_linked(&self) -> bool {
        self.trip_id.is_some()
    }

    /// Require that `principal` is the sender.
    pub fn ensure_sender(&self, principal: &Principal) -> Result<(), LifecycleError> {
        if principal.is(&self.sender_id) {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden(format!(
                "only the sender may modify package {}",
                self.id
            )))
        }
    }

    /// Require that `principal` is the sender or the assigned traveler.
    pub fn ensure_participant(&self, principal: &Principal) -> Result<(), LifecycleError> {
        let is_traveler = self
            .traveler_id
            .as_ref()
            .map(|t| principal.is(t))
            .unwrap_or(false);
        if principal.is(&self.sender_id) || is_traveler {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden(format!(
                "only the sender or assigned traveler may act on package {}",
                self.id
            )))
        }
    }

    /// Require that `principal` may move the package to `target`.
    ///
    /// Only decides *who*; whether the edge exists is checked by
    /// [`transition`](Self::transition).
    pub fn authorize_transition(
        &self,
        target: PackageStatus,
        principal: &Principal,
    ) -> Result<(), LifecycleError> {
        use PackageStatus::*;

        let from_dispute = self.status == Disputed;
        match target {
            Disputed => self.require_admin(principal, "raise a dispute"),
            _ if from_dispute => self.require_admin(principal, "resolve a dispute"),
            InTransit | Delivered => {
                if principal.admin {
                    Ok(())
                } else {
                    self.ensure_participant(principal)
                }
            }
            Cancelled => {
                if principal.admin {
                    Ok(())
                } else {
                    self.ensure_sender(principal)
                }
            }
            Posted if self.status == Matched => self.ensure_participant(principal),
            Draft | Posted | Matched => self.ensure_sender(principal),
        }
    }

    fn require_admin(&self, principal: &Principal, operation: &str) -> Result<(), LifecycleError> {
        if principal.admin {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden(format!(
                "only an administrator may {operation} on package {}",
                self.id
            )))
        }
    }

    /// Require a status in which edits are permitted.
    pub fn ensure_editable(&self) -> Result<(), LifecycleError> {
        if self.status.allows_edit() {
            Ok(())
        } else {
            Err(self.invalid_state("edit"))
        }
    }

    /// Require a status in which deletion is permitted.
    ///
    /// A package still holding a trip link is never deletable, whatever its
    /// status, because the trip's reserved capacity would be orphaned.
    pub fn ensure_deletable(&self) -> Result<(), LifecycleError> {
        if self.status.allows_delete() && !self.is_linked() {
            Ok(())
        } else {
            Err(self.invalid_state("delete"))
        }
    }

    /// Apply a partial update.
    ///
    /// The weight is locked while the package holds a trip link, since the
    /// trip's capacity was reserved against the old value.
    pub fn apply_patch(&mut self, patch: &PackagePatch) -> Result<(), LifecycleError> {
        self.ensure_editable()?;
        patch.validate()?;

        if let Some(weight) = patch.weight_kg {
            if self.is_linked() && weight != self.weight_kg {
                return Err(self.invalid_state("change weight while linked to a trip"));
            }
            self.weight_kg = weight;
        }
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(address) = &patch.pickup_address {
            self.pickup_address = address.clone();
        }
        if let Some(address) = &patch.delivery_address {
            self.delivery_address = address.clone();
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(category) = &patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Bind the package to a trip (POSTED → MATCHED).
    ///
    /// Capacity is the trip's concern; callers reserve it in the same
    /// critical section.
    pub fn bind_to_trip(
        &mut self,
        trip_id: TripId,
        traveler_id: UserId,
        actor: Option<UserId>,
    ) -> Result<(), LifecycleError> {
        if self.status != PackageStatus::Posted {
            return Err(self.invalid_state("assign to a trip"));
        }
        self.trip_id = Some(trip_id);
        self.traveler_id = Some(traveler_id);
        self.record_transition(PackageStatus::Matched, actor, "assigned to trip");
        Ok(())
    }

    /// Move to `target` along a legal edge.
    ///
    /// Entering POSTED or CANCELLED clears the trip link; the caller is
    /// responsible for releasing the trip's capacity and receives the
    /// former trip id to do so.
    pub fn transition(
        &mut self,
        target: PackageStatus,
        actor: Option<UserId>,
        reason: &str,
    ) -> Result<Option<TripId>, LifecycleError> {
        if !self.status.can_transition_to(target) {
            return Err(LifecycleError::InvalidTransition {
                entity: "package",
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        if target == PackageStatus::Matched {
            return Err(self.invalid_state("be matched outside an assignment"));
        }
        let released = if matches!(target, PackageStatus::Posted | PackageStatus::Cancelled) {
            self.release_trip_link()
        } else {
            None
        };
        self.record_transition(target, actor, reason);
        Ok(released)
    }

    fn release_trip_link(&mut self) -> Option<TripId> {
        self.traveler_id = None;
        self.trip_id.take()
    }

    fn record_transition(&mut self, target: PackageStatus, actor: Option<UserId>, reason: &str) {
        let now = Utc::now();
        self.transitions.push(TransitionRecord {
            from_state: self.status,
            to_state: target,
            actor,
            timestamp: now,
            reason: reason.to_string(),
        });
        self.status = target;
        self.updated_at = now;
    }

    fn invalid_state(&self, operation: &str) -> LifecycleError {
        LifecycleError::InvalidState {
            entity: "package",
            id: self.id.to_string(),
            status: self.status.to_string(),
            operation: operation.to_string(),
        }
    }
}
