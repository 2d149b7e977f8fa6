//! # Assignment Wizard
//!
//! The select → confirm → submit interaction as a value object.
//!
//! ```text
//!   SelectingCandidate ──select──▶ ConfirmingSafety ──submission()──▶ AssignmentSubmission
//!          ▲                          │      │
//!          └───────────back───────────┘      │
//!                                             ▼
//!                     (any) ──close──▶ Closed
//! ```
//!
//! The wizard performs no I/O. Its [`AssignmentSubmission`] is what a
//! client hands to the assignment coordinator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use waypost_core::MatchDirection;

use crate::safety::{GateError, SafetyConcern, SafetyConfirmationSet};

/// Where the wizard is in the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStage {
    /// Browsing candidates; nothing selected.
    SelectingCandidate,
    /// A candidate is selected and attestations are being collected.
    ConfirmingSafety {
        /// The selected candidate.
        candidate: Uuid,
        /// Attestations so far.
        confirmations: SafetyConfirmationSet,
    },
    /// Dismissed. All state discarded.
    Closed,
}

/// A ready-to-submit assignment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSubmission {
    /// The entity the search started from.
    pub anchor_id: Uuid,
    /// The selected candidate.
    pub candidate_id: Uuid,
    /// Which side is the anchor.
    pub direction: MatchDirection,
    /// The attestations, all confirmed.
    pub confirmations: SafetyConfirmationSet,
}

/// A single user's assignment session for one anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentWizard {
    anchor: Uuid,
    direction: MatchDirection,
    stage: WizardStage,
}

impl AssignmentWizard {
    /// Open a wizard for `anchor`.
    pub fn new(anchor: Uuid, direction: MatchDirection) -> Self {
        Self {
            anchor,
            direction,
            stage: WizardStage::SelectingCandidate,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    /// The anchor entity.
    pub fn anchor(&self) -> Uuid {
        self.anchor
    }

    /// The search direction.
    pub fn direction(&self) -> MatchDirection {
        self.direction
    }

    /// Select `candidate`, starting with a fresh confirmation set.
    ///
    /// Selecting again while confirming replaces the candidate and resets
    /// the attestations.
    pub fn select(&mut self, candidate: Uuid) -> Result<(), GateError> {
        if self.stage == WizardStage::Closed {
            return Err(GateError::Closed);
        }
        self.stage = WizardStage::ConfirmingSafety {
            candidate,
            confirmations: SafetyConfirmationSet::default(),
        };
        Ok(())
    }

    /// Set one attestation.
    pub fn confirm(&mut self, concern: SafetyConcern, value: bool) -> Result<(), GateError> {
        match &mut self.stage {
            WizardStage::ConfirmingSafety { confirmations, .. } => {
                confirmations.set(concern, value);
                Ok(())
            }
            WizardStage::SelectingCandidate => Err(GateError::NotConfirming),
            WizardStage::Closed => Err(GateError::Closed),
        }
    }

    /// Confirm all five concerns.
    pub fn confirm_all(&mut self) -> Result<(), GateError> {
        for concern in SafetyConcern::ALL {
            self.confirm(concern, true)?;
        }
        Ok(())
    }

    /// Return to candidate selection, discarding attestations.
    pub fn back(&mut self) -> Result<(), GateError> {
        match self.stage {
            WizardStage::Closed => Err(GateError::Closed),
            _ => {
                self.stage = WizardStage::SelectingCandidate;
                Ok(())
            }
        }
    }

    /// Dismiss the wizard.
    pub fn close(&mut self) {
        self.stage = WizardStage::Closed;
    }

    /// Whether [`submission`](Self::submission) would succeed.
    pub fn can_submit(&self) -> bool {
        self.submission().is_ok()
    }

    /// Build the submission, if a candidate is selected and the gate holds.
    pub fn submission(&self) -> Result<AssignmentSubmission, GateError> {
        match self.stage {
            WizardStage::ConfirmingSafety {
                candidate,
                confirmations,
            } => {
                confirmations.require_satisfied()?;
                Ok(AssignmentSubmission {
                    anchor_id: self.anchor,
                    candidate_id: candidate,
                    direction: self.direction,
                    confirmations,
                })
            }
            WizardStage::SelectingCandidate => Err(GateError::NoCandidate),
            WizardStage::Closed => Err(GateError::Closed),
        }
    }
}
