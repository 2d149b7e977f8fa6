//! # Safety Confirmation Gate
//!
//! Before a package and a trip are bound together, the confirming party
//! attests to five concerns. The gate is satisfied only when all five are
//! confirmed. A set lives only for the duration of one assignment attempt;
//! it is persisted as a [`SafetyConfirmationRecord`] after a successful
//! commit and never before.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use waypost_core::{ConfirmationId, ConfirmationRole, PackageId, Principal, TripId};

/// One of the five attestations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyConcern {
    /// The item is legal to carry across the route.
    LegalCompliance,
    /// The item has been inspected for damage.
    DamageInspection,
    /// The item matches its description.
    AccurateDescription,
    /// Packing and handling precautions are in place.
    SafetyMeasures,
    /// Platform terms are accepted.
    TermsAcceptance,
}

impl SafetyConcern {
    /// All five concerns, in presentation order.
    pub const ALL: [SafetyConcern; 5] = [
        Self::LegalCompliance,
        Self::DamageInspection,
        Self::AccurateDescription,
        Self::SafetyMeasures,
        Self::TermsAcceptance,
    ];

    /// Return the field name of this concern.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegalCompliance => "legal_compliance",
            Self::DamageInspection => "damage_inspection",
            Self::AccurateDescription => "accurate_description",
            Self::SafetyMeasures => "safety_measures",
            Self::TermsAcceptance => "terms_acceptance",
        }
    }

    /// The statement shown to a party acting in `role`.
    pub fn prompt(&self, role: ConfirmationRole) -> &'static str {
        match (self, role) {
            (Self::LegalCompliance, ConfirmationRole::Sender) => {
                "The item contains nothing illegal or restricted on this route."
            }
            (Self::LegalCompliance, ConfirmationRole::Traveler) => {
                "I will comply with customs and transport rules on this route."
            }
            (Self::DamageInspection, ConfirmationRole::Sender) => {
                "I have inspected the item and recorded its current condition."
            }
            (Self::DamageInspection, ConfirmationRole::Traveler) => {
                "I will inspect the item for damage at pickup."
            }
            (Self::AccurateDescription, ConfirmationRole::Sender) => {
                "The title, weight and category describe the item accurately."
            }
            (Self::AccurateDescription, ConfirmationRole::Traveler) => {
                "I will verify the item matches its description before accepting it."
            }
            (Self::SafetyMeasures, ConfirmationRole::Sender) => {
                "The item is packed securely for travel."
            }
            (Self::SafetyMeasures, ConfirmationRole::Traveler) => {
                "I will keep the item secure for the whole journey."
            }
            (Self::TermsAcceptance, _) => "I accept the platform's delivery terms.",
        }
    }
}

impl std::fmt::Display for SafetyConcern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five boolean attestations. All false by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SafetyConfirmationSet {
    /// See [`SafetyConcern::LegalCompliance`].
    #[serde(default)]
    pub legal_compliance: bool,
    /// See [`SafetyConcern::DamageInspection`].
    #[serde(default)]
    pub damage_inspection: bool,
    /// See [`SafetyConcern::AccurateDescription`].
    #[serde(default)]
    pub accurate_description: bool,
    /// See [`SafetyConcern::SafetyMeasures`].
    #[serde(default)]
    pub safety_measures: bool,
    /// See [`SafetyConcern::TermsAcceptance`].
    #[serde(default)]
    pub terms_acceptance: bool,
}

impl SafetyConfirmationSet {
    /// A set with every concern confirmed.
    pub fn all_confirmed() -> Self {
        Self {
            legal_compliance: true,
            damage_inspection: true,
            accurate_description: true,
            safety_measures: true,
            terms_acceptance: true,
        }
    }

    /// Whether `concern` is confirmed.
    pub fn get(&self, concern: SafetyConcern) -> bool {
        match concern {
            SafetyConcern::LegalCompliance => self.legal_compliance,
            SafetyConcern::DamageInspection => self.damage_inspection,
            SafetyConcern::AccurateDescription => self.accurate_description,
            SafetyConcern::SafetyMeasures => self.safety_measures,
            SafetyConcern::TermsAcceptance => self.terms_acceptance,
        }
    }

    /// Set `concern` to `value`.
    pub fn set(&mut self, concern: SafetyConcern, value: bool) {
        let slot = match concern {
            SafetyConcern::LegalCompliance => &mut self.legal_compliance,
            SafetyConcern::DamageInspection => &mut self.damage_inspection,
            SafetyConcern::AccurateDescription => &mut self.accurate_description,
            SafetyConcern::SafetyMeasures => &mut self.safety_measures,
            SafetyConcern::TermsAcceptance => &mut self.terms_acceptance,
        };
        *slot = value;
    }

    /// True iff all five concerns are confirmed.
    pub fn is_satisfied(&self) -> bool {
        SafetyConcern::ALL.iter().all(|c| self.get(*c))
    }

    /// The concerns not yet confirmed, in presentation order.
    pub fn missing(&self) -> Vec<SafetyConcern> {
        SafetyConcern::ALL
            .iter()
            .copied()
            .filter(|c| !self.get(*c))
            .collect()
    }

    /// Fail with [`GateError::Incomplete`] unless satisfied.
    pub fn require_satisfied(&self) -> Result<(), GateError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GateError::Incomplete(missing))
        }
    }
}

/// Errors from the safety gate and the assignment wizard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Some concerns are unconfirmed.
    #[error("safety confirmations incomplete: {}", join(.0))]
    Incomplete(Vec<SafetyConcern>),

    /// No candidate has been selected.
    #[error("no candidate selected")]
    NoCandidate,

    /// The wizard was closed.
    #[error("assignment wizard is closed")]
    Closed,

    /// Attestations can only be toggled after selecting a candidate.
    #[error("select a candidate before confirming safety")]
    NotConfirming,
}

fn join(concerns: &[SafetyConcern]) -> String {
    concerns
        .iter()
        .map(SafetyConcern::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The immutable audit record written after a successful assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfirmationRecord {
    /// Record identifier.
    pub id: ConfirmationId,
    /// Who attested.
    pub principal: Principal,
    /// The side they attested for.
    pub role: ConfirmationRole,
    /// The package assigned.
    pub package_id: PackageId,
    /// The trip assigned.
    pub trip_id: TripId,
    /// The attestations as submitted.
    pub confirmations: SafetyConfirmationSet,
    /// When the record was sealed.
    pub confirmed_at: DateTime<Utc>,
}

impl SafetyConfirmationRecord {
    /// Seal a satisfied set into a record.
    pub fn seal(
        principal: Principal,
        role: ConfirmationRole,
        package_id: PackageId,
        trip_id: TripId,
        confirmations: SafetyConfirmationSet,
    ) -> Result<Self, GateError> {
        confirmations.require_satisfied()?;
        Ok(Self {
            id: ConfirmationId::new(),
            principal,
            role,
            package_id,
            trip_id,
            confirmations,
            confirmed_at: Utc::now(),
        })
    }
}
