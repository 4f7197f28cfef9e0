//! Contract violations: the loud error category.
//!
//! Every violation found during an invocation goes through a `ViolationLedger`, which logs it
//! at `error!` with a stable code and keeps it for the report.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::calibration::narrative::NarrativeKind;
use crate::calibration::recommendation::Tier;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum ContractViolation {
    #[error("attempted to reassign locked tier {locked:?} to {attempted:?}")]
    LockedTierReassignment { locked: Tier, attempted: Tier },

    #[error("attempted to recompute locked final_score {locked} as {attempted}")]
    LockedScoreRecomputation { locked: u32, attempted: u32 },

    #[error("{field:?} text contains '{phrase}' while gaps are hidden")]
    BannedGuidancePhrase { field: NarrativeKind, phrase: String },

    #[error("{field:?} text contradicts locked tier {tier:?} with '{phrase}'")]
    NarrativeContradictsTier {
        field: NarrativeKind,
        tier: Tier,
        phrase: String,
    },
}

impl ContractViolation {
    /// Stable identifier for log filters and alerts.
    pub fn code(&self) -> &'static str {
        match self {
            ContractViolation::LockedTierReassignment { .. } => "locked_tier_reassignment",
            ContractViolation::LockedScoreRecomputation { .. } => "locked_score_recomputation",
            ContractViolation::BannedGuidancePhrase { .. } => "banned_guidance_phrase",
            ContractViolation::NarrativeContradictsTier { .. } => "narrative_contradicts_tier",
        }
    }
}

/// Per-invocation collection of violations.
#[derive(Debug, Default)]
pub struct ViolationLedger {
    violations: Vec<ContractViolation>,
}

impl ViolationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, violation: ContractViolation) {
        error!(violation = violation.code(), "Contract violation: {violation}");
        self.violations.push(violation);
    }

    /// Records the error side of a contract check, if any.
    pub fn check(&mut self, result: Result<(), ContractViolation>) {
        if let Err(violation) = result {
            self.record(violation);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_violations(self) -> Vec<ContractViolation> {
        self.violations
    }
}
