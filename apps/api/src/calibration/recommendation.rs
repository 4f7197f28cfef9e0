//! Final Recommendation Controller: the single place a tier is decided.
//!
//! `PendingRecommendation` holds the final score before the decision; `lock()` consumes it
//! and yields a `LockedRecommendation`, which has no mutators. Downstream stages can only
//! read the tier or ask `confirm_*` whether a value they carry still agrees with it; a
//! disagreement is returned as a `ContractViolation`, never applied.

use serde::Serialize;

use crate::calibration::hard_cap::FitAssessment;
use crate::calibration::violations::ContractViolation;

/// Ordered recommendation tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    DoNotApply,
    ApplyWithCaution,
    ConditionalApply,
    Apply,
    StronglyApply,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::DoNotApply => "Do Not Apply",
            Tier::ApplyWithCaution => "Apply With Caution",
            Tier::ConditionalApply => "Conditional Apply",
            Tier::Apply => "Apply",
            Tier::StronglyApply => "Strongly Apply",
        }
    }

    /// Tiers that advise against (or strongly hedge) applying.
    pub fn is_reject(self) -> bool {
        matches!(self, Tier::DoNotApply | Tier::ApplyWithCaution)
    }

    /// Parses a free-text label such as "Strongly Apply" or "do_not_apply".
    pub fn from_label(label: &str) -> Option<Tier> {
        let key: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "donotapply" | "dontapply" | "skip" => Some(Tier::DoNotApply),
            "applywithcaution" | "caution" => Some(Tier::ApplyWithCaution),
            "conditionalapply" | "conditional" => Some(Tier::ConditionalApply),
            "apply" => Some(Tier::Apply),
            "stronglyapply" | "strongapply" => Some(Tier::StronglyApply),
            _ => None,
        }
    }
}

/// Half-open score band `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierBand {
    pub lower: u32,
    pub upper: u32,
    pub tier: Tier,
}

/// Frozen, exhaustive, non-overlapping over 0..=100.
pub const TIER_TABLE: [TierBand; 5] = [
    TierBand { lower: 0, upper: 50, tier: Tier::DoNotApply },
    TierBand { lower: 50, upper: 70, tier: Tier::ApplyWithCaution },
    TierBand { lower: 70, upper: 80, tier: Tier::ConditionalApply },
    TierBand { lower: 80, upper: 90, tier: Tier::Apply },
    TierBand { lower: 90, upper: 101, tier: Tier::StronglyApply },
];

fn band_for_score(score: u32) -> TierBand {
    let score = score.min(100);
    TIER_TABLE
        .iter()
        .copied()
        .find(|band| band.lower <= score && score < band.upper)
        .unwrap_or(TIER_TABLE[TIER_TABLE.len() - 1])
}

/// Pure lookup. Scores above 100 are treated as 100.
pub fn tier_for_score(score: u32) -> Tier {
    band_for_score(score).tier
}

/// Score state before the decision is taken.
#[derive(Debug)]
pub struct PendingRecommendation {
    final_score: u32,
    raw_score: u32,
    hard_cap: u32,
}

impl PendingRecommendation {
    pub fn from_fit(fit: &FitAssessment) -> Self {
        Self {
            final_score: fit.final_score(),
            raw_score: fit.raw_score(),
            hard_cap: fit.hard_cap(),
        }
    }

    /// Decides the tier and locks it. Consumes the pending state.
    pub fn lock(self) -> LockedRecommendation {
        let band = band_for_score(self.final_score);
        let cap_note = if self.final_score < self.raw_score {
            format!("capped at {}", self.hard_cap)
        } else {
            "uncapped".to_string()
        };
        let lock_reason = format!(
            "final_score {} (raw {}, {}) in [{},{}) => {:?}",
            self.final_score, self.raw_score, cap_note, band.lower, band.upper, band.tier
        );
        tracing::info!("Recommendation locked: {lock_reason}");

        LockedRecommendation {
            tier: band.tier,
            final_score: self.final_score,
            lock_reason,
        }
    }
}

/// The locked decision. Fields are private and there are no setters.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedRecommendation {
    tier: Tier,
    final_score: u32,
    lock_reason: String,
}

impl LockedRecommendation {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    pub fn lock_reason(&self) -> &str {
        &self.lock_reason
    }

    /// Re-asserting the same tier is fine; any other tier is a violation.
    pub fn confirm_tier(&self, attempted: Tier) -> Result<(), ContractViolation> {
        if attempted == self.tier {
            return Ok(());
        }
        Err(ContractViolation::LockedTierReassignment {
            locked: self.tier,
            attempted,
        })
    }

    pub fn confirm_score(&self, attempted: u32) -> Result<(), ContractViolation> {
        if attempted == self.final_score {
            return Ok(());
        }
        Err(ContractViolation::LockedScoreRecomputation {
            locked: self.final_score,
            attempted,
        })
    }

    /// Serializable snapshot for downstream collaborators.
    pub fn decision(&self) -> RecommendationDecision {
        RecommendationDecision {
            tier: self.tier,
            locked: true,
            lock_reason: self.lock_reason.clone(),
        }
    }
}

/// Output view of the locked decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationDecision {
    pub tier: Tier,
    pub locked: bool,
    pub lock_reason: String,
}
