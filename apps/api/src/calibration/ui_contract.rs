//! UI Contract Enforcer
//!
//! Computes what the client will actually render and keeps every piece of guidance copy
//! consistent with it. When gaps are hidden, guidance may not point at them.

use serde::Serialize;
use tracing::{debug, info};

use crate::calibration::narrative::{Narrative, NarrativeField, NarrativeKind};
use crate::calibration::recommendation::{LockedRecommendation, Tier};
use crate::calibration::text::split_sentences;
use crate::calibration::violations::ContractViolation;

/// Tiers for which the gap list is never shown.
pub const GAP_SUPPRESSED_TIERS: &[Tier] = &[Tier::StronglyApply];

/// Phrases that only make sense next to a visible gap list. Matched as lowercase substrings.
pub const BANNED_WHEN_GAPS_HIDDEN: &[&str] = &[
    "gaps below",
    "gaps above",
    "gaps listed",
    "address gaps",
    "address the gaps",
    "close the gap",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiContract {
    pub gaps_visible: bool,
    pub strengths_available: bool,
    pub recommendation_tier: Tier,
}

impl UiContract {
    pub fn compute(
        strengths: &[NarrativeField],
        gaps: &[NarrativeField],
        locked: &LockedRecommendation,
    ) -> Self {
        let tier = locked.tier();
        let contract = Self {
            gaps_visible: !gaps.is_empty() && !GAP_SUPPRESSED_TIERS.contains(&tier),
            strengths_available: !strengths.is_empty(),
            recommendation_tier: tier,
        };
        info!(
            gaps_visible = contract.gaps_visible,
            strengths_available = contract.strengths_available,
            tier = ?tier,
            "UI contract computed"
        );
        contract
    }
}

fn banned_phrase(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    BANNED_WHEN_GAPS_HIDDEN
        .iter()
        .copied()
        .find(|p| lower.contains(p))
}

fn opening(tier: Tier) -> &'static str {
    match tier {
        Tier::DoNotApply => "This role asks for more than your background currently shows.",
        Tier::ApplyWithCaution => {
            "This role is a stretch, so apply selectively and make your case concrete."
        }
        Tier::ConditionalApply => {
            "You can compete for this role if your application makes the connection explicit."
        }
        Tier::Apply => "Your background lines up with this role.",
        Tier::StronglyApply => "Your background lines up closely with this role, so apply with confidence.",
    }
}

/// Only catalog keywords are used here, never free strength text.
fn lead_signal(strengths: &[NarrativeField]) -> String {
    strengths
        .iter()
        .find_map(|s| s.grounding_keywords.first())
        .map(|kw| format!("your {kw} experience"))
        .unwrap_or_else(|| "your most relevant results".to_string())
}

/// Deterministic guidance. Takes the contract as input so it cannot drift from it.
pub fn generate_guidance(
    contract: &UiContract,
    strengths: &[NarrativeField],
    gaps: &[NarrativeField],
) -> NarrativeField {
    let lead = lead_signal(strengths);
    let body = match gaps.first() {
        Some(gap) if contract.gaps_visible => {
            let first_gap = gap.text.trim().trim_end_matches(['.', '!', '?']);
            format!("Lead with {lead}. Then address the gaps below head-on, starting with: {first_gap}.")
        }
        _ => format!(
            "Lead with {lead} and frame each bullet around the outcomes this role cares about."
        ),
    };
    NarrativeField::new(
        NarrativeKind::Guidance,
        format!("{} {body}", opening(contract.recommendation_tier)),
    )
}

/// Post-generation assertion for guidance copy.
pub fn assert_guidance(contract: &UiContract, field: &NarrativeField) -> Result<(), ContractViolation> {
    if contract.gaps_visible {
        return Ok(());
    }
    match banned_phrase(&field.text) {
        Some(phrase) => Err(ContractViolation::BannedGuidancePhrase {
            field: field.kind,
            phrase: phrase.to_string(),
        }),
        None => Ok(()),
    }
}

fn strip_banned_sentences(field: &mut NarrativeField) -> usize {
    let sentences = split_sentences(&field.text);
    let kept: Vec<&str> = sentences
        .iter()
        .copied()
        .filter(|s| banned_phrase(s).is_none())
        .collect();
    let removed = sentences.len() - kept.len();
    if removed > 0 {
        field.text = kept.join(" ");
    }
    removed
}

/// Removes gap-pointing sentences from model-authored guidance when gaps are hidden.
/// Returns the number of sentences removed.
pub fn enforce_contract(contract: &UiContract, narrative: &mut Narrative) -> usize {
    if contract.gaps_visible {
        return 0;
    }
    let mut removed = 0;
    for slot in [&mut narrative.strategic_action, &mut narrative.rationale] {
        if let Some(field) = slot.as_mut() {
            removed += strip_banned_sentences(field);
            if field.text.trim().is_empty() {
                *slot = None;
            }
        }
    }
    if removed > 0 {
        debug!(removed, "Stripped gap references from hidden-gap guidance");
    }
    removed
}
