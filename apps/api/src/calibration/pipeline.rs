//! Calibration pipeline: runs the stages in order for one invocation.
//!
//! Role Classifier → Experience Calculator → Credibility Adjuster → Hard-Cap Enforcer →
//! Recommendation lock → Signal grounding → Consistency Validator → UI Contract Enforcer.
//!
//! Nothing is shared between invocations except the frozen keyword tables. Stages after
//! the lock can annotate, filter and rewrite narrative, but they only ever receive the
//! `LockedRecommendation` by shared reference.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::calibration::consistency::{check_field, enforce_consistency, SecondPersonRewriter};
use crate::calibration::credibility::{advisory_note, assess_credibility};
use crate::calibration::experience::{compute_raw_years, matching_entries, ExperienceAssessment};
use crate::calibration::hard_cap::{enforce_hard_cap, FitAssessment};
use crate::calibration::jd_parser::{resolve_required_years, RequiredYears, RequirementSource};
use crate::calibration::narrative::{Narrative, NarrativeField};
use crate::calibration::recommendation::{
    tier_for_score, PendingRecommendation, RecommendationDecision, Tier,
};
use crate::calibration::role_classifier::{classify_role, RoleCategory};
use crate::calibration::signals::{ground_narrative, SignalProfile, UngroundedSignal};
use crate::calibration::ui_contract::{assert_guidance, enforce_contract, generate_guidance, UiContract};
use crate::calibration::violations::{ContractViolation, ViolationLedger};
use crate::models::analysis::ModelAnalysis;
use crate::models::job::JobContext;
use crate::models::resume::ResumeInput;

/// Claimed years further than this from the computed figure get an annotation.
pub const CLAIMED_YEARS_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationInput {
    #[serde(default)]
    pub resume: ResumeInput,
    #[serde(default)]
    pub job: JobContext,
    #[serde(default)]
    pub analysis: ModelAnalysis,
}

#[derive(Debug, Clone, Default)]
pub struct CalibrationOptions {
    /// Fail the invocation on the first contract violation instead of reporting it.
    pub strict_contracts: bool,
    /// Date that open-ended ranges resolve to. `None` means today (UTC).
    pub analysis_date: Option<NaiveDate>,
}

impl CalibrationOptions {
    fn resolved_date(&self) -> NaiveDate {
        self.analysis_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Advisory notes attached to a report. None of them change the score or tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "annotation", rename_all = "snake_case")]
pub enum Annotation {
    RequiredYearsInferred {
        years: f64,
        source: RequirementSource,
    },
    ClaimedYearsDiscrepancy {
        claimed: f64,
        computed: f64,
    },
    CredibilityAdvisory {
        note: String,
    },
    ModelRecommendationOverridden {
        model_label: String,
        locked: Tier,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: &'static str,
    pub summary: String,
}

impl StageRecord {
    /// Every stage decision is logged as it is recorded.
    fn new(stage: &'static str, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        info!(stage, "{summary}");
        Self { stage, summary }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UngroundedSummary {
    pub count: usize,
    pub dropped: Vec<UngroundedSignal>,
}

/// Everything one invocation produces.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub invocation_id: Uuid,
    pub role_category: RoleCategory,
    pub experience: ExperienceAssessment,
    pub required_years: RequiredYears,
    pub fit: FitAssessment,
    pub final_score: u32,
    pub recommendation: RecommendationDecision,
    pub strengths: Vec<NarrativeField>,
    /// Only the gaps the UI will render. Empty whenever `ui_contract.gaps_visible` is false.
    pub gaps: Vec<NarrativeField>,
    pub rationale: Option<NarrativeField>,
    pub strategic_action: Option<NarrativeField>,
    pub guidance: NarrativeField,
    pub ui_contract: UiContract,
    pub annotations: Vec<Annotation>,
    pub ungrounded_signals: UngroundedSummary,
    pub contract_violations: Vec<ContractViolation>,
    pub audit: Vec<StageRecord>,
}

/// Runs every stage for one input.
///
/// In report mode contract violations are logged and returned inside the report. In strict
/// mode the first violation is returned as the error.
pub fn run_calibration(
    input: &CalibrationInput,
    options: &CalibrationOptions,
) -> Result<CalibrationReport, ContractViolation> {
    let invocation_id = Uuid::new_v4();
    let span = info_span!("calibration", %invocation_id);
    let _guard = span.enter();

    let analysis_date = options.resolved_date();
    let mut audit = Vec::with_capacity(8);
    let mut annotations = Vec::new();
    let mut ledger = ViolationLedger::new();

    // ── Role classification ─────────────────────────────────────────────────
    let role_category = classify_role(&input.job.role_title, &input.job.job_description);
    audit.push(StageRecord::new(
        "role_classifier",
        format!("role '{}' classified as {role_category:?}", input.job.role_title),
    ));

    // ── Experience ──────────────────────────────────────────────────────────
    let matched = matching_entries(&input.resume.experience, role_category);
    let raw_years = compute_raw_years(&matched, analysis_date);
    audit.push(StageRecord::new(
        "experience_calculator",
        format!(
            "{} of {} entries matched, {raw_years:.2} raw years as of {analysis_date}",
            matched.len(),
            input.resume.experience.len()
        ),
    ));

    // ── Credibility ─────────────────────────────────────────────────────────
    let credibility = assess_credibility(&matched);
    if let Some(note) = advisory_note(credibility.flags(), credibility.multiplier()) {
        annotations.push(Annotation::CredibilityAdvisory { note });
    }
    let experience = ExperienceAssessment::new(role_category, raw_years, matched.len(), credibility);
    audit.push(StageRecord::new(
        "credibility_adjuster",
        format!(
            "{} flag(s), multiplier {:.1}, adjusted years {:.2}",
            experience.credibility_flags().len(),
            experience.credibility_multiplier(),
            experience.adjusted_years()
        ),
    ));

    if let Some(claimed) = input
        .analysis
        .candidate_years_claimed
        .filter(|c| c.is_finite())
    {
        let computed = experience.adjusted_years();
        if (claimed - computed).abs() > CLAIMED_YEARS_TOLERANCE {
            warn!(claimed, computed, "Model-claimed years disagree with work history");
            annotations.push(Annotation::ClaimedYearsDiscrepancy { claimed, computed });
        }
    }

    // ── Hard cap ────────────────────────────────────────────────────────────
    let required_years = resolve_required_years(&input.job);
    if required_years.source == RequirementSource::ExtractedFromJd {
        annotations.push(Annotation::RequiredYearsInferred {
            years: required_years.years,
            source: required_years.source,
        });
    }
    let fit = enforce_hard_cap(
        experience.adjusted_years(),
        required_years.years,
        input.analysis.fit_score,
    );
    audit.push(StageRecord::new(
        "hard_cap_enforcer",
        match fit.years_percentage() {
            Some(pct) => format!(
                "{pct:.1}% of {} required years, cap {}, raw {} -> final {}",
                fit.required_years(),
                fit.hard_cap(),
                fit.raw_score(),
                fit.final_score()
            ),
            None => format!(
                "no years requirement, raw {} -> final {}",
                fit.raw_score(),
                fit.final_score()
            ),
        },
    ));

    // ── Recommendation lock ─────────────────────────────────────────────────
    let locked = PendingRecommendation::from_fit(&fit).lock();
    if let Some(label) = input.analysis.recommendation.as_deref() {
        if let Some(model_tier) = Tier::from_label(label) {
            if model_tier != locked.tier() {
                info!(model = ?model_tier, locked = ?locked.tier(), "Model recommendation overridden");
                annotations.push(Annotation::ModelRecommendationOverridden {
                    model_label: label.to_string(),
                    locked: locked.tier(),
                });
            }
        }
    }
    audit.push(StageRecord::new("recommendation_lock", locked.lock_reason()));

    // ── Signal grounding ────────────────────────────────────────────────────
    let profile = SignalProfile::build(&input.job.job_description, &input.resume.evidence_text());
    let Narrative {
        strengths,
        gaps,
        rationale,
        strategic_action,
    } = Narrative::from_analysis(&input.analysis);
    let proposed = strengths.len() + gaps.len();
    let grounding = ground_narrative(&profile, strengths, gaps);
    let ungrounded_signals = UngroundedSummary {
        count: grounding.dropped.len(),
        dropped: grounding.dropped,
    };
    audit.push(StageRecord::new(
        "signal_grounding",
        format!(
            "{} JD signal(s), {} evidence signal(s), {} of {proposed} strengths/gaps dropped",
            profile.jd_keywords().len(),
            profile.candidate_evidence_keywords().len(),
            ungrounded_signals.count
        ),
    ));
    let mut narrative = Narrative {
        strengths: grounding.strengths,
        gaps: grounding.gaps,
        rationale,
        strategic_action,
    };

    // ── Consistency ─────────────────────────────────────────────────────────
    let rewriter = SecondPersonRewriter::new(input.resume.candidate_name.as_deref());
    let consistency = enforce_consistency(&mut narrative, &locked, &rewriter, &mut ledger);
    audit.push(StageRecord::new(
        "consistency_validator",
        format!(
            "{} sentence(s) removed, {} item(s) dropped, {} field(s) rewritten",
            consistency.sentences_removed, consistency.items_dropped, consistency.fields_rewritten
        ),
    ));

    // ── UI contract ─────────────────────────────────────────────────────────
    let ui_contract = UiContract::compute(&narrative.strengths, &narrative.gaps, &locked);
    let stripped = enforce_contract(&ui_contract, &mut narrative);
    let guidance = generate_guidance(&ui_contract, &narrative.strengths, &narrative.gaps);
    let guidance_fields = narrative
        .fields()
        .filter(|f| f.kind.is_guidance())
        .chain(std::iter::once(&guidance));
    for field in guidance_fields {
        ledger.check(assert_guidance(&ui_contract, field));
    }
    ledger.check(check_field(locked.tier(), &guidance));

    let hidden_gaps = if ui_contract.gaps_visible {
        0
    } else {
        std::mem::take(&mut narrative.gaps).len()
    };
    audit.push(StageRecord::new(
        "ui_contract_enforcer",
        format!(
            "gaps_visible={}, {hidden_gaps} gap(s) hidden, {stripped} gap reference(s) stripped",
            ui_contract.gaps_visible
        ),
    ));

    // The lock must still agree with the numbers it was taken from.
    ledger.check(locked.confirm_score(fit.final_score()));
    ledger.check(locked.confirm_tier(tier_for_score(fit.final_score())));

    let contract_violations = ledger.into_violations();
    if options.strict_contracts {
        if let Some(first) = contract_violations.first() {
            return Err(first.clone());
        }
    }

    info!(
        tier = ?locked.tier(),
        final_score = locked.final_score(),
        violations = contract_violations.len(),
        ungrounded = ungrounded_signals.count,
        "Calibration complete"
    );

    Ok(CalibrationReport {
        invocation_id,
        role_category,
        experience,
        required_years,
        final_score: locked.final_score(),
        fit,
        recommendation: locked.decision(),
        strengths: narrative.strengths,
        gaps: narrative.gaps,
        rationale: narrative.rationale,
        strategic_action: narrative.strategic_action,
        guidance,
        ui_contract,
        annotations,
        ungrounded_signals,
        contract_violations,
        audit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::WorkHistoryEntry;

    fn options() -> CalibrationOptions {
        CalibrationOptions {
            strict_contracts: true,
            analysis_date: NaiveDate::from_ymd_opt(2026, 10, 15),
        }
    }

    fn input(fit_score: i64, required_years: Option<f64>) -> CalibrationInput {
        CalibrationInput {
            resume: ResumeInput {
                candidate_name: Some("Dana Reyes".to_string()),
                experience: vec![WorkHistoryEntry::new(
                    "Senior Recruiter",
                    "Acme Corp",
                    "Jan 2012 - Jan 2024",
                    &["Hired 40 engineers per year through outbound sourcing"],
                )],
                raw_text: None,
            },
            job: JobContext {
                role_title: "Senior Technical Recruiter".to_string(),
                job_description: "Own full-cycle recruiting with strong sourcing.".to_string(),
                required_years,
            },
            analysis: ModelAnalysis {
                fit_score,
                ..ModelAnalysis::default()
            },
        }
    }

    #[test]
    fn test_audit_records_every_stage_in_order() {
        let report = run_calibration(&input(85, Some(7.0)), &options()).unwrap();
        let stages: Vec<&str> = report.audit.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                "role_classifier",
                "experience_calculator",
                "credibility_adjuster",
                "hard_cap_enforcer",
                "recommendation_lock",
                "signal_grounding",
                "consistency_validator",
                "ui_contract_enforcer",
            ]
        );
    }

    #[test]
    fn test_final_score_matches_lock() {
        let report = run_calibration(&input(85, Some(7.0)), &options()).unwrap();
        assert_eq!(report.final_score, report.fit.final_score());
        assert_eq!(report.recommendation.tier, tier_for_score(report.final_score));
        assert!(report.recommendation.locked);
    }

    #[test]
    fn test_inferred_requirement_is_annotated() {
        let mut input = input(85, None);
        input.job.job_description = "5+ years of recruiting experience required.".to_string();
        let report = run_calibration(&input, &options()).unwrap();
        assert_eq!(report.required_years.years, 5.0);
        assert!(report.annotations.contains(&Annotation::RequiredYearsInferred {
            years: 5.0,
            source: RequirementSource::ExtractedFromJd,
        }));
    }

    #[test]
    fn test_claimed_years_never_change_the_score() {
        let mut input = input(85, Some(7.0));
        input.analysis.candidate_years_claimed = Some(30.0);
        let report = run_calibration(&input, &options()).unwrap();
        assert_eq!(report.experience.raw_years(), 12.0);
        assert_eq!(report.final_score, 85);
        assert!(report.annotations.iter().any(|a| matches!(
            a,
            Annotation::ClaimedYearsDiscrepancy { claimed, .. } if *claimed == 30.0
        )));
    }

    #[test]
    fn test_model_recommendation_is_overridden_not_obeyed() {
        let mut input = input(30, Some(7.0));
        input.analysis.recommendation = Some("Strongly Apply".to_string());
        let report = run_calibration(&input, &options()).unwrap();
        assert_eq!(report.recommendation.tier, Tier::DoNotApply);
        assert!(report.annotations.iter().any(|a| matches!(
            a,
            Annotation::ModelRecommendationOverridden { locked: Tier::DoNotApply, .. }
        )));
    }

    #[test]
    fn test_invocations_do_not_share_state() {
        let first = run_calibration(&input(85, Some(7.0)), &options()).unwrap();
        let second = run_calibration(&input(85, Some(7.0)), &options()).unwrap();
        assert_ne!(first.invocation_id, second.invocation_id);
        assert_eq!(first.final_score, second.final_score);
        assert_eq!(first.guidance, second.guidance);
    }
}
