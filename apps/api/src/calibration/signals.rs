//! Signal Scoping & Evidence Grounding.
//!
//! A `SignalProfile` is built per invocation from this JD and this resume only. The catalog
//! below is the only shared data and it is a frozen constant. A strength survives only when
//! every signal it claims is in the candidate's evidence and at least one of them is also in
//! the JD.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::calibration::narrative::{NarrativeField, NarrativeKind};
use crate::calibration::text::phrase_offsets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Technical,
    Product,
    Scale,
    Leadership,
    StaffSystems,
}

/// One catalog entry: a canonical name and the literal spellings that count as evidence.
#[derive(Debug, Clone, Copy)]
pub struct SignalTerm {
    pub canonical: &'static str,
    pub category: SignalCategory,
    pub aliases: &'static [&'static str],
}

const fn term(
    canonical: &'static str,
    category: SignalCategory,
    aliases: &'static [&'static str],
) -> SignalTerm {
    SignalTerm {
        canonical,
        category,
        aliases,
    }
}

use self::SignalCategory::{Leadership, Product, Scale, StaffSystems, Technical};

pub const SIGNAL_CATALOG: &[SignalTerm] = &[
    // Technical
    term("kubernetes", Technical, &["kubernetes", "k8s"]),
    term("docker", Technical, &["docker", "containers"]),
    term("aws", Technical, &["aws", "amazon web services"]),
    term("gcp", Technical, &["gcp", "google cloud"]),
    term("azure", Technical, &["azure"]),
    term("terraform", Technical, &["terraform"]),
    term("kafka", Technical, &["kafka"]),
    term("python", Technical, &["python"]),
    term("java", Technical, &["java"]),
    term("rust", Technical, &["rust"]),
    term("golang", Technical, &["golang"]),
    term("typescript", Technical, &["typescript"]),
    term("react", Technical, &["react"]),
    term("sql", Technical, &["sql", "postgres", "postgresql", "mysql"]),
    term("machine learning", Technical, &["machine learning", "ml models"]),
    term("microservices", Technical, &["microservices", "micro-services"]),
    term("ci/cd", Technical, &["ci/cd", "continuous integration"]),
    term("spark", Technical, &["spark"]),
    // Product
    term("roadmap", Product, &["roadmap", "roadmaps"]),
    term("experimentation", Product, &["a/b testing", "a/b tests", "experimentation"]),
    term("user research", Product, &["user research", "customer interviews"]),
    term("product strategy", Product, &["product strategy"]),
    term("go-to-market", Product, &["go-to-market", "gtm"]),
    term("okrs", Product, &["okr", "okrs"]),
    term("product analytics", Product, &["product analytics", "funnel analysis"]),
    term("pricing", Product, &["pricing", "monetization"]),
    // Scale
    term("large scale", Scale, &["at scale", "large-scale", "large scale", "high-scale"]),
    term("millions of users", Scale, &["millions of users", "million users"]),
    term("distributed systems", Scale, &["distributed systems", "distributed system"]),
    term("high availability", Scale, &["high availability", "99.9", "99.99"]),
    term("low latency", Scale, &["low latency", "low-latency"]),
    term("high volume hiring", Scale, &["high-volume hiring", "high volume hiring", "hypergrowth"]),
    // Leadership
    term("people management", Leadership, &["people management", "direct reports", "managed a team"]),
    term("hiring", Leadership, &["hiring", "hired"]),
    term("mentoring", Leadership, &["mentoring", "mentored", "coaching"]),
    term("cross-functional", Leadership, &["cross-functional", "cross functional"]),
    term("stakeholder management", Leadership, &["stakeholder management", "stakeholders"]),
    term("full-cycle recruiting", Leadership, &["full-cycle recruiting", "full cycle recruiting", "full-cycle"]),
    term("sourcing", Leadership, &["sourcing", "sourced"]),
    // Staff-level systems
    term("system design", StaffSystems, &["system design", "systems design"]),
    term("architecture", StaffSystems, &["architecture", "architected"]),
    term("technical strategy", StaffSystems, &["technical strategy", "technical vision"]),
    term("platform", StaffSystems, &["platform engineering", "internal platform", "platform team"]),
    term("org-wide impact", StaffSystems, &["org-wide", "company-wide", "organization-wide"]),
    term("reliability", StaffSystems, &["reliability", "sre"]),
    term("incident management", StaffSystems, &["incident management", "incident response", "on-call"]),
];

/// Canonical names of every catalog term present in `text`.
pub fn extract_signals(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    SIGNAL_CATALOG
        .iter()
        .filter(|t| {
            t.aliases
                .iter()
                .any(|alias| !phrase_offsets(&lower, alias).is_empty())
        })
        .map(|t| t.canonical.to_string())
        .collect()
}

/// Per-invocation signal profile. Never stored beyond the invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalProfile {
    jd_keywords: BTreeSet<String>,
    candidate_evidence_keywords: BTreeSet<String>,
}

impl SignalProfile {
    /// JD signals come from the JD only; evidence comes from the resume only.
    pub fn build(jd_text: &str, resume_text: &str) -> Self {
        Self {
            jd_keywords: extract_signals(jd_text),
            candidate_evidence_keywords: extract_signals(resume_text),
        }
    }

    pub fn jd_keywords(&self) -> &BTreeSet<String> {
        &self.jd_keywords
    }

    pub fn candidate_evidence_keywords(&self) -> &BTreeSet<String> {
        &self.candidate_evidence_keywords
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GroundingVerdict {
    Grounded { keywords: Vec<String> },
    NoSignal,
    MissingEvidence { missing: Vec<String> },
    NotRelevantToJd { claimed: Vec<String> },
    ContradictedByEvidence { present: Vec<String> },
}

impl GroundingVerdict {
    fn reason(&self) -> String {
        match self {
            GroundingVerdict::Grounded { .. } => "grounded".to_string(),
            GroundingVerdict::NoSignal => "claims no recognisable signal".to_string(),
            GroundingVerdict::MissingEvidence { missing } => {
                format!("not in candidate evidence: {}", missing.join(", "))
            }
            GroundingVerdict::NotRelevantToJd { claimed } => {
                format!("not asked for by this JD: {}", claimed.join(", "))
            }
            GroundingVerdict::ContradictedByEvidence { present } => {
                format!("candidate evidence already shows: {}", present.join(", "))
            }
        }
    }
}

/// Strength rule: claims something, every claim is evidenced, at least one claim is in the JD.
pub fn ground_strength(profile: &SignalProfile, text: &str) -> GroundingVerdict {
    let claimed = extract_signals(text);
    if claimed.is_empty() {
        return GroundingVerdict::NoSignal;
    }

    let missing: Vec<String> = claimed
        .iter()
        .filter(|k| !profile.candidate_evidence_keywords.contains(*k))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return GroundingVerdict::MissingEvidence { missing };
    }

    let relevant: Vec<String> = claimed
        .iter()
        .filter(|k| profile.jd_keywords.contains(*k))
        .cloned()
        .collect();
    if relevant.is_empty() {
        return GroundingVerdict::NotRelevantToJd {
            claimed: claimed.into_iter().collect(),
        };
    }

    GroundingVerdict::Grounded { keywords: relevant }
}

/// Gap rule: a gap naming catalog signals must name at least one the JD asks for and the
/// resume lacks. A gap naming no catalog signal cannot be checked and is kept as-is.
pub fn ground_gap(profile: &SignalProfile, text: &str) -> GroundingVerdict {
    let claimed = extract_signals(text);
    if claimed.is_empty() {
        return GroundingVerdict::Grounded { keywords: vec![] };
    }

    let in_jd: Vec<&String> = claimed
        .iter()
        .filter(|k| profile.jd_keywords.contains(*k))
        .collect();
    if in_jd.is_empty() {
        return GroundingVerdict::NotRelevantToJd {
            claimed: claimed.into_iter().collect(),
        };
    }

    let real_gaps: Vec<String> = in_jd
        .iter()
        .filter(|k| !profile.candidate_evidence_keywords.contains(**k))
        .map(|k| (*k).clone())
        .collect();
    if real_gaps.is_empty() {
        return GroundingVerdict::ContradictedByEvidence {
            present: in_jd.into_iter().cloned().collect(),
        };
    }

    GroundingVerdict::Grounded {
        keywords: real_gaps,
    }
}

/// A strength or gap removed from user-facing output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UngroundedSignal {
    pub kind: NarrativeKind,
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroundingOutcome {
    pub strengths: Vec<NarrativeField>,
    pub gaps: Vec<NarrativeField>,
    pub dropped: Vec<UngroundedSignal>,
}

fn partition(
    profile: &SignalProfile,
    fields: Vec<NarrativeField>,
    rule: fn(&SignalProfile, &str) -> GroundingVerdict,
    kept: &mut Vec<NarrativeField>,
    dropped: &mut Vec<UngroundedSignal>,
) {
    for field in fields {
        match rule(profile, &field.text) {
            GroundingVerdict::Grounded { keywords } => kept.push(field.with_grounding(keywords)),
            verdict => {
                let reason = verdict.reason();
                info!(kind = ?field.kind, "Dropping ungrounded signal '{}': {reason}", field.text);
                dropped.push(UngroundedSignal {
                    kind: field.kind,
                    text: field.text,
                    reason,
                });
            }
        }
    }
}

/// Filters proposed strengths and gaps against the profile.
pub fn ground_narrative(
    profile: &SignalProfile,
    strengths: Vec<NarrativeField>,
    gaps: Vec<NarrativeField>,
) -> GroundingOutcome {
    let mut outcome = GroundingOutcome::default();
    partition(
        profile,
        strengths,
        ground_strength,
        &mut outcome.strengths,
        &mut outcome.dropped,
    );
    partition(
        profile,
        gaps,
        ground_gap,
        &mut outcome.gaps,
        &mut outcome.dropped,
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Platform engineer. Run Kubernetes and Kafka at scale. Mentoring expected.";
    const RESUME: &str = "Operated k8s clusters for 40 services at scale; mentored 3 engineers.";

    fn profile() -> SignalProfile {
        SignalProfile::build(JD, RESUME)
    }

    #[test]
    fn test_profile_is_scoped_to_each_text() {
        let p = profile();
        assert!(p.jd_keywords().contains("kafka"));
        assert!(!p.candidate_evidence_keywords().contains("kafka"));
        // Alias "k8s" counts as kubernetes evidence
        assert!(p.candidate_evidence_keywords().contains("kubernetes"));
    }

    #[test]
    fn test_kubernetes_strength_kept_when_resume_supports_it() {
        match ground_strength(&profile(), "Deep Kubernetes operations experience") {
            GroundingVerdict::Grounded { keywords } => assert_eq!(keywords, vec!["kubernetes"]),
            other => panic!("expected grounded, got {other:?}"),
        }
    }

    #[test]
    fn test_kubernetes_strength_dropped_without_resume_support() {
        let p = SignalProfile::build(JD, "Managed Excel reporting for finance");
        assert!(matches!(
            ground_strength(&p, "Deep Kubernetes operations experience"),
            GroundingVerdict::MissingEvidence { .. }
        ));
    }

    #[test]
    fn test_strength_with_one_unsupported_claim_is_dropped() {
        // Kubernetes is evidenced, Kafka is not
        assert!(matches!(
            ground_strength(&profile(), "Kubernetes and Kafka expertise"),
            GroundingVerdict::MissingEvidence { missing } if missing == vec!["kafka".to_string()]
        ));
    }

    #[test]
    fn test_strength_not_in_jd_is_irrelevant() {
        let p = SignalProfile::build(JD, "Python and Kubernetes");
        assert!(matches!(
            ground_strength(&p, "Strong Python skills"),
            GroundingVerdict::NotRelevantToJd { .. }
        ));
    }

    #[test]
    fn test_vague_strength_has_no_signal() {
        assert_eq!(
            ground_strength(&profile(), "Great attitude and work ethic"),
            GroundingVerdict::NoSignal
        );
    }

    #[test]
    fn test_gap_kept_when_jd_asks_and_resume_lacks() {
        match ground_gap(&profile(), "No Kafka experience") {
            GroundingVerdict::Grounded { keywords } => assert_eq!(keywords, vec!["kafka"]),
            other => panic!("expected grounded gap, got {other:?}"),
        }
    }

    #[test]
    fn test_gap_contradicted_by_resume_is_dropped() {
        assert!(matches!(
            ground_gap(&profile(), "Lacks Kubernetes exposure"),
            GroundingVerdict::ContradictedByEvidence { .. }
        ));
    }

    #[test]
    fn test_gap_without_catalog_signal_is_kept() {
        assert_eq!(
            ground_gap(&profile(), "Limited exposure to regulated industries"),
            GroundingVerdict::Grounded { keywords: vec![] }
        );
    }

    #[test]
    fn test_ground_narrative_partitions_and_records_drops() {
        let outcome = ground_narrative(
            &profile(),
            vec![
                NarrativeField::new(NarrativeKind::Strength, "Kubernetes at scale"),
                NarrativeField::new(NarrativeKind::Strength, "Terraform mastery"),
            ],
            vec![NarrativeField::new(NarrativeKind::Gap, "No Kafka experience")],
        );
        assert_eq!(outcome.strengths.len(), 1);
        assert_eq!(
            outcome.strengths[0].grounding_keywords,
            vec!["kubernetes".to_string(), "large scale".to_string()]
        );
        assert_eq!(outcome.gaps.len(), 1);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].text, "Terraform mastery");
    }

    /// CRITICAL: two candidates against the same JD never see each other's evidence.
    #[test]
    fn test_no_cross_candidate_leakage() {
        let strong = SignalProfile::build(JD, "Kafka committer, ran Kafka at scale");
        let weak = SignalProfile::build(JD, "Retail store manager");
        let claim = "Kafka expertise";
        assert!(matches!(ground_strength(&strong, claim), GroundingVerdict::Grounded { .. }));
        assert!(matches!(
            ground_strength(&weak, claim),
            GroundingVerdict::MissingEvidence { .. }
        ));
    }
}
