//! Credibility Adjuster: heuristic discount on computed years.
//!
//! Red flags: a short-tenure note on an entry, or an employer name carrying an
//! early-stage marker. 0 flags → 1.0, 1 flag → 0.7, 2+ flags → 0.3.
//! The result is advisory and is always worded that way to the user.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::calibration::text::{contains_phrase, first_phrase_in};
use crate::models::resume::WorkHistoryEntry;

/// Longest first: "pre-seed" must win over "seed".
pub const EARLY_STAGE_MARKERS: &[&str] = &["pre-seed", "seed", "stealth", "founding", "startup"];

pub const MULTIPLIER_CLEAN: f64 = 1.0;
pub const MULTIPLIER_ONE_FLAG: f64 = 0.7;
pub const MULTIPLIER_MULTI_FLAG: f64 = 0.3;

const NUMBER: &str = r"(?:\d+|a|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

/// Bullets that state a tenure ("6 month contract", "Six months, then acquired").
fn tenure_note_regex() -> &'static Regex {
    static NOTE: OnceLock<Regex> = OnceLock::new();
    NOTE.get_or_init(|| {
        let duration = format!(r"(?:{NUMBER}[\s-]*months?|(?:1|one|a)[\s-]*year)");
        let pattern = format!(
            r"(?i)^\s*\(?\s*{duration}\b|\b{duration}\s+(?:contract|role|tenure|engagement|assignment|stint|position|term)\b"
        );
        Regex::new(&pattern).expect("tenure note regex is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum CredibilityFlag {
    ShortTenure { employer: String, evidence: String },
    EarlyStageEmployer { employer: String, marker: String },
}

/// Flags found on the matched entries, plus the resulting multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct CredibilityAssessment {
    flags: Vec<CredibilityFlag>,
    multiplier: f64,
}

impl CredibilityAssessment {
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn flags(&self) -> &[CredibilityFlag] {
        &self.flags
    }

    pub fn into_flags(self) -> Vec<CredibilityFlag> {
        self.flags
    }
}

pub fn multiplier_for(flag_count: usize) -> f64 {
    match flag_count {
        0 => MULTIPLIER_CLEAN,
        1 => MULTIPLIER_ONE_FLAG,
        _ => MULTIPLIER_MULTI_FLAG,
    }
}

fn short_tenure_evidence(entry: &WorkHistoryEntry) -> Option<String> {
    for header in [&entry.date_range, &entry.title] {
        if header.to_lowercase().contains("month") || contains_phrase(header, "1 year") {
            return Some(header.clone());
        }
    }
    entry
        .raw_bullets
        .iter()
        .find(|b| tenure_note_regex().is_match(b))
        .cloned()
}

/// Scans the entries that counted toward the role. At most one flag of each kind per entry.
pub fn assess_credibility(entries: &[&WorkHistoryEntry]) -> CredibilityAssessment {
    let mut flags = Vec::new();

    for entry in entries {
        if let Some(evidence) = short_tenure_evidence(entry) {
            flags.push(CredibilityFlag::ShortTenure {
                employer: entry.employer.clone(),
                evidence,
            });
        }
        if let Some(marker) = first_phrase_in(&entry.employer, EARLY_STAGE_MARKERS) {
            flags.push(CredibilityFlag::EarlyStageEmployer {
                employer: entry.employer.clone(),
                marker: marker.to_string(),
            });
        }
    }

    let multiplier = multiplier_for(flags.len());
    CredibilityAssessment { flags, multiplier }
}

/// User-facing advisory wording for a discounted assessment. `None` when nothing was discounted.
pub fn advisory_note(flags: &[CredibilityFlag], multiplier: f64) -> Option<String> {
    if flags.is_empty() {
        return None;
    }
    let reasons: Vec<String> = flags
        .iter()
        .map(|flag| match flag {
            CredibilityFlag::ShortTenure { employer, .. } => {
                format!("a short tenure note at {employer}")
            }
            CredibilityFlag::EarlyStageEmployer { employer, marker } => {
                format!("an early-stage ('{marker}') employer at {employer}")
            }
        })
        .collect();
    Some(format!(
        "Advisory: your counted experience was weighted at {:.0}% because of {}. \
         This is a heuristic and may not reflect the depth of your work.",
        multiplier * 100.0,
        reasons.join(" and ")
    ))
}
