//! JD requirement extraction: the years requirement when intake did not supply one.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::job::JobContext;

/// Figures above this are not requirements ("founded 50 years ago").
const MAX_PLAUSIBLE_YEARS: f64 = 40.0;

const NUMBER_WORDS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
    ("fifteen", 15.0),
];

fn years_regex() -> &'static Regex {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    YEARS.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{1,2}(?:\.\d)?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fifteen)\s*(?:\+|plus)?\s*(?:(?:-|–|to)\s*\d{1,2}\s*\+?\s*)?(?:full[\s-]+)?years?\b",
        )
        .expect("years regex is valid")
    })
}

fn parse_number(token: &str) -> Option<f64> {
    let lower = token.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == lower)
        .map(|(_, n)| *n)
        .or_else(|| lower.parse().ok())
}

/// First plausible "N years" figure in the JD, using the lower bound of any range.
pub fn extract_required_years(jd_text: &str) -> Option<f64> {
    years_regex()
        .captures_iter(jd_text)
        .filter_map(|caps| parse_number(caps.get(1)?.as_str()))
        .find(|years| *years > 0.0 && *years <= MAX_PLAUSIBLE_YEARS)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementSource {
    Stated,
    ExtractedFromJd,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequiredYears {
    pub years: f64,
    pub source: RequirementSource,
}

/// Any stated requirement wins, including an explicit 0 (no requirement). The JD is
/// scanned only when nothing usable was stated.
pub fn resolve_required_years(job: &JobContext) -> RequiredYears {
    if let Some(years) = job.required_years.filter(|y| y.is_finite()) {
        return RequiredYears {
            years: years.max(0.0),
            source: RequirementSource::Stated,
        };
    }
    match extract_required_years(&job.job_description) {
        Some(years) => RequiredYears {
            years,
            source: RequirementSource::ExtractedFromJd,
        },
        None => RequiredYears {
            years: 0.0,
            source: RequirementSource::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECRUITER_JD: &str = r#"
        Senior Technical Recruiter
        You will partner with engineering leaders to hire across the platform org.
        Requirements: 7+ years of full-cycle recruiting experience, 2+ years hiring engineers.
        About us: founded 120 years ago, now a software company.
    "#;

    #[test]
    fn test_plus_notation_takes_first_figure() {
        assert_eq!(extract_required_years(RECRUITER_JD), Some(7.0));
    }

    #[test]
    fn test_range_uses_lower_bound() {
        assert_eq!(extract_required_years("Looking for 5-7 years in product"), Some(5.0));
        assert_eq!(extract_required_years("3 to 5 years of design work"), Some(3.0));
    }

    #[test]
    fn test_word_numbers() {
        assert_eq!(extract_required_years("At least five years of sales"), Some(5.0));
    }

    #[test]
    fn test_minimum_phrasing() {
        assert_eq!(extract_required_years("minimum of 8 years managing ops"), Some(8.0));
    }

    #[test]
    fn test_implausible_values_skipped() {
        assert_eq!(extract_required_years("A 50 year old company seeks a marketer"), None);
    }

    #[test]
    fn test_no_requirement_is_none() {
        assert_eq!(extract_required_years("Join our friendly team"), None);
    }

    #[test]
    fn test_stated_requirement_wins() {
        let job = JobContext {
            role_title: "Recruiter".to_string(),
            job_description: "10+ years required".to_string(),
            required_years: Some(7.0),
        };
        let resolved = resolve_required_years(&job);
        assert_eq!(resolved.years, 7.0);
        assert_eq!(resolved.source, RequirementSource::Stated);
    }

    #[test]
    fn test_stated_zero_is_explicit_bypass() {
        let job = JobContext {
            role_title: "Recruiter".to_string(),
            job_description: "Our founders have 10 years of experience.".to_string(),
            required_years: Some(0.0),
        };
        let resolved = resolve_required_years(&job);
        assert_eq!(resolved.years, 0.0);
        assert_eq!(resolved.source, RequirementSource::Stated);
    }

    #[test]
    fn test_falls_back_to_jd_then_zero() {
        let job = JobContext {
            role_title: "Recruiter".to_string(),
            job_description: "Requires 4+ years".to_string(),
            required_years: None,
        };
        let resolved = resolve_required_years(&job);
        assert_eq!(resolved.years, 4.0);
        assert_eq!(resolved.source, RequirementSource::ExtractedFromJd);

        let job = JobContext {
            required_years: Some(f64::NAN),
            ..job
        };
        assert_eq!(resolve_required_years(&job).source, RequirementSource::ExtractedFromJd);

        let job = JobContext {
            role_title: "Recruiter".to_string(),
            job_description: "No requirement here".to_string(),
            required_years: None,
        };
        let resolved = resolve_required_years(&job);
        assert_eq!(resolved.years, 0.0);
        assert_eq!(resolved.source, RequirementSource::None);
    }
}
