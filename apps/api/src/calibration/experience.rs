//! Experience Calculator: qualifying years from parsed work history.
//!
//! Best-effort estimate: unparsable or open-without-"present" ranges contribute 0,
//! and months covered by several matching entries are counted once.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::calibration::credibility::{CredibilityAssessment, CredibilityFlag};
use crate::calibration::role_classifier::RoleCategory;
use crate::models::resume::WorkHistoryEntry;

/// Spans longer than this are treated as parse noise.
const MAX_SPAN_MONTHS: i32 = 50 * 12;

const ENDPOINT: &str = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s*\d{4}|\d{1,2}/\d{4}|\d{4}-\d{1,2}|\d{4}|present|current|now|today|ongoing)";

fn range_regex() -> &'static Regex {
    static RANGE: OnceLock<Regex> = OnceLock::new();
    RANGE.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b({ENDPOINT})\s*(?:-|–|—|\bto\b|\buntil\b|\bthrough\b)\s*({ENDPOINT})\b"
        );
        Regex::new(&pattern).expect("date range regex is valid")
    })
}

/// Half-open range of month indices (`year * 12 + month0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    pub start: i32,
    pub end: i32,
}

impl MonthSpan {
    pub fn months(&self) -> i32 {
        (self.end - self.start).max(0)
    }
}

enum Endpoint {
    Month(i32),
    Open,
}

fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + (month as i32 - 1)
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn valid_month(month: u32) -> Option<u32> {
    (1..=12).contains(&month).then_some(month)
}

fn parse_endpoint(raw: &str) -> Option<Endpoint> {
    let token = raw.trim().to_lowercase();
    if matches!(
        token.as_str(),
        "present" | "current" | "now" | "today" | "ongoing"
    ) {
        return Some(Endpoint::Open);
    }

    // MM/YYYY
    if let Some((month, year)) = token.split_once('/') {
        let month = valid_month(month.trim().parse().ok()?)?;
        return Some(Endpoint::Month(month_index(year.trim().parse().ok()?, month)));
    }

    // YYYY-MM
    if let Some((year, month)) = token.split_once('-') {
        let month = valid_month(month.trim().parse().ok()?)?;
        return Some(Endpoint::Month(month_index(year.trim().parse().ok()?, month)));
    }

    // YYYY
    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        return Some(Endpoint::Month(month_index(token.parse().ok()?, 1)));
    }

    // Month-name YYYY
    let year_start = token.find(|c: char| c.is_ascii_digit())?;
    let month = month_from_name(token[..year_start].trim())?;
    let year: i32 = token[year_start..].trim().parse().ok()?;
    Some(Endpoint::Month(month_index(year, month)))
}

/// Parses a free-text date range into a month span.
///
/// Returns `None` when no start/end pair is found, when the end precedes the start,
/// or when the span is implausibly long. An open end resolves to `analysis_date`.
pub fn parse_date_range(text: &str, analysis_date: NaiveDate) -> Option<MonthSpan> {
    let caps = range_regex().captures(text)?;
    let start = match parse_endpoint(caps.get(1)?.as_str())? {
        Endpoint::Month(m) => m,
        Endpoint::Open => return None,
    };
    let end = match parse_endpoint(caps.get(2)?.as_str())? {
        Endpoint::Month(m) => m,
        Endpoint::Open => month_index(analysis_date.year(), analysis_date.month()),
    };

    let span = MonthSpan { start, end };
    if span.months() == 0 || span.months() > MAX_SPAN_MONTHS {
        return None;
    }
    Some(span)
}

/// Entries whose title counts toward `category`. `General` keeps everything.
pub fn matching_entries(
    entries: &[WorkHistoryEntry],
    category: RoleCategory,
) -> Vec<&WorkHistoryEntry> {
    entries
        .iter()
        .filter(|e| category.matches_title(&e.title))
        .collect()
}

/// Sums tenure over `entries`, counting each calendar month once.
pub fn compute_raw_years(entries: &[&WorkHistoryEntry], analysis_date: NaiveDate) -> f64 {
    let mut months: BTreeSet<i32> = BTreeSet::new();

    for entry in entries {
        match parse_date_range(&entry.date_range, analysis_date) {
            Some(span) => months.extend(span.start..span.end),
            None => debug!(
                "Unparsable or open-ended date range '{}' for '{}', counted as 0",
                entry.date_range, entry.title
            ),
        }
    }

    months.len() as f64 / 12.0
}

/// Experience for one invocation. Built once; there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceAssessment {
    role_category: RoleCategory,
    raw_years: f64,
    credibility_multiplier: f64,
    adjusted_years: f64,
    matched_entries: usize,
    credibility_flags: Vec<CredibilityFlag>,
}

impl ExperienceAssessment {
    pub fn new(
        role_category: RoleCategory,
        raw_years: f64,
        matched_entries: usize,
        credibility: CredibilityAssessment,
    ) -> Self {
        let multiplier = credibility.multiplier();
        Self {
            role_category,
            raw_years,
            credibility_multiplier: multiplier,
            adjusted_years: raw_years * multiplier,
            matched_entries,
            credibility_flags: credibility.into_flags(),
        }
    }

    pub fn role_category(&self) -> RoleCategory {
        self.role_category
    }

    pub fn raw_years(&self) -> f64 {
        self.raw_years
    }

    pub fn credibility_multiplier(&self) -> f64 {
        self.credibility_multiplier
    }

    pub fn adjusted_years(&self) -> f64 {
        self.adjusted_years
    }

    pub fn matched_entries(&self) -> usize {
        self.matched_entries
    }

    pub fn credibility_flags(&self) -> &[CredibilityFlag] {
        &self.credibility_flags
    }
}
