//! Hard-Cap Enforcer: ceilings the model's fit score when qualifying years fall short.
//!
//! Bands on years_percentage: <50 → 45, 50–69 → 50, 70–89 → 55, ≥90 → no cap.
//! A role with no stated requirement bypasses capping explicitly.

use serde::Serialize;

/// A cap of 100 means "uncapped".
pub const NO_CAP: u32 = 100;

/// `(exclusive upper bound on years_percentage, cap)`; anything past the last band is uncapped.
pub const CAP_BANDS: &[(f64, u32)] = &[(50.0, 45), (70.0, 50), (90.0, 55)];

/// Clamps the model-supplied score into 0..=100.
pub fn clamp_raw_score(score: i64) -> u32 {
    score.clamp(0, 100) as u32
}

pub fn cap_for_percentage(years_percentage: f64) -> u32 {
    CAP_BANDS
        .iter()
        .find(|(upper, _)| years_percentage < *upper)
        .map(|(_, cap)| *cap)
        .unwrap_or(NO_CAP)
}

/// Fit for one invocation. Only constructed by [`enforce_hard_cap`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitAssessment {
    raw_score: u32,
    required_years: f64,
    /// `None` when the role states no years requirement.
    years_percentage: Option<f64>,
    hard_cap: u32,
    final_score: u32,
}

impl FitAssessment {
    pub fn raw_score(&self) -> u32 {
        self.raw_score
    }

    pub fn required_years(&self) -> f64 {
        self.required_years
    }

    pub fn years_percentage(&self) -> Option<f64> {
        self.years_percentage
    }

    pub fn hard_cap(&self) -> u32 {
        self.hard_cap
    }

    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    pub fn is_capped(&self) -> bool {
        self.final_score < self.raw_score
    }

    pub fn requirement_bypassed(&self) -> bool {
        self.years_percentage.is_none()
    }
}

/// Applies the cap ladder. `final_score = min(raw_score, hard_cap)`, so it never rises.
pub fn enforce_hard_cap(adjusted_years: f64, required_years: f64, raw_score: i64) -> FitAssessment {
    let raw_score = clamp_raw_score(raw_score);

    // No stated requirement: pass the score through untouched.
    if required_years <= 0.0 || !required_years.is_finite() {
        return FitAssessment {
            raw_score,
            required_years: 0.0,
            years_percentage: None,
            hard_cap: NO_CAP,
            final_score: raw_score,
        };
    }

    let years_percentage = adjusted_years.max(0.0) / required_years * 100.0;
    let hard_cap = cap_for_percentage(years_percentage);

    FitAssessment {
        raw_score,
        required_years,
        years_percentage: Some(years_percentage),
        hard_cap,
        final_score: raw_score.min(hard_cap),
    }
}
