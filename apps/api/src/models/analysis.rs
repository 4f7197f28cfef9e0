use serde::{Deserialize, Serialize};

/// Untrusted output of the upstream generative analysis.
///
/// Only `fit_score` feeds the numeric path. Everything else is narrative that the
/// calibration stages filter and rewrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelAnalysis {
    #[serde(default)]
    pub fit_score: i64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub strategic_action: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    /// Advisory only; years are always recomputed from the work history.
    #[serde(default)]
    pub candidate_years_claimed: Option<f64>,
    /// The model's own recommendation label, if it produced one.
    #[serde(default)]
    pub recommendation: Option<String>,
}
