//! Narrative fields: the model's free text, tagged by what it claims to be.

use serde::{Deserialize, Serialize};

use crate::models::analysis::ModelAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeKind {
    Strength,
    Gap,
    Rationale,
    StrategicAction,
    Guidance,
}

impl NarrativeKind {
    /// Kinds that tell the user what to do next; bound by the UI contract.
    pub fn is_guidance(self) -> bool {
        matches!(self, NarrativeKind::StrategicAction | NarrativeKind::Guidance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeField {
    pub kind: NarrativeKind,
    pub text: String,
    /// Canonical signal terms that justify this field. Empty until grounding runs.
    pub grounding_keywords: Vec<String>,
}

impl NarrativeField {
    pub fn new(kind: NarrativeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            grounding_keywords: Vec::new(),
        }
    }

    pub fn with_grounding(mut self, keywords: Vec<String>) -> Self {
        self.grounding_keywords = keywords;
        self
    }
}

/// All narrative for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Narrative {
    pub strengths: Vec<NarrativeField>,
    pub gaps: Vec<NarrativeField>,
    pub rationale: Option<NarrativeField>,
    pub strategic_action: Option<NarrativeField>,
}

impl Narrative {
    /// Wraps the model's strings. Blank entries are discarded.
    pub fn from_analysis(analysis: &ModelAnalysis) -> Self {
        let tagged = |kind: NarrativeKind, items: &[String]| -> Vec<NarrativeField> {
            items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| NarrativeField::new(kind, t))
                .collect()
        };
        let single = |kind: NarrativeKind, text: &Option<String>| {
            text.as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| NarrativeField::new(kind, t))
        };

        Self {
            strengths: tagged(NarrativeKind::Strength, &analysis.strengths),
            gaps: tagged(NarrativeKind::Gap, &analysis.gaps),
            rationale: single(NarrativeKind::Rationale, &analysis.rationale),
            strategic_action: single(NarrativeKind::StrategicAction, &analysis.strategic_action),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &NarrativeField> {
        self.strengths
            .iter()
            .chain(self.gaps.iter())
            .chain(self.rationale.iter())
            .chain(self.strategic_action.iter())
    }
}
