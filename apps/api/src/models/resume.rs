use serde::{Deserialize, Serialize};

/// One position from the parsed resume. Immutable once received.
///
/// Accepts both the internal field names and the resume parser's
/// `company` / `dates` / `bullets` spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHistoryEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "company")]
    pub employer: String,
    #[serde(default, alias = "dates")]
    pub date_range: String,
    #[serde(default, alias = "bullets")]
    pub raw_bullets: Vec<String>,
}

impl WorkHistoryEntry {
    pub fn new(title: &str, employer: &str, date_range: &str, raw_bullets: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            employer: employer.to_string(),
            date_range: date_range.to_string(),
            raw_bullets: raw_bullets.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// Structured resume as produced by the resume parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeInput {
    /// Used only to rewrite third-person references into second person.
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub experience: Vec<WorkHistoryEntry>,
    /// Full resume text. When absent, evidence is built from the structured entries.
    #[serde(default)]
    pub raw_text: Option<String>,
}

impl ResumeInput {
    /// Text the candidate's evidence keywords are extracted from.
    pub fn evidence_text(&self) -> String {
        if let Some(raw) = self.raw_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return raw.to_string();
        }
        let mut parts = Vec::new();
        for entry in &self.experience {
            parts.push(entry.title.as_str());
            parts.push(entry.employer.as_str());
            parts.extend(entry.raw_bullets.iter().map(String::as_str));
        }
        parts.join("\n")
    }
}
