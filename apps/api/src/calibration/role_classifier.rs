//! Role Classifier: maps a role title / JD to a fixed role category.
//!
//! Categories are tried in `CLASSIFICATION_ORDER`; the first whose keyword list hits wins.
//! Recruiting is tested before engineering so "Technical Recruiter" stays a recruiting role.

use serde::{Deserialize, Serialize};

use crate::calibration::text::first_phrase_in;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    ProductManagement,
    Engineering,
    Design,
    Operations,
    Recruiting,
    Sales,
    Marketing,
    General,
}

/// Priority order for classification. `General` is the fallback and is never tested.
pub const CLASSIFICATION_ORDER: &[RoleCategory] = &[
    RoleCategory::Recruiting,
    RoleCategory::ProductManagement,
    RoleCategory::Design,
    RoleCategory::Engineering,
    RoleCategory::Operations,
    RoleCategory::Sales,
    RoleCategory::Marketing,
];

impl RoleCategory {
    /// Frozen keyword list for this category. Also used to match work-history titles.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            RoleCategory::Recruiting => &[
                "recruiter",
                "recruiting",
                "recruitment",
                "talent acquisition",
                "talent partner",
                "sourcer",
                "sourcing specialist",
                "headhunter",
            ],
            RoleCategory::ProductManagement => &[
                "product manager",
                "product management",
                "product owner",
                "product lead",
                "head of product",
                "vp of product",
                "group product manager",
            ],
            RoleCategory::Design => &[
                "designer",
                "design lead",
                "head of design",
                "ux",
                "ui/ux",
                "user experience",
                "user researcher",
            ],
            RoleCategory::Engineering => &[
                "engineer",
                "engineering",
                "developer",
                "software",
                "programmer",
                "sre",
                "devops",
                "architect",
                "cto",
            ],
            RoleCategory::Operations => &[
                "operations",
                "ops manager",
                "program manager",
                "chief of staff",
                "supply chain",
                "logistics",
                "coo",
            ],
            RoleCategory::Sales => &[
                "sales",
                "account executive",
                "account manager",
                "business development",
                "sdr",
                "bdr",
            ],
            RoleCategory::Marketing => &[
                "marketing",
                "marketer",
                "growth",
                "brand manager",
                "demand generation",
                "content strategist",
                "seo",
                "communications",
            ],
            RoleCategory::General => &[],
        }
    }

    /// True if a work-history title counts toward this category.
    /// `General` matches every title, including empty ones.
    pub fn matches_title(self, title: &str) -> bool {
        match self {
            RoleCategory::General => true,
            _ => first_phrase_in(title, self.keywords()).is_some(),
        }
    }
}

fn classify_text(text: &str) -> Option<RoleCategory> {
    CLASSIFICATION_ORDER
        .iter()
        .copied()
        .find(|category| first_phrase_in(text, category.keywords()).is_some())
}

/// Classifies the role. The title is authoritative; the JD body is consulted only when
/// the title matches nothing. Total: falls back to `General`.
pub fn classify_role(role_title: &str, job_description: &str) -> RoleCategory {
    classify_text(role_title)
        .or_else(|| classify_text(job_description))
        .unwrap_or(RoleCategory::General)
}
