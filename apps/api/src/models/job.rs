use serde::{Deserialize, Serialize};

/// Job / role context from intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobContext {
    #[serde(default)]
    pub role_title: String,
    #[serde(default)]
    pub job_description: String,
    /// Stated years requirement. When absent it is extracted from the JD text.
    #[serde(default)]
    pub required_years: Option<f64>,
}
