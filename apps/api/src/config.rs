use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::calibration::pipeline::CalibrationOptions;

/// Service configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Turn contract violations into request failures instead of annotated reports.
    pub strict_contracts: bool,
    /// Pins the date "present"/"current" ranges resolve to. `None` means today (UTC).
    pub analysis_date: Option<NaiveDate>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            strict_contracts: optional_env("STRICT_CONTRACTS")
                .map(|v| parse_bool(&v))
                .transpose()
                .context("STRICT_CONTRACTS must be true/false")?
                .unwrap_or(false),
            analysis_date: optional_env("ANALYSIS_DATE")
                .map(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d"))
                .transpose()
                .context("ANALYSIS_DATE must be formatted YYYY-MM-DD")?,
        })
    }

    /// Per-invocation options handed to the calibration pipeline.
    pub fn calibration_options(&self) -> CalibrationOptions {
        CalibrationOptions {
            strict_contracts: self.strict_contracts,
            analysis_date: self.analysis_date,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean '{other}'"),
    }
}
