//! Axum route handlers for the Calibration API.

use axum::{extract::State, Json};
use tracing::info;

use crate::calibration::pipeline::{run_calibration, CalibrationInput, CalibrationReport};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/calibrate
///
/// Runs the full calibration pipeline over one model analysis and returns the locked
/// recommendation with its filtered narrative. Nothing is persisted.
pub async fn handle_calibrate(
    State(state): State<AppState>,
    Json(input): Json<CalibrationInput>,
) -> Result<Json<CalibrationReport>, AppError> {
    if input.job.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job.job_description cannot be empty".to_string(),
        ));
    }

    info!(
        "Calibrating '{}' against {} work history entries",
        input.job.role_title,
        input.resume.experience.len()
    );

    let report = run_calibration(&input, &state.config.calibration_options())?;

    Ok(Json(report))
}
