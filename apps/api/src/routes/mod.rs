pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::calibration::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/calibrate", post(handlers::handle_calibrate))
        .fallback(not_found)
        .with_state(state)
}
