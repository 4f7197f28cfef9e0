use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds configuration only. Calibration entities are built fresh per request and
/// never stored here.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}
