//! Calibration & recommendation lock pipeline.
//!
//! Deterministic post-processing that turns a model-generated resume/JD analysis into a
//! locked recommendation with contradiction-free, evidence-grounded narrative.

pub mod calibration;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod state;
