use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

pub mod client;
pub mod dto;
pub mod handler;
pub mod model;
pub mod registry;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(handler::get_settings))
        .route("/jobs", get(handler::list_jobs))
        .route("/jobs/submission/run", post(handler::run_submission))
        .route("/jobs/poll/run", post(handler::run_poll))
        .route("/jobs/{job}/run", post(handler::run_unknown))
}
