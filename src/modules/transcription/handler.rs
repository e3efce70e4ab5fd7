use super::dto::{TranscriptionJobResponse, TranscriptionSettingsResponse};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use crate::workers::job::JobContext;
use crate::workers::transcription_poller::PollSummary;
use crate::workers::transcription_submitter::SubmissionSummary;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

/// List outstanding transcription jobs
#[utoipa::path(
    get,
    path = "/api/v1/transcription/jobs",
    responses(
        (status = 200, description = "Registered transcription jobs", body = ApiResponse<Vec<TranscriptionJobResponse>>),
        (status = 503, description = "Registry unavailable")
    ),
    tag = "Transcription"
)]
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.list_records().await {
        Ok(records) => {
            let jobs: Vec<TranscriptionJobResponse> =
                records.into_iter().map(TranscriptionJobResponse::from).collect();
            ApiSuccess::ok(jobs, "Transcription jobs retrieved successfully").into_response()
        }
        Err(e) => ApiError::unavailable(e).into_response(),
    }
}

/// Show the settings both transcription jobs run with
#[utoipa::path(
    get,
    path = "/api/v1/transcription/settings",
    responses(
        (status = 200, description = "Transcription job settings", body = ApiResponse<TranscriptionSettingsResponse>)
    ),
    tag = "Transcription"
)]
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = TranscriptionSettingsResponse::from(&state.config.transcription);
    ApiSuccess::ok(settings, "Transcription settings retrieved successfully")
}

/// Run the submission job once
#[utoipa::path(
    post,
    path = "/api/v1/transcription/jobs/submission/run",
    responses(
        (status = 200, description = "Submission run finished", body = ApiResponse<SubmissionSummary>),
        (status = 500, description = "Run aborted")
    ),
    tag = "Transcription"
)]
pub async fn run_submission(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = JobContext::new(state.shutdown_token.child_token());
    match state.submission_job.run(&ctx).await {
        Ok(summary) => ApiSuccess::ok(summary, "Submission run finished").into_response(),
        Err(e) => ApiError::internal(e).into_response(),
    }
}

/// Run the status poller once
#[utoipa::path(
    post,
    path = "/api/v1/transcription/jobs/poll/run",
    responses(
        (status = 200, description = "Status poll finished", body = ApiResponse<PollSummary>),
        (status = 500, description = "Run aborted")
    ),
    tag = "Transcription"
)]
pub async fn run_poll(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = JobContext::new(state.shutdown_token.child_token());
    match state.poller_job.run(&ctx).await {
        Ok(summary) => ApiSuccess::ok(summary, "Status poll finished").into_response(),
        Err(e) => ApiError::internal(e).into_response(),
    }
}

pub async fn run_unknown(Path(job): Path<String>) -> impl IntoResponse {
    ApiError::not_found(format!("Unknown job: {}", job))
}
