use crate::modules::transcription::dto::{TranscriptionJobResponse, TranscriptionSettingsResponse};
use crate::workers::transcription_poller::PollSummary;
use crate::workers::transcription_submitter::SubmissionSummary;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::transcription::handler::get_settings,
        crate::modules::transcription::handler::list_jobs,
        crate::modules::transcription::handler::run_submission,
        crate::modules::transcription::handler::run_poll,
    ),
    components(
        schemas(
            TranscriptionJobResponse,
            TranscriptionSettingsResponse,
            SubmissionSummary,
            PollSummary
        )
    ),
    tags(
        (name = "Transcription", description = "Transcription job registry and job triggers")
    )
)]
pub struct ApiDoc;
