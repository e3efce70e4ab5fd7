use crate::config::settings::AppConfig;
use crate::modules::transcription::registry::JobRegistry;
use crate::workers::transcription_poller::StatusPollerJob;
use crate::workers::transcription_submitter::SubmissionJob;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: JobRegistry,
    pub submission_job: Arc<SubmissionJob>,
    pub poller_job: Arc<StatusPollerJob>,
    pub shutdown_token: CancellationToken,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        registry: JobRegistry,
        submission_job: Arc<SubmissionJob>,
        poller_job: Arc<StatusPollerJob>,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            registry,
            submission_job,
            poller_job,
            shutdown_token,
        }
    }
}
