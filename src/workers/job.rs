use crate::infrastructure::cache::CacheError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that abort a whole job run.
///
/// Per-tenant and per-job failures are logged inside the run and never
/// surface here.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("upstream listing failed: {0:#}")]
    Listing(anyhow::Error),
    #[error("job registry unavailable: {0}")]
    Registry(#[from] CacheError),
    #[error("job run was cancelled")]
    Cancelled,
}

/// Context handed to every job run.
#[derive(Clone, Default)]
pub struct JobContext {
    pub cancellation_token: CancellationToken,
}

impl JobContext {
    pub fn new(cancellation_token: CancellationToken) -> Self {
        Self { cancellation_token }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// `Err(JobError::Cancelled)` once cancellation was requested.
    pub fn checkpoint(&self) -> Result<(), JobError> {
        if self.is_cancelled() {
            Err(JobError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A job invoked by the scheduler on a fixed interval.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Identifier used in logs and by the ops API.
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    async fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}
