use super::job::{JobContext, JobError, ScheduledJob};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runs every registered job on its own fixed interval until shutdown.
///
/// Runs of the same job never overlap because each job loop awaits its run
/// before waiting for the next tick. Different jobs run independently.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
    shutdown_token: CancellationToken,
}

impl JobScheduler {
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self {
            jobs: Vec::new(),
            shutdown_token,
        }
    }

    pub fn register_job(&mut self, job: Arc<dyn ScheduledJob>) {
        info!("Registering job: {} (every {:?})", job.name(), job.interval());
        self.jobs.push(job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub async fn run(self) {
        info!("⏱️ Starting job scheduler with {} registered jobs", self.jobs.len());

        let loops = self
            .jobs
            .into_iter()
            .map(|job| run_job_loop(job, self.shutdown_token.clone()));
        join_all(loops).await;

        info!("Job scheduler stopped");
    }
}

async fn run_job_loop(job: Arc<dyn ScheduledJob>, shutdown_token: CancellationToken) {
    let mut ticker = interval(job.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        debug!("Running job {}", job.name());
        let ctx = JobContext::new(shutdown_token.child_token());
        match job.execute(&ctx).await {
            Ok(()) => {}
            Err(JobError::Cancelled) => {
                warn!("Job {} was cancelled", job.name());
                break;
            }
            Err(e) => error!("Job {} failed: {}", job.name(), e),
        }
    }
}
