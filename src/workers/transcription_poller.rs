//! Polls the transcription service for every registered job, writes lesson
//! completion back and prunes resolved jobs from the registry.

use super::job::{JobContext, JobError, ScheduledJob};
use crate::infrastructure::cache::CacheError;
use crate::modules::lesson::repository::LessonRepository;
use crate::modules::transcription::client::TranscriptionApi;
use crate::modules::transcription::model::{JobProgress, LessonStatus, fold_statuses};
use crate::modules::transcription::registry::JobRegistry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub checked: usize,
    pub resolved: usize,
    pub still_active: usize,
    pub errored: usize,
    pub lessons_completed: usize,
    pub lessons_failed: usize,
}

pub struct StatusPollerJob {
    api: Option<Arc<dyn TranscriptionApi>>,
    registry: JobRegistry,
    lessons: Arc<dyn LessonRepository>,
    interval: Duration,
}

impl StatusPollerJob {
    /// `api` is `None` when no service URL is configured; the job then does nothing.
    pub fn new(
        api: Option<Arc<dyn TranscriptionApi>>,
        registry: JobRegistry,
        lessons: Arc<dyn LessonRepository>,
        interval: Duration,
    ) -> Self {
        if api.is_none() {
            warn!("Transcription service URL not configured, transcription status polling is disabled");
        }

        Self {
            api,
            registry,
            lessons,
            interval,
        }
    }

    pub async fn run(&self, ctx: &JobContext) -> Result<PollSummary, JobError> {
        let Some(api) = self.api.as_deref() else {
            info!("Transcription service not configured, skipping status poll");
            return Ok(PollSummary::default());
        };

        let job_ids = match self.registry.job_ids().await {
            Ok(ids) => ids,
            Err(CacheError::NotFound) => {
                debug!("No pending transcription jobs");
                return Ok(PollSummary::default());
            }
            Err(e) => return Err(JobError::Registry(e)),
        };

        if job_ids.is_empty() {
            debug!("No pending transcription jobs");
            return Ok(PollSummary::default());
        }

        info!("🔎 Checking status of {} transcription job(s)", job_ids.len());

        let mut summary = PollSummary::default();
        let mut errored = HashSet::new();

        for job_id in &job_ids {
            ctx.checkpoint()?;
            summary.checked += 1;

            if let Err(e) = self.check_job_status(api, job_id, &mut summary).await {
                error!(job_id = %job_id, "❌ Failed to check transcription job: {:#}", e);
                summary.errored += 1;
                errored.insert(job_id.clone());
            }
        }

        let mut resolved = Vec::new();
        for job_id in &job_ids {
            if errored.contains(job_id) {
                continue;
            }
            match self.registry.record_exists(job_id).await {
                Ok(true) => {}
                Ok(false) => resolved.push(job_id.clone()),
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "Could not confirm job record, keeping it registered");
                }
            }
        }

        if !resolved.is_empty() {
            self.registry.prune(&resolved).await?;
            info!(
                "Removed {} resolved job(s) from the registry, {} still active",
                resolved.len(),
                job_ids.len() - resolved.len()
            );
        }

        Ok(summary)
    }

    /// Apply the service's view of one job.
    ///
    /// Errors leave the job registered so it is retried on the next run.
    async fn check_job_status(
        &self,
        api: &dyn TranscriptionApi,
        job_id: &str,
        summary: &mut PollSummary,
    ) -> Result<()> {
        let Some(record) = self
            .registry
            .load(job_id)
            .await
            .context("loading job record")?
        else {
            debug!(job_id, "Job record gone, treating job as resolved");
            return Ok(());
        };

        let report = api
            .job_status(job_id)
            .await
            .context("fetching job status")?;

        let applied = self.registry.applied_lessons(job_id).await.unwrap_or_else(|e| {
            warn!(job_id, error = %e, "Could not read applied lessons, re-applying completions");
            HashSet::new()
        });

        for lesson in &report.lessons {
            match lesson.status {
                LessonStatus::Completed => {
                    summary.lessons_completed += 1;
                    if applied.contains(&lesson.lesson_id) {
                        continue;
                    }
                    self.apply_completion(job_id, &lesson.lesson_id).await;
                }
                LessonStatus::Failed => {
                    summary.lessons_failed += 1;
                    warn!(
                        job_id,
                        lesson_id = %lesson.lesson_id,
                        tenant_id = %record.tenant_id,
                        "Lesson transcription failed: {}",
                        lesson.error_message.as_deref().unwrap_or("no error message")
                    );
                }
                LessonStatus::Pending | LessonStatus::Processing => {}
            }
        }

        match fold_statuses(report.lessons.iter().map(|lesson| lesson.status)) {
            JobProgress::Resolved => {
                self.registry
                    .forget(job_id)
                    .await
                    .context("deleting resolved job record")?;
                info!(job_id, tenant_id = %record.tenant_id, "✅ Transcription job resolved");
                summary.resolved += 1;
            }
            JobProgress::Active => {
                debug!(job_id, "Transcription job still in progress");
                summary.still_active += 1;
            }
        }

        Ok(())
    }

    async fn apply_completion(&self, job_id: &str, lesson_id: &str) {
        if let Err(e) = self
            .lessons
            .update_lesson_transcription_status(lesson_id, true)
            .await
        {
            error!(job_id, lesson_id, "Failed to mark lesson as transcribed: {:#}", e);
            return;
        }

        if let Err(e) = self.registry.mark_applied(job_id, lesson_id).await {
            warn!(job_id, lesson_id, error = %e, "Could not remember applied completion");
        }
    }
}

#[async_trait]
impl ScheduledJob for StatusPollerJob {
    fn name(&self) -> &'static str {
        "transcription_status_poll"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let summary = self.run(ctx).await?;
        if summary.checked > 0 {
            info!(
                checked = summary.checked,
                resolved = summary.resolved,
                still_active = summary.still_active,
                errored = summary.errored,
                "Transcription status poll finished"
            );
        }
        Ok(())
    }
}
