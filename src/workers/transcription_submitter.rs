//! Submits unprocessed lessons of every AI-enabled tenant to the
//! transcription service, one batch per tenant.

use super::job::{JobContext, JobError, ScheduledJob};
use crate::modules::lesson::model::Tenant;
use crate::modules::lesson::repository::{LessonRepository, TenantRepository};
use crate::modules::transcription::client::TranscriptionApi;
use crate::modules::transcription::dto::{ExtractAndEmbedRequest, LessonPayload};
use crate::modules::transcription::model::TranscriptionJobRecord;
use crate::modules::transcription::registry::JobRegistry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub tenants: usize,
    pub submitted: usize,
    pub skipped_pending: usize,
    pub skipped_empty: usize,
    pub failed: usize,
}

enum TenantOutcome {
    Submitted { job_id: String, lessons: usize },
    PendingJob,
    NoLessons,
}

pub struct SubmissionJob {
    api: Option<Arc<dyn TranscriptionApi>>,
    registry: JobRegistry,
    tenants: Arc<dyn TenantRepository>,
    lessons: Arc<dyn LessonRepository>,
    interval: Duration,
}

impl SubmissionJob {
    /// `api` is `None` when no service URL is configured; the job then does nothing.
    pub fn new(
        api: Option<Arc<dyn TranscriptionApi>>,
        registry: JobRegistry,
        tenants: Arc<dyn TenantRepository>,
        lessons: Arc<dyn LessonRepository>,
        interval: Duration,
    ) -> Self {
        if api.is_none() {
            warn!("Transcription service URL not configured, transcription submission is disabled");
        }

        Self {
            api,
            registry,
            tenants,
            lessons,
            interval,
        }
    }

    pub async fn run(&self, ctx: &JobContext) -> Result<SubmissionSummary, JobError> {
        let Some(api) = self.api.as_deref() else {
            info!("Transcription service not configured, skipping submission run");
            return Ok(SubmissionSummary::default());
        };

        let tenants = self
            .tenants
            .list_tenants_with_feature_enabled()
            .await
            .map_err(JobError::Listing)?;

        info!("🎙️ Checking {} tenant(s) for lessons to transcribe", tenants.total);

        let mut summary = SubmissionSummary {
            tenants: tenants.tenants.len(),
            ..SubmissionSummary::default()
        };

        for tenant in &tenants.tenants {
            ctx.checkpoint()?;

            match self.submit_for_tenant(api, tenant).await {
                Ok(TenantOutcome::Submitted { job_id, lessons }) => {
                    info!(tenant_id = %tenant.id, job_id = %job_id, "✅ Submitted {} lesson(s) for transcription", lessons);
                    summary.submitted += 1;
                }
                Ok(TenantOutcome::PendingJob) => {
                    info!(tenant_id = %tenant.id, "Tenant already has a pending transcription job, skipping");
                    summary.skipped_pending += 1;
                }
                Ok(TenantOutcome::NoLessons) => {
                    info!(tenant_id = %tenant.id, "No unprocessed lessons, skipping");
                    summary.skipped_empty += 1;
                }
                Err(e) => {
                    error!(tenant_id = %tenant.id, "❌ Transcription submission failed: {:#}", e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn submit_for_tenant(
        &self,
        api: &dyn TranscriptionApi,
        tenant: &Tenant,
    ) -> Result<TenantOutcome> {
        if self.registry.has_pending_job_for_tenant(&tenant.id).await {
            return Ok(TenantOutcome::PendingJob);
        }

        let lessons = self
            .lessons
            .list_unprocessed_lessons(&tenant.id)
            .await
            .context("listing unprocessed lessons")?;

        if lessons.lessons.is_empty() {
            return Ok(TenantOutcome::NoLessons);
        }

        let request = ExtractAndEmbedRequest {
            lessons: lessons.lessons.iter().map(LessonPayload::from).collect(),
            tenant_id: tenant.id.clone(),
        };

        let accepted = api
            .submit(&request)
            .await
            .context("submitting lessons to transcription service")?;

        let record =
            TranscriptionJobRecord::new(accepted.job_id.clone(), tenant.id.clone(), request.lesson_ids());

        self.registry
            .record(&record)
            .await
            .with_context(|| format!("recording accepted job {}", accepted.job_id))?;

        Ok(TenantOutcome::Submitted {
            job_id: accepted.job_id,
            lessons: record.lesson_ids.len(),
        })
    }
}

#[async_trait]
impl ScheduledJob for SubmissionJob {
    fn name(&self) -> &'static str {
        "transcription_submission"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let summary = self.run(ctx).await?;
        info!(
            submitted = summary.submitted,
            skipped_pending = summary.skipped_pending,
            skipped_empty = summary.skipped_empty,
            failed = summary.failed,
            "Transcription submission run finished"
        );
        Ok(())
    }
}
