use super::model::{
    JOB_INDEX_KEY, JOB_TTL, TranscriptionJobRecord, applied_lessons_key, job_record_key,
};
use crate::infrastructure::cache::{Cache, CacheError};
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Cache-resident registry of outstanding transcription jobs.
///
/// Layout:
/// - `transcription:jobs:list`: sorted set of job IDs scored by creation time
/// - `transcription:job:{jobId}`: JSON `TranscriptionJobRecord`
/// - `transcription:job:{jobId}:applied`: lessons already marked completed
///
/// Everything expires after 24h. The index is only ever changed by adding or
/// removing single members, so concurrent submitters and pollers do not
/// overwrite each other's updates.
#[derive(Clone)]
pub struct JobRegistry {
    cache: Arc<dyn Cache>,
}

impl JobRegistry {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Outstanding job IDs, oldest first.
    pub async fn job_ids(&self) -> Result<Vec<String>, CacheError> {
        self.cache.index_members(JOB_INDEX_KEY).await
    }

    pub async fn load(&self, job_id: &str) -> Result<Option<TranscriptionJobRecord>, CacheError> {
        match self.cache.get(&job_record_key(job_id)).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(CacheError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persist a new record and add it to the index.
    ///
    /// The two writes are not transactional: if the second one fails the
    /// record is orphaned until its TTL expires.
    pub async fn record(&self, record: &TranscriptionJobRecord) -> Result<(), CacheError> {
        let raw = serde_json::to_string(record)?;
        self.cache
            .set(&job_record_key(&record.job_id), &raw, JOB_TTL)
            .await?;
        self.cache
            .index_add(JOB_INDEX_KEY, &record.job_id, record.score(), JOB_TTL)
            .await
    }

    pub async fn record_exists(&self, job_id: &str) -> Result<bool, CacheError> {
        self.cache.exists(&job_record_key(job_id)).await
    }

    /// Delete the record of a resolved job. The index is pruned separately.
    pub async fn forget(&self, job_id: &str) -> Result<(), CacheError> {
        self.cache.delete(&job_record_key(job_id)).await?;
        self.cache.delete(&applied_lessons_key(job_id)).await
    }

    /// Drop resolved job IDs from the index and refresh its TTL.
    ///
    /// The backend removes the key itself once its last member is gone, so
    /// a job added concurrently by a submitter is never deleted here.
    pub async fn prune(&self, resolved: &[String]) -> Result<(), CacheError> {
        if resolved.is_empty() {
            return Ok(());
        }

        self.cache.index_remove(JOB_INDEX_KEY, resolved).await?;
        self.cache.expire(JOB_INDEX_KEY, JOB_TTL).await
    }

    /// Whether the tenant already has a job in flight.
    ///
    /// Fails open: when the registry cannot be read the answer is `false`,
    /// so a cache outage never blocks submissions.
    pub async fn has_pending_job_for_tenant(&self, tenant_id: &str) -> bool {
        let job_ids = match self.job_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(tenant_id, error = %e, "could not read job index, assuming no pending job");
                return false;
            }
        };

        for job_id in job_ids {
            match self.load(&job_id).await {
                Ok(Some(record)) if record.tenant_id == tenant_id => {
                    debug!(tenant_id, job_id = %job_id, "found pending transcription job");
                    return true;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(tenant_id, job_id = %job_id, error = %e, "could not read job record");
                }
            }
        }

        false
    }

    /// Lessons of a job whose completion has already been applied.
    pub async fn applied_lessons(&self, job_id: &str) -> Result<HashSet<String>, CacheError> {
        let members = self.cache.index_members(&applied_lessons_key(job_id)).await?;
        Ok(members.into_iter().collect())
    }

    pub async fn mark_applied(&self, job_id: &str, lesson_id: &str) -> Result<(), CacheError> {
        let score = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        self.cache
            .index_add(&applied_lessons_key(job_id), lesson_id, score, JOB_TTL)
            .await
    }

    /// Every live record referenced by the index. Dangling IDs are skipped.
    pub async fn list_records(&self) -> Result<Vec<TranscriptionJobRecord>, CacheError> {
        let mut records = Vec::new();
        for job_id in self.job_ids().await? {
            if let Some(record) = self.load(&job_id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
