use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

/// Sorted-set index of outstanding job IDs.
pub const JOB_INDEX_KEY: &str = "transcription:jobs:list";

/// TTL applied to job records and the index. Also bounds how long a job that
/// never resolves is tracked.
pub const JOB_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn job_record_key(job_id: &str) -> String {
    format!("transcription:job:{}", job_id)
}

/// Lessons whose completion has already been written back for a job.
pub fn applied_lessons_key(job_id: &str) -> String {
    format!("transcription:job:{}:applied", job_id)
}

/// Snapshot of one submission. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJobRecord {
    pub job_id: String,
    pub tenant_id: String,
    pub lesson_ids: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TranscriptionJobRecord {
    pub fn new(job_id: String, tenant_id: String, lesson_ids: Vec<String>) -> Self {
        Self {
            job_id,
            tenant_id,
            lesson_ids,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Index score: creation time in unix milliseconds.
    pub fn score(&self) -> i64 {
        (self.created_at.unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// Per-lesson status reported by the transcription service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    Processing,
    Completed,
    Failed,
    /// Unrecognized statuses land here so the job stays active.
    #[serde(other)]
    Pending,
}

impl LessonStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LessonStatus::Completed | LessonStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobProgress {
    /// At least one lesson is still pending or processing.
    Active,
    /// Every lesson reached a terminal status.
    Resolved,
}

/// Reduce the lesson statuses of a job to its progress.
///
/// A report without lessons is treated as active: the service has not
/// listed any work yet, so nothing can be considered done.
pub fn fold_statuses<I>(statuses: I) -> JobProgress
where
    I: IntoIterator<Item = LessonStatus>,
{
    let mut seen_any = false;
    for status in statuses {
        if !status.is_terminal() {
            return JobProgress::Active;
        }
        seen_any = true;
    }

    if seen_any {
        JobProgress::Resolved
    } else {
        JobProgress::Active
    }
}
