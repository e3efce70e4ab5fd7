use super::model::{LessonStatus, TranscriptionJobRecord};
use crate::config::settings::TranscriptionSettings;
use crate::modules::lesson::model::Lesson;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use utoipa::ToSchema;

// --- Transcription service wire contract ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonPayload {
    pub id: String,
    pub name: String,
    pub course_id: String,
    pub module_id: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
}

impl From<&Lesson> for LessonPayload {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id.clone(),
            name: lesson.name.clone(),
            course_id: lesson.course_id.clone(),
            module_id: lesson.module_id.clone(),
            description: lesson.description.clone(),
            video_url: lesson.video_url.clone(),
            pdf_url: lesson.pdf_url.clone(),
        }
    }
}

/// Body of `POST /api/v2/extract-and-embed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractAndEmbedRequest {
    pub lessons: Vec<LessonPayload>,
    pub tenant_id: String,
}

impl ExtractAndEmbedRequest {
    pub fn lesson_ids(&self) -> Vec<String> {
        self.lessons.iter().map(|lesson| lesson.id.clone()).collect()
    }
}

/// 202 response of the submission endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAccepted {
    pub job_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub video_ids: Vec<String>,
    #[serde(default)]
    pub queued_jobs: u64,
    #[serde(default)]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStatusReport {
    #[serde(default)]
    pub id: Option<String>,
    pub lesson_id: String,
    #[serde(default)]
    pub lesson_name: Option<String>,
    pub status: LessonStatus,
    #[serde(default)]
    pub chunks_created: Option<u64>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// 200 response of `GET /api/jobs/{jobId}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub job_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonStatusReport>,
}

// --- Ops API ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJobResponse {
    pub job_id: String,
    pub tenant_id: String,
    pub lesson_ids: Vec<String>,
    pub created_at: String,
}

impl From<TranscriptionJobRecord> for TranscriptionJobResponse {
    fn from(record: TranscriptionJobRecord) -> Self {
        Self {
            created_at: record
                .created_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| record.created_at.to_string()),
            job_id: record.job_id,
            tenant_id: record.tenant_id,
            lesson_ids: record.lesson_ids,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionSettingsResponse {
    pub service_configured: bool,
    pub service_url: Option<String>,
    pub submit_interval_secs: u64,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
}

impl From<&TranscriptionSettings> for TranscriptionSettingsResponse {
    fn from(settings: &TranscriptionSettings) -> Self {
        Self {
            service_configured: settings.base_url.is_some(),
            service_url: settings.base_url.clone(),
            submit_interval_secs: settings.submit_interval.as_secs(),
            poll_interval_secs: settings.poll_interval.as_secs(),
            http_timeout_secs: settings.http_timeout.as_secs(),
        }
    }
}
