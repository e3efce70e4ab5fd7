//! HTTP client for the external transcription service.

use super::dto::{ExtractAndEmbedRequest, JobStatusReport, SubmissionAccepted};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionApiError {
    #[error("transcription service returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("transcription service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("transcription service response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

#[async_trait]
pub trait TranscriptionApi: Send + Sync {
    /// Queue a batch of lessons. Only `202 Accepted` counts as success.
    async fn submit(
        &self,
        request: &ExtractAndEmbedRequest,
    ) -> Result<SubmissionAccepted, TranscriptionApiError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, TranscriptionApiError>;
}

pub struct TranscriptionClient {
    client: reqwest::Client,
    base_url: String,
}

impl TranscriptionClient {
    /// Create a client for the service at `base_url`
    /// (e.g. "http://transcriber:8000"). Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TranscriptionApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn expect_status(
        response: reqwest::Response,
        expected: StatusCode,
    ) -> Result<reqwest::Response, TranscriptionApiError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TranscriptionApiError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TranscriptionApi for TranscriptionClient {
    async fn submit(
        &self,
        request: &ExtractAndEmbedRequest,
    ) -> Result<SubmissionAccepted, TranscriptionApiError> {
        let url = format!("{}/api/v2/extract-and-embed", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let response = Self::expect_status(response, StatusCode::ACCEPTED).await?;

        response.json().await.map_err(TranscriptionApiError::Decode)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, TranscriptionApiError> {
        let url = format!("{}/api/jobs/{}/status", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;

        response.json().await.map_err(TranscriptionApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::transcription::dto::LessonPayload;
    use crate::modules::transcription::model::LessonStatus;
    use axum::extract::Path;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    async fn spawn_service(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request() -> ExtractAndEmbedRequest {
        ExtractAndEmbedRequest {
            lessons: vec![LessonPayload {
                id: "l1".into(),
                name: "Intro".into(),
                course_id: "c1".into(),
                module_id: None,
                description: None,
                video_url: Some("videos/l1.mp4".into()),
                pdf_url: None,
            }],
            tenant_id: "t1".into(),
        }
    }

    #[tokio::test]
    async fn submit_parses_accepted_response() {
        let router = Router::new().route(
            "/api/v2/extract-and-embed",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["tenantId"], "t1");
                (
                    HttpStatus::ACCEPTED,
                    Json(json!({
                        "jobId": "job-1",
                        "status": "queued",
                        "videoIds": ["l1"],
                        "queuedJobs": 1,
                        "traceId": "trace-abc"
                    })),
                )
            }),
        );
        let base_url = spawn_service(router).await;
        let client = TranscriptionClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let accepted = client.submit(&request()).await.unwrap();

        assert_eq!(accepted.job_id, "job-1");
        assert_eq!(accepted.queued_jobs, 1);
        assert_eq!(accepted.trace_id.as_deref(), Some("trace-abc"));
    }

    #[tokio::test]
    async fn submit_treats_ok_as_unexpected() {
        let router = Router::new().route(
            "/api/v2/extract-and-embed",
            post(|| async { (HttpStatus::OK, Json(json!({ "jobId": "job-1" }))) }),
        );
        let base_url = spawn_service(router).await;
        let client = TranscriptionClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let err = client.submit(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            TranscriptionApiError::UnexpectedStatus { status: 200, .. }
        ));
    }

    #[tokio::test]
    async fn submit_error_carries_status_and_body() {
        let router = Router::new().route(
            "/api/v2/extract-and-embed",
            post(|| async { (HttpStatus::INTERNAL_SERVER_ERROR, "queue unavailable") }),
        );
        let base_url = spawn_service(router).await;
        let client = TranscriptionClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let err = client.submit(&request()).await.unwrap_err();

        match err {
            TranscriptionApiError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "queue unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn job_status_reads_lesson_statuses() {
        let router = Router::new().route(
            "/api/jobs/{job_id}/status",
            get(|Path(job_id): Path<String>| async move {
                Json(json!({
                    "jobId": job_id,
                    "status": "processing",
                    "progress": 0.5,
                    "completed": 1,
                    "failed": 0,
                    "total": 2,
                    "startedAt": "2026-01-01T00:00:00Z",
                    "completedAt": null,
                    "lessons": [
                        {"id": "x1", "lessonId": "l1", "lessonName": "Intro", "status": "COMPLETED",
                         "chunksCreated": 4, "processingTimeMs": 1200, "errorMessage": null},
                        {"id": "x2", "lessonId": "l2", "lessonName": "Setup", "status": "PROCESSING",
                         "chunksCreated": 0, "processingTimeMs": null, "errorMessage": null}
                    ]
                }))
            }),
        );
        let base_url = spawn_service(router).await;
        let client = TranscriptionClient::new(&format!("{}/", base_url), Duration::from_secs(5))
            .unwrap();

        let report = client.job_status("job-7").await.unwrap();

        assert_eq!(report.job_id, "job-7");
        assert_eq!(report.total, 2);
        let statuses: Vec<_> = report.lessons.iter().map(|l| l.status).collect();
        assert_eq!(
            statuses,
            vec![LessonStatus::Completed, LessonStatus::Processing]
        );
    }

    #[tokio::test]
    async fn unknown_job_is_an_unexpected_status() {
        let base_url = spawn_service(Router::new()).await;
        let client = TranscriptionClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let err = client.job_status("missing").await.unwrap_err();

        assert!(matches!(
            err,
            TranscriptionApiError::UnexpectedStatus { status: 404, .. }
        ));
    }
}
