//! In-memory collaborators for driving the transcription jobs end to end.

#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use transcription_jobs::infrastructure::cache::{Cache, CacheError, InMemoryCache};
use transcription_jobs::modules::lesson::model::{Lesson, LessonList, Tenant, TenantList};
use transcription_jobs::modules::lesson::repository::{LessonRepository, TenantRepository};
use transcription_jobs::modules::transcription::client::{TranscriptionApi, TranscriptionClient};
use transcription_jobs::modules::transcription::dto::{
    ExtractAndEmbedRequest, JobStatusReport, LessonStatusReport, SubmissionAccepted,
};
use transcription_jobs::modules::transcription::model::LessonStatus;
use transcription_jobs::modules::transcription::registry::JobRegistry;
use transcription_jobs::workers::transcription_poller::StatusPollerJob;
use transcription_jobs::workers::transcription_submitter::SubmissionJob;

pub const INTERVAL: Duration = Duration::from_secs(60);

pub fn tenant(id: &str) -> Tenant {
    Tenant {
        id: id.to_string(),
        name: format!("Tenant {}", id),
    }
}

pub fn lesson(tenant_id: &str, id: &str) -> Lesson {
    Lesson {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        course_id: format!("course-{}", tenant_id),
        module_id: None,
        name: format!("Lesson {}", id),
        description: None,
        video_url: Some(format!("videos/{}.mp4", id)),
        pdf_url: None,
        transcription_completed: false,
    }
}

// --- Tenants ---

#[derive(Default)]
pub struct FakeTenants {
    tenants: Vec<Tenant>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeTenants {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self {
            tenants,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TenantRepository for FakeTenants {
    async fn list_tenants_with_feature_enabled(&self) -> Result<TenantList> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("tenants table unavailable");
        }
        Ok(TenantList::from(self.tenants.clone()))
    }
}

// --- Lessons ---

#[derive(Default)]
pub struct FakeLessons {
    lessons: Mutex<Vec<Lesson>>,
    failing_updates: HashSet<String>,
    pub updates: Mutex<Vec<(String, bool)>>,
    pub list_calls: AtomicUsize,
}

impl FakeLessons {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self {
            lessons: Mutex::new(lessons),
            ..Self::default()
        }
    }

    pub fn with_failing_update(mut self, lesson_id: &str) -> Self {
        self.failing_updates.insert(lesson_id.to_string());
        self
    }

    pub async fn updated_lessons(&self) -> Vec<String> {
        self.updates
            .lock()
            .await
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl LessonRepository for FakeLessons {
    async fn list_unprocessed_lessons(&self, tenant_id: &str) -> Result<LessonList> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let lessons = self
            .lessons
            .lock()
            .await
            .iter()
            .filter(|l| l.tenant_id == tenant_id && !l.transcription_completed)
            .cloned()
            .collect::<Vec<_>>();
        Ok(LessonList::from(lessons))
    }

    async fn update_lesson_transcription_status(
        &self,
        lesson_id: &str,
        completed: bool,
    ) -> Result<()> {
        self.updates
            .lock()
            .await
            .push((lesson_id.to_string(), completed));

        if self.failing_updates.contains(lesson_id) {
            return Err(anyhow!("lesson {} is locked", lesson_id));
        }

        let mut lessons = self.lessons.lock().await;
        match lessons.iter_mut().find(|l| l.id == lesson_id) {
            Some(lesson) => {
                lesson.transcription_completed = completed;
                Ok(())
            }
            None => bail!("lesson {} not found", lesson_id),
        }
    }
}

// --- Transcription service ---

/// State behind the fake transcription service. `spawn` serves it over HTTP
/// so the jobs talk to it through the real `TranscriptionClient`.
#[derive(Default)]
pub struct FakeTranscriptionService {
    failing_tenants: HashSet<String>,
    next_job: AtomicUsize,
    statuses: Mutex<HashMap<String, Vec<(String, LessonStatus)>>>,
    status_errors: Mutex<HashSet<String>>,
    pub submissions: Mutex<Vec<ExtractAndEmbedRequest>>,
    pub status_calls: AtomicUsize,
}

impl FakeTranscriptionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions for this tenant are answered with HTTP 500.
    pub fn rejecting(mut self, tenant_id: &str) -> Self {
        self.failing_tenants.insert(tenant_id.to_string());
        self
    }

    pub async fn set_statuses(&self, job_id: &str, statuses: &[(&str, LessonStatus)]) {
        self.statuses.lock().await.insert(
            job_id.to_string(),
            statuses
                .iter()
                .map(|(lesson, status)| (lesson.to_string(), *status))
                .collect(),
        );
    }

    pub async fn fail_status_for(&self, job_id: &str) {
        self.status_errors.lock().await.insert(job_id.to_string());
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.lock().await.len()
    }

    /// Serve on `127.0.0.1:0` and return a client pointed at it.
    pub async fn spawn(self) -> (Arc<Self>, Arc<dyn TranscriptionApi>) {
        let service = Arc::new(self);
        let router = Router::new()
            .route("/api/v2/extract-and-embed", post(extract_and_embed))
            .route("/api/jobs/{job_id}/status", get(job_status))
            .with_state(service.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client =
            TranscriptionClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let api: Arc<dyn TranscriptionApi> = Arc::new(client);
        (service, api)
    }
}

async fn extract_and_embed(
    State(service): State<Arc<FakeTranscriptionService>>,
    Json(request): Json<ExtractAndEmbedRequest>,
) -> Response {
    if service.failing_tenants.contains(&request.tenant_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
    }

    let n = service.next_job.fetch_add(1, Ordering::SeqCst) + 1;
    let accepted = SubmissionAccepted {
        job_id: format!("job-{}", n),
        status: "queued".to_string(),
        video_ids: request.lesson_ids(),
        queued_jobs: request.lessons.len() as u64,
        trace_id: None,
    };
    service.submissions.lock().await.push(request);

    (StatusCode::ACCEPTED, Json(accepted)).into_response()
}

async fn job_status(
    State(service): State<Arc<FakeTranscriptionService>>,
    Path(job_id): Path<String>,
) -> Response {
    service.status_calls.fetch_add(1, Ordering::SeqCst);

    if service.status_errors.lock().await.contains(&job_id) {
        return (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response();
    }

    let statuses = service
        .statuses
        .lock()
        .await
        .get(&job_id)
        .cloned()
        .unwrap_or_default();

    let report = JobStatusReport {
        job_id,
        status: "processing".to_string(),
        progress: 0.0,
        completed: 0,
        failed: 0,
        total: statuses.len() as u64,
        started_at: None,
        completed_at: None,
        lessons: statuses
            .into_iter()
            .map(|(lesson_id, status)| LessonStatusReport {
                id: None,
                lesson_id,
                lesson_name: None,
                status,
                chunks_created: None,
                processing_time_ms: None,
                error_message: (status == LessonStatus::Failed)
                    .then(|| "no audio track".to_string()),
            })
            .collect(),
    };

    Json(report).into_response()
}

// --- Cache ---

/// Wraps a cache and counts every call made through it.
pub struct CountingCache {
    inner: InMemoryCache,
    pub calls: AtomicUsize,
}

impl CountingCache {
    pub fn new() -> Self {
        Self {
            inner: InMemoryCache::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Cache for CountingCache {
    async fn get(&self, key: &str) -> Result<String, CacheError> {
        self.tick();
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.tick();
        self.inner.set(key, value, ttl).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.tick();
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.tick();
        self.inner.delete(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        self.tick();
        self.inner.expire(key, ttl).await
    }

    async fn index_add(
        &self,
        key: &str,
        member: &str,
        score: i64,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.tick();
        self.inner.index_add(key, member, score, ttl).await
    }

    async fn index_remove(&self, key: &str, members: &[String]) -> Result<(), CacheError> {
        self.tick();
        self.inner.index_remove(key, members).await
    }

    async fn index_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        self.tick();
        self.inner.index_members(key).await
    }
}

// --- Wiring ---

pub struct Harness {
    pub cache: Arc<InMemoryCache>,
    pub registry: JobRegistry,
    pub tenants: Arc<FakeTenants>,
    pub lessons: Arc<FakeLessons>,
    pub service: Arc<FakeTranscriptionService>,
    pub submission: SubmissionJob,
    pub poller: StatusPollerJob,
}

impl Harness {
    pub async fn new(
        tenants: FakeTenants,
        lessons: FakeLessons,
        service: FakeTranscriptionService,
    ) -> Self {
        let cache = Arc::new(InMemoryCache::new());
        let registry = JobRegistry::new(cache.clone());
        let tenants = Arc::new(tenants);
        let lessons = Arc::new(lessons);
        let (service, api) = service.spawn().await;

        let submission = SubmissionJob::new(
            Some(api.clone()),
            registry.clone(),
            tenants.clone(),
            lessons.clone(),
            INTERVAL,
        );
        let poller = StatusPollerJob::new(Some(api), registry.clone(), lessons.clone(), INTERVAL);

        Self {
            cache,
            registry,
            tenants,
            lessons,
            service,
            submission,
            poller,
        }
    }
}
