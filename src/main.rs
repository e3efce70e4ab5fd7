use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transcription_jobs::app;
use transcription_jobs::config::settings::{AppConfig, TranscriptionSettings};
use transcription_jobs::infrastructure::cache::Cache;
use transcription_jobs::infrastructure::db::pool::connect_to_db;
use transcription_jobs::infrastructure::redis::client::RedisService;
use transcription_jobs::modules::lesson::repository::{PgLessonRepository, PgTenantRepository};
use transcription_jobs::modules::transcription::client::{TranscriptionApi, TranscriptionClient};
use transcription_jobs::modules::transcription::registry::JobRegistry;
use transcription_jobs::state::AppState;
use transcription_jobs::workers::scheduler::JobScheduler;
use transcription_jobs::workers::transcription_poller::StatusPollerJob;
use transcription_jobs::workers::transcription_submitter::SubmissionJob;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting transcription job service...");

    let config = AppConfig::new()?;

    let db = connect_to_db(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    let redis = RedisService::new(&config.redis_url)
        .await
        .context("failed to connect to Redis")?;

    let cache: Arc<dyn Cache> = Arc::new(redis);
    let registry = JobRegistry::new(cache);
    let api = transcription_api(&config.transcription)?;

    let lessons = Arc::new(PgLessonRepository::new(db.clone()));
    let tenants = Arc::new(PgTenantRepository::new(db));

    let submission_job = Arc::new(SubmissionJob::new(
        api.clone(),
        registry.clone(),
        tenants,
        lessons.clone(),
        config.transcription.submit_interval,
    ));
    let poller_job = Arc::new(StatusPollerJob::new(
        api,
        registry.clone(),
        lessons,
        config.transcription.poll_interval,
    ));

    let shutdown_token = CancellationToken::new();
    let mut scheduler = JobScheduler::new(shutdown_token.clone());
    scheduler.register_job(submission_job.clone());
    scheduler.register_job(poller_job.clone());
    let scheduler_handle = tokio::spawn(scheduler.run());

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(
        config,
        registry,
        submission_job,
        poller_job,
        shutdown_token.clone(),
    );
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    shutdown_token.cancel();
    scheduler_handle.await?;
    info!("Shutdown complete");

    Ok(())
}

fn transcription_api(
    settings: &TranscriptionSettings,
) -> anyhow::Result<Option<Arc<dyn TranscriptionApi>>> {
    let Some(base_url) = settings.base_url.as_deref() else {
        return Ok(None);
    };

    let client = TranscriptionClient::new(base_url, settings.http_timeout)
        .context("failed to build transcription HTTP client")?;
    info!("Transcription service at {}", client.base_url());

    let api: Arc<dyn TranscriptionApi> = Arc::new(client);
    Ok(Some(api))
}

async fn shutdown_signal(shutdown_token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
        _ = shutdown_token.cancelled() => {}
    }
    shutdown_token.cancel();
}
