use super::model::{Lesson, LessonList, Tenant, TenantList};
use crate::infrastructure::db::pool::DbPool;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;

/// Lessons still waiting for a transcription. Only lessons with a video are eligible.
const UNPROCESSED_LESSONS_SQL: &str = r#"
    SELECT l.id::text AS id,
           c.tenant_id::text AS tenant_id,
           c.id::text AS course_id,
           l.module_id::text AS module_id,
           l.name,
           l.description,
           l.video_url,
           l.pdf_url,
           l.transcription_completed
    FROM lessons l
    JOIN courses c ON c.id = l.course_id
    WHERE c.tenant_id = $1::uuid
      AND l.transcription_completed = false
      AND l.video_url IS NOT NULL
    ORDER BY l.created_at
    "#;

#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Tenants with the AI/transcription feature switched on.
    async fn list_tenants_with_feature_enabled(&self) -> Result<TenantList>;
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Lessons of a tenant whose transcription has not completed yet.
    async fn list_unprocessed_lessons(&self, tenant_id: &str) -> Result<LessonList>;

    async fn update_lesson_transcription_status(&self, lesson_id: &str, completed: bool)
    -> Result<()>;
}

pub struct PgTenantRepository {
    pool: DbPool,
}

impl PgTenantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn list_tenants_with_feature_enabled(&self) -> Result<TenantList> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id::text AS id, name
            FROM tenants
            WHERE ai_enabled = true
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list tenants with AI enabled")?;

        Ok(TenantList::from(tenants))
    }
}

pub struct PgLessonRepository {
    pool: DbPool,
}

impl PgLessonRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for PgLessonRepository {
    async fn list_unprocessed_lessons(&self, tenant_id: &str) -> Result<LessonList> {
        let lessons = sqlx::query_as::<_, Lesson>(UNPROCESSED_LESSONS_SQL)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to list unprocessed lessons for tenant {}", tenant_id))?;

        Ok(LessonList::from(lessons))
    }

    async fn update_lesson_transcription_status(
        &self,
        lesson_id: &str,
        completed: bool,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE lessons SET transcription_completed = $1, updated_at = NOW() WHERE id = $2::uuid",
        )
        .bind(completed)
        .bind(lesson_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update transcription status of lesson {}", lesson_id))?;

        if result.rows_affected() == 0 {
            bail!("lesson {} not found", lesson_id);
        }

        Ok(())
    }
}
