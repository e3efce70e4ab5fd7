use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Tenant {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub tenant_id: String,
    pub course_id: String,
    pub module_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub transcription_completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TenantList {
    pub tenants: Vec<Tenant>,
    pub total: usize,
}

impl From<Vec<Tenant>> for TenantList {
    fn from(tenants: Vec<Tenant>) -> Self {
        Self {
            total: tenants.len(),
            tenants,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LessonList {
    pub lessons: Vec<Lesson>,
    pub total: usize,
}

impl From<Vec<Lesson>> for LessonList {
    fn from(lessons: Vec<Lesson>) -> Self {
        Self {
            total: lessons.len(),
            lessons,
        }
    }
}
