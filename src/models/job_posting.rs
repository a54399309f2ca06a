use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ACTIVE_JOB_STATUS: &str = "active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub hr_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub experience_required: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobPosting {
    pub hr_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub experience_required: Option<String>,
    pub status: String,
}
