use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `priority_level` 1 is the most important skill: the first one the
/// recruiter entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RequiredSkill {
    pub id: Uuid,
    pub job_id: Uuid,
    pub skill_name: String,
    pub priority_level: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequiredSkill {
    pub job_id: Uuid,
    pub skill_name: String,
    pub priority_level: i32,
}
