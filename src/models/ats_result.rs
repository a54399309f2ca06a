use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AtsResult {
    pub id: Uuid,
    pub application_id: Uuid,
    pub score: Option<i32>,
    pub feedback: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
}
