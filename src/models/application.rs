use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Reviewing => "Reviewing",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Stored statuses are nullable; a missing value means the default.
    pub fn from_stored(value: Option<&str>) -> Result<Self, Error> {
        match value {
            Some(raw) => raw.parse(),
            None => Ok(ApplicationStatus::default()),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim().to_ascii_lowercase().as_str() {
            "applied" => ApplicationStatus::Applied,
            "reviewing" => ApplicationStatus::Reviewing,
            "accepted" => ApplicationStatus::Accepted,
            "rejected" => ApplicationStatus::Rejected,
            _ => {
                return Err(Error::validation(format!(
                    "Unknown application status: {}",
                    s
                )))
            }
        };
        Ok(status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: Option<String>,
    pub applied_date: Option<DateTime<Utc>>,
}

/// Result of the outer join between an application and its candidate
/// profile, job posting and ATS result. Missing sides stay `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationJoinRow {
    pub application: Application,
    pub candidate_name: Option<String>,
    pub job_title: Option<String>,
    pub ats_score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedApplication {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: Option<String>,
    pub applied_date: Option<DateTime<Utc>>,
    pub candidate_name: String,
    pub job_title: String,
    pub ats_score: Option<i32>,
}

impl From<ApplicationJoinRow> for EnrichedApplication {
    fn from(row: ApplicationJoinRow) -> Self {
        let ApplicationJoinRow {
            application,
            candidate_name,
            job_title,
            ats_score,
        } = row;

        Self {
            id: application.id,
            candidate_id: application.candidate_id,
            job_id: application.job_id,
            status: application.status,
            resume_url: application.resume_url,
            applied_date: application.applied_date,
            candidate_name: candidate_name.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            job_title: job_title.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            ats_score,
        }
    }
}

/// Newest `applied_date` first, missing dates last, then by id.
pub fn newest_applied_first(a: &EnrichedApplication, b: &EnrichedApplication) -> Ordering {
    match (a.applied_date, b.applied_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}
