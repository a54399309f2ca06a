use serde::Serialize;
use uuid::Uuid;

use crate::models::{ApplicationStatus, EnrichedApplication, JobPosting};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub total_applicants: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobApplicantCounts {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl DashboardStats {
    pub fn compute(jobs: &[JobPosting], applications: &[EnrichedApplication]) -> Self {
        let counts = count(applications.iter());
        Self {
            total_jobs: jobs.len(),
            total_applicants: counts.total,
            accepted: counts.accepted,
            rejected: counts.rejected,
        }
    }
}

impl JobApplicantCounts {
    pub fn for_job(applications: &[EnrichedApplication], job_id: Uuid) -> Self {
        count(applications.iter().filter(|a| a.job_id == job_id))
    }
}

fn count<'a>(applications: impl Iterator<Item = &'a EnrichedApplication>) -> JobApplicantCounts {
    applications.fold(JobApplicantCounts::default(), |mut acc, app| {
        acc.total += 1;
        match app.status {
            ApplicationStatus::Accepted => acc.accepted += 1,
            ApplicationStatus::Rejected => acc.rejected += 1,
            ApplicationStatus::Applied | ApplicationStatus::Reviewing => {}
        }
        acc
    })
}
