use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::newest_applied_first;
use crate::models::{Application, ApplicationStatus, EnrichedApplication, JobPosting};
use crate::store::RecruitingStore;

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn RecruitingStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn RecruitingStore>) -> Self {
        Self { store }
    }

    /// Applications received for `jobs`, joined with candidate name, job
    /// title and ATS score, newest first.
    pub async fn list_for_jobs(&self, jobs: &[JobPosting]) -> Result<Vec<EnrichedApplication>> {
        if jobs.is_empty() {
            debug!("No job postings, skipping application lookup");
            return Ok(Vec::new());
        }

        let job_ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
        let rows = self.store.fetch_applications(&job_ids).await?;

        let mut applications: Vec<EnrichedApplication> =
            rows.into_iter().map(EnrichedApplication::from).collect();
        applications.sort_by(newest_applied_first);
        Ok(applications)
    }

    pub async fn update_status(
        &self,
        hr_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let updated = self
            .store
            .update_application_status(hr_id, application_id, status)
            .await?;
        info!(application_id = %application_id, status = %status, "Application status updated");
        Ok(updated)
    }
}
