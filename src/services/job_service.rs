use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::job_dto::CreateJobPayload;
use crate::error::{Error, Result};
use crate::models::{JobPosting, NewJobPosting, ACTIVE_JOB_STATUS};
use crate::services::skill_service::{normalize_skill_names, SkillService};
use crate::store::RecruitingStore;

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn RecruitingStore>,
    skills: SkillService,
}

impl JobService {
    pub fn new(store: Arc<dyn RecruitingStore>) -> Self {
        let skills = SkillService::new(store.clone());
        Self { store, skills }
    }

    pub async fn list_jobs(&self, hr_id: Uuid) -> Result<Vec<JobPosting>> {
        let mut jobs = self.store.list_jobs_by_owner(hr_id).await?;
        jobs.sort_by(newest_created_first);
        Ok(jobs)
    }

    /// Inserts the posting and its skills as one unit: if the skills cannot
    /// be written the posting is deleted again.
    pub async fn create_job(&self, hr_id: Uuid, payload: CreateJobPayload) -> Result<JobPosting> {
        payload.validate()?;
        let skill_names = normalize_skill_names(&payload.skills)?;

        let job = self
            .store
            .insert_job(NewJobPosting {
                hr_id,
                title: payload.title.trim().to_string(),
                company_name: payload.company_name.trim().to_string(),
                description: payload.description,
                experience_required: payload.experience_required,
                status: ACTIVE_JOB_STATUS.to_string(),
            })
            .await?;

        if let Err(err) = self.skills.write_skills(job.id, &skill_names).await {
            warn!(job_id = %job.id, error = %err, "Skill write failed, rolling back job posting");
            return match self.store.delete_job(hr_id, job.id).await {
                Ok(()) => Err(err),
                Err(rollback) => Err(Error::PartialWrite(format!(
                    "Job posting {} was created without its skills ({}); rollback failed: {}",
                    job.id, err, rollback
                ))),
            };
        }

        info!(job_id = %job.id, hr_id = %hr_id, skills = skill_names.len(), "Job posting created");
        Ok(job)
    }

    pub async fn delete_job(&self, hr_id: Uuid, job_id: Uuid) -> Result<()> {
        self.store.delete_job(hr_id, job_id).await?;
        info!(job_id = %job_id, hr_id = %hr_id, "Job posting deleted");
        Ok(())
    }

    pub async fn fetch_job_skills(&self, job_id: Uuid) -> Result<Vec<String>> {
        self.skills.skill_names(job_id).await
    }
}

/// Newest `created_at` first with missing timestamps last. Used with a
/// stable sort so equal keys keep storage order.
fn newest_created_first(a: &JobPosting, b: &JobPosting) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
