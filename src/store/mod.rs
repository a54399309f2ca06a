pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Application, ApplicationJoinRow, ApplicationStatus, JobPosting, NewJobPosting,
    NewRequiredSkill, RequiredSkill,
};

pub use memory::{MemoryStore, StoreOp};
pub use postgres::PgStore;

/// Storage seam for the five recruiting tables. Deleting a job posting
/// cascades to its skills, applications and their ATS results.
#[async_trait]
pub trait RecruitingStore: Send + Sync {
    async fn list_jobs_by_owner(&self, hr_id: Uuid) -> Result<Vec<JobPosting>>;

    async fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting>;

    /// Fails with a persistence error when no job with this id is owned by `hr_id`.
    async fn delete_job(&self, hr_id: Uuid, job_id: Uuid) -> Result<()>;

    /// Inserts all rows or none of them.
    async fn insert_skills(&self, skills: Vec<NewRequiredSkill>) -> Result<Vec<RequiredSkill>>;

    async fn list_skills(&self, job_id: Uuid) -> Result<Vec<RequiredSkill>>;

    async fn fetch_applications(&self, job_ids: &[Uuid]) -> Result<Vec<ApplicationJoinRow>>;

    async fn update_application_status(
        &self,
        hr_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application>;
}
