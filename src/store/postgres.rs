use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::RecruitingStore;
use crate::error::{Error, Result};
use crate::models::{
    Application, ApplicationJoinRow, ApplicationStatus, JobPosting, NewJobPosting,
    NewRequiredSkill, RequiredSkill,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    candidate_id: Uuid,
    job_id: Uuid,
    status: Option<String>,
    resume_url: Option<String>,
    applied_date: Option<DateTime<Utc>>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        let status = ApplicationStatus::from_stored(row.status.as_deref())
            .map_err(|e| Error::persistence(format!("Corrupt application {}: {}", row.id, e)))?;
        Ok(Application {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            status,
            resume_url: row.resume_url,
            applied_date: row.applied_date,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationJoinRecord {
    #[sqlx(flatten)]
    application: ApplicationRow,
    candidate_name: Option<String>,
    job_title: Option<String>,
    ats_score: Option<i32>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecruitingStore for PgStore {
    async fn list_jobs_by_owner(&self, hr_id: Uuid) -> Result<Vec<JobPosting>> {
        let jobs = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT id, hr_id, title, company_name, description, experience_required, status, created_at
            FROM job_postings
            WHERE hr_id = $1
            ORDER BY created_at DESC NULLS LAST, seq ASC
            "#,
        )
        .bind(hr_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    async fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting> {
        // Owner must be an existing HR profile; otherwise nothing is inserted.
        let created = sqlx::query_as::<_, JobPosting>(
            r#"
            INSERT INTO job_postings (hr_id, title, company_name, description, experience_required, status)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE EXISTS (SELECT 1 FROM profiles WHERE id = $1 AND role = 'HR')
            RETURNING id, hr_id, title, company_name, description, experience_required, status, created_at
            "#,
        )
        .bind(job.hr_id)
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.description)
        .bind(&job.experience_required)
        .bind(&job.status)
        .fetch_optional(&self.pool)
        .await?;

        created.ok_or_else(|| {
            Error::persistence(format!("Profile {} is not an HR profile", job.hr_id))
        })
    }

    async fn delete_job(&self, hr_id: Uuid, job_id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM job_postings WHERE id = $1 AND hr_id = $2")
            .bind(job_id)
            .bind(hr_id)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(Error::persistence(format!("Job posting {} not found", job_id)));
        }
        Ok(())
    }

    async fn insert_skills(&self, skills: Vec<NewRequiredSkill>) -> Result<Vec<RequiredSkill>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(skills.len());
        for skill in skills {
            let row = sqlx::query_as::<_, RequiredSkill>(
                r#"
                INSERT INTO required_skills (job_id, skill_name, priority_level)
                VALUES ($1, $2, $3)
                RETURNING id, job_id, skill_name, priority_level, created_at
                "#,
            )
            .bind(skill.job_id)
            .bind(&skill.skill_name)
            .bind(skill.priority_level)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }
        tx.commit().await?;

        Ok(inserted)
    }

    async fn list_skills(&self, job_id: Uuid) -> Result<Vec<RequiredSkill>> {
        let skills = sqlx::query_as::<_, RequiredSkill>(
            r#"
            SELECT id, job_id, skill_name, priority_level, created_at
            FROM required_skills
            WHERE job_id = $1
            ORDER BY priority_level ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(skills)
    }

    async fn fetch_applications(&self, job_ids: &[Uuid]) -> Result<Vec<ApplicationJoinRow>> {
        let records = sqlx::query_as::<_, ApplicationJoinRecord>(
            r#"
            SELECT
                a.id,
                a.candidate_id,
                a.job_id,
                a.status,
                a.resume_url,
                a.applied_date,
                p.name AS candidate_name,
                j.title AS job_title,
                r.score AS ats_score
            FROM applications a
            LEFT JOIN profiles p ON p.id = a.candidate_id
            LEFT JOIN job_postings j ON j.id = a.job_id
            LEFT JOIN ats_results r ON r.application_id = a.id
            WHERE a.job_id = ANY($1)
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(|record| -> Result<ApplicationJoinRow> {
                Ok(ApplicationJoinRow {
                    application: record.application.try_into()?,
                    candidate_name: record.candidate_name,
                    job_title: record.job_title,
                    ats_score: record.ats_score,
                })
            })
            .collect()
    }

    async fn update_application_status(
        &self,
        hr_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET status = $1
            WHERE id = $2
              AND job_id IN (SELECT id FROM job_postings WHERE hr_id = $3)
            RETURNING id, candidate_id, job_id, status, resume_url, applied_date
            "#,
        )
        .bind(status.as_str())
        .bind(application_id)
        .bind(hr_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(Error::persistence(format!(
                "Application {} not found",
                application_id
            ))),
        }
    }
}
