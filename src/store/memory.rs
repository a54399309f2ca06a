use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::RecruitingStore;
use crate::error::{Error, Result};
use crate::models::{
    Application, ApplicationJoinRow, ApplicationStatus, AtsResult, JobPosting, NewJobPosting,
    NewRequiredSkill, Profile, RequiredSkill, Role,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListJobs,
    InsertJob,
    DeleteJob,
    InsertSkills,
    ListSkills,
    FetchApplications,
    UpdateApplicationStatus,
}

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    jobs: Vec<JobPosting>,
    skills: Vec<RequiredSkill>,
    applications: Vec<Application>,
    ats_results: Vec<AtsResult>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    // Timestamps are strictly increasing so "newest first" is well defined.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn profile(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

/// In-process implementation of [`RecruitingStore`] with the same foreign
/// key and cascade rules as the SQL schema. Operations can be made to fail
/// once via [`MemoryStore::fail_next`], and every trait call is counted.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failures: Mutex<HashMap<StoreOp, String>>,
    calls: Mutex<HashMap<StoreOp, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_profile(&self, name: &str, role: Role) -> Profile {
        let mut tables = lock(&self.tables);
        let profile = Profile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            created_at: Some(tables.next_timestamp()),
        };
        tables.profiles.push(profile.clone());
        profile
    }

    pub fn add_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        resume_url: Option<&str>,
    ) -> Result<Application> {
        let mut tables = lock(&self.tables);
        match tables.profile(candidate_id) {
            Some(p) if p.role == Role::Candidate => {}
            Some(_) => {
                return Err(Error::persistence(format!(
                    "Profile {} is not a candidate",
                    candidate_id
                )))
            }
            None => {
                return Err(Error::persistence(format!(
                    "Profile {} not found",
                    candidate_id
                )))
            }
        }
        if !tables.jobs.iter().any(|j| j.id == job_id) {
            return Err(Error::persistence(format!("Job posting {} not found", job_id)));
        }

        let application = Application {
            id: Uuid::new_v4(),
            candidate_id,
            job_id,
            status: ApplicationStatus::Applied,
            resume_url: resume_url.map(str::to_string),
            applied_date: Some(tables.next_timestamp()),
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    pub fn add_ats_result(
        &self,
        application_id: Uuid,
        score: Option<i32>,
        feedback: Option<&str>,
    ) -> Result<AtsResult> {
        let mut tables = lock(&self.tables);
        if !tables.applications.iter().any(|a| a.id == application_id) {
            return Err(Error::persistence(format!(
                "Application {} not found",
                application_id
            )));
        }
        if tables
            .ats_results
            .iter()
            .any(|r| r.application_id == application_id)
        {
            return Err(Error::persistence(format!(
                "Application {} already has an ATS result",
                application_id
            )));
        }
        if let Some(score) = score {
            if !(0..=100).contains(&score) {
                return Err(Error::persistence(format!("ATS score {} out of range", score)));
            }
        }

        let result = AtsResult {
            id: Uuid::new_v4(),
            application_id,
            score,
            feedback: feedback.map(str::to_string),
            analyzed_at: Some(tables.next_timestamp()),
        };
        tables.ats_results.push(result.clone());
        Ok(result)
    }

    /// Removes a profile without touching rows that reference it, so joins
    /// can be exercised against a dangling candidate.
    pub fn forget_profile(&self, id: Uuid) {
        lock(&self.tables).profiles.retain(|p| p.id != id);
    }

    pub fn skills_for_job(&self, job_id: Uuid) -> Vec<RequiredSkill> {
        lock(&self.tables)
            .skills
            .iter()
            .filter(|s| s.job_id == job_id)
            .cloned()
            .collect()
    }

    pub fn applications_for_job(&self, job_id: Uuid) -> Vec<Application> {
        lock(&self.tables)
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect()
    }

    pub fn ats_result_for(&self, application_id: Uuid) -> Option<AtsResult> {
        lock(&self.tables)
            .ats_results
            .iter()
            .find(|r| r.application_id == application_id)
            .cloned()
    }

    pub fn job_exists(&self, job_id: Uuid) -> bool {
        lock(&self.tables).jobs.iter().any(|j| j.id == job_id)
    }

    pub fn fail_next(&self, op: StoreOp, message: &str) {
        lock(&self.failures).insert(op, message.to_string());
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    fn enter(&self, op: StoreOp) -> Result<()> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        match lock(&self.failures).remove(&op) {
            Some(message) => Err(Error::Persistence(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecruitingStore for MemoryStore {
    async fn list_jobs_by_owner(&self, hr_id: Uuid) -> Result<Vec<JobPosting>> {
        self.enter(StoreOp::ListJobs)?;
        let tables = lock(&self.tables);
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.hr_id == hr_id)
            .cloned()
            .collect())
    }

    async fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting> {
        self.enter(StoreOp::InsertJob)?;
        let mut tables = lock(&self.tables);
        match tables.profile(job.hr_id) {
            Some(p) if p.role == Role::Hr => {}
            _ => {
                return Err(Error::persistence(format!(
                    "Profile {} is not an HR profile",
                    job.hr_id
                )))
            }
        }

        let created = JobPosting {
            id: Uuid::new_v4(),
            hr_id: job.hr_id,
            title: job.title,
            company_name: job.company_name,
            description: job.description,
            experience_required: job.experience_required,
            status: Some(job.status),
            created_at: Some(tables.next_timestamp()),
        };
        tables.jobs.push(created.clone());
        Ok(created)
    }

    async fn delete_job(&self, hr_id: Uuid, job_id: Uuid) -> Result<()> {
        self.enter(StoreOp::DeleteJob)?;
        let mut tables = lock(&self.tables);
        if !tables
            .jobs
            .iter()
            .any(|j| j.id == job_id && j.hr_id == hr_id)
        {
            return Err(Error::persistence(format!("Job posting {} not found", job_id)));
        }

        let doomed: Vec<Uuid> = tables
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .map(|a| a.id)
            .collect();
        tables
            .ats_results
            .retain(|r| !doomed.contains(&r.application_id));
        tables.applications.retain(|a| a.job_id != job_id);
        tables.skills.retain(|s| s.job_id != job_id);
        tables.jobs.retain(|j| j.id != job_id);
        Ok(())
    }

    async fn insert_skills(&self, skills: Vec<NewRequiredSkill>) -> Result<Vec<RequiredSkill>> {
        self.enter(StoreOp::InsertSkills)?;
        let mut tables = lock(&self.tables);
        for skill in &skills {
            if !tables.jobs.iter().any(|j| j.id == skill.job_id) {
                return Err(Error::persistence(format!(
                    "Job posting {} not found",
                    skill.job_id
                )));
            }
            if skill.skill_name.trim().is_empty() || skill.priority_level < 1 {
                return Err(Error::persistence("Invalid required skill row"));
            }
            let taken = tables.skills.iter().any(|s| {
                s.job_id == skill.job_id && s.priority_level == skill.priority_level
            });
            if taken {
                return Err(Error::persistence(format!(
                    "Priority {} already used for job {}",
                    skill.priority_level, skill.job_id
                )));
            }
        }

        let mut inserted = Vec::with_capacity(skills.len());
        for skill in skills {
            let row = RequiredSkill {
                id: Uuid::new_v4(),
                job_id: skill.job_id,
                skill_name: skill.skill_name,
                priority_level: skill.priority_level,
                created_at: Some(tables.next_timestamp()),
            };
            tables.skills.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn list_skills(&self, job_id: Uuid) -> Result<Vec<RequiredSkill>> {
        self.enter(StoreOp::ListSkills)?;
        let mut skills: Vec<RequiredSkill> = lock(&self.tables)
            .skills
            .iter()
            .filter(|s| s.job_id == job_id)
            .cloned()
            .collect();
        skills.sort_by_key(|s| s.priority_level);
        Ok(skills)
    }

    async fn fetch_applications(&self, job_ids: &[Uuid]) -> Result<Vec<ApplicationJoinRow>> {
        self.enter(StoreOp::FetchApplications)?;
        let tables = lock(&self.tables);
        let rows = tables
            .applications
            .iter()
            .filter(|a| job_ids.contains(&a.job_id))
            .map(|a| ApplicationJoinRow {
                application: a.clone(),
                candidate_name: tables.profile(a.candidate_id).map(|p| p.name.clone()),
                job_title: tables
                    .jobs
                    .iter()
                    .find(|j| j.id == a.job_id)
                    .map(|j| j.title.clone()),
                ats_score: tables
                    .ats_results
                    .iter()
                    .find(|r| r.application_id == a.id)
                    .and_then(|r| r.score),
            })
            .collect();
        Ok(rows)
    }

    async fn update_application_status(
        &self,
        hr_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        self.enter(StoreOp::UpdateApplicationStatus)?;
        let mut tables = lock(&self.tables);
        let owned_jobs: Vec<Uuid> = tables
            .jobs
            .iter()
            .filter(|j| j.hr_id == hr_id)
            .map(|j| j.id)
            .collect();
        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.id == application_id && owned_jobs.contains(&a.job_id))
            .ok_or_else(|| {
                Error::persistence(format!("Application {} not found", application_id))
            })?;
        application.status = status;
        Ok(application.clone())
    }
}
