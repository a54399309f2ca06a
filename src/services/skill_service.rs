use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NewRequiredSkill, RequiredSkill};
use crate::store::RecruitingStore;

#[derive(Clone)]
pub struct SkillService {
    store: Arc<dyn RecruitingStore>,
}

impl SkillService {
    pub fn new(store: Arc<dyn RecruitingStore>) -> Self {
        Self { store }
    }

    pub async fn write_skills(&self, job_id: Uuid, names: &[String]) -> Result<Vec<RequiredSkill>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let rows = build_skill_rows(job_id, names)?;
        self.store.insert_skills(rows).await
    }

    /// Skill names for a job, highest priority first.
    pub async fn skill_names(&self, job_id: Uuid) -> Result<Vec<String>> {
        let mut skills = self.store.list_skills(job_id).await?;
        skills.sort_by_key(|s| s.priority_level);
        Ok(skills.into_iter().map(|s| s.skill_name).collect())
    }
}

pub fn normalize_skill_names(names: &[String]) -> Result<Vec<String>> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                Err(Error::validation(format!(
                    "Skill #{} must have a name",
                    idx + 1
                )))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

/// Assigns `priority_level` from the 1-based position in `names`.
pub fn build_skill_rows(job_id: Uuid, names: &[String]) -> Result<Vec<NewRequiredSkill>> {
    normalize_skill_names(names)?
        .into_iter()
        .enumerate()
        .map(|(idx, skill_name)| {
            let priority_level = i32::try_from(idx + 1)
                .map_err(|_| Error::validation("Too many required skills"))?;
            Ok(NewRequiredSkill {
                job_id,
                skill_name,
                priority_level,
            })
        })
        .collect()
}
