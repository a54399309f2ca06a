use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::cache::{CachedResult, QueryCache, QueryKey};
use crate::config::DEFAULT_SIGNED_URL_TTL_SECS;
use crate::dto::job_dto::CreateJobPayload;
use crate::error::{Error, Result};
use crate::models::{Application, ApplicationStatus, EnrichedApplication, JobPosting, Principal};
use crate::mutation::{MutationExecutor, MutationSpec, Notification};
use crate::services::application_service::ApplicationService;
use crate::services::identity_service::IdentityProvider;
use crate::services::job_service::JobService;
use crate::services::stats_service::{DashboardStats, JobApplicantCounts};
use crate::services::storage_service::ResumeStorage;
use crate::store::RecruitingStore;

/// One recruiter's dashboard. Owns the read cache for its lifetime; reads
/// with no signed-in principal return empty results without touching
/// storage, mutations fail with [`Error::NotAuthenticated`].
pub struct DashboardSession {
    identity: Arc<dyn IdentityProvider>,
    principal: OnceCell<Option<Principal>>,
    jobs: JobService,
    applications: ApplicationService,
    storage: Arc<dyn ResumeStorage>,
    cache: Arc<QueryCache>,
    executor: MutationExecutor,
    signed_url_ttl_secs: u64,
}

impl DashboardSession {
    pub fn new(
        store: Arc<dyn RecruitingStore>,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn ResumeStorage>,
    ) -> (Self, UnboundedReceiver<Notification>) {
        let cache = Arc::new(QueryCache::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            identity,
            principal: OnceCell::new(),
            jobs: JobService::new(store.clone()),
            applications: ApplicationService::new(store),
            storage,
            executor: MutationExecutor::new(Arc::downgrade(&cache), tx),
            cache,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
        };
        (session, rx)
    }

    pub fn with_signed_url_ttl(mut self, ttl_secs: u64) -> Self {
        self.signed_url_ttl_secs = ttl_secs;
        self
    }

    /// Resolved once per session.
    pub async fn current_principal(&self) -> Result<Option<Principal>> {
        let principal = self
            .principal
            .get_or_try_init(|| self.identity.current_principal())
            .await?;
        Ok(*principal)
    }

    async fn require_hr(&self) -> Result<Principal> {
        let principal = self.current_principal().await?.ok_or(Error::NotAuthenticated)?;
        if !principal.is_hr() {
            return Err(Error::Forbidden(
                "Only HR profiles can manage job postings".to_string(),
            ));
        }
        Ok(principal)
    }

    pub async fn jobs(&self) -> Result<Arc<Vec<JobPosting>>> {
        let Some(principal) = self.current_principal().await? else {
            return Ok(Arc::new(Vec::new()));
        };
        if let Some(jobs) = self.cache.jobs(principal.id) {
            debug!(hr_id = %principal.id, "Job listing served from cache");
            return Ok(jobs);
        }

        let key = QueryKey::jobs(principal.id);
        let generation = self.cache.begin_fetch(key);
        let jobs = Arc::new(self.jobs.list_jobs(principal.id).await?);
        self.cache
            .store(key, generation, CachedResult::Jobs(jobs.clone()));
        Ok(jobs)
    }

    pub async fn applications(&self) -> Result<Arc<Vec<EnrichedApplication>>> {
        let Some(principal) = self.current_principal().await? else {
            return Ok(Arc::new(Vec::new()));
        };
        if let Some(apps) = self.cache.applications(principal.id) {
            debug!(hr_id = %principal.id, "Application listing served from cache");
            return Ok(apps);
        }

        let key = QueryKey::applications(principal.id);
        let generation = self.cache.begin_fetch(key);
        let jobs = self.jobs().await?;
        let apps = Arc::new(self.applications.list_for_jobs(&jobs).await?);
        self.cache
            .store(key, generation, CachedResult::Applications(apps.clone()));
        Ok(apps)
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let jobs = self.jobs().await?;
        let apps = self.applications().await?;
        Ok(DashboardStats::compute(&jobs, &apps))
    }

    pub async fn job_applicant_counts(&self, job_id: Uuid) -> Result<JobApplicantCounts> {
        let apps = self.applications().await?;
        Ok(JobApplicantCounts::for_job(&apps, job_id))
    }

    pub async fn job_skills(&self, job_id: Uuid) -> Result<Vec<String>> {
        if self.current_principal().await?.is_none() {
            return Ok(Vec::new());
        }
        self.jobs.fetch_job_skills(job_id).await
    }

    pub async fn create_job(&self, payload: CreateJobPayload) -> Result<JobPosting> {
        let principal = self.require_hr().await?;
        let jobs = self.jobs.clone();
        self.executor
            .execute(
                MutationSpec::create_job(QueryKey::jobs(principal.id)),
                async move { jobs.create_job(principal.id, payload).await },
            )
            .await
    }

    pub async fn delete_job(&self, job_id: Uuid) -> Result<()> {
        let principal = self.require_hr().await?;
        let jobs = self.jobs.clone();
        self.executor
            .execute(
                MutationSpec::delete_job(QueryKey::jobs(principal.id)),
                async move { jobs.delete_job(principal.id, job_id).await },
            )
            .await
    }

    pub async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let principal = self.require_hr().await?;
        let applications = self.applications.clone();
        self.executor
            .execute(
                MutationSpec::update_application_status(QueryKey::applications(principal.id)),
                async move {
                    applications
                        .update_status(principal.id, application_id, status)
                        .await
                },
            )
            .await
    }

    /// Short-lived download link for the application's resume, if it has one.
    pub async fn resume_download_url(
        &self,
        application: &EnrichedApplication,
    ) -> Result<Option<Url>> {
        self.require_hr().await?;
        let Some(path) = application.resume_url.as_deref() else {
            return Ok(None);
        };
        let url = self
            .storage
            .signed_url(path, self.signed_url_ttl_secs)
            .await?;
        Ok(Some(url))
    }

    /// Drops every cached listing, e.g. on an explicit refresh.
    pub fn refresh(&self) {
        self.cache.clear();
    }
}
