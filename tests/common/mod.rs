use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use recruiter_dashboard::dashboard::DashboardSession;
use recruiter_dashboard::dto::job_dto::CreateJobPayload;
use recruiter_dashboard::error::Result;
use recruiter_dashboard::models::{Principal, Profile, Role};
use recruiter_dashboard::mutation::Notification;
use recruiter_dashboard::services::identity_service::{IdentityProvider, StaticIdentityProvider};
use recruiter_dashboard::services::storage_service::{HmacUrlSigner, ResumeStorage};
use recruiter_dashboard::store::MemoryStore;
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

mock! {
    pub Identity {}

    #[async_trait]
    impl IdentityProvider for Identity {
        async fn current_principal(&self) -> Result<Option<Principal>>;
    }
}

mock! {
    pub Storage {}

    #[async_trait]
    impl ResumeStorage for Storage {
        async fn signed_url(&self, path: &str, ttl_secs: u64) -> Result<Url>;
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub hr: Profile,
    pub session: DashboardSession,
    pub notifications: UnboundedReceiver<Notification>,
}

pub fn signer() -> Arc<HmacUrlSigner> {
    Arc::new(HmacUrlSigner::new("https://files.example.com/resumes", "s3cret").expect("signer"))
}

pub fn session_for(
    store: &Arc<MemoryStore>,
    principal: Option<Principal>,
) -> (DashboardSession, UnboundedReceiver<Notification>) {
    DashboardSession::new(
        store.clone(),
        Arc::new(StaticIdentityProvider(principal)),
        signer(),
    )
}

pub fn hr_fixture() -> Fixture {
    recruiter_dashboard::telemetry::init_tracing(false);
    let store = Arc::new(MemoryStore::new());
    let hr = store.add_profile("Hannah Recruiter", Role::Hr);
    let (session, notifications) = session_for(&store, Some(Principal::hr(hr.id)));
    Fixture {
        store,
        hr,
        session,
        notifications,
    }
}

pub fn job_payload(title: &str, skills: &[&str]) -> CreateJobPayload {
    CreateJobPayload {
        title: title.to_string(),
        company_name: "Acme".to_string(),
        description: "...".to_string(),
        experience_required: Some("2-4".to_string()),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}
