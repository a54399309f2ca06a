pub mod cache;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod mutation;
pub mod services;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use crate::config::Config;
use crate::dashboard::DashboardSession;
use crate::mutation::Notification;
use crate::services::identity_service::JwtIdentityProvider;
use crate::services::storage_service::HmacUrlSigner;
use crate::store::{PgStore, RecruitingStore};
use tokio::sync::mpsc::UnboundedReceiver;

/// Process-wide handles shared by every dashboard session.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecruitingStore>,
    pub signer: Arc<HmacUrlSigner>,
    pub config: Config,
}

impl AppState {
    /// Loads the process configuration from the environment once and connects with it.
    pub async fn from_env() -> error::Result<Self> {
        config::init_config()?;
        let config = config::get_config()?.clone();
        Self::connect(config).await
    }

    pub async fn connect(config: Config) -> error::Result<Self> {
        let pool = database::pool::create_pool(&config).await?;
        database::pool::run_migrations(&pool).await?;
        let signer = HmacUrlSigner::from_config(&config)?;

        Ok(Self {
            store: Arc::new(PgStore::new(pool)),
            signer: Arc::new(signer),
            config,
        })
    }

    /// Opens a session for the holder of `authorization` (a `Bearer <jwt>` header value).
    pub fn open_session(
        &self,
        authorization: Option<&str>,
    ) -> (DashboardSession, UnboundedReceiver<Notification>) {
        let identity = JwtIdentityProvider::from_authorization_header(
            authorization,
            self.config.jwt_secret.clone(),
        );
        let (session, notifications) =
            DashboardSession::new(self.store.clone(), Arc::new(identity), self.signer.clone());
        (
            session.with_signed_url_ttl(self.config.signed_url_ttl_secs),
            notifications,
        )
    }
}
