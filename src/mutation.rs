use serde::Serialize;
use std::future::Future;
use std::sync::Weak;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// User-visible outcome of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn success(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            title: "Error".to_string(),
            description: err.to_string(),
            variant: NotificationVariant::Destructive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MutationSpec {
    pub name: &'static str,
    pub invalidates: Vec<QueryKey>,
    pub on_success: Notification,
}

impl MutationSpec {
    pub fn create_job(key: QueryKey) -> Self {
        Self {
            name: "create_job",
            invalidates: vec![key],
            on_success: Notification::success(
                "Job created",
                "Your job posting has been created successfully.",
            ),
        }
    }

    pub fn delete_job(key: QueryKey) -> Self {
        Self {
            name: "delete_job",
            invalidates: vec![key],
            on_success: Notification::success("Job deleted", "The job posting has been deleted."),
        }
    }

    pub fn update_application_status(key: QueryKey) -> Self {
        Self {
            name: "update_application_status",
            invalidates: vec![key],
            on_success: Notification::success(
                "Status updated",
                "Application status has been updated.",
            ),
        }
    }
}

/// Runs writes on their own task so they finish even if the caller goes
/// away. Cache keys are invalidated only after a successful write, and
/// through a weak handle: once the session is gone the invalidation is a
/// no-op. No write is retried.
#[derive(Clone)]
pub struct MutationExecutor {
    cache: Weak<QueryCache>,
    notifications: UnboundedSender<Notification>,
}

impl MutationExecutor {
    pub fn new(cache: Weak<QueryCache>, notifications: UnboundedSender<Notification>) -> Self {
        Self {
            cache,
            notifications,
        }
    }

    pub async fn execute<T, F>(&self, spec: MutationSpec, write: F) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let name = spec.name;
        let cache = self.cache.clone();
        let notifications = self.notifications.clone();

        let task = tokio::spawn(async move {
            let outcome = write.await;
            let notification = match &outcome {
                Ok(_) => {
                    match cache.upgrade() {
                        Some(cache) => {
                            for key in &spec.invalidates {
                                cache.invalidate(*key);
                            }
                        }
                        None => info!(mutation = spec.name, "Session closed, nothing to invalidate"),
                    }
                    spec.on_success
                }
                Err(err) => {
                    warn!(mutation = spec.name, error = %err, "Mutation failed");
                    Notification::failure(err)
                }
            };
            // Receiver may already be dropped with the session.
            let _ = notifications.send(notification);
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                let err = Error::persistence(format!("Mutation task aborted: {}", join_err));
                warn!(mutation = name, error = %err, "Mutation task did not complete");
                let _ = self.notifications.send(Notification::failure(&err));
                Err(err)
            }
        }
    }
}
