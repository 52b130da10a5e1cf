//! Lifecycle notifications.
//!
//! The dispatcher is a fire-and-forget boundary: listener failures are an
//! operational concern, not a processing concern, so every error raised by a
//! listener is caught, logged and never propagated into the worker loop.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CallbackConfig;
use crate::fetch::BASIC_AUTH_USER;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("callback rejected with status {0}")]
    Rejected(u16),
}

/// Job lifecycle event raised by the worker.
#[derive(Debug, Clone)]
pub enum ListenerEvent {
    Start {
        job_url: String,
        job_id: String,
    },
    Done {
        job_url: String,
        job_id: String,
        output_path: Option<String>,
    },
    Fail {
        message: String,
        error: String,
    },
}

/// External lifecycle listener with three individually optional capabilities.
///
/// Implementations override the hooks they care about; the defaults are
/// no-ops. Injected at construction time rather than loaded dynamically.
#[async_trait]
pub trait PackageListener: Send + Sync {
    async fn on_package_start(&self, _job_url: &str, _job_id: &str) -> Result<(), ListenerError> {
        Ok(())
    }

    async fn on_package_done(
        &self,
        _job_url: &str,
        _job_id: &str,
        _output_path: Option<&str>,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    async fn on_package_fail(&self, _message: &str, _error: &str) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Routes lifecycle events to an optionally-injected listener.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    listener: Option<Arc<dyn PackageListener>>,
}

impl NotificationDispatcher {
    pub fn new(listener: Option<Arc<dyn PackageListener>>) -> Self {
        Self { listener }
    }

    /// Dispatch an event. Listener errors are logged and swallowed.
    pub async fn notify(&self, event: ListenerEvent) {
        let Some(listener) = &self.listener else {
            return;
        };
        let result = match &event {
            ListenerEvent::Start { job_url, job_id } => {
                listener.on_package_start(job_url, job_id).await
            }
            ListenerEvent::Done {
                job_url,
                job_id,
                output_path,
            } => {
                listener
                    .on_package_done(job_url, job_id, output_path.as_deref())
                    .await
            }
            ListenerEvent::Fail { message, error } => {
                listener.on_package_fail(message, error).await
            }
        };
        if let Err(e) = result {
            warn!(error = %e, ?event, "package listener failed, continuing");
        }
    }
}

/// Listener that posts lifecycle callbacks to an external HTTP endpoint
/// (`<url>/packagerCallback/success` and `/packagerCallback/failure`).
pub struct CallbackListener {
    client: Client,
    config: CallbackConfig,
    access_token: Option<String>,
}

impl CallbackListener {
    pub fn new(config: CallbackConfig, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            config,
            access_token,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), ListenerError> {
        let base = self.config.url.as_str().trim_end_matches('/');
        let url = format!("{base}/packagerCallback/{path}");
        let mut request = self.client.post(&url).json(&body);
        if let Some(password) = &self.config.password {
            let user = self.config.user.as_deref().unwrap_or(BASIC_AUTH_USER);
            request = request.basic_auth(user, Some(password));
        }
        if let Some(token) = &self.access_token {
            request = request.header("x-jwt", format!("Bearer {token}"));
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ListenerError::Rejected(response.status().as_u16()));
        }
        debug!(url, "delivered package callback");
        Ok(())
    }
}

#[async_trait]
impl PackageListener for CallbackListener {
    async fn on_package_done(
        &self,
        job_url: &str,
        job_id: &str,
        _output_path: Option<&str>,
    ) -> Result<(), ListenerError> {
        self.post("success", json!({ "url": job_url, "jobId": job_id }))
            .await
    }

    async fn on_package_fail(&self, message: &str, _error: &str) -> Result<(), ListenerError> {
        self.post("failure", json!({ "message": message })).await
    }
}
