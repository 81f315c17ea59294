//! Dashboard aggregate fetching
//!
//! The aggregate is read-only and replaced wholesale on every fetch.
//! Refreshes triggered by edits run detached; a failure there is logged
//! and never reaches the edit that caused it.

use std::sync::Arc;

use shared::DashboardSummary;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::error::ClientResult;
use crate::http::AdminApi;
use crate::session::Session;

/// Fetches and holds the latest dashboard aggregate
#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    latest: Arc<RwLock<Option<DashboardSummary>>>,
}

impl DashboardService {
    pub fn new(api: Arc<dyn AdminApi>, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Fetch the aggregate and store it.
    ///
    /// Returns `Ok(None)` without a request while the backend is not ready
    /// or no credential is held.
    pub async fn fetch(&self) -> ClientResult<Option<DashboardSummary>> {
        if !self.session.is_ready() {
            return Ok(None);
        }
        let Some(credential) = self.session.credential().await else {
            return Ok(None);
        };

        let result = self.api.dashboard(&credential).await;
        let summary = self.session.observe(result).await?;
        *self.latest.write().await = Some(summary.clone());
        Ok(Some(summary))
    }

    /// Fire-and-forget refresh
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.fetch().await {
                tracing::error!(error = %e, "Failed to refresh dashboard");
            }
        })
    }

    pub async fn latest(&self) -> Option<DashboardSummary> {
        self.latest.read().await.clone()
    }
}
