//! Admin client facade
//!
//! Wires the session, HTTP seam, prober and the per-concern services
//! together the way the dashboard page did on load.

use std::sync::Arc;

use shared::{DashboardSummary, NewRecharge, OrderId};

use crate::config::ClientConfig;
use crate::dashboard::DashboardService;
use crate::edit::{EditController, RowEditor, SaveOutcome};
use crate::error::{ClientError, ClientResult};
use crate::http::{AdminApi, NetworkHttpClient};
use crate::notify::{Notifier, TracingNotifier};
use crate::orders::{FetchOutcome, OrderList};
use crate::prober::ReadinessProber;
use crate::session::{CredentialPrompt, Session};
use crate::site_config::ConfigStore;

/// Everything an operator front end needs, sharing one session
pub struct AdminClient {
    config: ClientConfig,
    session: Arc<Session>,
    prober: ReadinessProber,
    orders: OrderList,
    dashboard: DashboardService,
    editor: EditController,
    site_config: ConfigStore,
    notifier: Arc<dyn Notifier>,
}

impl AdminClient {
    /// Build a client talking to `config.base_url` over HTTP
    pub fn new(
        config: ClientConfig,
        notifier: Option<Arc<dyn Notifier>>,
        prompt: Option<Arc<dyn CredentialPrompt>>,
    ) -> ClientResult<Self> {
        let api: Arc<dyn AdminApi> = Arc::new(NetworkHttpClient::new(&config)?);
        let mut session = Session::new();
        if let Some(prompt) = prompt {
            session = session.with_prompt(prompt);
        }
        let notifier: Arc<dyn Notifier> = match notifier {
            Some(notifier) => notifier,
            None => Arc::new(TracingNotifier::new(config.toast_duration)),
        };
        Ok(Self::with_api(config, api, Arc::new(session), notifier))
    }

    /// Build a client over any [`AdminApi`] implementation
    pub fn with_api(
        config: ClientConfig,
        api: Arc<dyn AdminApi>,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let prober = ReadinessProber::new(api.clone(), session.clone(), config.readiness);
        let orders = OrderList::new(
            api.clone(),
            session.clone(),
            prober.clone(),
            config.page_size,
        );
        let dashboard = DashboardService::new(api.clone(), session.clone());
        let editor = EditController::new(
            api.clone(),
            session.clone(),
            dashboard.clone(),
            notifier.clone(),
            config.save_payload,
            config.auth_expiry,
        );
        let site_config = ConfigStore::new(api, session.clone());

        Self {
            config,
            session,
            prober,
            orders,
            dashboard,
            editor,
            site_config,
            notifier,
        }
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn prober(&self) -> &ReadinessProber {
        &self.prober
    }

    pub fn orders(&self) -> &OrderList {
        &self.orders
    }

    pub fn dashboard(&self) -> &DashboardService {
        &self.dashboard
    }

    pub fn editor(&self) -> &EditController {
        &self.editor
    }

    pub fn site_config(&self) -> &ConfigStore {
        &self.site_config
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    // ========== Flows ==========

    /// Wait for the backend, obtain the credential, then load page 1 and
    /// the dashboard. Nothing is fetched when the backend never answers.
    pub async fn start(&self) -> ClientResult<(FetchOutcome, Option<DashboardSummary>)> {
        if !self.prober.ensure_ready().await {
            self.notifier.alert(&ClientError::NotReady.user_message());
            return Err(ClientError::NotReady);
        }
        self.session.authorize().await?;

        let page = self.orders.fetch_page(1, &self.orders.current_filter().await).await?;
        let summary = match self.dashboard.fetch().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "Initial dashboard load failed");
                None
            }
        };
        Ok((page, summary))
    }

    /// Save an edited row and mirror the result into the cached page
    pub async fn save_row(&self, row: &mut RowEditor) -> SaveOutcome {
        let outcome = self.editor.save(row).await;
        if outcome.is_saved() {
            self.orders.update_cached(row.order()).await;
        }
        outcome
    }

    /// Create an order, then reload the list and the dashboard
    pub async fn add_order(&self, order: &NewRecharge) -> ClientResult<String> {
        let message = self.orders.create(order).await?;
        self.orders.refresh().await?;
        self.dashboard.spawn_refresh();
        Ok(message)
    }

    /// Delete an order. Refetches the page when its last row went away.
    pub async fn remove_order(&self, id: &OrderId) -> ClientResult<()> {
        let outcome = self.orders.delete(id).await?;
        if outcome.page_emptied {
            // Rows from the next page shift in; past the end, step back
            if let FetchOutcome::Applied(page) = self.orders.refresh().await?
                && page.orders.is_empty()
                && page.state.page > page.state.total_pages
            {
                self.orders
                    .fetch_page(page.state.total_pages, &page.filter)
                    .await?;
            }
        }
        self.dashboard.spawn_refresh();
        Ok(())
    }
}
