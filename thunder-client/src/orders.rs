//! Paginated, filtered order list
//!
//! Holds the current page in memory. Every fetch carries a sequence token
//! so a slow response for an older query can never overwrite a newer one.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use shared::{NewRecharge, OrderFilter, OrderId, PaginatedResponse, Recharge};
use tokio::sync::Mutex;

use crate::error::{ClientError, ClientResult};
use crate::http::AdminApi;
use crate::prober::ReadinessProber;
use crate::session::Session;

// ============================================================================
// Export
// ============================================================================

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    /// Spreadsheet; requested as `excel`, saved as `.xlsx`
    Excel,
    Json,
    Pdf,
}

impl ExportFormat {
    /// Value of the `format` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Downloaded export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// `recargas_YYYY-MM-DD.<ext>`
    pub fn filename_for(format: ExportFormat, date: NaiveDate) -> String {
        format!("recargas_{}.{}", date.format("%Y-%m-%d"), format.extension())
    }

    /// Write into `dir` under the suggested filename
    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Pages needed for `total` rows, never less than one
pub fn total_pages_for(total: u64, limit: u32) -> u32 {
    if total == 0 || limit == 0 {
        return 1;
    }
    total.div_ceil(u64::from(limit)) as u32
}

/// Pagination derived from the latest list response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub total: u64,
}

impl PageState {
    /// Build from a response, tolerating backends that omit
    /// `total_pages`, `page` or `limit`
    pub fn from_response<T>(
        resp: &PaginatedResponse<T>,
        requested_page: u32,
        default_limit: u32,
    ) -> Self {
        let limit = resp.limit.filter(|l| *l > 0).unwrap_or(default_limit);
        let total = resp.total.unwrap_or(resp.data.len() as u64);
        let total_pages = resp
            .total_pages
            .filter(|p| *p > 0)
            .unwrap_or_else(|| total_pages_for(total, limit));

        Self {
            page: resp.page.unwrap_or(requested_page),
            total_pages,
            limit,
            total,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// The page currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Recharge>,
    pub state: PageState,
    pub filter: OrderFilter,
}

/// Result of a list fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Response became the current page
    Applied(OrderPage),
    /// A newer fetch already landed; this response was dropped
    Stale,
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The cached page has no rows left and should be refetched
    pub page_emptied: bool,
}

#[derive(Debug, Default)]
struct ListCache {
    applied_token: u64,
    page: Option<OrderPage>,
    filter: OrderFilter,
}

/// Order list fetcher and page cache
pub struct OrderList {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    prober: ReadinessProber,
    page_size: u32,
    cache: Mutex<ListCache>,
    next_token: AtomicU64,
}

impl OrderList {
    pub fn new(
        api: Arc<dyn AdminApi>,
        session: Arc<Session>,
        prober: ReadinessProber,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            session,
            prober,
            page_size,
            cache: Mutex::new(ListCache::default()),
            next_token: AtomicU64::new(0),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch one page.
    ///
    /// Re-probes the backend first when readiness was lost.
    pub async fn fetch_page(&self, page: u32, filter: &OrderFilter) -> ClientResult<FetchOutcome> {
        if !self.prober.ensure_ready().await {
            return Err(ClientError::NotReady);
        }
        let credential = self.session.authorize().await?;
        let page = page.max(1);
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(page, token, filter = ?filter, "Fetching orders");
        let result = self
            .api
            .list_orders(&credential, page, self.page_size, filter)
            .await;
        let resp = self.session.observe(result).await?;
        let state = PageState::from_response(&resp, page, self.page_size);

        let mut cache = self.cache.lock().await;
        if token < cache.applied_token {
            tracing::debug!(token, applied = cache.applied_token, "Discarding stale page");
            return Ok(FetchOutcome::Stale);
        }

        let current = OrderPage {
            orders: resp.data,
            state,
            filter: filter.clone(),
        };
        cache.applied_token = token;
        cache.filter = filter.clone();
        cache.page = Some(current.clone());

        tracing::info!(
            page = state.page,
            total_pages = state.total_pages,
            total = state.total,
            "Orders loaded"
        );
        Ok(FetchOutcome::Applied(current))
    }

    /// Start over at page 1 with a new filter
    pub async fn apply_filter(&self, filter: OrderFilter) -> ClientResult<FetchOutcome> {
        self.fetch_page(1, &filter).await
    }

    pub async fn clear_filters(&self) -> ClientResult<FetchOutcome> {
        self.fetch_page(1, &OrderFilter::default()).await
    }

    /// Refetch the current page with the current filter
    pub async fn refresh(&self) -> ClientResult<FetchOutcome> {
        let (page, filter) = {
            let cache = self.cache.lock().await;
            let page = cache.page.as_ref().map(|p| p.state.page).unwrap_or(1);
            (page, cache.filter.clone())
        };
        self.fetch_page(page, &filter).await
    }

    /// Next page, or `None` when already on the last one
    pub async fn next_page(&self) -> ClientResult<Option<FetchOutcome>> {
        let target = {
            let cache = self.cache.lock().await;
            cache
                .page
                .as_ref()
                .filter(|p| p.state.has_next())
                .map(|p| (p.state.page + 1, cache.filter.clone()))
        };
        match target {
            Some((page, filter)) => self.fetch_page(page, &filter).await.map(Some),
            None => Ok(None),
        }
    }

    /// Previous page, or `None` when already on the first one
    pub async fn prev_page(&self) -> ClientResult<Option<FetchOutcome>> {
        let target = {
            let cache = self.cache.lock().await;
            cache
                .page
                .as_ref()
                .filter(|p| p.state.has_prev())
                .map(|p| (p.state.page - 1, cache.filter.clone()))
        };
        match target {
            Some((page, filter)) => self.fetch_page(page, &filter).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn current(&self) -> Option<OrderPage> {
        self.cache.lock().await.page.clone()
    }

    pub async fn current_filter(&self) -> OrderFilter {
        self.cache.lock().await.filter.clone()
    }

    /// Look up a row of the current page
    pub async fn find(&self, id: &OrderId) -> Option<Recharge> {
        let cache = self.cache.lock().await;
        cache
            .page
            .as_ref()
            .and_then(|p| p.orders.iter().find(|o| &o.id == id).cloned())
    }

    /// Replace a cached row after a successful save
    pub async fn update_cached(&self, order: &Recharge) {
        let mut cache = self.cache.lock().await;
        if let Some(slot) = cache
            .page
            .as_mut()
            .and_then(|p| p.orders.iter_mut().find(|o| o.id == order.id))
        {
            *slot = order.clone();
        }
    }

    /// Credential for an action that must not trigger a probe
    async fn privileged(&self) -> ClientResult<String> {
        self.session.require_ready()?;
        self.session.authorize().await
    }

    /// Create an order. Returns the backend's acknowledgement text.
    pub async fn create(&self, order: &NewRecharge) -> ClientResult<String> {
        let credential = self.privileged().await?;
        let result = self.api.create_order(&credential, order).await;
        let ack = self.session.observe(result).await?;
        tracing::info!(name = %order.name, carrier = %order.carrier, "Order created");
        Ok(ack
            .message
            .unwrap_or_else(|| "Novo pedido adicionado com sucesso!".to_string()))
    }

    /// Delete an order and drop it from the cached page
    pub async fn delete(&self, id: &OrderId) -> ClientResult<DeleteOutcome> {
        let credential = self.privileged().await?;
        let result = self.api.delete_order(&credential, id).await;
        self.session.observe(result).await?;
        tracing::info!(order_id = %id, "Order deleted");

        let mut cache = self.cache.lock().await;
        let page_emptied = match cache.page.as_mut() {
            Some(page) => {
                page.orders.retain(|o| &o.id != id);
                page.orders.is_empty()
            }
            None => false,
        };
        Ok(DeleteOutcome { page_emptied })
    }

    /// Download an export of every order matching `filter`
    pub async fn export(&self, format: ExportFormat, filter: &OrderFilter) -> ClientResult<ExportFile> {
        let credential = self.privileged().await?;
        let result = self.api.export(&credential, format, filter).await;
        let bytes = self.session.observe(result).await?;

        let filename = ExportFile::filename_for(format, chrono::Local::now().date_naive());
        tracing::info!(%filename, size = bytes.len(), "Export downloaded");
        Ok(ExportFile { filename, bytes })
    }
}
