//! Thunder Client - admin client for the recharge backend
//!
//! Waits for the (sleepy) backend to come up, then lists, filters, edits,
//! creates, deletes and exports recharge orders, reads the dashboard
//! aggregate and edits the site configuration document.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod edit;
pub mod error;
pub mod http;
pub mod notify;
pub mod orders;
pub mod prober;
pub mod session;
pub mod site_config;
pub mod view;

#[cfg(test)]
mod mock;

pub use client::AdminClient;
pub use config::{AuthExpiry, ClientConfig, SavePayload};
pub use dashboard::DashboardService;
pub use edit::{EditController, RowEditor, RowState, SaveOutcome};
pub use error::{ClientError, ClientResult};
pub use http::{AdminApi, NetworkHttpClient};
pub use notify::{Notifier, ToastKind, TracingNotifier};
pub use orders::{ExportFile, ExportFormat, FetchOutcome, OrderList, OrderPage, PageState};
pub use prober::{BackoffPolicy, ReadinessProber};
pub use session::{CredentialPrompt, Session};
pub use site_config::{ConfigStore, SiteConfigForm};

// Re-export shared types for convenience
pub use shared::{
    Carrier, DashboardSummary, EditableField, FieldUpdate, NewRecharge, OrderFilter, OrderId,
    OrderStatus, Period, Recharge, SiteConfig,
};
