//! Shared types for the Thunder Recargas admin tooling
//!
//! Wire types exchanged with the recharge backend: order records,
//! list filters and pagination envelopes, the dashboard aggregate and the
//! site configuration document.

pub mod models;
pub mod query;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Carrier, DashboardSummary, EditableField, FieldUpdate, NewRecharge, OrderId, OrderStatus,
    RechargeOptions, Recharge, SiteConfig, Variations,
};
pub use query::{OrderFilter, PaginatedResponse, ParseError, Period};
pub use response::ApiMessage;
