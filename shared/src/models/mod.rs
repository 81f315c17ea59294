//! Data models
//!
//! Shared between the admin client and the CLI. Field names on the wire
//! follow the backend (Portuguese column names, camelCase config keys).

pub mod dashboard;
pub mod recharge;
pub mod site_config;

// Re-exports
pub use dashboard::*;
pub use recharge::*;
pub use site_config::*;
