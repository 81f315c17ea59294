//! API response types

use serde::{Deserialize, Serialize};

/// `{ "message": ... }` body the backend returns for acknowledgements and
/// errors alike
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Parse an error body, returning its message when it has one
    pub fn extract(body: &str) -> Option<String> {
        serde_json::from_str::<ApiMessage>(body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.trim().is_empty())
    }
}
