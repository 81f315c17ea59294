//! Client error types

use thiserror::Error;

/// Generic text shown when the backend gives no usable message
pub const GENERIC_FAILURE: &str = "Falha ao processar a solicitação.";

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Health probe never succeeded
    #[error("Server not ready")]
    NotReady,

    /// 401 from the backend; the stored credential has been discarded
    #[error("Authentication required")]
    Unauthorized,

    /// 503 from the backend; readiness has been reset
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other non-2xx response
    #[error("Request failed ({status}): {}", message.as_deref().unwrap_or(GENERIC_FAILURE))]
    RequestFailed {
        status: u16,
        message: Option<String>,
    },

    /// Transport failure (connect, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No credential held and none supplied when asked
    #[error("Admin password required")]
    MissingCredential,

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Operator input the backend would store but the client cannot read back
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] shared::ParseError),
}

impl ClientError {
    /// Text for the operator-facing alert
    pub fn user_message(&self) -> String {
        match self {
            Self::NotReady => {
                "Servidor não está pronto. Aguarde alguns segundos e tente novamente.".into()
            }
            Self::Unauthorized => "Senha incorreta ou expirada. Faça login novamente.".into(),
            Self::ServiceUnavailable(msg) => msg.clone(),
            Self::RequestFailed { message, .. } => {
                message.clone().unwrap_or_else(|| GENERIC_FAILURE.into())
            }
            Self::Network(_) => {
                "Não foi possível conectar ao servidor. Tente novamente em alguns segundos.".into()
            }
            Self::MissingCredential => "Senha é necessária para acessar o painel.".into(),
            Self::InvalidResponse(_) | Self::Serialization(_) => GENERIC_FAILURE.into(),
            Self::InvalidState(msg) => msg.clone(),
            Self::InvalidValue(err) => format!("Valor inválido: {err}"),
        }
    }

    /// Whether readiness should be re-validated after this error
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::Network(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
