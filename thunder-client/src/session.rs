//! Session state shared by every operation
//!
//! Holds the single admin credential and the backend readiness flag.
//! Both used to be ambient globals in the dashboard; here they live in one
//! object handed to each component.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Source of the admin password when none is held
pub trait CredentialPrompt: Send + Sync {
    /// Ask the operator. `None` means they declined.
    fn prompt(&self, reason: &str) -> Option<String>;
}

/// Credential and readiness for one operator session
pub struct Session {
    credential: RwLock<Option<String>>,
    ready: AtomicBool,
    prompt: Option<Arc<dyn CredentialPrompt>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ready", &self.is_ready())
            .field("has_prompt", &self.prompt.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            credential: RwLock::new(None),
            ready: AtomicBool::new(false),
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn CredentialPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_credential(self, credential: impl Into<String>) -> Self {
        Self {
            credential: RwLock::new(Some(credential.into())),
            ..self
        }
    }

    // ========== Readiness ==========

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn mark_not_ready(&self) {
        if self.ready.swap(false, Ordering::AcqRel) {
            tracing::warn!("Backend readiness reset, next data call will re-probe");
        }
    }

    /// Fail fast with [`ClientError::NotReady`] unless the backend is known ready
    pub fn require_ready(&self) -> ClientResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ClientError::NotReady)
        }
    }

    // ========== Credential ==========

    pub async fn credential(&self) -> Option<String> {
        self.credential.read().await.clone()
    }

    pub async fn has_credential(&self) -> bool {
        self.credential.read().await.is_some()
    }

    pub async fn set_credential(&self, credential: impl Into<String>) {
        *self.credential.write().await = Some(credential.into());
    }

    pub async fn clear_credential(&self) {
        if self.credential.write().await.take().is_some() {
            tracing::info!("Admin credential discarded");
        }
    }

    /// Credential for a privileged call, prompting when none is held
    pub async fn authorize(&self) -> ClientResult<String> {
        if let Some(credential) = self.credential().await {
            return Ok(credential);
        }
        self.reprompt("Por favor, insira a senha de administrador:")
            .await
    }

    /// Ask the prompt for a fresh credential and store it
    pub async fn reprompt(&self, reason: &str) -> ClientResult<String> {
        let prompt = self.prompt.as_ref().ok_or(ClientError::MissingCredential)?;
        match prompt.prompt(reason).filter(|c| !c.is_empty()) {
            Some(credential) => {
                self.set_credential(credential.clone()).await;
                Ok(credential)
            }
            None => Err(ClientError::MissingCredential),
        }
    }

    /// Apply session side effects of a call result.
    ///
    /// A 401 discards the credential; a 503 or transport failure clears
    /// readiness. The result is passed through unchanged.
    pub async fn observe<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(err) = &result {
            match err {
                ClientError::Unauthorized => self.clear_credential().await,
                e if e.is_connectivity() => self.mark_not_ready(),
                _ => {}
            }
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
