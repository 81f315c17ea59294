//! Operator notifications
//!
//! Toasts are transient and dismiss themselves; alerts are blocking
//! messages the front end must show as-is.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Transient notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// A row or field update was acknowledged
    Saved,
    /// An export finished downloading
    Exported,
}

impl ToastKind {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Saved => "Alterações salvas!",
            Self::Exported => "Exportação concluída!",
        }
    }
}

/// Sink for operator-facing messages
pub trait Notifier: Send + Sync {
    fn toast(&self, kind: ToastKind);
    fn alert(&self, message: &str);
}

#[derive(Debug, Default)]
struct SlotState {
    current: Option<ToastKind>,
    generation: u64,
}

/// Single visible toast that hides itself after a fixed duration.
///
/// A newer toast restarts the timer; the older timer then does nothing.
#[derive(Debug, Clone)]
pub struct ToastSlot {
    state: Arc<Mutex<SlotState>>,
    duration: Duration,
}

impl ToastSlot {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState::default())),
            duration,
        }
    }

    /// Show a toast; the returned task hides it when it expires
    pub async fn show(&self, kind: ToastKind) -> JoinHandle<()> {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.current = Some(kind);
            state.generation
        };

        let state = self.state.clone();
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut state = state.lock().await;
            if state.generation == generation {
                state.current = None;
            }
        })
    }

    pub async fn current(&self) -> Option<ToastKind> {
        self.state.lock().await.current
    }
}

/// Notifier that reports through `tracing` and tracks the visible toast
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    slot: ToastSlot,
}

impl TracingNotifier {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            slot: ToastSlot::new(toast_duration),
        }
    }

    pub fn slot(&self) -> &ToastSlot {
        &self.slot
    }
}

impl Notifier for TracingNotifier {
    fn toast(&self, kind: ToastKind) {
        tracing::info!(toast = ?kind, "{}", kind.text());
        // Needs a runtime; outside one the toast is only logged
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let slot = self.slot.clone();
            handle.spawn(async move {
                let _ = slot.show(kind).await;
            });
        }
    }

    fn alert(&self, message: &str) {
        tracing::warn!(alert = message, "Operator alert");
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Notifier that records everything for assertions
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub toasts: StdMutex<Vec<ToastKind>>,
        pub alerts: StdMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn toasts(&self) -> Vec<ToastKind> {
            self.toasts.lock().unwrap().clone()
        }

        pub fn alerts(&self) -> Vec<String> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn toast(&self, kind: ToastKind) {
            self.toasts.lock().unwrap().push(kind);
        }

        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }
}
