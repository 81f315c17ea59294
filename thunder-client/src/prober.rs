//! Connection readiness prober
//!
//! The backend sleeps when idle and takes a while to wake up, so no data
//! call is attempted until `/health` has answered once. Readiness is then
//! trusted until a 503 or transport failure resets it (see
//! [`Session::observe`]).

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::http::AdminApi;
use crate::session::Session;

/// Bounded retry policy for the readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Probes to attempt before giving up
    pub max_attempts: u32,
    /// Wait after each failed attempt except the last
    pub interval: Duration,
    /// Upper bound of random extra wait added to `interval`
    pub jitter: Duration,
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait before the next attempt
    pub fn delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let bound = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra_ms = rand::thread_rng().gen_range(0..=bound);
        self.interval.saturating_add(Duration::from_millis(extra_ms))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(8, Duration::from_millis(4000))
    }
}

/// Polls the health endpoint and flips the session readiness flag
#[derive(Clone)]
pub struct ReadinessProber {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    policy: BackoffPolicy,
}

impl ReadinessProber {
    pub fn new(api: Arc<dyn AdminApi>, session: Arc<Session>, policy: BackoffPolicy) -> Self {
        Self {
            api,
            session,
            policy,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// One health request; any error counts as "not answering"
    pub async fn probe(&self) -> bool {
        match self.api.health().await {
            Ok(()) => {
                self.session.mark_ready();
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Server not ready");
                false
            }
        }
    }

    /// [`ensure_ready_with`](Self::ensure_ready_with) using the configured policy
    pub async fn ensure_ready(&self) -> bool {
        self.ensure_ready_with(&self.policy).await
    }

    /// Probe until the backend answers or the attempts run out.
    ///
    /// Returns immediately when the session is already marked ready.
    pub async fn ensure_ready_with(&self, policy: &BackoffPolicy) -> bool {
        if self.session.is_ready() {
            return true;
        }

        for attempt in 1..=policy.max_attempts {
            tracing::info!(attempt, max_attempts = policy.max_attempts, "Connecting to server...");

            if self.probe().await {
                tracing::info!(attempt, "Server connected");
                return true;
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.delay()).await;
            }
        }

        tracing::warn!(
            attempts = policy.max_attempts,
            "Could not reach server after several attempts"
        );
        false
    }
}
