//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | THUNDER_BACKEND_URL | http://localhost:5000 | Backend base URL |
//! | THUNDER_REQUEST_TIMEOUT_SECS | 30 | Per-request timeout |
//! | THUNDER_PROBE_TIMEOUT_MS | 8000 | Health probe timeout |
//! | THUNDER_PROBE_ATTEMPTS | 8 | Readiness attempts |
//! | THUNDER_PROBE_INTERVAL_MS | 4000 | Wait between failed attempts |
//! | THUNDER_PROBE_JITTER_MS | 0 | Extra random wait, upper bound |
//! | THUNDER_PAGE_SIZE | 10 | Orders per page |
//! | THUNDER_TOAST_MS | 3000 | "Saved" toast lifetime |
//! | THUNDER_AUTH_EXPIRY | reload | `reload` or `reprompt` on 401 |
//! | THUNDER_SAVE_PAYLOAD | full | `full` or `changed` row PUT body |

use std::str::FromStr;
use std::time::Duration;

use crate::prober::BackoffPolicy;

/// What happens after a 401 drops the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthExpiry {
    /// Abort and require a full restart / re-login
    #[default]
    Reload,
    /// Ask for the password again inline
    Reprompt,
}

impl FromStr for AuthExpiry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reload" => Ok(Self::Reload),
            "reprompt" => Ok(Self::Reprompt),
            other => Err(format!("invalid auth expiry policy: {other}")),
        }
    }
}

/// Shape of the row save PUT body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavePayload {
    /// Every editable field of the row
    #[default]
    FullRow,
    /// Only fields that differ from the last persisted values
    ChangedOnly,
}

impl FromStr for SavePayload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "full-row" => Ok(Self::FullRow),
            "changed" | "changed-only" => Ok(Self::ChangedOnly),
            other => Err(format!("invalid save payload mode: {other}")),
        }
    }
}

/// Client configuration for talking to the recharge backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Timeout for data requests
    pub request_timeout: Duration,
    /// Timeout for a single health probe
    pub probe_timeout: Duration,
    /// Readiness retry policy
    pub readiness: BackoffPolicy,
    /// Orders per page
    pub page_size: u32,
    /// Lifetime of transient notifications
    pub toast_duration: Duration,
    pub auth_expiry: AuthExpiry,
    pub save_payload: SavePayload,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_millis(8000),
            readiness: BackoffPolicy::default(),
            page_size: 10,
            toast_duration: Duration::from_millis(3000),
            auth_expiry: AuthExpiry::default(),
            save_payload: SavePayload::default(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            let raw = lookup(key)?;
            match raw.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
                    None
                }
            }
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        let mut config = Self::new(
            lookup("THUNDER_BACKEND_URL").unwrap_or_else(|| "http://localhost:5000".into()),
        );

        if let Some(secs) = parsed::<u64>(lookup, "THUNDER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parsed::<u64>(lookup, "THUNDER_PROBE_TIMEOUT_MS") {
            config.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = parsed::<u32>(lookup, "THUNDER_PROBE_ATTEMPTS") {
            config.readiness.max_attempts = attempts;
        }
        if let Some(ms) = parsed::<u64>(lookup, "THUNDER_PROBE_INTERVAL_MS") {
            config.readiness.interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed::<u64>(lookup, "THUNDER_PROBE_JITTER_MS") {
            config.readiness.jitter = Duration::from_millis(ms);
        }
        if let Some(size) = parsed::<u32>(lookup, "THUNDER_PAGE_SIZE").filter(|s| *s > 0) {
            config.page_size = size;
        }
        if let Some(ms) = parsed::<u64>(lookup, "THUNDER_TOAST_MS") {
            config.toast_duration = Duration::from_millis(ms);
        }
        if let Some(policy) = parsed(lookup, "THUNDER_AUTH_EXPIRY") {
            config.auth_expiry = policy;
        }
        if let Some(mode) = parsed(lookup, "THUNDER_SAVE_PAYLOAD") {
            config.save_payload = mode;
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_readiness(mut self, policy: BackoffPolicy) -> Self {
        self.readiness = policy;
        self
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    pub fn with_auth_expiry(mut self, policy: AuthExpiry) -> Self {
        self.auth_expiry = policy;
        self
    }

    pub fn with_save_payload(mut self, mode: SavePayload) -> Self {
        self.save_payload = mode;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}
