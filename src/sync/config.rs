use std::time::Duration;

use crate::alerting::Credentials;

/// Default bound on sync passes running at once
pub const DEFAULT_MAX_CONCURRENT_SYNCS: usize = 4;

/// Alerting backend configuration, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Backend base URL; sync is disabled without one
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout; none means wait indefinitely
    pub timeout: Option<Duration>,
    pub max_concurrent_syncs: usize,
}

impl SyncConfig {
    /// Configuration with sync turned off
    pub fn disabled() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            timeout: None,
            max_concurrent_syncs: DEFAULT_MAX_CONCURRENT_SYNCS,
        }
    }

    /// Sync against the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::disabled()
        }
    }

    /// Read configuration from environment variables
    /// SEYREN_URL=http://seyren:8080
    /// SEYREN_USERNAME=grafana
    /// SEYREN_PASSWORD=secret
    /// SEYREN_TIMEOUT_SECS=30
    /// CHECKSYNC_MAX_CONCURRENT_SYNCS=4
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            base_url: non_empty("SEYREN_URL").map(|u| u.trim().to_string()),
            username: non_empty("SEYREN_USERNAME"),
            password: non_empty("SEYREN_PASSWORD"),
            timeout: non_empty("SEYREN_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            max_concurrent_syncs: non_empty("CHECKSYNC_MAX_CONCURRENT_SYNCS")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_SYNCS),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_concurrent_syncs(mut self, max: usize) -> Self {
        self.max_concurrent_syncs = max.max(1);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    /// Basic auth credentials, if either half is set.
    ///
    /// A missing half is sent as an empty string.
    pub fn credentials(&self) -> Option<Credentials> {
        if self.username.is_none() && self.password.is_none() {
            return None;
        }
        Some(Credentials {
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
        })
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::disabled()
    }
}
