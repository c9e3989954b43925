use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime tuning for retries, retention, and the HTTP surfaces. Threaded
/// explicitly through the scheduler, worker, and ingestion path rather than
/// read from a process-wide singleton, so tests can build independent
/// instances with different tunings (e.g. zero-backoff for fast retry
/// tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub max_retries: u32,
    pub retry_backoff_base: u64,
    pub retry_backoff_factor_seconds: u64,
    pub retry_backoff_max_seconds: u64,
    pub retry_jitter: bool,

    pub retention_days: u32,

    pub request_timeout_connect_seconds: u64,
    pub request_timeout_read_seconds: u64,

    pub audit_enabled: bool,
    pub extra_ca_bundle_paths: Vec<String>,

    pub scheduler_tick_interval_seconds: u64,
    pub scheduler_batch_size: usize,

    pub cloudevents_specversion: String,

    /// When true, the callback-URL reachability probe (§4.8) also checks
    /// that the URL rejects unauthenticated requests.
    pub test_callback_auth: bool,

    pub bind_address: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_backoff_base: 2,
            retry_backoff_factor_seconds: 3,
            retry_backoff_max_seconds: 48,
            retry_jitter: false,
            retention_days: 30,
            request_timeout_connect_seconds: 10,
            request_timeout_read_seconds: 30,
            audit_enabled: true,
            extra_ca_bundle_paths: Vec::new(),
            scheduler_tick_interval_seconds: 1,
            scheduler_batch_size: 100,
            cloudevents_specversion: "1.0".to_string(),
            test_callback_auth: false,
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl RelayConfig {
    /// Loads `.env` (if present) then layers environment variables over the
    /// defaults. Unset variables keep their default; a present-but-unparsable
    /// value is a hard error rather than a silent fallback.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Some(v) = env_u32("RELAY_MAX_RETRIES")? {
            config.max_retries = v;
        }
        if let Some(v) = env_u64("RELAY_RETRY_BACKOFF_BASE")? {
            config.retry_backoff_base = v;
        }
        if let Some(v) = env_u64("RELAY_RETRY_BACKOFF_FACTOR_SECONDS")? {
            config.retry_backoff_factor_seconds = v;
        }
        if let Some(v) = env_u64("RELAY_RETRY_BACKOFF_MAX_SECONDS")? {
            config.retry_backoff_max_seconds = v;
        }
        if let Some(v) = env_bool("RELAY_RETRY_JITTER")? {
            config.retry_jitter = v;
        }
        if let Some(v) = env_u32("RELAY_RETENTION_DAYS")? {
            config.retention_days = v;
        }
        if let Some(v) = env_u64("RELAY_REQUEST_TIMEOUT_CONNECT_SECONDS")? {
            config.request_timeout_connect_seconds = v;
        }
        if let Some(v) = env_u64("RELAY_REQUEST_TIMEOUT_READ_SECONDS")? {
            config.request_timeout_read_seconds = v;
        }
        if let Some(v) = env_bool("RELAY_AUDIT_ENABLED")? {
            config.audit_enabled = v;
        }
        if let Ok(v) = env::var("RELAY_EXTRA_CA_BUNDLE_PATHS") {
            config.extra_ca_bundle_paths = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Some(v) = env_u64("RELAY_SCHEDULER_TICK_INTERVAL_SECONDS")? {
            config.scheduler_tick_interval_seconds = v;
        }
        if let Some(v) = env_usize("RELAY_SCHEDULER_BATCH_SIZE")? {
            config.scheduler_batch_size = v;
        }
        if let Ok(v) = env::var("RELAY_CLOUDEVENTS_SPECVERSION") {
            config.cloudevents_specversion = v;
        }
        if let Some(v) = env_bool("RELAY_TEST_CALLBACK_AUTH")? {
            config.test_callback_auth = v;
        }
        if let Ok(v) = env::var("RELAY_BIND_ADDRESS") {
            config.bind_address = v;
        }

        Ok(config)
    }

    pub fn request_timeout_connect(&self) -> Duration {
        Duration::from_secs(self.request_timeout_connect_seconds)
    }

    pub fn request_timeout_read(&self) -> Duration {
        Duration::from_secs(self.request_timeout_read_seconds)
    }

    pub fn scheduler_tick_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_tick_interval_seconds)
    }
}

fn env_u32(key: &'static str) -> Result<Option<u32>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue { key, message: e.to_string() }),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue { key, message: e.to_string() }),
        Err(_) => Ok(None),
    }
}

fn env_usize(key: &'static str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue { key, message: e.to_string() }),
        Err(_) => Ok(None),
    }
}

fn env_bool(key: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            other => Err(ConfigError::InvalidValue {
                key,
                message: format!("expected a boolean, got {other:?}"),
            }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = RelayConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_backoff_base, 2);
        assert_eq!(config.retry_backoff_factor_seconds, 3);
        assert_eq!(config.retry_backoff_max_seconds, 48);
        assert!(!config.retry_jitter);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.cloudevents_specversion, "1.0");
    }
}
