//! Configuration for chirpstore
//!
//! Centralized configuration with sensible defaults and environment
//! overrides.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Main configuration for a chirpstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The single JSON file holding the store snapshot
    pub snapshot_path: PathBuf,

    // -------------------------------------------------------------------------
    // Sync Configuration
    // -------------------------------------------------------------------------
    /// How often the scheduler snapshots the store
    pub sync_interval: Duration,

    /// Retry policy for a failed snapshot write
    pub sync_retry: RetryPolicy,

    /// Skip writing a snapshot identical to the last one written
    pub skip_unchanged: bool,

    // -------------------------------------------------------------------------
    // Collaborator Secrets
    // -------------------------------------------------------------------------
    /// Secrets consumed by the auth and webhook layers, never by the store
    pub secrets: Secrets,
}

/// Bounded exponential backoff for snapshot writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per tick, including the first (at least 1)
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_backoff: Duration,

    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Secrets handed through to external collaborators
#[derive(Clone, Default)]
pub struct Secrets {
    /// Signing key for bearer tokens
    pub jwt_secret: Option<String>,

    /// API key expected on billing webhooks
    pub webhook_api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("webhook_api_key", &redact(&self.webhook_api_key))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./data.json"),
            sync_interval: Duration::from_secs(10),
            sync_retry: RetryPolicy::default(),
            skip_unchanged: false,
            secrets: Secrets::default(),
        }
    }
}

impl Config {
    // =========================================================================
    // Environment Variables
    // =========================================================================
    pub const ENV_DB_PATH: &'static str = "CHIRPSTORE_DB_PATH";
    pub const ENV_SYNC_INTERVAL_SECS: &'static str = "CHIRPSTORE_SYNC_INTERVAL_SECS";
    pub const ENV_SYNC_MAX_ATTEMPTS: &'static str = "CHIRPSTORE_SYNC_MAX_ATTEMPTS";
    pub const ENV_JWT_SECRET: &'static str = "JWT_SECRET";
    pub const ENV_WEBHOOK_API_KEY: &'static str = "POLKA_KEY";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reopen this config for further overrides
    pub fn into_builder(self) -> ConfigBuilder {
        ConfigBuilder { config: self }
    }

    /// Defaults overridden by whatever the process environment sets
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        if let Some(path) = lookup(Self::ENV_DB_PATH) {
            builder = builder.snapshot_path(path);
        }
        if let Some(raw) = lookup(Self::ENV_SYNC_INTERVAL_SECS) {
            let secs: u64 = parse_var(Self::ENV_SYNC_INTERVAL_SECS, &raw)?;
            builder = builder.sync_interval(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup(Self::ENV_SYNC_MAX_ATTEMPTS) {
            let attempts: u32 = parse_var(Self::ENV_SYNC_MAX_ATTEMPTS, &raw)?;
            builder = builder.sync_max_attempts(attempts);
        }
        if let Some(secret) = lookup(Self::ENV_JWT_SECRET) {
            builder = builder.jwt_secret(secret);
        }
        if let Some(key) = lookup(Self::ENV_WEBHOOK_API_KEY) {
            builder = builder.webhook_api_key(key);
        }

        builder.try_build()
    }

    /// Check values the scheduler cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(StoreError::Config("snapshot path is empty".to_string()));
        }
        if self.sync_interval.is_zero() {
            return Err(StoreError::Config(
                "sync interval must be greater than zero".to_string(),
            ));
        }
        if self.sync_retry.max_attempts == 0 {
            return Err(StoreError::Config(
                "sync retry needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| StoreError::Config(format!("{} has invalid value {:?}", name, raw)))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Set the sync interval
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.config.sync_interval = interval;
        self
    }

    /// Set the whole retry policy
    pub fn sync_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.sync_retry = policy;
        self
    }

    /// Set the number of write attempts per tick
    pub fn sync_max_attempts(mut self, attempts: u32) -> Self {
        self.config.sync_retry.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry
    pub fn sync_initial_backoff(mut self, backoff: Duration) -> Self {
        self.config.sync_retry.initial_backoff = backoff;
        self
    }

    /// Skip writes whose snapshot matches the last one written
    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.config.skip_unchanged = skip;
        self
    }

    /// Set the token signing secret
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secrets.jwt_secret = Some(secret.into());
        self
    }

    /// Set the webhook API key
    pub fn webhook_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.secrets.webhook_api_key = Some(key.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate
    pub fn try_build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
