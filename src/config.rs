//! Configuration management for the countdown service.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::{CountdownError, Result};

/// Environment variable prefix, e.g. `COUNTDOWN__RATE_LIMITING__MAX_REQUESTS=5`.
const ENV_PREFIX: &str = "COUNTDOWN";

/// Longest accepted counting window: 366 days.
pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

/// Main configuration for the countdown service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Creation rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitConfig,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// Deadline for a single store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// How often expired store entries are reclaimed, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            store_timeout_ms: default_store_timeout_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl ServerConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_store_timeout_ms() -> u64 {
    2000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Fixed-window limit on countdown creation, per client identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of one counting window, in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Creations admitted per identity per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,

    /// Honor `X-Forwarded-For` / `X-Real-IP` when deriving the identity
    #[serde(default)]
    pub trust_proxy: bool,

    /// Global kill switch; when false every request is admitted
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            trust_proxy: false,
            enabled: default_enabled(),
        }
    }
}

impl RateLimitConfig {
    /// Window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Window length in milliseconds.
    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

fn default_window_secs() -> u64 {
    180
}

fn default_max_requests() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

impl ServiceConfig {
    /// Load configuration once at startup.
    ///
    /// Layers, lowest precedence first: built-in defaults, the optional YAML
    /// file at `path`, then `COUNTDOWN__<SECTION>__<KEY>` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder
                .add_source(config::File::from(path).format(config::FileFormat::Yaml));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CountdownError::Config(e.to_string()))?;

        let config: ServiceConfig = settings
            .try_deserialize()
            .map_err(|e| CountdownError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)
            .map_err(|e| CountdownError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limiting.window_secs == 0 {
            return Err(CountdownError::Config(
                "rate_limiting.window_secs must be greater than zero".to_string(),
            ));
        }
        if self.rate_limiting.window_secs > MAX_WINDOW_SECS {
            return Err(CountdownError::Config(format!(
                "rate_limiting.window_secs must not exceed {}",
                MAX_WINDOW_SECS
            )));
        }
        if self.rate_limiting.max_requests == 0 {
            return Err(CountdownError::Config(
                "rate_limiting.max_requests must be greater than zero".to_string(),
            ));
        }
        if self.server.store_timeout_ms == 0 {
            return Err(CountdownError::Config(
                "server.store_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.server.sweep_interval_secs == 0 {
            return Err(CountdownError::Config(
                "server.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
