//! Configuration System using Figment
//!
//! Configuration is loaded from:
//! 1. `config/camfeed.toml` (base configuration, optional)
//! 2. Environment variables prefixed with `CAMFEED_`, nested with `__`
//!    (e.g. `CAMFEED_BACKEND__PAGE_URL=http://rover.local:5000/`)
//!
//! The frame rate is deliberately absent: it is read from the backend's
//! settings document at startup.
//!
//! # Example
//! ```no_run
//! use camfeed::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("Page: {:?}", config.backend.page_url);
//! # Ok::<(), camfeed::error::SessionError>(())
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AppResult, SessionError};
use crate::stream::SessionTimings;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/camfeed.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Where the page, settings and frames live
    #[serde(default)]
    pub backend: BackendConfig,
    /// Refresh loop and recovery timings
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Backend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Page URL; control packets are posted to its path.
    /// Falls back to `CAMFEED_PAGE_URL`, then `http://127.0.0.1:5000/`.
    #[serde(default)]
    pub page_url: Option<String>,
    /// Settings document, relative to the page
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
    /// Frame image, relative to the page
    #[serde(default = "default_frame_path")]
    pub frame_path: String,
    /// TCP/TLS connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Whole-request timeout for settings and control requests, in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Largest frame body accepted by a probe, in bytes
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

/// Stream timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Budget for a single frame probe, in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// Period of the recovery probe while stopped, in milliseconds
    #[serde(default = "default_recovery_interval")]
    pub recovery_interval_ms: u64,
}

fn default_name() -> String {
    "camfeed".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_settings_path() -> String {
    "/settings".to_string()
}

fn default_frame_path() -> String {
    "static/img/cam.jpg".to_string()
}

fn default_connect_timeout() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    5000
}

fn default_max_frame_bytes() -> usize {
    camfeed_client::DEFAULT_MAX_FRAME_BYTES
}

fn default_probe_timeout() -> u64 {
    1000
}

fn default_recovery_interval() -> u64 {
    3000
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            settings_path: default_settings_path(),
            frame_path: default_frame_path(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout(),
            recovery_interval_ms: default_recovery_interval(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/camfeed.toml` and environment variables
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        Ok(Self::figment(path.as_ref()).extract()?)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAMFEED_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        crate::logging::parse_level(&self.application.log_level)?;
        self.application.log_format.parse::<crate::logging::LogFormat>()?;

        for (name, value) in [
            ("backend.settings_path", &self.backend.settings_path),
            ("backend.frame_path", &self.backend.frame_path),
        ] {
            if value.trim().is_empty() {
                return Err(SessionError::Configuration(format!("{name} cannot be empty")));
            }
        }

        for (name, value) in [
            ("backend.connect_timeout_ms", self.backend.connect_timeout_ms),
            ("backend.request_timeout_ms", self.backend.request_timeout_ms),
            ("stream.probe_timeout_ms", self.stream.probe_timeout_ms),
            ("stream.recovery_interval_ms", self.stream.recovery_interval_ms),
            ("backend.max_frame_bytes", self.backend.max_frame_bytes as u64),
        ] {
            if value == 0 {
                return Err(SessionError::Configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        Ok(())
    }

    /// Session timings derived from the `[stream]` section.
    #[must_use]
    pub fn session_timings(&self) -> SessionTimings {
        SessionTimings {
            probe_budget: Duration::from_millis(self.stream.probe_timeout_ms),
            recovery_interval: Duration::from_millis(self.stream.recovery_interval_ms),
        }
    }

    /// HTTP timeouts derived from the `[backend]` section.
    #[must_use]
    pub fn http_config(&self) -> camfeed_client::HttpConfig {
        camfeed_client::HttpConfig {
            connect_timeout: Duration::from_millis(self.backend.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.backend.request_timeout_ms),
            max_frame_bytes: self.backend.max_frame_bytes,
        }
    }
}
