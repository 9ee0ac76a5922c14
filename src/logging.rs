//! Tracing setup
//!
//! Installs a `tracing-subscriber` registry with one `fmt` layer. The
//! configured level applies to the `camfeed` crates only; the HTTP stack
//! underneath stays at `warn` unless `RUST_LOG` says otherwise.
//!
//! # Example
//! ```no_run
//! use camfeed::{config::AppConfig, logging};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! logging::init_from_config(&config)?;
//! tracing::info!("Feed controller starting");
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::AppConfig;
use crate::error::{AppResult, SessionError};

/// Crates whose events follow the configured level.
const OWN_TARGETS: [&str; 2] = ["camfeed", "camfeed_client"];

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, coloured
    #[default]
    Pretty,
    /// One line per event, no colour
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(SessionError::Configuration(format!(
                "Invalid log format '{other}'. Must be one of: pretty, compact, json"
            ))),
        }
    }
}

/// Parse a level name, case-insensitively.
pub fn parse_level(level: &str) -> AppResult<Level> {
    Level::from_str(level.trim()).map_err(|_| {
        SessionError::Configuration(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        ))
    })
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Level for the `camfeed` crates
    pub level: Level,
    /// Line layout
    pub format: LogFormat,
    /// Emit span open/close events (useful when tracing probe latency)
    pub span_events: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            span_events: false,
        }
    }
}

impl LogSettings {
    /// Read level and format from the `[application]` section.
    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            level: parse_level(&config.application.log_level)?,
            format: config.application.log_format.parse()?,
            ..Default::default()
        })
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        let mut directive = String::from("warn");
        for target in OWN_TARGETS {
            directive.push_str(&format!(",{target}={level}"));
        }
        directive
    }
}

/// Install the global subscriber described by the application config.
pub fn init_from_config(config: &AppConfig) -> AppResult<()> {
    init(&LogSettings::from_app_config(config)?)
}

/// Install the global subscriber.
///
/// A second call leaves the first subscriber in place and returns `Ok`.
pub fn init(settings: &LogSettings) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.default_directive()))
        .map_err(|e| SessionError::Configuration(format!("Bad log filter: {e}")))?;

    let span_events = if settings.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = match settings.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(false)
            .with_span_events(span_events)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_events(span_events)
            .with_filter(filter)
            .boxed(),
    };

    if let Err(e) = tracing_subscriber::registry().with(layer).try_init() {
        tracing::debug!(error = %e, "Subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(matches!(
            parse_level("verbose"),
            Err(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn format_names() {
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn settings_follow_application_section() {
        let mut config = AppConfig::default();
        config.application.log_level = "debug".into();
        config.application.log_format = "json".into();

        let settings = LogSettings::from_app_config(&config).unwrap();
        assert_eq!(settings.level, Level::DEBUG);
        assert_eq!(settings.format, LogFormat::Json);
        assert!(!settings.span_events);
    }

    #[test]
    fn default_directive_scopes_level_to_own_crates() {
        let settings = LogSettings {
            level: Level::TRACE,
            ..Default::default()
        };
        assert_eq!(
            settings.default_directive(),
            "warn,camfeed=trace,camfeed_client=trace"
        );
    }
}
