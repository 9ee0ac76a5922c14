//! Page address configuration and URL normalization.
//!
//! The controller talks to a single web page backend: control packets are
//! posted to the page's own path, and the settings document and frame image
//! are resolved relative to it.
//!
//! - [`PageAddress`]: Validated page URL with source tracking
//! - [`AddressSource`]: Where the address configuration came from
//! - [`AddressError`]: Why an address was rejected
//!
//! # Address Resolution Precedence
//!
//! 1. Value from the configuration file
//! 2. `CAMFEED_PAGE_URL` environment variable
//! 3. Default: `http://127.0.0.1:5000/`
//!
//! # Example
//!
//! ```
//! use camfeed_client::connection::{AddressSource, PageAddress};
//!
//! let addr = PageAddress::parse("rover.local:5000/drive", AddressSource::UserInput)?;
//! assert_eq!(addr.as_str(), "http://rover.local:5000/drive");
//! assert_eq!(addr.path(), "/drive");
//! # Ok::<(), camfeed_client::connection::AddressError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Environment variable consulted when no page URL is configured.
pub const PAGE_URL_ENV: &str = "CAMFEED_PAGE_URL";

/// Default page address when no configuration is provided.
pub const DEFAULT_PAGE_URL: &str = "http://127.0.0.1:5000/";

/// Source of the page address configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressSource {
    /// Hardcoded default (`http://127.0.0.1:5000/`)
    Default,
    /// Loaded from `CAMFEED_PAGE_URL`
    Environment,
    /// Read from the configuration file
    Config,
    /// Supplied directly by the caller
    UserInput,
}

impl AddressSource {
    /// Returns a short label for log output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Environment => "env",
            Self::Config => "config",
            Self::UserInput => "user",
        }
    }
}

/// Validated page address with metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAddress {
    url: Url,
    source: AddressSource,
}

impl PageAddress {
    /// Parse and normalize a page URL.
    pub fn parse(input: &str, source: AddressSource) -> Result<Self, AddressError> {
        Ok(Self {
            url: normalize_url(input)?,
            source,
        })
    }

    /// Returns the normalized URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path component of the page; control packets are posted here.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns where this address came from.
    #[must_use]
    pub fn source(&self) -> AddressSource {
        self.source
    }

    /// Resolve a path or URL relative to the page.
    ///
    /// Absolute paths (`/settings`) replace the page path, relative ones are
    /// resolved against the page's directory, full URLs pass through.
    pub fn join(&self, reference: &str) -> Result<Url, url::ParseError> {
        self.url.join(reference)
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Why a page URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address cannot be empty")]
    EmptyInput,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("URL must include a host")]
    MissingHost,
    #[error("Unsupported scheme '{0}' (use http or https)")]
    UnsupportedScheme(String),
}

/// Normalize a page URL string.
///
/// - Trims whitespace
/// - Adds `http://` scheme if missing
/// - Rejects anything that is not http/https or lacks a host
///
/// The path is kept as given since it identifies the page itself.
///
/// ```
/// use camfeed_client::connection::normalize_url;
///
/// let url = normalize_url("192.168.1.40:5000")?;
/// assert_eq!(url.as_str(), "http://192.168.1.40:5000/");
/// # Ok::<(), camfeed_client::connection::AddressError>(())
/// ```
pub fn normalize_url(input: &str) -> Result<Url, AddressError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(AddressError::EmptyInput);
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("http://{input}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| AddressError::InvalidUrl(e.to_string()))?;

    let scheme = url.scheme().to_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(AddressError::UnsupportedScheme(scheme));
    }

    if url.host().is_none() {
        return Err(AddressError::MissingHost);
    }

    Ok(url)
}

/// Resolve the page address from configuration, environment, then default.
///
/// Invalid candidates are skipped with a warning; this never fails.
pub fn resolve_address(configured: Option<&str>) -> PageAddress {
    resolve_address_from(configured, std::env::var(PAGE_URL_ENV).ok().as_deref())
}

/// Same as [`resolve_address`] with the environment value passed explicitly.
pub fn resolve_address_from(configured: Option<&str>, env_value: Option<&str>) -> PageAddress {
    if let Some(input) = configured.filter(|s| !s.trim().is_empty()) {
        match PageAddress::parse(input, AddressSource::Config) {
            Ok(addr) => return addr,
            Err(e) => tracing::warn!(input, error = %e, "Ignoring configured page URL"),
        }
    }

    if let Some(input) = env_value.filter(|s| !s.trim().is_empty()) {
        match PageAddress::parse(input, AddressSource::Environment) {
            Ok(addr) => return addr,
            Err(e) => tracing::warn!(input, error = %e, "Ignoring {PAGE_URL_ENV}"),
        }
    }

    default_address()
}

fn default_address() -> PageAddress {
    PageAddress {
        url: Url::parse(DEFAULT_PAGE_URL).unwrap_or_else(|_| unreachable!("default URL is valid")),
        source: AddressSource::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_host_port() {
        let url = normalize_url("127.0.0.1:5000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn test_normalize_keeps_page_path() {
        let url = normalize_url("http://rover.local:8080/camera").unwrap();
        assert_eq!(url.path(), "/camera");
    }

    #[test]
    fn test_normalize_ipv6() {
        let url = normalize_url("[::1]:8080").unwrap();
        assert_eq!(url.as_str(), "http://[::1]:8080/");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        let url = normalize_url("  localhost:5000  ").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_url("").unwrap_err(), AddressError::EmptyInput);
        assert_eq!(normalize_url("   ").unwrap_err(), AddressError::EmptyInput);
    }

    #[test]
    fn test_normalize_unsupported_scheme() {
        let err = normalize_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, AddressError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_page_address_join() {
        let addr = PageAddress::parse("http://rover.local:5000/drive", AddressSource::Config).unwrap();
        assert_eq!(
            addr.join("/settings").unwrap().as_str(),
            "http://rover.local:5000/settings"
        );
        assert_eq!(
            addr.join("static/cam.jpg").unwrap().as_str(),
            "http://rover.local:5000/static/cam.jpg"
        );
    }

    #[test]
    fn test_resolve_prefers_config() {
        let addr = resolve_address_from(Some("config.local:7777"), Some("http://env.local:8888"));
        assert_eq!(addr.as_str(), "http://config.local:7777/");
        assert_eq!(addr.source(), AddressSource::Config);
    }

    #[test]
    fn test_resolve_falls_back_to_env() {
        let addr = resolve_address_from(Some("   "), Some("http://env.local:8888"));
        assert_eq!(addr.source(), AddressSource::Environment);

        let addr = resolve_address_from(Some("ftp://bad"), Some("http://env.local:8888"));
        assert_eq!(addr.source(), AddressSource::Environment);
    }

    #[test]
    fn test_resolve_default() {
        let addr = resolve_address_from(None, None);
        assert_eq!(addr.as_str(), DEFAULT_PAGE_URL);
        assert_eq!(addr.source(), AddressSource::Default);
    }

    #[test]
    fn test_address_error_display() {
        assert_eq!(AddressError::EmptyInput.to_string(), "Address cannot be empty");
        assert!(AddressError::UnsupportedScheme("ftp".to_string())
            .to_string()
            .contains("ftp"));
    }
}
