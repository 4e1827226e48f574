//! Backend location and transport settings.

use std::time::Duration;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "CATALOG_BACKEND_URL";
/// Environment variable holding the request timeout in whole seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "CATALOG_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Applied by the transport; the core itself never times out a request.
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CatalogConfig {
    /// Read settings from the process environment, falling back to defaults
    /// for unset or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup(BACKEND_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let request_timeout = match lookup(REQUEST_TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "ignoring invalid {REQUEST_TIMEOUT_ENV}");
                    defaults.request_timeout
                }
            },
            None => defaults.request_timeout,
        };
        Self {
            base_url,
            request_timeout,
        }
    }
}
