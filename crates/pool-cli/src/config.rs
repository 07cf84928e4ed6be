//! Registry connection settings.
//!
//! Built from CLI flags (each with a `POOLCTL_*` environment fallback) and
//! handed to [`Registry::open`](crate::store::Registry::open).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::StoreError;

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const FILE_SCHEME: &str = "file://";

/// Where the registry lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Registry URL.
    pub url: String,
    /// Connection timeout for remote registries.
    pub connect_timeout: Duration,
    /// Per-request timeout for remote registries.
    pub request_timeout: Duration,
}

impl RegistryConfig {
    /// Settings for `url` with default timeouts.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Resolve the URL into a registry target.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] for unsupported schemes or an empty
    /// `file://` path.
    pub fn target(&self) -> Result<RegistryTarget, StoreError> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            return Ok(RegistryTarget::Remote(self.url.clone()));
        }
        if let Some(path) = self.url.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(StoreError::Config("file:// registry needs a path".into()));
            }
            return Ok(RegistryTarget::Local(PathBuf::from(path)));
        }
        Err(StoreError::Config(format!(
            "invalid registry URL: {}, must start with ws://, wss:// or file://",
            self.url
        )))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new("ws://localhost:8080")
    }
}

/// A resolved registry location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryTarget {
    /// Remote registry reached over WebSocket.
    Remote(String),
    /// Local JSON state file.
    Local(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn websocket_urls_are_remote() {
        let target = RegistryConfig::new("wss://pools.internal:443").target().expect("valid");
        assert_eq!(target, RegistryTarget::Remote("wss://pools.internal:443".into()));
    }

    #[test]
    fn file_urls_are_local() {
        let target = RegistryConfig::new("file:///var/lib/pools.json").target().expect("valid");
        assert_eq!(target, RegistryTarget::Local(PathBuf::from("/var/lib/pools.json")));
    }

    #[test]
    fn relative_file_path_is_kept() {
        let target = RegistryConfig::new("file://pools.json").target().expect("valid");
        assert_eq!(target, RegistryTarget::Local(PathBuf::from("pools.json")));
    }

    #[test_case("file://"; "empty file path")]
    #[test_case("http://localhost:8080"; "http")]
    #[test_case("localhost:8080"; "no scheme")]
    #[test_case(""; "empty")]
    fn unsupported_urls_rejected(url: &str) {
        let err = RegistryConfig::new(url).target().expect_err("rejected");
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn default_timeouts() {
        let config = RegistryConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
