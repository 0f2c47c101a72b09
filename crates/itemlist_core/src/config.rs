//! Store configuration and validation.
//!
//! # Responsibility
//! - Describe which backing collaborator a controller uses and how it
//!   persists and mints ids.
//! - Reject unusable settings before any storage is touched.
//!
//! # Invariants
//! - On-disk locations must be absolute paths.
//! - Remote base URLs must be http(s).

use crate::repo::snapshot_store::DEFAULT_STORAGE_KEY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// How a snapshot-backed controller treats a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Keep the in-memory change and mark the store dirty.
    #[default]
    BestEffort,
    /// Apply the change only after the write succeeded.
    Strict,
}

/// Identifier scheme for locally created records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScheme {
    #[default]
    Uuid,
    /// Base36 epoch millis plus random suffix.
    Timestamp,
}

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Process-local snapshot; nothing survives the process.
    Memory,
    /// One JSON file per storage key inside `dir`.
    File { dir: PathBuf },
    /// `kv_entries` table in a SQLite database file.
    Sqlite { path: PathBuf },
    /// REST collection rooted at `base_url`.
    Http { base_url: String, timeout_ms: u64 },
}

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    /// Snapshot key; ignored by the HTTP backend.
    pub storage_key: String,
    pub write_policy: WritePolicy,
    pub id_scheme: IdScheme,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Memory,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            write_policy: WritePolicy::default(),
            id_scheme: IdScheme::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_backend(backend: BackendConfig) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Checks settings that would otherwise fail late inside a backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::BlankStorageKey);
        }
        match &self.backend {
            BackendConfig::Memory => Ok(()),
            BackendConfig::File { dir: path } | BackendConfig::Sqlite { path } => {
                if path.is_absolute() {
                    Ok(())
                } else {
                    Err(ConfigError::RelativePath(path.clone()))
                }
            }
            BackendConfig::Http {
                base_url,
                timeout_ms,
            } => {
                let trimmed = base_url.trim();
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(ConfigError::InvalidBaseUrl(base_url.clone()));
                }
                if *timeout_ms == 0 {
                    return Err(ConfigError::ZeroTimeout);
                }
                Ok(())
            }
        }
    }

    /// HTTP timeout, when the backend is remote.
    pub fn http_timeout(&self) -> Option<Duration> {
        match self.backend {
            BackendConfig::Http { timeout_ms, .. } => Some(Duration::from_millis(timeout_ms)),
            _ => None,
        }
    }
}

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    BlankStorageKey,
    RelativePath(PathBuf),
    InvalidBaseUrl(String),
    ZeroTimeout,
    UnknownValue { field: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankStorageKey => write!(f, "storage key must not be blank"),
            Self::RelativePath(path) => {
                write!(f, "path must be absolute, got `{}`", path.display())
            }
            Self::InvalidBaseUrl(value) => {
                write!(f, "base url must start with http:// or https://, got `{value}`")
            }
            Self::ZeroTimeout => write!(f, "http timeout must be greater than zero"),
            Self::UnknownValue { field, value } => write!(f, "unknown {field} `{value}`"),
        }
    }
}

impl Error for ConfigError {}

impl FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::UnknownValue {
                field: "write policy",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for IdScheme {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(Self::Uuid),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(ConfigError::UnknownValue {
                field: "id scheme",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendConfig, ConfigError, IdScheme, StoreConfig, WritePolicy};
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid_memory_store() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, BackendConfig::Memory);
        assert_eq!(config.storage_key, "simple_crud_items_v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn relative_paths_are_rejected() {
        let config = StoreConfig::with_backend(BackendConfig::File {
            dir: PathBuf::from("data/items"),
        });
        assert!(matches!(config.validate(), Err(ConfigError::RelativePath(_))));
    }

    #[test]
    fn http_backend_requires_scheme_and_timeout() {
        let bad_scheme = StoreConfig::with_backend(BackendConfig::Http {
            base_url: "ftp://example.test".to_string(),
            timeout_ms: 1_000,
        });
        assert!(matches!(bad_scheme.validate(), Err(ConfigError::InvalidBaseUrl(_))));

        let zero_timeout = StoreConfig::with_backend(BackendConfig::Http {
            base_url: "https://example.test".to_string(),
            timeout_ms: 0,
        });
        assert_eq!(zero_timeout.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn enums_parse_from_cli_text() {
        assert_eq!("Strict".parse::<WritePolicy>().unwrap(), WritePolicy::Strict);
        assert_eq!("best-effort".parse::<WritePolicy>().unwrap(), WritePolicy::BestEffort);
        assert_eq!("timestamp".parse::<IdScheme>().unwrap(), IdScheme::Timestamp);
        assert!("sometimes".parse::<WritePolicy>().is_err());
    }
}
