//! # Configuration
//!
//! Optional TOML configuration for the CLI.
//!
//! Resolution order:
//! 1. `--config <path>` (must exist)
//! 2. `TAXON_CONFIG` environment variable (must exist)
//! 3. `taxon.toml` in the working directory (optional)
//! 4. Built-in defaults
//!
//! ```toml
//! [store]
//! reingest = "merge"      # merge | replace | reject
//! ordering = "as_given"   # as_given | topological
//!
//! [limits]
//! max_fixture_bytes = 104857600
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taxon_core::{StoreOptions, TaxonError};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taxon.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TAXON_CONFIG";

/// Maximum fixture document size (100 MB).
pub const MAX_FIXTURE_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Input size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_fixture_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_fixture_bytes: MAX_FIXTURE_FILE_SIZE,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonConfig {
    pub store: StoreOptions,
    pub limits: Limits,
}

impl TaxonConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, TaxonError> {
        toml::from_str(text).map_err(|e| TaxonError::Config(e.to_string()))
    }

    /// Load a config file that must exist.
    pub fn from_file(path: &Path) -> Result<Self, TaxonError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TaxonError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Resolve and load the configuration from the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, TaxonError> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::resolve(explicit, from_env.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Pick the first config source that applies.
    ///
    /// `explicit` and `from_env` must name existing files. `fallback` is
    /// read only when it exists.
    pub fn resolve(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        fallback: &Path,
    ) -> Result<Self, TaxonError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config from --config");
            return Self::from_file(path);
        }

        if let Some(path) = from_env {
            tracing::debug!(path = %path.display(), "loading config from {}", CONFIG_ENV_VAR);
            return Self::from_file(path);
        }

        if fallback.is_file() {
            tracing::debug!(path = %fallback.display(), "loading default config file");
            return Self::from_file(fallback);
        }

        Ok(Self::default())
    }
}
