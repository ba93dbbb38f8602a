//! Configuration file support for archmetrics.
//!
//! Loads optional `.archmetrics/config.toml` from the workspace root.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::fs_utils::{DEFAULT_EXCLUDED_DIRS, JAVA_EXTENSION};

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ArchMetricsConfig {
    pub cache: CacheConfig,
    pub workspace: WorkspaceConfig,
}

/// Debounce and freshness timing, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Delay between the last save and the recomputation it triggers.
    pub debounce_ms: u64,
    /// Saves arriving while the cached bundle is younger than this are
    /// ignored.
    pub freshness_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            freshness_ms: 3000,
        }
    }
}

/// Which files make up the workspace.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory names skipped at any depth during enumeration.
    pub excluded_dirs: Vec<String>,
    /// Source file extension, without the dot.
    pub extension: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            extension: JAVA_EXTENSION.to_string(),
        }
    }
}

/// Runtime knobs of the cache coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub debounce: Duration,
    pub freshness: Duration,
    pub extension: String,
    pub excluded_dirs: Vec<String>,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        ArchMetricsConfig::default().coordinator_settings()
    }
}

impl ArchMetricsConfig {
    /// Load config from `.archmetrics/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".archmetrics").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            debounce: Duration::from_millis(self.cache.debounce_ms),
            freshness: Duration::from_millis(self.cache.freshness_ms),
            extension: self.workspace.extension.trim_start_matches('.').to_string(),
            excluded_dirs: self.workspace.excluded_dirs.clone(),
        }
    }
}
