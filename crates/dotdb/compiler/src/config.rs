// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Compiler configuration: TOML file, environment overrides, and the
//! process-wide copy compilers read from.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::cost::Thresholds;
use crate::error::{ConfigError, ConfigResult};

pub const CONFIG_ENV: &str = "DOTDB_CONFIG";
pub const EXPENSIVE_THRESHOLD_ENV: &str = "DOTDB_EXPENSIVE_THRESHOLD";
pub const TOO_EXPENSIVE_THRESHOLD_ENV: &str = "DOTDB_TOO_EXPENSIVE_THRESHOLD";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Plans with a node estimated above this many rows are logged as expensive.
    pub expensive_threshold: u64,
    /// Plans with a node estimated above this many rows are rejected; 0 disables.
    pub too_expensive_threshold: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            expensive_threshold: 10000,
            too_expensive_threshold: 0,
        }
    }
}

impl CompilerConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit path, then `DOTDB_CONFIG`, then defaults; environment
    /// threshold overrides are applied last.
    pub fn resolve(cli_config: Option<PathBuf>) -> ConfigResult<Self> {
        Self::resolve_with(cli_config, |key| std::env::var(key).ok())
    }

    /// [`CompilerConfig::resolve`] with environment variables read through `lookup`.
    pub fn resolve_with(cli_config: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Some(env_config) = lookup(CONFIG_ENV) {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        config.apply_overrides_from(lookup)?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies threshold overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(value) = lookup(EXPENSIVE_THRESHOLD_ENV) {
            self.log.expensive_threshold = parse_threshold(EXPENSIVE_THRESHOLD_ENV, value)?;
            debug!(expensive_threshold = self.log.expensive_threshold, "threshold overridden from environment");
        }
        if let Some(value) = lookup(TOO_EXPENSIVE_THRESHOLD_ENV) {
            self.log.too_expensive_threshold = parse_threshold(TOO_EXPENSIVE_THRESHOLD_ENV, value)?;
            debug!(too_expensive_threshold = self.log.too_expensive_threshold, "threshold overridden from environment");
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.log.expensive_threshold, self.log.too_expensive_threshold)
    }
}

fn parse_threshold(key: &'static str, value: String) -> ConfigResult<u64> {
    value.trim().parse().map_err(|_| ConfigError::InvalidOverride { key, value })
}

static GLOBAL_CONFIG: LazyLock<RwLock<Arc<CompilerConfig>>> = LazyLock::new(|| RwLock::new(Arc::new(CompilerConfig::default())));

/// The process-wide configuration as of now.
pub fn global_config() -> Arc<CompilerConfig> {
    Arc::clone(&GLOBAL_CONFIG.read())
}

/// Replaces the process-wide configuration. Compilers already built keep the
/// copy they started with.
pub fn store_global_config(config: CompilerConfig) {
    *GLOBAL_CONFIG.write() = Arc::new(config);
}
