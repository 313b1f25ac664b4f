// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Weft engine.

use serde::{Deserialize, Serialize};

/// Top-level configuration, merged from defaults, TOML files, and
/// `WEFT_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeftConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub plugins: PluginsConfig,
    pub log: LogConfig,
}

/// Administrative HTTP server binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8321,
        }
    }
}

/// SQLite lifecycle-state database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "data/weft.db".to_string(),
        }
    }
}

/// Plugin artifact locations and the optional remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Directory plugin artifacts are installed under.
    pub install_dir: String,
    /// Data directory handed to native plugin enable hooks.
    pub data_dir: String,
    /// Remote catalog base URL; empty disables remote search/install.
    pub registry_url: String,
    /// TTL in seconds for cached remote manifest fetches.
    pub cache_ttl_secs: u64,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            install_dir: "data/plugins".to_string(),
            data_dir: "data".to_string(),
            registry_url: String::new(),
            cache_ttl_secs: 300,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Tracing filter directive, e.g. `info` or `weft=debug,info`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_self_consistent() {
        let config = WeftConfig::default();
        assert_eq!(config.server.port, 8321);
        assert!(config.plugins.registry_url.is_empty());
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = WeftConfig::default();
        let rendered = toml::to_string(&config).unwrap();
        let parsed: WeftConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
