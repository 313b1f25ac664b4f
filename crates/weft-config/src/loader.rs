// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the hierarchy `./weft.toml` > `~/.config/weft/weft.toml` >
//! `/etc/weft/weft.toml` with environment variable overrides via the
//! `WEFT_` prefix.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use weft_core::WeftError;

use crate::model::WeftConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/weft/weft.toml` (system-wide)
/// 3. `~/.config/weft/weft.toml` (user XDG config)
/// 4. `./weft.toml` (local directory)
/// 5. `WEFT_*` environment variables
pub fn load_config() -> Result<WeftConfig, WeftError> {
    build_figment().extract().map_err(map_figment_err)
}

/// Load configuration from inline TOML content only (no file lookup).
pub fn load_config_from_str(toml_content: &str) -> Result<WeftConfig, WeftError> {
    Figment::new()
        .merge(Serialized::defaults(WeftConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
        .map_err(map_figment_err)
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WeftConfig, WeftError> {
    Figment::new()
        .merge(Serialized::defaults(WeftConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(map_figment_err)
}

fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WeftConfig::default()))
        .merge(Toml::file("/etc/weft/weft.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("weft/weft.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("weft.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `WEFT_SECTION_KEY` to `section.key`.
///
/// Uses explicit `map()` instead of `Env::split("_")` so keys containing
/// underscores (`database_path`, `install_dir`) survive the mapping.
fn env_provider() -> Env {
    Env::prefixed("WEFT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("plugins_", "plugins.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}

fn map_figment_err(e: figment::Error) -> WeftError {
    WeftError::Config(e.to_string())
}
