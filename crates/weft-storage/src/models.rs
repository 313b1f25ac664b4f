// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the plugin lifecycle tables.

/// One row of `plugin_state`: the durable enable/disable record for a
/// native plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginStateRecord {
    pub name: String,
    pub enabled: bool,
    pub version: String,
    /// RFC 3339 timestamp of the most recent enable, if any.
    pub enabled_at: Option<String>,
    /// RFC 3339 timestamp of the most recent disable, if any.
    pub disabled_at: Option<String>,
}
