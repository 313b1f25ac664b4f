// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifests: the declared identity of an extension.
//!
//! A manifest is read from `plugin.json`, validated once, and treated as
//! immutable afterwards. Registries enforce a non-decreasing version when a
//! name is re-registered.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use weft_core::types::CapabilityRole;
use weft_core::WeftError;

use crate::version::{Constraint, Version};

/// Conventional manifest file name inside a plugin directory.
pub const MANIFEST_FILE_NAME: &str = "plugin.json";

/// Plugin names: lowercase alphanumeric with interior dashes, or a single
/// lowercase letter.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z]([a-z0-9-]*[a-z0-9])?$").unwrap());

/// An edge from a dependent plugin to a required plugin.
///
/// The constraint is kept as a string on the wire and parsed on demand;
/// [`PluginManifest::validate`] guarantees it parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    pub constraint: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
        }
    }

    /// The parsed form of the constraint string.
    pub fn parsed_constraint(&self) -> Result<Constraint, WeftError> {
        Constraint::parse(&self.constraint)
    }
}

/// A capability this plugin provides or consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDecl {
    pub name: String,
    pub role: CapabilityRole,
    #[serde(default, skip_serializing_if = "priority_is_zero")]
    pub priority: i32,
}

fn priority_is_zero(p: &i32) -> bool {
    *p == 0
}

/// The declared identity of a plugin.
///
/// Serialized as camelCase JSON; empty collections and the empty tier are
/// omitted entirely so the wire form round-trips losslessly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<CapabilityDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub module_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub step_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trigger_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workflow_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wiring_hook_names: Vec<String>,
    /// Tier string; empty behaves as `core` and is never serialized.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tier: String,
}

/// Whether a string is acceptable as a plugin name.
pub fn is_valid_plugin_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

impl PluginManifest {
    /// Minimal manifest with the mandatory identity fields.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: author.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Validate all invariants in a fixed order: name, version, author,
    /// description, then each dependency. Returns the first failure with
    /// the offending field named.
    pub fn validate(&self) -> Result<(), WeftError> {
        let invalid = |field: &str, reason: String| WeftError::InvalidManifest {
            field: field.to_string(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name", "must not be empty".into()));
        }
        if !is_valid_plugin_name(&self.name) {
            return Err(invalid(
                "name",
                format!("{:?} must be lowercase alphanumeric with interior dashes", self.name),
            ));
        }
        if self.version.is_empty() {
            return Err(invalid("version", "must not be empty".into()));
        }
        if let Err(e) = Version::parse(&self.version) {
            return Err(invalid("version", e.to_string()));
        }
        if self.author.is_empty() {
            return Err(invalid("author", "must not be empty".into()));
        }
        if self.description.is_empty() {
            return Err(invalid("description", "must not be empty".into()));
        }
        for dep in &self.dependencies {
            if dep.name.is_empty() {
                return Err(invalid("dependencies", "dependency name must not be empty".into()));
            }
            if dep.constraint.is_empty() {
                return Err(invalid(
                    "dependencies",
                    format!("dependency {:?} has an empty constraint", dep.name),
                ));
            }
            if let Err(e) = Constraint::parse(&dep.constraint) {
                return Err(invalid(
                    "dependencies",
                    format!("dependency {:?}: {e}", dep.name),
                ));
            }
        }
        Ok(())
    }

    /// The parsed form of the version string.
    pub fn parsed_version(&self) -> Result<Version, WeftError> {
        Version::parse(&self.version)
    }

    /// Read and validate a manifest from a `plugin.json` file.
    pub fn load(path: &Path) -> Result<Self, WeftError> {
        let data = std::fs::read_to_string(path).map_err(|source| WeftError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let manifest: PluginManifest =
            serde_json::from_str(&data).map_err(|e| WeftError::InvalidManifest {
                field: "manifest".to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), WeftError> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| WeftError::Internal(format!("serialize manifest: {e}")))?;
        std::fs::write(path, data).map_err(|source| WeftError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
