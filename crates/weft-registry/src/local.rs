// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local registry of installed plugin artifacts.
//!
//! Tracks which plugins are installed on this node, keyed by name.
//! Replacement is version-monotonic: a re-registration may keep or raise
//! the version, never lower it. Unregistration is refused while dependents
//! remain.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::info;

use weft_core::{ComponentHandle, WeftError};
use weft_plugin::manifest::PluginManifest;

/// The installed record for one plugin.
///
/// `component` is an opaque handle obtained from the external load
/// mechanism; the registry never interprets it.
#[derive(Debug, Clone)]
pub struct PluginEntry {
    pub manifest: PluginManifest,
    pub component: Option<ComponentHandle>,
    pub source_dir: Option<PathBuf>,
}

/// Registry of locally installed plugins.
#[derive(Default)]
pub struct LocalRegistry {
    entries: RwLock<HashMap<String, PluginEntry>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and record a plugin.
    ///
    /// Every declared dependency must already resolve against a registered
    /// plugin at a satisfying version, and the version may not go down
    /// relative to an existing registration under the same name.
    pub fn register(
        &self,
        manifest: PluginManifest,
        component: Option<ComponentHandle>,
        source_dir: Option<PathBuf>,
    ) -> Result<(), WeftError> {
        manifest.validate()?;
        let proposed = manifest.parsed_version()?;

        let mut entries = self.entries.write().expect("local registry lock poisoned");

        check_dependencies_against(&entries, &manifest)?;

        if let Some(existing) = entries.get(&manifest.name) {
            let current = existing.manifest.parsed_version()?;
            if proposed < current {
                return Err(WeftError::VersionDowngrade {
                    name: manifest.name.clone(),
                    current: current.to_string(),
                    proposed: proposed.to_string(),
                });
            }
        }

        info!(plugin = %manifest.name, version = %manifest.version, "plugin registered locally");
        entries.insert(
            manifest.name.clone(),
            PluginEntry {
                manifest,
                component,
                source_dir,
            },
        );
        Ok(())
    }

    /// Verify a manifest's dependencies against the current registrations.
    pub fn check_dependencies(&self, manifest: &PluginManifest) -> Result<(), WeftError> {
        let entries = self.entries.read().expect("local registry lock poisoned");
        check_dependencies_against(&entries, manifest)
    }

    /// Remove a plugin. Fails while other registered plugins depend on it.
    pub fn unregister(&self, name: &str) -> Result<PluginEntry, WeftError> {
        let mut entries = self.entries.write().expect("local registry lock poisoned");
        if !entries.contains_key(name) {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }

        let mut dependents: Vec<String> = entries
            .values()
            .filter(|e| e.manifest.dependencies.iter().any(|d| d.name == name))
            .map(|e| e.manifest.name.clone())
            .collect();
        if !dependents.is_empty() {
            dependents.sort();
            return Err(WeftError::DependentsRemain {
                name: name.to_string(),
                dependents,
            });
        }

        info!(plugin = %name, "plugin unregistered locally");
        entries
            .remove(name)
            .ok_or_else(|| WeftError::PluginNotFound {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<PluginEntry> {
        let entries = self.entries.read().expect("local registry lock poisoned");
        entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let entries = self.entries.read().expect("local registry lock poisoned");
        entries.contains_key(name)
    }

    /// Every entry, sorted by name.
    pub fn list(&self) -> Vec<PluginEntry> {
        let entries = self.entries.read().expect("local registry lock poisoned");
        let mut list: Vec<PluginEntry> = entries.values().cloned().collect();
        list.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));
        list
    }

    /// Case-insensitive search over name, description, and tags. An empty
    /// query returns everything.
    pub fn search(&self, query: &str) -> Vec<PluginManifest> {
        let needle = query.to_lowercase();
        self.list()
            .into_iter()
            .map(|e| e.manifest)
            .filter(|m| {
                needle.is_empty()
                    || m.name.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
                    || m.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

fn check_dependencies_against(
    entries: &HashMap<String, PluginEntry>,
    manifest: &PluginManifest,
) -> Result<(), WeftError> {
    for dep in &manifest.dependencies {
        let entry = entries
            .get(&dep.name)
            .ok_or_else(|| WeftError::UnsatisfiedDependency {
                name: manifest.name.clone(),
                dependency: dep.name.clone(),
            })?;
        let constraint = dep.parsed_constraint()?;
        let actual = entry.manifest.parsed_version()?;
        if !constraint.matches(&actual) {
            return Err(WeftError::VersionConstraintUnsatisfied {
                name: manifest.name.clone(),
                dependency: dep.name.clone(),
                constraint: dep.constraint.clone(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}
