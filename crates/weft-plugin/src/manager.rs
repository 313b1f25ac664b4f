// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine plugin manager: explicit enable/disable on top of the loader.
//!
//! Disabling rebuilds the loader from scratch from the remaining enabled
//! set. Every still-enabled plugin is re-validated on each disable, which
//! guarantees no stale factory entry survives removal.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use weft_core::WeftError;

use crate::capability::CapabilityRegistry;
use crate::engine::{
    ConfigTransformHook, EnginePlugin, ModuleFactory, ModuleSchema, StepFactory, TriggerFactory,
    WiringHook, WorkflowHandlerFactory,
};
use crate::loader::PluginLoader;
use crate::resolver::{DependencyGraph, MissingPolicy};
use crate::tier::LicenseValidator;

struct ManagerInner {
    plugins: BTreeMap<String, Arc<dyn EnginePlugin>>,
    enabled: BTreeSet<String>,
    loader: PluginLoader,
}

impl ManagerInner {
    fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (name, plugin) in &self.plugins {
            graph.insert(
                name.clone(),
                plugin
                    .engine_manifest()
                    .dependencies
                    .iter()
                    .map(|d| d.name.clone())
                    .collect(),
            );
        }
        graph
    }
}

/// Lifecycle manager for engine-capability plugins.
///
/// Registration and activation are separate: a registered plugin
/// contributes nothing until enabled. Factory tables and hooks are derived
/// state, recomputed from the enabled set, never persisted independently.
pub struct EnginePluginManager {
    inner: RwLock<ManagerInner>,
    license_validator: Option<Arc<dyn LicenseValidator>>,
}

impl EnginePluginManager {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ManagerInner {
                plugins: BTreeMap::new(),
                enabled: BTreeSet::new(),
                loader: PluginLoader::new(Arc::new(CapabilityRegistry::new())),
            }),
            license_validator: None,
        }
    }

    pub fn with_license_validator(mut self, validator: Arc<dyn LicenseValidator>) -> Self {
        let mut inner = self.inner.write().expect("engine manager lock poisoned");
        inner.loader.set_license_validator(Arc::clone(&validator));
        drop(inner);
        self.license_validator = Some(validator);
        self
    }

    /// Register a plugin without enabling it. Duplicate names are rejected
    /// and the existing registration wins.
    pub fn register(&self, plugin: Arc<dyn EnginePlugin>) -> Result<(), WeftError> {
        let manifest = plugin.engine_manifest();
        manifest.validate()?;
        let name = manifest.name.clone();

        let mut inner = self.inner.write().expect("engine manager lock poisoned");
        if inner.plugins.contains_key(&name) {
            return Err(WeftError::DuplicateRegistration { name });
        }
        info!(plugin = %name, version = %manifest.version, "engine plugin registered");
        inner.plugins.insert(name, plugin);
        Ok(())
    }

    /// Enable a plugin and any registered dependencies, in activation
    /// order. Dependencies not registered here are assumed to be satisfied
    /// externally. If a later member fails, earlier members stay enabled.
    pub fn enable(&self, name: &str) -> Result<(), WeftError> {
        let mut inner = self.inner.write().expect("engine manager lock poisoned");
        if !inner.plugins.contains_key(name) {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }
        if inner.enabled.contains(name) {
            return Ok(());
        }

        let order = inner
            .dependency_graph()
            .enable_order(name, MissingPolicy::AssumeSatisfied)?;

        for member in order {
            if inner.enabled.contains(&member) {
                continue;
            }
            if let Some(plugin) = inner.plugins.get(&member).cloned() {
                inner.loader.load_plugin(plugin)?;
                inner.enabled.insert(member.clone());
                info!(plugin = %member, "engine plugin enabled");
            }
        }
        Ok(())
    }

    /// Disable a plugin together with every enabled plugin that
    /// transitively depends on it, then rebuild the loader from the
    /// remaining enabled set.
    pub fn disable(&self, name: &str) -> Result<(), WeftError> {
        let mut inner = self.inner.write().expect("engine manager lock poisoned");
        if !inner.plugins.contains_key(name) {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }
        if !inner.enabled.contains(name) {
            return Ok(());
        }

        let enabled_set = inner.enabled.iter().cloned().collect();
        let order = inner.dependency_graph().disable_order(name, &enabled_set);
        for member in &order {
            if inner.enabled.remove(member) {
                info!(plugin = %member, "engine plugin disabled");
            }
        }

        // Full rebuild: the only way to guarantee no stale factory entries.
        let mut loader = PluginLoader::new(Arc::new(CapabilityRegistry::new()));
        if let Some(validator) = &self.license_validator {
            loader.set_license_validator(Arc::clone(validator));
        }
        let remaining: Vec<Arc<dyn EnginePlugin>> = inner
            .enabled
            .iter()
            .filter_map(|n| inner.plugins.get(n).cloned())
            .collect();
        debug!(remaining = remaining.len(), "rebuilding engine plugin loader");
        loader.load_plugins(remaining)?;
        inner.loader = loader;
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        let inner = self.inner.read().expect("engine manager lock poisoned");
        inner.enabled.contains(name)
    }

    /// Names of all registered plugins, sorted.
    pub fn registered_plugins(&self) -> Vec<String> {
        let inner = self.inner.read().expect("engine manager lock poisoned");
        inner.plugins.keys().cloned().collect()
    }

    /// Names of all enabled plugins, sorted.
    pub fn enabled_plugins(&self) -> Vec<String> {
        let inner = self.inner.read().expect("engine manager lock poisoned");
        inner.enabled.iter().cloned().collect()
    }

    pub fn module_factories(&self) -> HashMap<String, Arc<dyn ModuleFactory>> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .module_factories()
    }

    pub fn step_factories(&self) -> HashMap<String, Arc<dyn StepFactory>> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .step_factories()
    }

    pub fn trigger_factories(&self) -> HashMap<String, Arc<dyn TriggerFactory>> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .trigger_factories()
    }

    pub fn workflow_handler_factories(&self) -> HashMap<String, Arc<dyn WorkflowHandlerFactory>> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .workflow_handler_factories()
    }

    pub fn module_schemas(&self) -> HashMap<String, ModuleSchema> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .module_schemas()
    }

    pub fn wiring_hooks(&self) -> Vec<WiringHook> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .wiring_hooks()
    }

    pub fn config_transform_hooks(&self) -> Vec<ConfigTransformHook> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .config_transform_hooks()
    }

    /// Verify required capabilities against the current enabled set.
    pub fn verify_capabilities(&self, required: &[String]) -> Result<(), WeftError> {
        self.inner
            .read()
            .expect("engine manager lock poisoned")
            .loader
            .verify_capabilities(required)
    }
}

impl Default for EnginePluginManager {
    fn default() -> Self {
        Self::new()
    }
}
