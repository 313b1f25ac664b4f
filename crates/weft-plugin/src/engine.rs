// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution interfaces for engine-capability plugins.
//!
//! A plugin contributes factories keyed by type name, UI schemas for the
//! editor, and hooks that run after module construction. Factories for the
//! four contribution kinds are distinct traits so a table entry can never
//! be used as the wrong kind.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use weft_core::{ComponentHandle, WeftError};

use crate::capability::Contract;
use crate::manifest::PluginManifest;

/// Builds a runtime module (server, broker, state machine, ...) from its
/// configuration block.
pub trait ModuleFactory: Send + Sync {
    fn create(&self, name: &str, config: &Value) -> Result<ComponentHandle, WeftError>;
}

/// Builds a pipeline step from its configuration block.
pub trait StepFactory: Send + Sync {
    fn create(&self, name: &str, config: &Value) -> Result<ComponentHandle, WeftError>;
}

/// Builds a trigger from its configuration block.
pub trait TriggerFactory: Send + Sync {
    fn create(&self, name: &str, config: &Value) -> Result<ComponentHandle, WeftError>;
}

/// Builds a workflow handler from its configuration block.
pub trait WorkflowHandlerFactory: Send + Sync {
    fn create(&self, name: &str, config: &Value) -> Result<ComponentHandle, WeftError>;
}

/// The instantiated modules a wiring hook may connect, keyed by instance
/// name.
pub type ModuleTable = HashMap<String, ComponentHandle>;

/// Cross-module wiring executed after all modules are constructed.
///
/// Hooks run in descending priority order; ties run in insertion order.
#[derive(Clone)]
pub struct WiringHook {
    pub name: String,
    pub priority: i32,
    pub run: Arc<dyn Fn(&ModuleTable) -> Result<(), WeftError> + Send + Sync>,
}

impl WiringHook {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        run: impl Fn(&ModuleTable) -> Result<(), WeftError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            run: Arc::new(run),
        }
    }
}

impl std::fmt::Debug for WiringHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiringHook")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Rewrites a pipeline configuration document before module construction.
#[derive(Clone)]
pub struct ConfigTransformHook {
    pub name: String,
    pub priority: i32,
    pub run: Arc<dyn Fn(Value) -> Result<Value, WeftError> + Send + Sync>,
}

impl ConfigTransformHook {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        run: impl Fn(Value) -> Result<Value, WeftError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            run: Arc::new(run),
        }
    }
}

impl std::fmt::Debug for ConfigTransformHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigTransformHook")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Configuration schema for one module type, consumed by the visual editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSchema {
    pub module_type: String,
    pub title: String,
    pub description: String,
    pub config_schema: Value,
}

/// An engine-capability-contributing extension.
///
/// Default methods return empty contributions so a plugin implements only
/// the kinds it actually offers; the loader checks the rest via the
/// manifest declarations.
pub trait EnginePlugin: Send + Sync {
    /// The plugin's declared identity.
    fn engine_manifest(&self) -> &PluginManifest;

    /// Capability contracts this plugin introduces.
    fn contracts(&self) -> Vec<Contract> {
        Vec::new()
    }

    fn module_factories(&self) -> HashMap<String, Arc<dyn ModuleFactory>> {
        HashMap::new()
    }

    fn step_factories(&self) -> HashMap<String, Arc<dyn StepFactory>> {
        HashMap::new()
    }

    fn trigger_factories(&self) -> HashMap<String, Arc<dyn TriggerFactory>> {
        HashMap::new()
    }

    fn workflow_handler_factories(&self) -> HashMap<String, Arc<dyn WorkflowHandlerFactory>> {
        HashMap::new()
    }

    fn module_schemas(&self) -> Vec<ModuleSchema> {
        Vec::new()
    }

    fn wiring_hooks(&self) -> Vec<WiringHook> {
        Vec::new()
    }

    fn config_transform_hooks(&self) -> Vec<ConfigTransformHook> {
        Vec::new()
    }

    /// Downcasting support for optional capability-marker interfaces.
    fn as_any(&self) -> &dyn Any;
}
