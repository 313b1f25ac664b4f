// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin model and engine lifecycle for Weft.
//!
//! This crate turns independently authored, versioned, interdependent
//! extensions into a consistent runtime configuration: the version and
//! constraint model, plugin manifests, the capability contract registry,
//! the dependency resolver, the tier gate, and the engine plugin loader
//! and manager.

pub mod capability;
pub mod engine;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod resolver;
pub mod tier;
pub mod version;

// Re-export key items at crate root for ergonomic imports.
pub use capability::{CapabilityRegistry, Contract, ProviderEntry};
pub use engine::{
    ConfigTransformHook, EnginePlugin, ModuleFactory, ModuleSchema, ModuleTable, StepFactory,
    TriggerFactory, WiringHook, WorkflowHandlerFactory,
};
pub use loader::PluginLoader;
pub use manager::EnginePluginManager;
pub use manifest::{
    is_valid_plugin_name, CapabilityDecl, Dependency, PluginManifest, MANIFEST_FILE_NAME,
};
pub use resolver::{DependencyGraph, MissingPolicy};
pub use tier::{validate_tier, LicenseValidator};
pub use version::{check_version, Constraint, ConstraintOp, Version};
