// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Weft registries and managers.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Licensing classification gating plugin activation.
///
/// Manifests carry the tier as a plain string (an empty string behaves as
/// `Core`); this enum is the typed form used by the tier gate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginTier {
    #[default]
    Core,
    Community,
    Premium,
}

/// The role a plugin plays for a declared capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CapabilityRole {
    Provider,
    Consumer,
}

/// Which factory table a type-name key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FactoryKind {
    Module,
    Step,
    Trigger,
    #[strum(serialize = "workflow handler")]
    WorkflowHandler,
}

/// Opaque handle to a runnable component produced by the external
/// code-loading mechanism.
///
/// Registries store and return handles without ever interpreting them;
/// only the orchestration engine downcasts to a concrete component type.
#[derive(Clone)]
pub struct ComponentHandle {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ComponentHandle {
    /// Wrap a concrete component value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Attempt to recover the concrete component type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle").finish_non_exhaustive()
    }
}
