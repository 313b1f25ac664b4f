// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract for the external code-loading mechanism.

use crate::error::WeftError;
use crate::types::ComponentHandle;

/// Compiles or interprets a plugin's source into a runnable component.
///
/// The loading mechanism itself (interpreter pool, WASM runtime, process
/// sandbox) lives outside this core; registries consume it only through
/// this contract and treat the returned handle as opaque.
pub trait ComponentLoader: Send + Sync {
    /// Load the named plugin's source, returning a runnable component.
    fn load(&self, name: &str, source: &str) -> Result<ComponentHandle, WeftError>;
}
