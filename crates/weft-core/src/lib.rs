// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Weft plugin engine.
//!
//! This crate provides the error taxonomy, common types, and collaborator
//! traits shared by every Weft registry and manager. It holds no state of
//! its own: registries are explicit objects injected by constructor, never
//! ambient globals, so tests can instantiate isolated instances in parallel.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WeftError;
pub use traits::ComponentLoader;
pub use types::{CapabilityRole, ComponentHandle, FactoryKind, PluginTier};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_reexports_are_accessible() {
        let _err = WeftError::Internal("test".into());
        let _tier = PluginTier::Core;
        let _role = CapabilityRole::Provider;
        let _handle = ComponentHandle::new(42u8);

        fn _assert_loader<T: ComponentLoader>() {}
    }
}
