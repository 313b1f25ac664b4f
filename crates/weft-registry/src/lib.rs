// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin artifact registries for Weft.
//!
//! Tracks which plugin artifacts are installed locally, searches and
//! installs from a remote catalog, and enforces version-monotonic upgrade
//! rules. Code loading is delegated to the external `ComponentLoader`
//! contract; the registries never interpret the handles it returns.

pub mod composite;
pub mod installer;
pub mod local;
pub mod remote;

pub use composite::CompositeRegistry;
pub use installer::{sanitize_path_component, PluginInstaller, SOURCE_FILE_NAME};
pub use local::{LocalRegistry, PluginEntry};
pub use remote::{RemotePlugin, RemoteRegistry, DEFAULT_CACHE_TTL};
