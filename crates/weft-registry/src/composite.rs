// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composite registry layering a remote catalog beneath the local one.
//!
//! Search degrades to local-only results when the remote is unreachable;
//! direct fetches surface the network error because callers need a
//! definite outcome.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use weft_core::WeftError;
use weft_plugin::manifest::PluginManifest;

use crate::local::LocalRegistry;
use crate::remote::RemoteRegistry;

/// Local registry with an optional remote catalog beneath it.
pub struct CompositeRegistry {
    local: Arc<LocalRegistry>,
    remote: Option<Arc<RemoteRegistry>>,
}

impl CompositeRegistry {
    pub fn new(local: Arc<LocalRegistry>, remote: Option<Arc<RemoteRegistry>>) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &Arc<LocalRegistry> {
        &self.local
    }

    pub fn remote(&self) -> Option<&Arc<RemoteRegistry>> {
        self.remote.as_ref()
    }

    /// Merged search: local and remote results, local entries winning on
    /// name collision, sorted by name. A remote failure degrades to
    /// local-only results with a warning rather than failing the caller.
    pub async fn search(&self, query: &str) -> Vec<PluginManifest> {
        let mut merged: BTreeMap<String, PluginManifest> = BTreeMap::new();

        if let Some(remote) = &self.remote {
            match remote.search(query).await {
                Ok(results) => {
                    for manifest in results {
                        merged.insert(manifest.name.clone(), manifest);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "remote search failed; returning local results only");
                }
            }
        }

        // Local entries overwrite remote ones of the same name.
        for manifest in self.local.search(query) {
            merged.insert(manifest.name.clone(), manifest);
        }

        merged.into_values().collect()
    }

    /// Resolve one manifest: local first, then the remote catalog.
    ///
    /// Unlike [`CompositeRegistry::search`], a remote failure here is
    /// surfaced so the caller can distinguish "not found" from "unknown".
    pub async fn get(&self, name: &str) -> Result<PluginManifest, WeftError> {
        if let Some(entry) = self.local.get(name) {
            return Ok(entry.manifest);
        }
        match &self.remote {
            Some(remote) => remote.fetch_manifest(name).await,
            None => Err(WeftError::PluginNotFound {
                name: name.to_string(),
            }),
        }
    }
}
