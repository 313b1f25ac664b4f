// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote plugin catalog client.
//!
//! Manifest fetches are cached for a bounded TTL to limit redundant
//! round-trips. Network failures are reported as
//! [`WeftError::RegistryUnavailable`], distinct from a definite
//! [`WeftError::PluginNotFound`], so callers can decide whether a retry is
//! worthwhile. All network I/O happens outside any local registry lock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use weft_core::WeftError;
use weft_plugin::manifest::PluginManifest;

/// Default TTL for cached manifest fetches.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// A catalog entry as served by the remote registry: the manifest plus,
/// for installable plugins, the inline source consumed by the external
/// load mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePlugin {
    pub manifest: PluginManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

struct CachedManifest {
    fetched_at: Instant,
    manifest: PluginManifest,
}

/// HTTP client for a remote plugin catalog.
pub struct RemoteRegistry {
    base_url: String,
    client: reqwest::Client,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CachedManifest>>,
}

impl RemoteRegistry {
    /// Create a client against `base_url` (no trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Override the manifest cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Search the remote catalog. The query may be empty (list all).
    pub async fn search(&self, query: &str) -> Result<Vec<PluginManifest>, WeftError> {
        let url = format!("{}/api/plugins", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| unavailable("search", &e))?;
        if !response.status().is_success() {
            return Err(WeftError::RegistryUnavailable {
                message: format!("search returned status {}", response.status()),
            });
        }
        response
            .json::<Vec<PluginManifest>>()
            .await
            .map_err(|e| unavailable("search decode", &e))
    }

    /// Fetch one plugin's manifest, consulting the TTL cache first.
    pub async fn fetch_manifest(&self, name: &str) -> Result<PluginManifest, WeftError> {
        {
            let cache = self.cache.lock().expect("remote cache lock poisoned");
            if let Some(cached) = cache.get(name) {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    debug!(plugin = %name, "manifest served from cache");
                    return Ok(cached.manifest.clone());
                }
            }
        }

        let plugin = self.fetch(name).await?;
        let mut cache = self.cache.lock().expect("remote cache lock poisoned");
        cache.insert(
            name.to_string(),
            CachedManifest {
                fetched_at: Instant::now(),
                manifest: plugin.manifest.clone(),
            },
        );
        Ok(plugin.manifest)
    }

    /// Fetch one plugin's full catalog entry (manifest plus inline
    /// source). Never served from cache: installs need a definite outcome.
    pub async fn fetch(&self, name: &str) -> Result<RemotePlugin, WeftError> {
        let url = format!("{}/api/plugins/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable("fetch", &e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(WeftError::RegistryUnavailable {
                message: format!("fetch returned status {}", response.status()),
            });
        }
        response
            .json::<RemotePlugin>()
            .await
            .map_err(|e| unavailable("fetch decode", &e))
    }

    /// Fetch the catalog entry for a specific version.
    pub async fn download(&self, name: &str, version: &str) -> Result<RemotePlugin, WeftError> {
        let url = format!("{}/api/plugins/{}/download", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .query(&[("version", version)])
            .send()
            .await
            .map_err(|e| unavailable("download", &e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(WeftError::RegistryUnavailable {
                message: format!("download returned status {}", response.status()),
            });
        }
        response
            .json::<RemotePlugin>()
            .await
            .map_err(|e| unavailable("download decode", &e))
    }
}

fn unavailable(operation: &str, error: &dyn std::fmt::Display) -> WeftError {
    WeftError::RegistryUnavailable {
        message: format!("{operation}: {error}"),
    }
}
