// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native plugin manager: lifecycle and HTTP dispatch for administrative
//! extensions, with durable enable/disable state.
//!
//! Each enabled plugin owns an isolated router scope; requests reach it
//! only while the plugin is registered and enabled. Lifecycle hooks run
//! synchronously under the manager lock, so a hanging hook blocks this
//! manager's other operations, a documented limitation of this layer.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower::ServiceExt;
use tracing::{error, info, warn};

use weft_core::WeftError;
use weft_plugin::manifest::Dependency;
use weft_plugin::resolver::{DependencyGraph, MissingPolicy};
use weft_plugin::tier::{validate_tier, LicenseValidator};
use weft_plugin::version::check_version;
use weft_storage::queries::plugin_state;
use weft_storage::Database;

/// A page the plugin contributes to the admin UI navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPageDef {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub category: String,
}

/// Shared context handed to plugin lifecycle hooks.
///
/// The logger is the global tracing subscriber; hooks receive the data
/// directory and database handle explicitly.
#[derive(Clone, Default)]
pub struct PluginContext {
    pub data_dir: PathBuf,
    pub db: Option<Database>,
}

/// An HTTP-facing administrative extension.
///
/// Lifecycle hooks accept a cancellation-aware async context but this
/// layer enforces no timeout; honoring cancellation is the hook's own
/// responsibility.
#[async_trait]
pub trait NativePlugin: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn description(&self) -> &str;

    /// Licensing tier; empty behaves as core.
    fn tier(&self) -> &str {
        ""
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    fn ui_pages(&self) -> Vec<UiPageDef> {
        Vec::new()
    }

    /// Register the plugin's routes into its isolated scope.
    fn register_routes(&self, router: Router) -> Router {
        router
    }

    async fn on_enable(&self, _ctx: &PluginContext) -> Result<(), WeftError> {
        Ok(())
    }

    async fn on_disable(&self, _ctx: &PluginContext) -> Result<(), WeftError> {
        Ok(())
    }
}

/// JSON representation of a plugin for the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub enabled: bool,
    pub ui_pages: Vec<UiPageDef>,
    pub dependencies: Vec<Dependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<String>,
}

struct Inner {
    plugins: BTreeMap<String, Arc<dyn NativePlugin>>,
    enabled: BTreeSet<String>,
    routers: HashMap<String, Router>,
    ctx: PluginContext,
}

impl Inner {
    fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (name, plugin) in &self.plugins {
            graph.insert(
                name.clone(),
                plugin.dependencies().iter().map(|d| d.name.clone()).collect(),
            );
        }
        graph
    }
}

/// Manager for native plugins: registration, dependency-aware cascading
/// activation, durable state, and per-plugin request dispatch.
pub struct NativePluginManager {
    inner: RwLock<Inner>,
    db: Option<Database>,
    license_validator: Option<Arc<dyn LicenseValidator>>,
}

impl NativePluginManager {
    pub fn new(db: Option<Database>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                plugins: BTreeMap::new(),
                enabled: BTreeSet::new(),
                routers: HashMap::new(),
                ctx: PluginContext {
                    db: db.clone(),
                    ..PluginContext::default()
                },
            }),
            db,
            license_validator: None,
        }
    }

    pub fn with_license_validator(mut self, validator: Arc<dyn LicenseValidator>) -> Self {
        self.license_validator = Some(validator);
        self
    }

    /// Replace the shared context handed to lifecycle hooks.
    pub async fn set_context(&self, ctx: PluginContext) {
        self.inner.write().await.ctx = ctx;
    }

    /// Add a plugin to the known set without enabling it.
    pub async fn register(&self, plugin: Arc<dyn NativePlugin>) -> Result<(), WeftError> {
        let name = plugin.name().to_string();
        if name.is_empty() {
            return Err(WeftError::InvalidManifest {
                field: "name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let mut inner = self.inner.write().await;
        if inner.plugins.contains_key(&name) {
            return Err(WeftError::DuplicateRegistration { name });
        }
        info!(plugin = %name, version = %plugin.version(), "native plugin registered");
        inner.plugins.insert(name, plugin);
        Ok(())
    }

    /// Enable a plugin and every not-yet-enabled dependency, in activation
    /// order. Any unregistered dependency is a hard failure. On a hook
    /// failure the failing plugin's routing scope is rolled back and the
    /// whole call aborts; members enabled earlier in this call stay
    /// enabled.
    pub async fn enable(&self, name: &str) -> Result<(), WeftError> {
        let mut inner = self.inner.write().await;
        if !inner.plugins.contains_key(name) {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }

        let order = inner
            .dependency_graph()
            .enable_order(name, MissingPolicy::Fail)?;

        for member in order {
            if inner.enabled.contains(&member) {
                continue;
            }
            self.enable_one(&mut inner, &member).await?;
        }
        Ok(())
    }

    async fn enable_one(&self, inner: &mut Inner, name: &str) -> Result<(), WeftError> {
        let Some(plugin) = inner.plugins.get(name).cloned() else {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        };

        validate_tier(name, plugin.tier(), self.license_validator.as_deref())?;

        // Minimum-version constraints against each dependency's registered
        // version.
        for dep in plugin.dependencies() {
            let Some(dep_plugin) = inner.plugins.get(&dep.name) else {
                return Err(WeftError::UnsatisfiedDependency {
                    name: name.to_string(),
                    dependency: dep.name.clone(),
                });
            };
            if dep.constraint.is_empty() {
                continue;
            }
            if !check_version(dep_plugin.version(), &dep.constraint)? {
                return Err(WeftError::VersionConstraintUnsatisfied {
                    name: name.to_string(),
                    dependency: dep.name.clone(),
                    constraint: dep.constraint.clone(),
                    actual: dep_plugin.version().to_string(),
                });
            }
        }

        // Isolated routing scope, rolled back if the enable hook fails.
        let router = plugin.register_routes(Router::new());
        inner.routers.insert(name.to_string(), router);

        let ctx = inner.ctx.clone();
        if let Err(e) = plugin.on_enable(&ctx).await {
            inner.routers.remove(name);
            return Err(WeftError::HookFailed {
                plugin: name.to_string(),
                hook: "enable".to_string(),
                reason: e.to_string(),
            });
        }

        inner.enabled.insert(name.to_string());
        self.persist_state(name, true, plugin.version()).await;
        info!(plugin = %name, "native plugin enabled");
        Ok(())
    }

    /// Disable a plugin and every enabled plugin that transitively depends
    /// on it, dependents first. A failing disable hook is logged and does
    /// not block deactivation of the rest.
    pub async fn disable(&self, name: &str) -> Result<(), WeftError> {
        let mut inner = self.inner.write().await;
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

        for member in order {
            if !inner.enabled.contains(&member) {
                continue;
            }
            let Some(plugin) = inner.plugins.get(&member).cloned() else {
                continue;
            };

            let ctx = inner.ctx.clone();
            if let Err(e) = plugin.on_disable(&ctx).await {
                warn!(plugin = %member, error = %e, "disable hook failed; continuing");
            }
            inner.routers.remove(&member);
            inner.enabled.remove(&member);
            self.persist_state(&member, false, plugin.version()).await;
            info!(plugin = %member, "native plugin disabled");
        }
        Ok(())
    }

    pub async fn is_enabled(&self, name: &str) -> bool {
        self.inner.read().await.enabled.contains(name)
    }

    /// Names of all enabled plugins, sorted.
    pub async fn enabled_plugins(&self) -> Vec<String> {
        self.inner.read().await.enabled.iter().cloned().collect()
    }

    /// Info for every registered plugin, sorted by name, with persisted
    /// timestamps when a database is configured.
    pub async fn all_plugins(&self) -> Vec<PluginInfo> {
        let snapshot: Vec<(String, Arc<dyn NativePlugin>, bool)> = {
            let inner = self.inner.read().await;
            inner
                .plugins
                .iter()
                .map(|(name, plugin)| {
                    (name.clone(), Arc::clone(plugin), inner.enabled.contains(name))
                })
                .collect()
        };

        let mut result = Vec::with_capacity(snapshot.len());
        for (name, plugin, enabled) in snapshot {
            let mut info = PluginInfo {
                name: name.clone(),
                version: plugin.version().to_string(),
                description: plugin.description().to_string(),
                enabled,
                ui_pages: plugin.ui_pages(),
                dependencies: plugin.dependencies(),
                enabled_at: None,
                disabled_at: None,
            };
            if let Some(db) = &self.db {
                if let Ok(Some(record)) = plugin_state::get_state(db, &name).await {
                    info.enabled_at = record.enabled_at;
                    info.disabled_at = record.disabled_at;
                }
            }
            result.push(info);
        }
        result
    }

    /// Re-enable every plugin whose last persisted state was enabled.
    ///
    /// Idempotent: already-enabled members are skipped by `enable`. A
    /// persisted name that no longer resolves is logged and skipped so one
    /// stale row cannot fail the whole restore.
    pub async fn restore_state(&self) -> Result<(), WeftError> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let names = plugin_state::list_enabled(db).await?;
        for name in names {
            if let Err(e) = self.enable(&name).await {
                warn!(plugin = %name, error = %e, "failed to restore plugin state");
            }
        }
        Ok(())
    }

    /// Dispatch a request (already stripped of the admin prefix and plugin
    /// name) into the named plugin's routing scope.
    ///
    /// Unregistered and registered-but-disabled plugins both yield a plain
    /// 404, deliberately indistinguishable so registration state does not
    /// leak to unauthorized callers.
    pub async fn dispatch(&self, name: &str, request: Request<Body>) -> Response {
        let router = {
            let inner = self.inner.read().await;
            if !inner.plugins.contains_key(name) || !inner.enabled.contains(name) {
                None
            } else {
                inner.routers.get(name).cloned()
            }
        };

        match router {
            Some(router) => match router.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            },
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn persist_state(&self, name: &str, enabled: bool, version: &str) {
        if let Some(db) = &self.db {
            if let Err(e) = plugin_state::upsert_state(db, name, enabled, version).await {
                error!(plugin = %name, error = %e, "failed to persist plugin state");
            }
        }
    }
}
