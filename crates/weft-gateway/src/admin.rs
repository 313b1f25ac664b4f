// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative HTTP API for native plugins.
//!
//! Routes under [`ADMIN_PLUGIN_PREFIX`]:
//! - `GET  {prefix}`                  list all plugins with status
//! - `POST {prefix}/{name}/enable`    enable (cascading)
//! - `POST {prefix}/{name}/disable`   disable (cascading)
//! - any   `{prefix}/{name}/{rest}`   stripped-prefix delegation into the
//!   plugin's routing scope; 404 when unregistered or disabled

use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::native::{NativePluginManager, PluginInfo};
use crate::respond::error_response;

/// Fixed path prefix of the native plugin admin API.
pub const ADMIN_PLUGIN_PREFIX: &str = "/api/v1/admin/plugins";

/// Body returned by enable/disable actions.
#[derive(Debug, Serialize)]
struct LifecycleResponse {
    plugin: String,
    status: &'static str,
}

/// Build the admin router for a native plugin manager.
pub fn admin_router(manager: Arc<NativePluginManager>) -> Router {
    Router::new()
        .route(ADMIN_PLUGIN_PREFIX, get(list_plugins))
        .route(
            &format!("{ADMIN_PLUGIN_PREFIX}/{{name}}/enable"),
            post(enable_plugin),
        )
        .route(
            &format!("{ADMIN_PLUGIN_PREFIX}/{{name}}/disable"),
            post(disable_plugin),
        )
        .route(
            &format!("{ADMIN_PLUGIN_PREFIX}/{{name}}/{{*rest}}"),
            any(delegate),
        )
        .with_state(manager)
}

/// GET {prefix}: all registered plugins, sorted by name.
async fn list_plugins(
    State(manager): State<Arc<NativePluginManager>>,
) -> Json<Vec<PluginInfo>> {
    Json(manager.all_plugins().await)
}

/// POST {prefix}/{name}/enable
async fn enable_plugin(
    State(manager): State<Arc<NativePluginManager>>,
    Path(name): Path<String>,
) -> Response {
    match manager.enable(&name).await {
        Ok(()) => Json(LifecycleResponse {
            plugin: name,
            status: "enabled",
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST {prefix}/{name}/disable
async fn disable_plugin(
    State(manager): State<Arc<NativePluginManager>>,
    Path(name): Path<String>,
) -> Response {
    match manager.disable(&name).await {
        Ok(()) => Json(LifecycleResponse {
            plugin: name,
            status: "disabled",
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Delegate into the plugin's private routing scope with the admin prefix
/// and plugin name stripped from the path.
async fn delegate(
    State(manager): State<Arc<NativePluginManager>>,
    Path((name, rest)): Path<(String, String)>,
    mut request: Request,
) -> Response {
    let query = request
        .uri()
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let stripped: Uri = match format!("/{rest}{query}").parse() {
        Ok(uri) => uri,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };
    *request.uri_mut() = stripped;
    manager.dispatch(&name, request).await
}
