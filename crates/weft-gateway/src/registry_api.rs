// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry HTTP API (artifact management).
//!
//! - `GET    /api/plugins`                 list installed plugins
//! - `GET    /api/plugins?q=`              merged local+remote search
//! - `POST   /api/plugins`                 register, optional inline source
//! - `GET    /api/plugins/{name}`          fetch one manifest
//! - `DELETE /api/plugins/{name}`          uninstall/unregister
//! - `POST   /api/plugins/{name}/install`  install from the remote catalog

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use weft_core::ComponentLoader;
use weft_plugin::manifest::PluginManifest;
use weft_registry::{sanitize_path_component, CompositeRegistry, PluginInstaller};

use crate::respond::{error_response, ErrorResponse};

/// Shared state for the registry API handlers.
#[derive(Clone)]
pub struct RegistryState {
    pub composite: Arc<CompositeRegistry>,
    pub installer: Arc<PluginInstaller>,
    pub loader: Option<Arc<dyn ComponentLoader>>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstallParams {
    version: String,
}

/// Body for `POST /api/plugins`.
#[derive(Debug, Serialize, Deserialize)]
struct RegisterRequest {
    manifest: PluginManifest,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Serialize)]
struct InstallResponse {
    plugin: String,
    version: String,
    status: &'static str,
}

/// Build the registry API router.
pub fn registry_router(state: RegistryState) -> Router {
    Router::new()
        .route("/api/plugins", get(list_or_search).post(register_plugin))
        .route(
            "/api/plugins/{name}",
            get(get_plugin).delete(delete_plugin),
        )
        .route("/api/plugins/{name}/install", post(install_plugin))
        .with_state(state)
}

/// GET /api/plugins: installed plugins, or a merged search with `?q=`.
async fn list_or_search(
    State(state): State<RegistryState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<PluginManifest>> {
    match params.q {
        Some(query) => Json(state.composite.search(&query).await),
        None => Json(state.composite.local().search("")),
    }
}

/// POST /api/plugins: register a manifest, with optional inline source.
///
/// 400 on a malformed body or missing manifest, 422 on manifest or
/// dependency validation failure, 201 with the manifest on success.
async fn register_plugin(
    State(state): State<RegistryState>,
    body: Result<Json<serde_json::Value>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Ok(Json(raw)) = body else {
        return bad_request("request body is not valid JSON");
    };
    if raw.get("manifest").is_none() {
        return bad_request("missing manifest");
    }
    let request: RegisterRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => return bad_request(&format!("malformed body: {e}")),
    };

    if let Err(e) = request.manifest.validate() {
        return error_response(&e);
    }

    // An inline source that fails to load is tolerated: the plugin is
    // registered without a runnable component.
    let component = match (&state.loader, &request.source) {
        (Some(loader), Some(source)) => match loader.load(&request.manifest.name, source) {
            Ok(component) => Some(component),
            Err(e) => {
                warn!(plugin = %request.manifest.name, error = %e,
                    "component load failed during register; continuing without it");
                None
            }
        },
        _ => None,
    };

    match state
        .composite
        .local()
        .register(request.manifest.clone(), component, None)
    {
        Ok(()) => (StatusCode::CREATED, Json(request.manifest)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/plugins/{name}
async fn get_plugin(State(state): State<RegistryState>, Path(name): Path<String>) -> Response {
    match state.composite.get(&name).await {
        Ok(manifest) => Json(manifest).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/plugins/{name}
async fn delete_plugin(State(state): State<RegistryState>, Path(name): Path<String>) -> Response {
    let result = if state.installer.is_installed(&name) {
        state.installer.uninstall(&name)
    } else {
        state.composite.local().unregister(&name).map(|_| ())
    };
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/plugins/{name}/install?version=
///
/// Name and version are validated against path traversal before any
/// filesystem access.
async fn install_plugin(
    State(state): State<RegistryState>,
    Path(name): Path<String>,
    Query(params): Query<InstallParams>,
) -> Response {
    for value in [name.as_str(), params.version.as_str()] {
        if let Err(e) = sanitize_path_component(value) {
            return error_response(&e);
        }
    }

    match state.installer.install(&name, &params.version).await {
        Ok(()) => Json(InstallResponse {
            plugin: name,
            version: params.version,
            status: "installed",
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
