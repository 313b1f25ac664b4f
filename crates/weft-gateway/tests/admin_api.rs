// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the native plugin admin API.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceExt;

use weft_core::WeftError;
use weft_gateway::{admin_router, NativePlugin, NativePluginManager, PluginContext, PluginInfo};
use weft_plugin::manifest::Dependency;

struct SimplePlugin {
    name: String,
    version: String,
    deps: Vec<Dependency>,
}

impl SimplePlugin {
    fn new(name: &str, version: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            version: version.to_string(),
            deps: Vec::new(),
        })
    }

    fn with_deps(name: &str, version: &str, deps: Vec<Dependency>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            version: version.to_string(),
            deps,
        })
    }
}

#[async_trait]
impl NativePlugin for SimplePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn description(&self) -> &str {
        "A test plugin"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.deps.clone()
    }

    fn register_routes(&self, router: Router) -> Router {
        let plugin = self.name.clone();
        router
            .route(
                "/tables",
                get(move || {
                    let plugin = plugin.clone();
                    async move {
                        Json(serde_json::json!({"plugin": plugin, "endpoint": "tables"}))
                    }
                }),
            )
            .route("/health", get(|| async { Json(serde_json::json!({"status": "ok"})) }))
    }

    async fn on_enable(&self, _ctx: &PluginContext) -> Result<(), WeftError> {
        Ok(())
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn post_request(path: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

async fn manager_with(plugins: Vec<Arc<SimplePlugin>>) -> Arc<NativePluginManager> {
    let manager = NativePluginManager::new(None);
    for plugin in plugins {
        manager.register(plugin).await.unwrap();
    }
    Arc::new(manager)
}

#[tokio::test]
async fn list_returns_plugins_sorted_by_name() {
    let manager = manager_with(vec![
        SimplePlugin::new("bravo", "2.0.0"),
        SimplePlugin::new("alpha", "1.0.0"),
    ])
    .await;
    manager.enable("alpha").await.unwrap();
    let app = admin_router(manager);

    let response = app.oneshot(get_request("/api/v1/admin/plugins")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let plugins: Vec<PluginInfo> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0].name, "alpha");
    assert!(plugins[0].enabled);
    assert_eq!(plugins[1].name, "bravo");
    assert!(!plugins[1].enabled);
}

#[tokio::test]
async fn enable_and_disable_via_http() {
    let manager = manager_with(vec![SimplePlugin::new("store-browser", "1.0.0")]).await;
    let app = admin_router(Arc::clone(&manager));

    let response = app
        .clone()
        .oneshot(post_request("/api/v1/admin/plugins/store-browser/enable"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(manager.is_enabled("store-browser").await);

    let response = app
        .oneshot(post_request("/api/v1/admin/plugins/store-browser/disable"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!manager.is_enabled("store-browser").await);
}

#[tokio::test]
async fn enable_unknown_plugin_is_404_with_cause() {
    let manager = manager_with(vec![]).await;
    let app = admin_router(manager);

    let response = app
        .oneshot(post_request("/api/v1/admin/plugins/ghost/enable"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn enable_with_unsatisfied_version_constraint_is_422() {
    let manager = manager_with(vec![
        SimplePlugin::new("dep-lib", "0.9.0"),
        SimplePlugin::with_deps(
            "consumer",
            "1.0.0",
            vec![Dependency::new("dep-lib", ">=1.0.0")],
        ),
    ])
    .await;
    let app = admin_router(manager);

    let response = app
        .oneshot(post_request("/api/v1/admin/plugins/consumer/enable"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("dep-lib"));
    assert!(message.contains(">=1.0.0"));
}

#[tokio::test]
async fn delegation_reaches_enabled_plugin_routes() {
    let manager = manager_with(vec![SimplePlugin::new("store-browser", "1.0.0")]).await;
    manager.enable("store-browser").await.unwrap();
    let app = admin_router(manager);

    let response = app
        .oneshot(get_request("/api/v1/admin/plugins/store-browser/tables"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["plugin"], "store-browser");
    assert_eq!(body["endpoint"], "tables");
}

#[tokio::test]
async fn delegation_to_disabled_plugin_matches_unknown_plugin_shape() {
    let manager = manager_with(vec![SimplePlugin::new("store-browser", "1.0.0")]).await;
    // Registered but never enabled.
    let app = admin_router(manager);

    let disabled = app
        .clone()
        .oneshot(get_request("/api/v1/admin/plugins/store-browser/tables"))
        .await
        .unwrap();
    let unknown = app
        .oneshot(get_request("/api/v1/admin/plugins/nonexistent/tables"))
        .await
        .unwrap();

    assert_eq!(disabled.status(), StatusCode::NOT_FOUND);
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let disabled_bytes =
        axum::body::to_bytes(disabled.into_body(), usize::MAX).await.unwrap();
    let unknown_bytes = axum::body::to_bytes(unknown.into_body(), usize::MAX).await.unwrap();
    assert_eq!(disabled_bytes, unknown_bytes);
}

#[tokio::test]
async fn delegation_stops_after_disable() {
    let manager = manager_with(vec![SimplePlugin::new("store-browser", "1.0.0")]).await;
    manager.enable("store-browser").await.unwrap();
    manager.disable("store-browser").await.unwrap();
    let app = admin_router(manager);

    let response = app
        .oneshot(get_request("/api/v1/admin/plugins/store-browser/tables"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_rejects_non_get_methods() {
    let manager = manager_with(vec![]).await;
    let app = admin_router(manager);

    let response = app.oneshot(post_request("/api/v1/admin/plugins")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unrelated_paths_are_404() {
    let manager = manager_with(vec![]).await;
    let app = admin_router(manager);

    let response = app.oneshot(get_request("/some/random/path")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
