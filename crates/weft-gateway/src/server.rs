// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Assembles the admin and registry routers with shared middleware and
//! serves them on the configured address.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use weft_core::WeftError;

use crate::admin::admin_router;
use crate::native::NativePluginManager;
use crate::registry_api::{registry_router, RegistryState};

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Assemble the full gateway router: health, admin API, registry API.
pub fn gateway_router(manager: Arc<NativePluginManager>, registry: RegistryState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .merge(admin_router(manager))
        .merge(registry_router(registry))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /health
async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Bind and serve the gateway until the process exits.
pub async fn start_server(
    config: &ServerConfig,
    manager: Arc<NativePluginManager>,
    registry: RegistryState,
) -> Result<(), WeftError> {
    let app = gateway_router(manager, registry);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        WeftError::Config(format!("failed to bind gateway to {addr}: {e}"))
    })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| WeftError::Internal(format!("gateway server error: {e}")))
}
