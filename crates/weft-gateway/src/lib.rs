// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native plugin manager and administrative HTTP surface for Weft.
//!
//! Hosts the lifecycle manager for HTTP-facing administrative extensions
//! (durable enable/disable state, cascading activation, per-plugin request
//! dispatch) and the axum routers exposing the admin and registry APIs.

pub mod admin;
pub mod native;
pub mod registry_api;
pub mod respond;
pub mod server;

pub use admin::{admin_router, ADMIN_PLUGIN_PREFIX};
pub use native::{NativePlugin, NativePluginManager, PluginContext, PluginInfo, UiPageDef};
pub use registry_api::{registry_router, RegistryState};
pub use respond::{error_response, status_for, ErrorResponse};
pub use server::{gateway_router, start_server, ServerConfig};
