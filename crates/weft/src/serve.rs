// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `weft serve` command implementation.
//!
//! Wires the configured storage, registries, and native plugin manager
//! together, restores persisted plugin state, and serves the gateway.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use weft_config::WeftConfig;
use weft_core::WeftError;
use weft_gateway::{
    start_server, NativePluginManager, PluginContext, RegistryState, ServerConfig,
};
use weft_registry::{CompositeRegistry, LocalRegistry, PluginInstaller, RemoteRegistry};
use weft_storage::Database;

/// Run the `weft serve` command until the process exits.
pub async fn run_serve(config: WeftConfig) -> Result<(), WeftError> {
    init_tracing(&config.log.level);
    info!("starting weft serve");

    let db = Database::open(&config.storage.database_path).await?;

    // Artifact registries: local always, remote only when configured.
    let local = Arc::new(LocalRegistry::new());
    let remote = if config.plugins.registry_url.is_empty() {
        None
    } else {
        Some(Arc::new(
            RemoteRegistry::new(config.plugins.registry_url.clone())
                .with_cache_ttl(Duration::from_secs(config.plugins.cache_ttl_secs)),
        ))
    };
    let composite = Arc::new(CompositeRegistry::new(Arc::clone(&local), remote.clone()));

    // Code loading is an external collaborator; the control plane runs
    // without one and registers artifacts metadata-only.
    let installer = Arc::new(PluginInstaller::new(
        remote,
        Arc::clone(&local),
        None,
        config.plugins.install_dir.clone(),
    ));

    let scanned = installer.scan_installed()?;
    info!(count = scanned.len(), "scanned installed plugins");

    let manager = Arc::new(NativePluginManager::new(Some(db.clone())));
    manager
        .set_context(PluginContext {
            data_dir: PathBuf::from(&config.plugins.data_dir),
            db: Some(db),
        })
        .await;

    if let Err(e) = manager.restore_state().await {
        warn!(error = %e, "failed to restore plugin state");
    }

    let registry_state = RegistryState {
        composite,
        installer,
        loader: None,
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    start_server(&server_config, manager, registry_state).await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
