// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin installer: fetches artifacts from the remote catalog and
//! persists them under a per-plugin directory.
//!
//! Every name and version is path-sanitized before any filesystem access.
//! A component load failure during install is logged and tolerated: the
//! plugin stays registered without a loadable component.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use weft_core::{ComponentHandle, ComponentLoader, WeftError};
use weft_plugin::manifest::{PluginManifest, MANIFEST_FILE_NAME};
use weft_plugin::resolver::{DependencyGraph, MissingPolicy};

use crate::local::LocalRegistry;
use crate::remote::RemoteRegistry;

/// File name for inline plugin source persisted next to the manifest.
pub const SOURCE_FILE_NAME: &str = "plugin.src";

/// Reject a name or version that could resolve outside the designated
/// artifact root.
pub fn sanitize_path_component(value: &str) -> Result<(), WeftError> {
    let unsafe_component = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains("..")
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0');
    if unsafe_component {
        return Err(WeftError::UnsafeArtifactPath {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Installs plugin artifacts under `install_dir/{name}/` and keeps the
/// local registry in sync.
pub struct PluginInstaller {
    remote: Option<Arc<RemoteRegistry>>,
    local: Arc<LocalRegistry>,
    loader: Option<Arc<dyn ComponentLoader>>,
    install_dir: PathBuf,
}

impl PluginInstaller {
    pub fn new(
        remote: Option<Arc<RemoteRegistry>>,
        local: Arc<LocalRegistry>,
        loader: Option<Arc<dyn ComponentLoader>>,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            remote,
            local,
            loader,
            install_dir: install_dir.into(),
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn local(&self) -> &Arc<LocalRegistry> {
        &self.local
    }

    /// Whether a plugin directory with a manifest exists on disk.
    pub fn is_installed(&self, name: &str) -> bool {
        if sanitize_path_component(name).is_err() {
            return false;
        }
        self.install_dir.join(name).join(MANIFEST_FILE_NAME).exists()
    }

    /// Install a plugin from the remote catalog.
    ///
    /// A no-op when the plugin is already installed. Path components are
    /// validated before the filesystem is touched.
    pub async fn install(&self, name: &str, version: &str) -> Result<(), WeftError> {
        sanitize_path_component(name)?;
        sanitize_path_component(version)?;

        if self.is_installed(name) {
            return Ok(());
        }

        let remote = self.remote.as_ref().ok_or_else(|| {
            WeftError::Config("no remote registry configured".to_string())
        })?;

        let bundle = remote.download(name, version).await?;
        bundle.manifest.validate()?;
        if bundle.manifest.name != name {
            return Err(WeftError::InvalidManifest {
                field: "name".to_string(),
                reason: format!(
                    "remote manifest names {:?}, requested {:?}",
                    bundle.manifest.name, name
                ),
            });
        }

        let plugin_dir = self.install_dir.join(name);
        std::fs::create_dir_all(&plugin_dir).map_err(|source| WeftError::Io {
            path: plugin_dir.display().to_string(),
            source,
        })?;
        bundle.manifest.save(&plugin_dir.join(MANIFEST_FILE_NAME))?;
        if let Some(source) = &bundle.source {
            let source_path = plugin_dir.join(SOURCE_FILE_NAME);
            std::fs::write(&source_path, source).map_err(|e| WeftError::Io {
                path: source_path.display().to_string(),
                source: e,
            })?;
        }

        let component = self.try_load_component(name, bundle.source.as_deref());
        self.local
            .register(bundle.manifest, component, Some(plugin_dir))?;
        info!(plugin = %name, version = %version, "plugin installed");
        Ok(())
    }

    /// Install from an on-disk bundle directory containing `plugin.json`
    /// and the plugin's files.
    pub fn install_from_bundle(&self, bundle_dir: &Path) -> Result<(), WeftError> {
        let manifest = PluginManifest::load(&bundle_dir.join(MANIFEST_FILE_NAME))?;
        sanitize_path_component(&manifest.name)?;

        let plugin_dir = self.install_dir.join(&manifest.name);
        copy_dir(bundle_dir, &plugin_dir)?;

        let source = std::fs::read_to_string(plugin_dir.join(SOURCE_FILE_NAME)).ok();
        let component = self.try_load_component(&manifest.name, source.as_deref());
        let name = manifest.name.clone();
        self.local.register(manifest, component, Some(plugin_dir))?;
        info!(plugin = %name, "plugin installed from bundle");
        Ok(())
    }

    /// Scan the install directory and register every installed plugin.
    ///
    /// Registration runs in dependency order so installed plugins that
    /// depend on each other resolve. An unreadable or invalid entry is
    /// logged and skipped rather than failing the whole scan.
    pub fn scan_installed(&self) -> Result<Vec<PluginManifest>, WeftError> {
        let Ok(read_dir) = std::fs::read_dir(&self.install_dir) else {
            return Ok(Vec::new());
        };

        let mut manifests: Vec<PluginManifest> = Vec::new();
        for entry in read_dir.flatten() {
            let manifest_path = entry.path().join(MANIFEST_FILE_NAME);
            if !manifest_path.exists() {
                continue;
            }
            match PluginManifest::load(&manifest_path) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => {
                    warn!(path = %manifest_path.display(), error = %e, "skipping unreadable plugin");
                }
            }
        }

        let mut graph = DependencyGraph::new();
        for manifest in &manifests {
            graph.insert(
                manifest.name.clone(),
                manifest.dependencies.iter().map(|d| d.name.clone()).collect(),
            );
        }
        let order = graph.full_enable_order(MissingPolicy::AssumeSatisfied)?;

        let mut registered = Vec::new();
        for name in order {
            let Some(manifest) = manifests.iter().find(|m| m.name == name).cloned() else {
                continue;
            };
            let plugin_dir = self.install_dir.join(&manifest.name);
            let source = std::fs::read_to_string(plugin_dir.join(SOURCE_FILE_NAME)).ok();
            let component = self.try_load_component(&manifest.name, source.as_deref());
            match self
                .local
                .register(manifest.clone(), component, Some(plugin_dir))
            {
                Ok(()) => registered.push(manifest),
                Err(e) => {
                    warn!(plugin = %manifest.name, error = %e, "skipping plugin during scan");
                }
            }
        }
        Ok(registered)
    }

    /// Remove a plugin's artifact directory and local registration.
    pub fn uninstall(&self, name: &str) -> Result<(), WeftError> {
        sanitize_path_component(name)?;
        if !self.is_installed(name) {
            return Err(WeftError::PluginNotFound {
                name: name.to_string(),
            });
        }

        // Refuses while dependents remain, before any file is removed.
        if self.local.contains(name) {
            self.local.unregister(name)?;
        }

        let plugin_dir = self.install_dir.join(name);
        std::fs::remove_dir_all(&plugin_dir).map_err(|source| WeftError::Io {
            path: plugin_dir.display().to_string(),
            source,
        })?;
        info!(plugin = %name, "plugin uninstalled");
        Ok(())
    }

    fn try_load_component(&self, name: &str, source: Option<&str>) -> Option<ComponentHandle> {
        let loader = self.loader.as_ref()?;
        let source = source?;
        match loader.load(name, source) {
            Ok(component) => Some(component),
            Err(e) => {
                warn!(plugin = %name, error = %e, "component load failed; continuing without it");
                None
            }
        }
    }
}

/// Recursively copy a directory tree.
fn copy_dir(src: &Path, dst: &Path) -> Result<(), WeftError> {
    let io_err = |path: &Path, source: std::io::Error| WeftError::Io {
        path: path.display().to_string(),
        source,
    };

    std::fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;
    for entry in std::fs::read_dir(src).map_err(|e| io_err(src, e))? {
        let entry = entry.map_err(|e| io_err(src, e))?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| io_err(&target, e))?;
        }
    }
    Ok(())
}
