// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Weft plugin engine.

use thiserror::Error;

use crate::types::FactoryKind;

/// The primary error type used across all Weft registries and managers.
///
/// Every failure names the offending identifier so callers can report it
/// without reconstructing context. Conflicts always leave existing state
/// in place; the new request is the one rejected.
#[derive(Debug, Error)]
pub enum WeftError {
    /// A version string did not parse as `major.minor.patch`.
    #[error("malformed version {input:?}: {reason}")]
    MalformedVersion { input: String, reason: String },

    /// A constraint string did not parse as an operator plus a version.
    #[error("malformed constraint {input:?}: {reason}")]
    MalformedConstraint { input: String, reason: String },

    /// A manifest failed validation; `field` names the first offender.
    #[error("invalid manifest: field {field:?}: {reason}")]
    InvalidManifest { field: String, reason: String },

    /// A plugin with the same name is already registered.
    #[error("plugin {name:?} is already registered")]
    DuplicateRegistration { name: String },

    /// A factory type key is already claimed by an earlier plugin.
    #[error("plugin {plugin:?}: {kind} type {type_name:?} already registered")]
    DuplicateFactoryType {
        plugin: String,
        kind: FactoryKind,
        type_name: String,
    },

    /// A capability contract of the same name exists with a different
    /// interface identity.
    #[error("capability contract {name:?} already registered with a different interface")]
    DuplicateContract { name: String },

    /// The dependency graph contains a cycle through the named plugin.
    #[error("circular dependency detected involving plugin {name:?}")]
    CircularDependency { name: String },

    /// A declared dependency is not present in the known set.
    #[error("plugin {name:?}: dependency {dependency:?} is not registered")]
    UnsatisfiedDependency { name: String, dependency: String },

    /// A dependency is registered but its version does not satisfy the
    /// dependent's constraint.
    #[error(
        "plugin {name:?}: dependency {dependency:?} version {actual} does not satisfy {constraint}"
    )]
    VersionConstraintUnsatisfied {
        name: String,
        dependency: String,
        constraint: String,
        actual: String,
    },

    /// A premium plugin was rejected by the configured license validator.
    #[error("plugin {plugin:?} requires a valid license: {reason}")]
    LicenseRequired { plugin: String, reason: String },

    /// A manifest declared a tier outside the known set.
    #[error("plugin {plugin:?} has unknown tier {tier:?}")]
    UnknownTier { plugin: String, tier: String },

    /// Re-registration attempted with a lower version than the one held.
    #[error("plugin {name:?}: version {proposed} is lower than registered version {current}")]
    VersionDowngrade {
        name: String,
        current: String,
        proposed: String,
    },

    /// Required capabilities with no enabled provider; lists every one.
    #[error("missing capabilities: {}", capabilities.join(", "))]
    MissingCapabilities { capabilities: Vec<String> },

    /// No capability contract or provider under the requested name.
    #[error("no provider registered for capability {name:?}")]
    NoProvider { name: String },

    /// The named plugin is not known to the registry or manager.
    #[error("plugin {name:?} is not registered")]
    PluginNotFound { name: String },

    /// Unregistration refused while other plugins still depend on the target.
    #[error("plugin {name:?} is still required by: {}", dependents.join(", "))]
    DependentsRemain {
        name: String,
        dependents: Vec<String>,
    },

    /// A name or version would escape the designated artifact root.
    #[error("unsafe artifact path component {value:?}")]
    UnsafeArtifactPath { value: String },

    /// The remote registry could not be reached. Distinct from
    /// [`WeftError::PluginNotFound`] so installers can decide to retry.
    #[error("remote registry unavailable: {message}")]
    RegistryUnavailable { message: String },

    /// The external code-loading mechanism rejected a plugin source.
    #[error("component load failed for {name:?}: {reason}")]
    ComponentLoad { name: String, reason: String },

    /// A plugin lifecycle hook returned an error.
    #[error("plugin {plugin:?}: {hook} hook failed: {reason}")]
    HookFailed {
        plugin: String,
        hook: String,
        reason: String,
    },

    /// Storage backend errors (database open, query, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Filesystem errors while managing plugin artifacts.
    #[error("io error at {path:?}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WeftError {
    /// True when the error indicates "does not exist" rather than a
    /// conflict, policy rejection, or infrastructure failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WeftError::PluginNotFound { .. } | WeftError::NoProvider { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_offending_identifier() {
        let err = WeftError::CircularDependency {
            name: "cycle-a".into(),
        };
        assert!(err.to_string().contains("cycle-a"));

        let err = WeftError::DuplicateFactoryType {
            plugin: "http-kit".into(),
            kind: FactoryKind::Module,
            type_name: "http.server".into(),
        };
        assert!(err.to_string().contains("http.server"));
        assert!(err.to_string().contains("module"));

        let err = WeftError::VersionDowngrade {
            name: "a".into(),
            current: "1.0.0".into(),
            proposed: "0.9.0".into(),
        };
        assert!(err.to_string().contains("0.9.0"));
    }

    #[test]
    fn missing_capabilities_lists_every_entry() {
        let err = WeftError::MissingCapabilities {
            capabilities: vec!["http-server".into(), "message-broker".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("http-server"));
        assert!(msg.contains("message-broker"));
    }

    #[test]
    fn not_found_classification() {
        assert!(
            WeftError::PluginNotFound { name: "x".into() }.is_not_found()
        );
        assert!(
            !WeftError::RegistryUnavailable {
                message: "dns".into()
            }
            .is_not_found()
        );
    }
}
