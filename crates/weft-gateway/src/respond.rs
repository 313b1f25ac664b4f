// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-HTTP mapping shared by the gateway routers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use weft_core::WeftError;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error description naming the offending plugin or field.
    pub error: String,
}

/// The HTTP status a Weft error maps to.
pub fn status_for(error: &WeftError) -> StatusCode {
    match error {
        WeftError::PluginNotFound { .. } | WeftError::NoProvider { .. } => StatusCode::NOT_FOUND,
        WeftError::MalformedVersion { .. }
        | WeftError::MalformedConstraint { .. }
        | WeftError::InvalidManifest { .. }
        | WeftError::UnsatisfiedDependency { .. }
        | WeftError::VersionConstraintUnsatisfied { .. }
        | WeftError::CircularDependency { .. }
        | WeftError::UnknownTier { .. }
        | WeftError::MissingCapabilities { .. }
        | WeftError::UnsafeArtifactPath { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        WeftError::DuplicateRegistration { .. }
        | WeftError::DuplicateContract { .. }
        | WeftError::DuplicateFactoryType { .. }
        | WeftError::VersionDowngrade { .. }
        | WeftError::DependentsRemain { .. } => StatusCode::CONFLICT,
        WeftError::LicenseRequired { .. } => StatusCode::FORBIDDEN,
        WeftError::RegistryUnavailable { .. } => StatusCode::BAD_GATEWAY,
        WeftError::HookFailed { .. }
        | WeftError::ComponentLoad { .. }
        | WeftError::Storage { .. }
        | WeftError::Io { .. }
        | WeftError::Config(_)
        | WeftError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a Weft error as a JSON error response.
pub fn error_response(error: &WeftError) -> Response {
    (
        status_for(error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            status_for(&WeftError::PluginNotFound { name: "x".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&WeftError::VersionDowngrade {
                name: "x".into(),
                current: "1.0.0".into(),
                proposed: "0.9.0".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&WeftError::LicenseRequired {
                plugin: "x".into(),
                reason: "denied".into()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&WeftError::RegistryUnavailable {
                message: "dns".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&WeftError::UnsatisfiedDependency {
                name: "x".into(),
                dependency: "y".into()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
