// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier / licensing gate shared by both lifecycle managers.
//!
//! Runs before any state mutation during load or enable, so a licensing
//! failure leaves the system unchanged.

use std::str::FromStr;

use tracing::warn;

use weft_core::types::PluginTier;
use weft_core::WeftError;

/// Approves or denies premium plugin usage.
///
/// When no validator is configured, premium plugins are allowed with a
/// warning so self-hosted deployments keep working without a license
/// server.
pub trait LicenseValidator: Send + Sync {
    /// Returns `Ok(())` if the named plugin is licensed for use.
    fn validate_plugin(&self, plugin: &str) -> Result<(), WeftError>;
}

/// Check whether a plugin's tier permits activation.
///
/// Core, community, and the empty tier always pass. Premium delegates to
/// the validator when one is configured. Any other tier value is rejected.
pub fn validate_tier(
    plugin: &str,
    tier: &str,
    validator: Option<&dyn LicenseValidator>,
) -> Result<(), WeftError> {
    if tier.is_empty() {
        return Ok(());
    }
    match PluginTier::from_str(tier) {
        Ok(PluginTier::Core) | Ok(PluginTier::Community) => Ok(()),
        Ok(PluginTier::Premium) => match validator {
            None => {
                warn!(
                    plugin,
                    "premium plugin allowed without license validator (self-hosted deployment)"
                );
                Ok(())
            }
            Some(v) => v.validate_plugin(plugin).map_err(|e| WeftError::LicenseRequired {
                plugin: plugin.to_string(),
                reason: e.to_string(),
            }),
        },
        Err(_) => Err(WeftError::UnknownTier {
            plugin: plugin.to_string(),
            tier: tier.to_string(),
        }),
    }
}
