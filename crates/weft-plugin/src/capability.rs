// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability contract and provider catalog.
//!
//! A contract names an abstract service interface; providers are ranked by
//! priority. The catalog is read-mostly: lookups take a shared lock while a
//! single writer registers. Interface identity is a `TypeId`, so "does this
//! plugin implement the extra interface" is an explicit type test at load
//! time rather than reflection.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

use weft_core::WeftError;

/// A named abstract service interface a provider must satisfy.
#[derive(Debug, Clone)]
pub struct Contract {
    pub name: String,
    pub description: String,
    pub interface_id: TypeId,
}

impl Contract {
    /// Build a contract whose identity is the interface type `T`
    /// (typically `dyn SomeServiceTrait`).
    pub fn of<T: ?Sized + 'static>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            interface_id: TypeId::of::<T>(),
        }
    }
}

/// One plugin offering one capability at a given priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub capability: String,
    pub plugin: String,
    pub priority: i32,
    pub interface_id: TypeId,
}

#[derive(Default)]
struct Inner {
    contracts: HashMap<String, Contract>,
    providers: HashMap<String, Vec<ProviderEntry>>,
}

/// Catalog of capability contracts and the providers offering each.
///
/// Instances are injected by constructor wherever they are needed; there is
/// no process-global registry.
#[derive(Default)]
pub struct CapabilityRegistry {
    inner: RwLock<Inner>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract. Re-registering the identical contract is
    /// idempotent; the same name with a different interface identity is a
    /// conflict and the existing contract wins.
    pub fn register_contract(&self, contract: Contract) -> Result<(), WeftError> {
        if contract.name.is_empty() {
            return Err(WeftError::Internal(
                "capability contract name must not be empty".into(),
            ));
        }
        let mut inner = self.inner.write().expect("capability registry lock poisoned");
        if let Some(existing) = inner.contracts.get(&contract.name) {
            if existing.interface_id != contract.interface_id {
                return Err(WeftError::DuplicateContract {
                    name: contract.name,
                });
            }
            return Ok(());
        }
        inner.contracts.insert(contract.name.clone(), contract);
        Ok(())
    }

    /// Register a provider for a capability.
    ///
    /// Providers may arrive before the contract is known; they stay latent
    /// until a consumer resolves through a registered contract.
    pub fn register_provider(
        &self,
        capability: &str,
        plugin: &str,
        priority: i32,
        interface_id: TypeId,
    ) -> Result<(), WeftError> {
        if capability.is_empty() || plugin.is_empty() {
            return Err(WeftError::Internal(
                "capability and plugin names must not be empty".into(),
            ));
        }
        let mut inner = self.inner.write().expect("capability registry lock poisoned");
        inner
            .providers
            .entry(capability.to_string())
            .or_default()
            .push(ProviderEntry {
                capability: capability.to_string(),
                plugin: plugin.to_string(),
                priority,
                interface_id,
            });
        Ok(())
    }

    /// Whether at least one provider is registered for the capability.
    pub fn has_provider(&self, capability: &str) -> bool {
        let inner = self.inner.read().expect("capability registry lock poisoned");
        inner
            .providers
            .get(capability)
            .is_some_and(|p| !p.is_empty())
    }

    /// The registered contract for a capability, if any.
    pub fn contract_for(&self, capability: &str) -> Option<Contract> {
        let inner = self.inner.read().expect("capability registry lock poisoned");
        inner.contracts.get(capability).cloned()
    }

    /// Resolve the highest-priority provider for a capability.
    ///
    /// Ties are broken by registration order (first wins). Fails when the
    /// contract is unknown or no provider has been registered.
    pub fn resolve(&self, capability: &str) -> Result<ProviderEntry, WeftError> {
        let inner = self.inner.read().expect("capability registry lock poisoned");
        if !inner.contracts.contains_key(capability) {
            return Err(WeftError::NoProvider {
                name: capability.to_string(),
            });
        }
        let providers = inner.providers.get(capability).ok_or_else(|| {
            WeftError::NoProvider {
                name: capability.to_string(),
            }
        })?;
        let mut best: Option<&ProviderEntry> = None;
        for entry in providers {
            if best.is_none_or(|b| entry.priority > b.priority) {
                best = Some(entry);
            }
        }
        best.cloned().ok_or_else(|| WeftError::NoProvider {
            name: capability.to_string(),
        })
    }

    /// All registered capability names, sorted.
    pub fn list_capabilities(&self) -> Vec<String> {
        let inner = self.inner.read().expect("capability registry lock poisoned");
        let mut names: Vec<String> = inner.contracts.keys().cloned().collect();
        names.sort();
        names
    }

    /// Copies of every provider entry for a capability.
    pub fn list_providers(&self, capability: &str) -> Vec<ProviderEntry> {
        let inner = self.inner.read().expect("capability registry lock poisoned");
        inner.providers.get(capability).cloned().unwrap_or_default()
    }
}
