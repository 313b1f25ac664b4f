// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine plugin loader: aggregates per-plugin contributions into the
//! unified factory tables consumed by the orchestration engine.
//!
//! Factory keys never overwrite: a duplicate type name is a hard error
//! naming the key, and the earlier plugin's contribution stays intact.
//! Accessors hand out defensive copies so callers cannot mutate
//! loader-internal state.

use std::collections::HashMap;
use std::sync::Arc;

use weft_core::{CapabilityRole, FactoryKind, WeftError};

use crate::capability::CapabilityRegistry;
use crate::engine::{
    ConfigTransformHook, EnginePlugin, ModuleFactory, ModuleSchema, StepFactory, TriggerFactory,
    WiringHook, WorkflowHandlerFactory,
};
use crate::resolver::{DependencyGraph, MissingPolicy};
use crate::tier::{validate_tier, LicenseValidator};

/// Loads [`EnginePlugin`]s and populates the factory tables, capability
/// registry, schema table, and hook lists.
pub struct PluginLoader {
    capability_registry: Arc<CapabilityRegistry>,
    module_factories: HashMap<String, Arc<dyn ModuleFactory>>,
    step_factories: HashMap<String, Arc<dyn StepFactory>>,
    trigger_factories: HashMap<String, Arc<dyn TriggerFactory>>,
    handler_factories: HashMap<String, Arc<dyn WorkflowHandlerFactory>>,
    module_schemas: HashMap<String, ModuleSchema>,
    wiring_hooks: Vec<WiringHook>,
    config_transform_hooks: Vec<ConfigTransformHook>,
    plugins: Vec<Arc<dyn EnginePlugin>>,
    license_validator: Option<Arc<dyn LicenseValidator>>,
}

impl PluginLoader {
    /// Create a loader backed by the given capability registry.
    pub fn new(capability_registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            capability_registry,
            module_factories: HashMap::new(),
            step_factories: HashMap::new(),
            trigger_factories: HashMap::new(),
            handler_factories: HashMap::new(),
            module_schemas: HashMap::new(),
            wiring_hooks: Vec::new(),
            config_transform_hooks: Vec::new(),
            plugins: Vec::new(),
            license_validator: None,
        }
    }

    /// Register a license validator used for premium tier plugins.
    pub fn set_license_validator(&mut self, validator: Arc<dyn LicenseValidator>) {
        self.license_validator = Some(validator);
    }

    /// Validate a plugin's manifest and tier, then merge its contributions.
    ///
    /// Ordering: manifest validation, tier gate, capability contracts,
    /// declared providers, factory tables (module, step, trigger, handler),
    /// UI schemas, hooks. The tier gate runs before any mutation, so a
    /// licensing failure leaves the loader unchanged.
    pub fn load_plugin(&mut self, plugin: Arc<dyn EnginePlugin>) -> Result<(), WeftError> {
        let manifest = plugin.engine_manifest().clone();
        manifest.validate()?;
        validate_tier(
            &manifest.name,
            &manifest.tier,
            self.license_validator.as_deref(),
        )?;

        for contract in plugin.contracts() {
            self.capability_registry.register_contract(contract)?;
        }

        for decl in &manifest.capabilities {
            if decl.role == CapabilityRole::Provider {
                self.capability_registry.register_provider(
                    &decl.name,
                    &manifest.name,
                    decl.priority,
                    plugin.as_any().type_id(),
                )?;
            }
        }

        for (type_name, factory) in plugin.module_factories() {
            if self.module_factories.contains_key(&type_name) {
                return Err(WeftError::DuplicateFactoryType {
                    plugin: manifest.name,
                    kind: FactoryKind::Module,
                    type_name,
                });
            }
            self.module_factories.insert(type_name, factory);
        }

        for (type_name, factory) in plugin.step_factories() {
            if self.step_factories.contains_key(&type_name) {
                return Err(WeftError::DuplicateFactoryType {
                    plugin: manifest.name,
                    kind: FactoryKind::Step,
                    type_name,
                });
            }
            self.step_factories.insert(type_name, factory);
        }

        for (type_name, factory) in plugin.trigger_factories() {
            if self.trigger_factories.contains_key(&type_name) {
                return Err(WeftError::DuplicateFactoryType {
                    plugin: manifest.name,
                    kind: FactoryKind::Trigger,
                    type_name,
                });
            }
            self.trigger_factories.insert(type_name, factory);
        }

        for (type_name, factory) in plugin.workflow_handler_factories() {
            if self.handler_factories.contains_key(&type_name) {
                return Err(WeftError::DuplicateFactoryType {
                    plugin: manifest.name,
                    kind: FactoryKind::WorkflowHandler,
                    type_name,
                });
            }
            self.handler_factories.insert(type_name, factory);
        }

        for schema in plugin.module_schemas() {
            self.module_schemas.insert(schema.module_type.clone(), schema);
        }

        self.wiring_hooks.extend(plugin.wiring_hooks());
        self.config_transform_hooks.extend(plugin.config_transform_hooks());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Load a set of plugins in dependency order.
    ///
    /// Dependencies absent from the set are treated as already satisfied
    /// (the engine may load a partial subset). Loading stops at the first
    /// error with no rollback of previously loaded members.
    pub fn load_plugins(&mut self, plugins: Vec<Arc<dyn EnginePlugin>>) -> Result<(), WeftError> {
        let mut by_name: HashMap<String, Arc<dyn EnginePlugin>> = HashMap::new();
        let mut graph = DependencyGraph::new();
        for plugin in plugins {
            let manifest = plugin.engine_manifest();
            graph.insert(
                manifest.name.clone(),
                manifest.dependencies.iter().map(|d| d.name.clone()).collect(),
            );
            by_name.insert(manifest.name.clone(), plugin);
        }

        let order = graph.full_enable_order(MissingPolicy::AssumeSatisfied)?;
        for name in order {
            if let Some(plugin) = by_name.remove(&name) {
                self.load_plugin(plugin)?;
            }
        }
        Ok(())
    }

    /// Defensive copy of the module factory table.
    pub fn module_factories(&self) -> HashMap<String, Arc<dyn ModuleFactory>> {
        self.module_factories.clone()
    }

    /// Defensive copy of the step factory table.
    pub fn step_factories(&self) -> HashMap<String, Arc<dyn StepFactory>> {
        self.step_factories.clone()
    }

    /// Defensive copy of the trigger factory table.
    pub fn trigger_factories(&self) -> HashMap<String, Arc<dyn TriggerFactory>> {
        self.trigger_factories.clone()
    }

    /// Defensive copy of the workflow handler factory table.
    pub fn workflow_handler_factories(&self) -> HashMap<String, Arc<dyn WorkflowHandlerFactory>> {
        self.handler_factories.clone()
    }

    /// Defensive copy of the module schema table.
    pub fn module_schemas(&self) -> HashMap<String, ModuleSchema> {
        self.module_schemas.clone()
    }

    /// All wiring hooks, highest priority first; ties keep insertion order.
    pub fn wiring_hooks(&self) -> Vec<WiringHook> {
        let mut hooks = self.wiring_hooks.clone();
        hooks.sort_by_key(|h| std::cmp::Reverse(h.priority));
        hooks
    }

    /// All config transform hooks, highest priority first; ties keep
    /// insertion order.
    pub fn config_transform_hooks(&self) -> Vec<ConfigTransformHook> {
        let mut hooks = self.config_transform_hooks.clone();
        hooks.sort_by_key(|h| std::cmp::Reverse(h.priority));
        hooks
    }

    /// The loader's capability registry.
    pub fn capability_registry(&self) -> &Arc<CapabilityRegistry> {
        &self.capability_registry
    }

    /// Successfully loaded plugins in load order.
    pub fn loaded_plugins(&self) -> Vec<Arc<dyn EnginePlugin>> {
        self.plugins.clone()
    }

    /// Verify a set of required capabilities against the registry,
    /// reporting every missing one rather than the first.
    pub fn verify_capabilities(&self, required: &[String]) -> Result<(), WeftError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !self.capability_registry.has_provider(name.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WeftError::MissingCapabilities {
                capabilities: missing,
            })
        }
    }

    /// Verify every consumer-role declaration of the loaded plugins.
    pub fn verify_consumer_capabilities(&self) -> Result<(), WeftError> {
        let required: Vec<String> = self
            .plugins
            .iter()
            .flat_map(|p| p.engine_manifest().capabilities.iter())
            .filter(|decl| decl.role == CapabilityRole::Consumer)
            .map(|decl| decl.name.clone())
            .collect();
        self.verify_capabilities(&required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Contract;
    use crate::manifest::{CapabilityDecl, Dependency, PluginManifest};
    use serde_json::Value;
    use std::any::Any;
    use weft_core::ComponentHandle;

    struct NamedFactory(&'static str);

    impl ModuleFactory for NamedFactory {
        fn create(&self, _name: &str, _config: &Value) -> Result<ComponentHandle, WeftError> {
            Ok(ComponentHandle::new(self.0))
        }
    }

    impl StepFactory for NamedFactory {
        fn create(&self, _name: &str, _config: &Value) -> Result<ComponentHandle, WeftError> {
            Ok(ComponentHandle::new(self.0))
        }
    }

    /// Test plugin assembled from parts.
    struct TestPlugin {
        manifest: PluginManifest,
        modules: Vec<(&'static str, &'static str)>,
        steps: Vec<(&'static str, &'static str)>,
        hooks: Vec<WiringHook>,
    }

    impl TestPlugin {
        fn named(name: &str) -> Self {
            Self {
                manifest: PluginManifest::new(name, "1.0.0", "Test", "A test plugin"),
                modules: vec![],
                steps: vec![],
                hooks: vec![],
            }
        }
    }

    impl EnginePlugin for TestPlugin {
        fn engine_manifest(&self) -> &PluginManifest {
            &self.manifest
        }

        fn module_factories(&self) -> HashMap<String, Arc<dyn ModuleFactory>> {
            self.modules
                .iter()
                .map(|(k, v)| (k.to_string(), Arc::new(NamedFactory(v)) as Arc<dyn ModuleFactory>))
                .collect()
        }

        fn step_factories(&self) -> HashMap<String, Arc<dyn StepFactory>> {
            self.steps
                .iter()
                .map(|(k, v)| (k.to_string(), Arc::new(NamedFactory(v)) as Arc<dyn StepFactory>))
                .collect()
        }

        fn wiring_hooks(&self) -> Vec<WiringHook> {
            self.hooks.clone()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn new_loader() -> PluginLoader {
        PluginLoader::new(Arc::new(CapabilityRegistry::new()))
    }

    #[test]
    fn load_plugin_merges_factories() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("http-kit");
        plugin.modules = vec![("http.server", "server"), ("http.client", "client")];
        plugin.steps = vec![("step.validate", "validate")];

        loader.load_plugin(Arc::new(plugin)).unwrap();

        assert_eq!(loader.module_factories().len(), 2);
        assert_eq!(loader.step_factories().len(), 1);
        assert!(loader.trigger_factories().is_empty());
    }

    #[test]
    fn duplicate_module_type_fails_and_first_contribution_survives() {
        let mut loader = new_loader();

        let mut first = TestPlugin::named("first");
        first.modules = vec![("shared.type", "first-impl")];
        loader.load_plugin(Arc::new(first)).unwrap();

        let mut second = TestPlugin::named("second");
        second.modules = vec![("shared.type", "second-impl")];
        let err = loader.load_plugin(Arc::new(second)).unwrap_err();
        match err {
            WeftError::DuplicateFactoryType {
                plugin,
                kind,
                type_name,
            } => {
                assert_eq!(plugin, "second");
                assert_eq!(kind, FactoryKind::Module);
                assert_eq!(type_name, "shared.type");
            }
            other => panic!("expected DuplicateFactoryType, got {other}"),
        }

        let table = loader.module_factories();
        let handle = table["shared.type"].create("x", &Value::Null).unwrap();
        assert_eq!(*handle.downcast::<&'static str>().unwrap(), "first-impl");
    }

    #[test]
    fn invalid_manifest_is_rejected_before_mutation() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("Bad Name");
        plugin.modules = vec![("x.y", "x")];

        assert!(loader.load_plugin(Arc::new(plugin)).is_err());
        assert!(loader.module_factories().is_empty());
        assert!(loader.loaded_plugins().is_empty());
    }

    #[test]
    fn unknown_tier_is_rejected_before_mutation() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("tiered");
        plugin.manifest.tier = "enterprise".into();
        plugin.modules = vec![("x.y", "x")];

        assert!(matches!(
            loader.load_plugin(Arc::new(plugin)),
            Err(WeftError::UnknownTier { .. })
        ));
        assert!(loader.module_factories().is_empty());
    }

    #[test]
    fn premium_without_validator_loads() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("premium-kit");
        plugin.manifest.tier = "premium".into();

        loader.load_plugin(Arc::new(plugin)).unwrap();
        assert_eq!(loader.loaded_plugins().len(), 1);
    }

    #[test]
    fn premium_with_denying_validator_fails() {
        struct Deny;
        impl LicenseValidator for Deny {
            fn validate_plugin(&self, plugin: &str) -> Result<(), WeftError> {
                Err(WeftError::Internal(format!("denied {plugin}")))
            }
        }

        let mut loader = new_loader();
        loader.set_license_validator(Arc::new(Deny));

        let mut plugin = TestPlugin::named("premium-kit");
        plugin.manifest.tier = "premium".into();

        assert!(matches!(
            loader.load_plugin(Arc::new(plugin)),
            Err(WeftError::LicenseRequired { .. })
        ));
        assert!(loader.loaded_plugins().is_empty());
    }

    #[test]
    fn capability_declarations_register_providers() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("web");
        plugin.manifest.capabilities = vec![
            CapabilityDecl {
                name: "http-server".into(),
                role: CapabilityRole::Provider,
                priority: 10,
            },
            CapabilityDecl {
                name: "message-broker".into(),
                role: CapabilityRole::Consumer,
                priority: 0,
            },
        ];

        loader.load_plugin(Arc::new(plugin)).unwrap();

        let reg = loader.capability_registry();
        assert!(reg.has_provider("http-server"));
        // Consumer roles never register providers.
        assert!(!reg.has_provider("message-broker"));
    }

    #[test]
    fn contracts_are_registered() {
        trait Storage {}

        let mut loader = new_loader();
        let plugin = TestPlugin::named("store");

        struct ContractPlugin(TestPlugin);
        impl EnginePlugin for ContractPlugin {
            fn engine_manifest(&self) -> &PluginManifest {
                self.0.engine_manifest()
            }
            fn contracts(&self) -> Vec<Contract> {
                vec![Contract::of::<dyn Storage>("blob-storage", "Stores blobs")]
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        loader.load_plugin(Arc::new(ContractPlugin(plugin))).unwrap();
        assert_eq!(
            loader.capability_registry().list_capabilities(),
            vec!["blob-storage"]
        );
    }

    #[test]
    fn accessors_return_defensive_copies() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("http-kit");
        plugin.modules = vec![("http.server", "server")];
        loader.load_plugin(Arc::new(plugin)).unwrap();

        let mut copy = loader.module_factories();
        copy.clear();
        assert_eq!(loader.module_factories().len(), 1);
    }

    #[test]
    fn wiring_hooks_sorted_by_descending_priority_stable() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("wiring");
        plugin.hooks = vec![
            WiringHook::new("low", 1, |_| Ok(())),
            WiringHook::new("high", 50, |_| Ok(())),
            WiringHook::new("mid-first", 10, |_| Ok(())),
            WiringHook::new("mid-second", 10, |_| Ok(())),
        ];
        loader.load_plugin(Arc::new(plugin)).unwrap();

        let hooks = loader.wiring_hooks();
        let names: Vec<&str> = hooks.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid-first", "mid-second", "low"]);
    }

    #[test]
    fn load_plugins_orders_by_dependencies() {
        let mut loader = new_loader();

        let mut c = TestPlugin::named("c-top");
        c.manifest.dependencies = vec![Dependency::new("b-middle", ">=1.0.0")];
        let mut b = TestPlugin::named("b-middle");
        b.manifest.dependencies = vec![Dependency::new("a-base", ">=1.0.0")];
        let a = TestPlugin::named("a-base");

        loader
            .load_plugins(vec![Arc::new(c), Arc::new(b), Arc::new(a)])
            .unwrap();

        let loaded: Vec<String> = loader
            .loaded_plugins()
            .iter()
            .map(|p| p.engine_manifest().name.clone())
            .collect();
        assert_eq!(loaded, vec!["a-base", "b-middle", "c-top"]);
    }

    #[test]
    fn load_plugins_cycle_fails() {
        let mut loader = new_loader();
        let mut a = TestPlugin::named("cycle-a");
        a.manifest.dependencies = vec![Dependency::new("cycle-b", ">=1.0.0")];
        let mut b = TestPlugin::named("cycle-b");
        b.manifest.dependencies = vec![Dependency::new("cycle-a", ">=1.0.0")];

        assert!(matches!(
            loader.load_plugins(vec![Arc::new(a), Arc::new(b)]),
            Err(WeftError::CircularDependency { .. })
        ));
        assert!(loader.loaded_plugins().is_empty());
    }

    #[test]
    fn load_plugins_tolerates_external_dependencies() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("partial");
        plugin.manifest.dependencies = vec![Dependency::new("already-loaded", ">=1.0.0")];

        loader.load_plugins(vec![Arc::new(plugin)]).unwrap();
        assert_eq!(loader.loaded_plugins().len(), 1);
    }

    #[test]
    fn verify_capabilities_lists_every_missing_entry() {
        let mut loader = new_loader();
        let mut plugin = TestPlugin::named("web");
        plugin.manifest.capabilities = vec![CapabilityDecl {
            name: "http-server".into(),
            role: CapabilityRole::Provider,
            priority: 0,
        }];
        loader.load_plugin(Arc::new(plugin)).unwrap();

        let required = vec![
            "http-server".to_string(),
            "message-broker".to_string(),
            "scheduler".to_string(),
        ];
        match loader.verify_capabilities(&required) {
            Err(WeftError::MissingCapabilities { capabilities }) => {
                assert_eq!(capabilities, vec!["message-broker", "scheduler"]);
            }
            other => panic!("expected MissingCapabilities, got {other:?}"),
        }
    }

    #[test]
    fn verify_consumer_capabilities_checks_declared_requirements() {
        let mut loader = new_loader();
        let mut provider = TestPlugin::named("broker");
        provider.manifest.capabilities = vec![CapabilityDecl {
            name: "message-broker".into(),
            role: CapabilityRole::Provider,
            priority: 0,
        }];
        let mut consumer = TestPlugin::named("pipeline");
        consumer.manifest.capabilities = vec![CapabilityDecl {
            name: "message-broker".into(),
            role: CapabilityRole::Consumer,
            priority: 0,
        }];

        loader.load_plugin(Arc::new(provider)).unwrap();
        loader.load_plugin(Arc::new(consumer)).unwrap();
        loader.verify_consumer_capabilities().unwrap();
    }
}
