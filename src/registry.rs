//! Centralized registry for lint rule plugins
//!
//! Maps rule names to factories so host tooling can construct configured
//! plugins without knowing their concrete types. A process-wide registry
//! with the built-in rule pre-registered covers the common host flow;
//! instance registries exist for hosts that manage their own rule sets.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::plugin::{LintPlugin, OmitemptyPlugin, PLUGIN_NAME};

/// Builds a configured plugin from optional host settings.
pub type PluginFactory = Box<dyn Fn(Option<&Value>) -> Arc<dyn LintPlugin> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("plugin '{0}' is already registered")]
    DuplicateName(String),
    #[error("no plugin registered under '{0}'")]
    UnknownName(String),
}

/// Registry for managing lint rule plugins
///
/// Factories are keyed by name; registering the same name twice is an
/// error so a misconfigured host fails loudly instead of silently
/// shadowing a rule.
pub struct PluginRegistry {
    factories: FxHashMap<String, PluginFactory>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Creates a registry with the built-in rule pre-registered
    ///
    /// Registers:
    /// - `omitempty` - JSON tag omit-marker consistency checking
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Registering a fresh name into an empty registry cannot collide.
        let _ = registry.register(PLUGIN_NAME, Box::new(|settings| {
            Arc::new(OmitemptyPlugin::new(settings)) as Arc<dyn LintPlugin>
        }));

        debug!(
            "Initialized plugin registry with {} built-in plugins",
            registry.factories.len()
        );

        registry
    }

    /// Registers a factory under a rule name
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: PluginFactory,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        trace!("Registering plugin: {}", name);

        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.factories.insert(name.clone(), factory);

        debug!(
            "Registered plugin '{}' (total: {})",
            name,
            self.factories.len()
        );
        Ok(())
    }

    /// Unregisters a factory by rule name
    ///
    /// Returns `true` if a factory was removed, `false` if not found.
    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.factories.remove(name).is_some();

        if removed {
            debug!("Unregistered plugin '{}'", name);
        } else {
            trace!("Plugin '{}' not found for unregistration", name);
        }

        removed
    }

    /// Constructs a configured plugin by rule name
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownName`] if no factory is registered
    /// under the name.
    pub fn create(
        &self,
        name: &str,
        settings: Option<&Value>,
    ) -> Result<Arc<dyn LintPlugin>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))?;
        trace!("Creating plugin: {}", name);
        Ok(factory(settings))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the names of all registered plugins, sorted
    pub fn plugin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered plugins
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no plugins are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Process-wide registry (singleton), initialized with the built-in rule
/// on first use.
static REGISTRY: Lazy<RwLock<PluginRegistry>> =
    Lazy::new(|| RwLock::new(PluginRegistry::with_defaults()));

/// Registers a factory with the process-wide registry.
pub fn register_plugin(
    name: impl Into<String>,
    factory: PluginFactory,
) -> Result<(), RegistryError> {
    REGISTRY.write().register(name, factory)
}

/// Constructs a configured plugin from the process-wide registry.
pub fn create_plugin(
    name: &str,
    settings: Option<&Value>,
) -> Result<Arc<dyn LintPlugin>, RegistryError> {
    REGISTRY.read().create(name, settings)
}

/// Names registered with the process-wide registry, sorted.
pub fn registered_plugins() -> Vec<String> {
    REGISTRY.read().plugin_names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Field, SourceFile, TypeDecl, TypeExpr};
    use crate::diagnostic::Diagnostic;
    use serde_json::json;

    /// Mock plugin for testing
    struct MockPlugin {
        name: &'static str,
    }

    impl LintPlugin for MockPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn check(&self, _file: &SourceFile) -> Vec<Diagnostic> {
            Vec::new()
        }
    }

    fn mock_factory(name: &'static str) -> PluginFactory {
        Box::new(move |_settings| Arc::new(MockPlugin { name }) as Arc<dyn LintPlugin>)
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = PluginRegistry::new();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_with_defaults_registers_builtin_rule() {
        let registry = PluginRegistry::with_defaults();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("omitempty"));
        assert_eq!(registry.plugin_names(), vec!["omitempty".to_string()]);
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = PluginRegistry::new();
        registry
            .register("mock", mock_factory("mock"))
            .unwrap();
        assert!(registry.contains("mock"));

        let plugin = registry.create("mock", None).unwrap();
        assert_eq!(plugin.name(), "mock");
    }

    #[test]
    fn test_unregister_removes_factory() {
        let mut registry = PluginRegistry::new();
        registry.register("mock", mock_factory("mock")).unwrap();

        assert!(registry.unregister("mock"));
        assert!(!registry.contains("mock"));
        assert!(registry.is_empty());
        assert!(!registry.unregister("mock"));

        // the name is free for re-registration afterwards
        registry.register("mock", mock_factory("mock")).unwrap();
        assert!(registry.contains("mock"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = PluginRegistry::new();
        registry.register("mock", mock_factory("mock")).unwrap();
        let err = registry
            .register("mock", mock_factory("mock"))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("mock".to_string()));
        assert_eq!(err.to_string(), "plugin 'mock' is already registered");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_unknown_name_is_rejected() {
        let registry = PluginRegistry::with_defaults();
        let err = registry.create("nonexistent", None).err().unwrap();
        assert_eq!(err, RegistryError::UnknownName("nonexistent".to_string()));
        assert_eq!(err.to_string(), "no plugin registered under 'nonexistent'");
    }

    #[test]
    fn test_create_passes_settings_through() {
        let registry = PluginRegistry::with_defaults();
        let settings = json!({ "unnecessary": false, "missing": false });
        let plugin = registry.create("omitempty", Some(&settings)).unwrap();

        let file = SourceFile::new(vec![TypeDecl::new(
            "User",
            TypeExpr::Struct(vec![
                Field::named("ID", TypeExpr::ident("int"))
                    .with_tag(r#"`json:"id,omitempty"`"#),
            ]),
        )]);
        assert!(plugin.check(&file).is_empty());
    }

    #[test]
    fn test_global_registry_has_builtin_rule() {
        let names = registered_plugins();
        assert!(names.contains(&"omitempty".to_string()));

        let plugin = create_plugin("omitempty", None).unwrap();
        assert_eq!(plugin.name(), "omitempty");
    }

    #[test]
    fn test_global_registry_accepts_new_plugins() {
        register_plugin("mock-global", mock_factory("mock-global")).unwrap();
        let plugin = create_plugin("mock-global", None).unwrap();
        assert_eq!(plugin.name(), "mock-global");
    }

    #[test]
    fn test_global_registry_rejects_unknown_names() {
        let err = create_plugin("never-registered", None).err().unwrap();
        assert_eq!(
            err,
            RegistryError::UnknownName("never-registered".to_string())
        );
    }
}
