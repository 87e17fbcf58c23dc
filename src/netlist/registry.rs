use super::{LogObserver, PartConfig, PartObserver, WidgetFactory};
use crate::primitives::Primitive;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Name to template map handed to a [Resolver](super::Resolver).
///
/// Every circuit resolved against the same [Registry] shares its [PartConfig]s, while
/// independent registries let circuits with conflicting names coexist.
///
/// # Example
/// ```
/// # use netsim::{PartConfig, Registry};
/// let mut registry = Registry::new();
/// registry.register("inc", PartConfig::new().input("a").output("y", |i, _| i["a"] + 1));
///
/// assert!(registry.config("inc").is_some());
/// assert!(registry.config("and").is_none());
/// assert!(Registry::with_primitives().config("and").is_some());
/// ```
#[derive(Default)]
pub struct Registry {
    configs: HashMap<String, Arc<PartConfig>>,
    widgets: HashMap<String, WidgetFactory>,
}

impl Registry {
    /// Returns an empty [Registry].
    pub fn new() -> Registry {
        Default::default()
    }

    /// Returns a [Registry] holding every [Primitive] under its name and the `"log"` widget.
    pub fn with_primitives() -> Registry {
        let mut registry = Registry::new();
        for primitive in Primitive::iter() {
            registry.register(primitive.name(), primitive.config());
        }
        registry.register_widget("log", |part| -> Box<dyn PartObserver> {
            Box::new(LogObserver::new(part))
        });
        registry
    }

    /// Registers `config` under `key`, returning the template previously registered under it.
    pub fn register<S: Into<String>>(
        &mut self,
        key: S,
        config: PartConfig,
    ) -> Option<Arc<PartConfig>> {
        self.register_shared(key, Arc::new(config))
    }

    /// Like [register](Registry::register), for a template already shared elsewhere.
    pub fn register_shared<S: Into<String>>(
        &mut self,
        key: S,
        config: Arc<PartConfig>,
    ) -> Option<Arc<PartConfig>> {
        self.configs.insert(key.into(), config)
    }

    /// Registers a widget factory under `key`.
    pub fn register_widget<S, F>(&mut self, key: S, factory: F)
    where
        S: Into<String>,
        F: Fn(&str) -> Box<dyn PartObserver> + Send + Sync + 'static,
    {
        self.widgets.insert(key.into(), Box::new(factory));
    }

    pub fn config(&self, key: &str) -> Option<&Arc<PartConfig>> {
        self.configs.get(key)
    }

    pub fn widget(&self, key: &str) -> Option<&WidgetFactory> {
        self.widgets.get(key)
    }

    /// Returns the registered template keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut configs: Vec<_> = self.configs.keys().collect();
        let mut widgets: Vec<_> = self.widgets.keys().collect();
        configs.sort();
        widgets.sort();
        f.debug_struct("Registry")
            .field("configs", &configs)
            .field("widgets", &widgets)
            .finish()
    }
}
