//! Immutable mapping from method names to handlers.
//!
//! The registry is assembled once at startup with [`RegistryBuilder`] and then
//! shared by `Arc`. Conflicts are startup errors rather than silent overrides.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use orrery_protocol::{MethodDescriptor, MethodHandler};
use thiserror::Error;

use crate::dispatch::BUILT_IN_METHODS;

/// Conflicts detected while registering handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two handlers claim the same method.
    #[error("method '{method}' is claimed by both '{existing}' and '{handler}'")]
    DuplicateMethod {
        /// Contested method name.
        method: String,
        /// Handler registered first.
        existing: String,
        /// Handler rejected.
        handler: String,
    },
    /// A handler claims a built-in method.
    #[error("handler '{handler}' cannot override built-in method '{method}'")]
    ReservedMethod {
        /// Built-in method name.
        method: String,
        /// Offending handler.
        handler: String,
    },
    /// Two handlers share an identity name.
    #[error("handler name '{handler}' is already registered")]
    DuplicateHandler {
        /// Repeated handler name.
        handler: String,
    },
}

/// Methods answered by one handler, in the order it reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerCatalog {
    /// Handler identity.
    pub handler: String,
    /// Methods it answers.
    pub methods: Vec<MethodDescriptor>,
}

/// Collects handlers before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: Vec<Arc<dyn MethodHandler>>,
    catalog: Vec<HandlerCatalog>,
    methods: HashMap<String, usize>,
    names: HashSet<String>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every method `handler` reports.
    ///
    /// Nothing is recorded when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the handler name is taken, a method
    /// shadows a built-in, or a method is already claimed.
    pub fn register(&mut self, handler: Arc<dyn MethodHandler>) -> Result<&mut Self, RegistryError> {
        let name = handler.name().to_owned();
        if self.names.contains(&name) {
            return Err(RegistryError::DuplicateHandler { handler: name });
        }

        let methods = handler.methods();
        let mut claimed = HashSet::with_capacity(methods.len());
        for descriptor in &methods {
            self.check_method(descriptor.name, &name, &claimed)?;
            claimed.insert(descriptor.name);
        }

        let index = self.handlers.len();
        for descriptor in &methods {
            self.methods.insert(descriptor.name.to_owned(), index);
        }
        self.names.insert(name.clone());
        self.catalog.push(HandlerCatalog {
            handler: name,
            methods,
        });
        self.handlers.push(handler);
        Ok(self)
    }

    fn check_method(
        &self,
        method: &str,
        handler: &str,
        claimed: &HashSet<&str>,
    ) -> Result<(), RegistryError> {
        if BUILT_IN_METHODS.iter().any(|builtin| builtin.name == method) {
            return Err(RegistryError::ReservedMethod {
                method: method.to_owned(),
                handler: handler.to_owned(),
            });
        }
        if claimed.contains(method) {
            return Err(RegistryError::DuplicateMethod {
                method: method.to_owned(),
                existing: handler.to_owned(),
                handler: handler.to_owned(),
            });
        }
        if let Some(existing) = self
            .methods
            .get(method)
            .and_then(|index| self.catalog.get(*index))
        {
            return Err(RegistryError::DuplicateMethod {
                method: method.to_owned(),
                existing: existing.handler.clone(),
                handler: handler.to_owned(),
            });
        }
        Ok(())
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
            catalog: self.catalog,
            methods: self.methods,
        }
    }
}

/// Frozen method table shared across connections.
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn MethodHandler>>,
    catalog: Vec<HandlerCatalog>,
    methods: HashMap<String, usize>,
}

impl HandlerRegistry {
    /// Builds a registry from `handlers` in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] encountered.
    pub fn from_handlers(
        handlers: impl IntoIterator<Item = Arc<dyn MethodHandler>>,
    ) -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        for handler in handlers {
            builder.register(handler)?;
        }
        Ok(builder.build())
    }

    /// Handler answering `method`.
    #[must_use]
    pub fn lookup(&self, method: &str) -> Option<&Arc<dyn MethodHandler>> {
        self.methods
            .get(method)
            .and_then(|index| self.handlers.get(*index))
    }

    /// Handler identities with their methods, in registration order.
    #[must_use]
    pub fn catalog(&self) -> &[HandlerCatalog] {
        &self.catalog
    }

    /// Number of registered methods.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::tests::support::StubHandler;

    #[fixture]
    fn galaxy() -> Arc<dyn MethodHandler> {
        Arc::new(StubHandler::new("galaxy", &["get_galaxy_details", "get_stars"]))
    }

    #[rstest]
    fn indexes_every_reported_method(galaxy: Arc<dyn MethodHandler>) {
        let planets: Arc<dyn MethodHandler> =
            Arc::new(StubHandler::new("planets", &["list_planets"]));
        let registry =
            HandlerRegistry::from_handlers([galaxy, planets]).expect("no conflicts");

        assert_eq!(registry.method_count(), 3);
        assert_eq!(registry.handler_count(), 2);
        let handler = registry.lookup("list_planets").expect("registered");
        assert_eq!(handler.name(), "planets");
        assert!(registry.lookup("get_factories").is_none());
    }

    #[rstest]
    fn catalog_keeps_registration_order(galaxy: Arc<dyn MethodHandler>) {
        let planets: Arc<dyn MethodHandler> =
            Arc::new(StubHandler::new("planets", &["list_planets"]));
        let registry =
            HandlerRegistry::from_handlers([planets, galaxy]).expect("no conflicts");

        let names: Vec<&str> = registry
            .catalog()
            .iter()
            .map(|entry| entry.handler.as_str())
            .collect();
        assert_eq!(names, ["planets", "galaxy"]);
        let galaxy_methods: Vec<&str> = registry
            .catalog()
            .last()
            .map(|entry| entry.methods.iter().map(|method| method.name).collect())
            .unwrap_or_default();
        assert_eq!(galaxy_methods, ["get_galaxy_details", "get_stars"]);
    }

    #[rstest]
    fn rejects_duplicate_methods(galaxy: Arc<dyn MethodHandler>) {
        let clash: Arc<dyn MethodHandler> = Arc::new(StubHandler::new("stars", &["get_stars"]));
        let error = HandlerRegistry::from_handlers([galaxy, clash]).expect_err("conflict");
        assert_eq!(
            error,
            RegistryError::DuplicateMethod {
                method: "get_stars".to_owned(),
                existing: "galaxy".to_owned(),
                handler: "stars".to_owned(),
            }
        );
    }

    #[rstest]
    #[case::ping("ping")]
    #[case::game_info("get_game_info")]
    #[case::list("list_methods")]
    fn rejects_built_in_names(#[case] method: &'static str) {
        let sneaky: Arc<dyn MethodHandler> = Arc::new(StubHandler::new("sneaky", &[method]));
        let error = HandlerRegistry::from_handlers([sneaky]).expect_err("reserved");
        assert!(matches!(error, RegistryError::ReservedMethod { .. }));
    }

    #[rstest]
    fn rejects_duplicate_handler_names(galaxy: Arc<dyn MethodHandler>) {
        let twin: Arc<dyn MethodHandler> = Arc::new(StubHandler::new("galaxy", &["get_seed"]));
        let error = HandlerRegistry::from_handlers([galaxy, twin]).expect_err("duplicate");
        assert!(matches!(error, RegistryError::DuplicateHandler { .. }));
    }

    #[test]
    fn failed_registration_leaves_builder_untouched() {
        let mut builder = RegistryBuilder::new();
        let repeated: Arc<dyn MethodHandler> =
            Arc::new(StubHandler::new("repeat", &["get_stars", "get_stars"]));
        assert!(builder.register(repeated).is_err());

        let registry = builder.build();
        assert_eq!(registry.method_count(), 0);
        assert_eq!(registry.handler_count(), 0);
    }
}
