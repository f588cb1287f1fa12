//! The service container.
//!
//! [`Container`] maps string identifiers to bindings: a factory invoked per
//! resolution, or a singleton materialized once and cached. Identifiers may
//! be aliased; aliases are resolved transitively to a canonical identifier
//! before lookup.
//!
//! Services are stored as `Rc<dyn Any>` and downcast by the consumer, which
//! keeps the container agnostic of the concrete types flowing through it.
//! The container is single-threaded by design: interior mutability via
//! `RefCell`, sharing via `Rc`, no locks.
//!
//! # Example
//!
//! ```rust
//! use drover_container::{Container, Params};
//! use std::rc::Rc;
//!
//! struct Clock { ticks: u64 }
//!
//! let container = Container::new();
//! container.singleton("clock", Rc::new(|_c: &Container, _p: &Params| {
//!     Ok(Rc::new(Clock { ticks: 0 }) as drover_container::Service)
//! }));
//! container.alias("time", "clock");
//!
//! let clock = container.resolve("time", &Params::new()).unwrap();
//! assert!(clock.downcast::<Clock>().is_ok());
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::ContainerError;

/// The container's value type. Consumers downcast to the concrete type
/// they registered.
pub type Service = Rc<dyn Any>;

/// Constructor overrides passed through to factories at resolution time.
pub type Params = HashMap<String, serde_json::Value>;

/// A binding recipe: receives the container (for nested resolution) and
/// the caller's parameter overrides.
pub type Factory = Rc<dyn Fn(&Container, &Params) -> Result<Service, ContainerError>>;

#[derive(Clone)]
enum Binding {
    /// Invoked on every resolution.
    Factory(Factory),
    /// Invoked once; the produced value is cached.
    Singleton(Factory),
}

/// String-identified service registry with factory/singleton bindings and
/// an alias table.
#[derive(Default)]
pub struct Container {
    bindings: RefCell<HashMap<String, Binding>>,
    instances: RefCell<HashMap<String, Service>>,
    aliases: RefCell<HashMap<String, String>>,
    /// Identifiers currently being resolved, for circular-resolution detection.
    resolving: RefCell<Vec<String>>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory binding. The factory runs on every resolution.
    ///
    /// Re-binding an identifier replaces the previous recipe and drops any
    /// cached singleton value for it.
    pub fn bind(&self, id: &str, factory: Factory) {
        self.instances.borrow_mut().remove(id);
        self.bindings
            .borrow_mut()
            .insert(id.to_string(), Binding::Factory(factory));
    }

    /// Registers a singleton binding. The factory runs at most once; the
    /// value it produces is cached for the container's lifetime.
    pub fn singleton(&self, id: &str, factory: Factory) {
        self.instances.borrow_mut().remove(id);
        self.bindings
            .borrow_mut()
            .insert(id.to_string(), Binding::Singleton(factory));
    }

    /// Installs a ready-made value as a singleton.
    pub fn instance(&self, id: &str, service: Service) {
        self.instances.borrow_mut().insert(id.to_string(), service);
    }

    /// Registers `alias` as a secondary name for `target`.
    pub fn alias(&self, alias: &str, target: &str) {
        self.aliases
            .borrow_mut()
            .insert(alias.to_string(), target.to_string());
    }

    /// Follows the alias table to the canonical identifier.
    ///
    /// A single hop is the common case, but chains are walked to their
    /// fixed point. A chain that revisits an identifier fails with
    /// [`ContainerError::AliasCycle`].
    pub fn canonical(&self, id: &str) -> Result<String, ContainerError> {
        let aliases = self.aliases.borrow();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = id;
        while let Some(target) = aliases.get(current) {
            if !seen.insert(current) {
                return Err(ContainerError::AliasCycle(id.to_string()));
            }
            current = target;
        }
        Ok(current.to_string())
    }

    /// Returns true if the identifier (after alias resolution) has a
    /// binding or a cached instance.
    pub fn bound(&self, id: &str) -> bool {
        match self.canonical(id) {
            Ok(canonical) => {
                self.bindings.borrow().contains_key(&canonical)
                    || self.instances.borrow().contains_key(&canonical)
            }
            Err(_) => false,
        }
    }

    /// Resolves an identifier to a service.
    ///
    /// Alias resolution happens first; then a cached singleton wins, a
    /// singleton factory runs once and caches, and a plain factory runs per
    /// call. `params` is passed through to the factory as constructor
    /// overrides. An identifier with no binding fails with
    /// [`ContainerError::BindingNotFound`].
    pub fn resolve(&self, id: &str, params: &Params) -> Result<Service, ContainerError> {
        let id = self.canonical(id)?;

        if let Some(cached) = self.instances.borrow().get(&id) {
            return Ok(cached.clone());
        }

        // Clone the recipe out so no borrow is held while the factory runs;
        // factories are free to call back into the container.
        let binding = self
            .bindings
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| ContainerError::BindingNotFound(id.clone()))?;

        self.enter(&id)?;
        let result = match binding {
            Binding::Factory(factory) => factory(self, params),
            Binding::Singleton(factory) => factory(self, params).map(|service| {
                self.instances
                    .borrow_mut()
                    .insert(id.clone(), service.clone());
                service
            }),
        };
        self.exit(&id);

        log::trace!("resolved '{}'", id);
        result
    }

    /// Resolves an identifier and downcasts the service to `T`.
    pub fn resolve_as<T: Any>(&self, id: &str, params: &Params) -> Result<Rc<T>, ContainerError> {
        self.resolve(id, params)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch(id.to_string()))
    }

    fn enter(&self, id: &str) -> Result<(), ContainerError> {
        let mut resolving = self.resolving.borrow_mut();
        if resolving.iter().any(|r| r == id) {
            return Err(ContainerError::CircularDependency(id.to_string()));
        }
        resolving.push(id.to_string());
        Ok(())
    }

    fn exit(&self, id: &str) {
        let mut resolving = self.resolving.borrow_mut();
        if let Some(pos) = resolving.iter().rposition(|r| r == id) {
            resolving.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Widget {
        label: String,
    }

    fn widget_factory(label: &str) -> Factory {
        let label = label.to_string();
        Rc::new(move |_c, _p| {
            Ok(Rc::new(Widget {
                label: label.clone(),
            }) as Service)
        })
    }

    #[test]
    fn test_bind_resolves_fresh_value_per_call() {
        let container = Container::new();
        container.bind("widget", widget_factory("w"));

        let a = container.resolve("widget", &Params::new()).unwrap();
        let b = container.resolve("widget", &Params::new()).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_singleton_materializes_once() {
        let runs = Rc::new(Cell::new(0));
        let runs_inner = runs.clone();

        let container = Container::new();
        container.singleton(
            "widget",
            Rc::new(move |_c, _p| {
                runs_inner.set(runs_inner.get() + 1);
                Ok(Rc::new(Widget { label: "w".into() }) as Service)
            }),
        );

        let a = container.resolve("widget", &Params::new()).unwrap();
        let b = container.resolve("widget", &Params::new()).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_instance_is_returned_as_is() {
        let container = Container::new();
        container.instance("widget", Rc::new(Widget { label: "w".into() }));

        let resolved = container
            .resolve_as::<Widget>("widget", &Params::new())
            .unwrap();
        assert_eq!(resolved.label, "w");
    }

    #[test]
    fn test_alias_resolves_transitively() {
        let container = Container::new();
        container.instance("widget", Rc::new(Widget { label: "w".into() }));
        container.alias("gadget", "widget");
        container.alias("gizmo", "gadget");

        assert_eq!(container.canonical("gizmo").unwrap(), "widget");
        assert!(container
            .resolve_as::<Widget>("gizmo", &Params::new())
            .is_ok());
    }

    #[test]
    fn test_alias_cycle_is_an_error() {
        let container = Container::new();
        container.alias("a", "b");
        container.alias("b", "a");

        assert!(matches!(
            container.canonical("a"),
            Err(ContainerError::AliasCycle(_))
        ));
    }

    #[test]
    fn test_unbound_identifier_fails() {
        let container = Container::new();
        let err = container.resolve("missing", &Params::new()).unwrap_err();
        assert!(matches!(err, ContainerError::BindingNotFound(id) if id == "missing"));
    }

    #[test]
    fn test_factory_may_resolve_other_services() {
        let container = Container::new();
        container.instance("label", Rc::new(String::from("nested")));
        container.bind(
            "widget",
            Rc::new(|c, p| {
                let label = c.resolve_as::<String>("label", p)?;
                Ok(Rc::new(Widget {
                    label: (*label).clone(),
                }) as Service)
            }),
        );

        let widget = container
            .resolve_as::<Widget>("widget", &Params::new())
            .unwrap();
        assert_eq!(widget.label, "nested");
    }

    #[test]
    fn test_self_resolution_is_circular() {
        let container = Container::new();
        container.bind("widget", Rc::new(|c, p| c.resolve("widget", p)));

        let err = container.resolve("widget", &Params::new()).unwrap_err();
        assert!(matches!(err, ContainerError::CircularDependency(_)));
    }

    #[test]
    fn test_rebinding_drops_cached_singleton() {
        let container = Container::new();
        container.singleton("widget", widget_factory("old"));
        let _ = container.resolve("widget", &Params::new()).unwrap();

        container.bind("widget", widget_factory("new"));
        let widget = container
            .resolve_as::<Widget>("widget", &Params::new())
            .unwrap();
        assert_eq!(widget.label, "new");
    }

    #[test]
    fn test_type_mismatch_on_downcast() {
        let container = Container::new();
        container.instance("widget", Rc::new(Widget { label: "w".into() }));

        let err = container
            .resolve_as::<String>("widget", &Params::new())
            .unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch(_)));
    }

    #[test]
    fn test_resolution_failure_clears_guard() {
        let container = Container::new();
        container.bind("widget", Rc::new(|c, p| c.resolve("widget", p)));

        assert!(container.resolve("widget", &Params::new()).is_err());
        // The guard must not leak a stale entry that poisons later calls.
        container.bind("widget", widget_factory("w"));
        assert!(container.resolve("widget", &Params::new()).is_ok());
    }
}
