//! Lazy service binders.
//!
//! A binder is a deferred setup routine: it installs one or more real
//! bindings into the [`Container`] the first time one of its identifiers is
//! requested. This decouples service construction order from declaration
//! order: an application declares *that* a service can be built without
//! paying for it until somebody asks.
//!
//! Binders are held in an explicit name → closure table. Several
//! identifiers may map to the same binder; the binder still runs at most
//! once, memoized by name in a ran-set. A binder that fails is *not*
//! marked ran, so the next resolution retries it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::container::Container;
use crate::error::ContainerError;

/// A deferred setup routine. Installs bindings by calling
/// `bind`/`singleton`/`instance`/`alias` on the container it receives.
pub type Binder = Rc<dyn Fn(&Container) -> Result<(), ContainerError>>;

/// Table of identifiers exposed through lazily-run binders.
#[derive(Default)]
pub struct LazyBindingRegistry {
    /// Identifier → binder name.
    entries: RefCell<HashMap<String, String>>,
    /// Binder name → closure.
    binders: RefCell<HashMap<String, Binder>>,
    /// Binder names that have completed.
    ran: RefCell<HashSet<String>>,
}

impl LazyBindingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a binder under `name`.
    pub fn define(&self, name: &str, binder: Binder) {
        self.binders
            .borrow_mut()
            .insert(name.to_string(), binder);
    }

    /// Maps an identifier to a previously (or subsequently) defined binder.
    pub fn attach(&self, id: &str, name: &str) {
        self.entries
            .borrow_mut()
            .insert(id.to_string(), name.to_string());
    }

    /// Defines a binder and maps all of `ids` to it in one call.
    pub fn register(&self, ids: &[&str], name: &str, binder: Binder) {
        self.define(name, binder);
        for id in ids {
            self.attach(id, name);
        }
    }

    /// Returns true if the identifier is exposed through a binder.
    pub fn exposes(&self, id: &str) -> bool {
        self.entries.borrow().contains_key(id)
    }

    /// Returns true if the named binder has completed.
    pub fn has_run(&self, name: &str) -> bool {
        self.ran.borrow().contains(name)
    }

    /// Runs the binder mapped to `id`, if any and if it has not yet run.
    ///
    /// Identifiers with no binder entry are a no-op, and the caller falls
    /// through to plain container resolution. A binder error propagates and
    /// leaves the binder eligible for retry.
    pub fn run_pending(&self, id: &str, container: &Container) -> Result<(), ContainerError> {
        let name = match self.entries.borrow().get(id) {
            Some(name) => name.clone(),
            None => return Ok(()),
        };
        if self.ran.borrow().contains(&name) {
            return Ok(());
        }
        let binder = self
            .binders
            .borrow()
            .get(&name)
            .cloned()
            .ok_or_else(|| ContainerError::UnknownBinder(name.clone()))?;

        log::debug!("running binder '{}' for '{}'", name, id);
        binder(container)?;
        self.ran.borrow_mut().insert(name);
        Ok(())
    }
}
