//! Service container with lazy binders for CLI applications.
//!
//! `drover-container` provides the resolution core of the drover
//! framework: a string-identified service registry with factory and
//! singleton bindings, an alias table, and a lazy binder registry that
//! installs bindings on first demand.
//!
//! # Features
//!
//! - **Bindings**: per-resolution factories, cached singletons, ready-made
//!   instances
//! - **Aliases**: secondary identifiers, transitively resolved before
//!   lookup
//! - **Lazy binders**: deferred setup routines, memoized by name, retried
//!   after failure
//! - **Guards**: alias-cycle and circular-resolution detection
//!
//! The crate is deliberately single-threaded (`Rc` + `RefCell`): a CLI
//! process parses arguments, runs one command, and exits. See the `drover`
//! crate for the application, dispatch, and kernel layers built on top.

mod container;
mod error;
mod lazy;

pub use container::{Container, Factory, Params, Service};
pub use error::ContainerError;
pub use lazy::{Binder, LazyBindingRegistry};
