//! Error types for container resolution.

use thiserror::Error;

/// Error type for binding and resolution operations.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// No binding is registered for the identifier.
    #[error("no binding registered for '{0}'")]
    BindingNotFound(String),

    /// The alias table loops back on itself for this identifier.
    #[error("alias chain for '{0}' does not resolve to a fixed point")]
    AliasCycle(String),

    /// A factory transitively resolved its own identifier.
    #[error("circular resolution of '{0}'")]
    CircularDependency(String),

    /// An identifier is mapped to a binder that was never defined.
    #[error("identifier is mapped to unknown binder '{0}'")]
    UnknownBinder(String),

    /// A lazy binder reported a failure of its own.
    #[error("binder '{0}' failed: {1}")]
    BinderFailed(String, String),

    /// The resolved service is not of the requested type.
    #[error("service '{0}' is not of the requested type")]
    TypeMismatch(String),
}
