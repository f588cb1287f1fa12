//! Error types for the framework layer.

use std::path::PathBuf;

use drover_container::ContainerError;
use thiserror::Error;

/// Error type for application, dispatch, and generator operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Dispatch against a name no command is registered under.
    #[error("command not found: '{0}'")]
    CommandNotFound(String),

    /// The identifier resolved, but not to a runnable command.
    #[error("identifier '{0}' did not resolve to a runnable command")]
    NotRunnable(String),

    /// The generator's destination file already exists.
    #[error("destination already exists: {} (pass --force to overwrite)", .0.display())]
    DestinationExists(PathBuf),

    /// The generator's destination directory is missing or not writable.
    #[error("destination is not writable: {}", .0.display())]
    NotWritable(PathBuf),

    /// A config namespace file exists but could not be parsed.
    #[error("failed to load config {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Stub template rendering failed.
    #[error("stub rendering failed")]
    Template(#[from] minijinja::Error),

    /// Container resolution failed.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
