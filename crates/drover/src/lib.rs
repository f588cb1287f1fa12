//! # Drover: a micro-framework for command-line applications
//!
//! Drover wires three small pieces together: a service container with
//! lazy, on-demand binding, a TOML configuration loader, and a command
//! dispatcher that resolves named commands through the container and runs
//! them against an argument vector, capturing their output.
//!
//! ## Core Concepts
//!
//! - [`Application`]: the composition root: base path, config, container,
//!   lazy binders, and the command identifier list
//! - [`ConfigStore`]: idempotent namespace loading with dotted-key access
//! - [`Command`]: a runnable unit with a clap-declared signature
//! - [`Console`]: the dispatcher owning the resolved, runnable command set
//! - [`Kernel`]: the façade an entry point talks to (`handle`, `call`,
//!   `all`, `output`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use drover::{Application, Kernel};
//!
//! fn main() -> Result<(), drover::Error> {
//!     let app = Rc::new(Application::builder().build()?);
//!     let mut kernel = Kernel::new(app);
//!
//!     let argv: Vec<String> = std::env::args().skip(1).collect();
//!     let code = kernel.handle(&argv)?;
//!     print!("{}", kernel.output());
//!     std::process::exit(code);
//! }
//! ```
//!
//! Commands are plain structs implementing [`Command`]; they are bound
//! into the container and exposed by identifier:
//!
//! ```rust,ignore
//! app.bind_command("greet", || GreetCommand::new());
//! app.register_command("greet");
//! ```
//!
//! The argument-parsing grammar is `clap`'s; drover adds the resolution,
//! lifecycle, and output-capture plumbing around it.

mod app;
mod command;
pub mod commands;
mod config;
mod console;
mod error;
mod kernel;
mod output;

pub use app::{
    Application, ApplicationBuilder, RunMode, ServiceProvider, FRAMEWORK_NAME, FRAMEWORK_VERSION,
};
pub use command::{BoxedCommand, Command};
pub use config::ConfigStore;
pub use console::Console;
pub use error::Error;
pub use kernel::Kernel;
pub use output::OutputBuffer;

pub use drover_container::{
    Binder, Container, ContainerError, Factory, LazyBindingRegistry, Params, Service,
};
