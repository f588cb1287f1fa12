//! The kernel façade.
//!
//! [`Kernel`] is the thin surface an entry point talks to. It owns exactly
//! one [`Console`], created on first use from the application's declared
//! command list (or the kernel default list when the application declares
//! none) and cached for the kernel's lifetime. Commands registered into
//! the application *after* the first access are not picked up.

use std::collections::HashMap;
use std::rc::Rc;

use crate::app::Application;
use crate::command::BoxedCommand;
use crate::console::Console;
use crate::error::Error;

/// Commands exposed when the application declares none.
const DEFAULT_COMMANDS: &[&str] = &["generate"];

/// Façade over the lazily-constructed command dispatcher.
pub struct Kernel {
    app: Rc<Application>,
    console: Option<Console>,
}

impl Kernel {
    /// Creates a kernel for an application. Nothing is resolved until the
    /// first call that needs the dispatcher.
    pub fn new(app: Rc<Application>) -> Self {
        Self { app, console: None }
    }

    /// Runs a command by argument vector; returns its exit code.
    pub fn handle(&mut self, argv: &[String]) -> Result<i32, Error> {
        Ok(self.console()?.run(argv))
    }

    /// Like [`handle`](Self::handle), additionally appending the captured
    /// output to a caller-supplied sink.
    pub fn handle_to(&mut self, argv: &[String], sink: &mut String) -> Result<i32, Error> {
        let console = self.console()?;
        let code = console.run(argv);
        sink.push_str(console.output());
        Ok(code)
    }

    /// Runs a command by name with a parameter mapping; returns its exit
    /// code.
    pub fn call(&mut self, command: &str, params: &[(&str, &str)]) -> Result<i32, Error> {
        Ok(self.console()?.call(command, params))
    }

    /// Every registered command, keyed by declared name.
    pub fn all(&mut self) -> Result<&HashMap<String, Rc<BoxedCommand>>, Error> {
        Ok(self.console()?.all())
    }

    /// The captured output of the most recent `handle`/`call`, or `""`
    /// when nothing has run yet.
    pub fn output(&self) -> String {
        self.console
            .as_ref()
            .map(|console| console.output().to_string())
            .unwrap_or_default()
    }

    /// The dispatcher, constructed on first use and cached.
    fn console(&mut self) -> Result<&mut Console, Error> {
        if self.console.is_none() {
            let ids = {
                let declared = self.app.commands();
                if declared.is_empty() {
                    DEFAULT_COMMANDS.iter().map(|id| id.to_string()).collect()
                } else {
                    declared
                }
            };
            log::debug!("constructing dispatcher with {} command(s)", ids.len());
            let mut console = Console::new(self.app.clone(), self.app.version());
            console.resolve_commands(&ids)?;
            self.console = Some(console);
        }
        Ok(self.console.as_mut().expect("dispatcher initialized above"))
    }
}
