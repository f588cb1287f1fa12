//! The command contract.
//!
//! A command declares its signature as a `clap::Command` and implements
//! [`Command::handle`], which receives the parsed matches and an output
//! buffer and returns an exit code. Commands take `&mut self`: CLI
//! applications are single-threaded, so handlers can hold state without
//! interior mutability wrappers.
//!
//! Commands that need the owning [`Application`] override
//! [`Command::set_app`]; the dispatcher injects the back-reference when it
//! registers the command. The application strictly outlives every command
//! it resolves.

use std::cell::RefCell;
use std::rc::Rc;

use clap::ArgMatches;

use crate::app::Application;
use crate::output::OutputBuffer;
use drover_container::Service;

/// A named, runnable unit with a declared signature and a result code.
pub trait Command {
    /// The clap definition carrying the command's name, positional
    /// arguments, options, and description.
    fn definition(&self) -> clap::Command;

    /// Entry point. Writes user-facing text to `out` and returns the exit
    /// code.
    fn handle(&mut self, matches: &ArgMatches, out: &mut OutputBuffer) -> anyhow::Result<i32>;

    /// Receives a back-reference to the owning application. Default: the
    /// command does not care.
    fn set_app(&mut self, _app: Rc<Application>) {}
}

/// Container payload for resolvable commands.
///
/// The container traffics in `Rc<dyn Any>`, which cannot carry a bare
/// trait object; `BoxedCommand` is the concrete type command factories
/// produce and the dispatcher downcasts to.
pub struct BoxedCommand(RefCell<Box<dyn Command>>);

impl BoxedCommand {
    /// Wraps a command.
    pub fn new(command: impl Command + 'static) -> Self {
        Self(RefCell::new(Box::new(command)))
    }

    /// Wraps a command as a container [`Service`], ready to be returned
    /// from a factory.
    pub fn service(command: impl Command + 'static) -> Service {
        Rc::new(Self::new(command))
    }

    /// The command's declared name.
    pub fn name(&self) -> String {
        self.0.borrow().definition().get_name().to_string()
    }

    /// The command's clap definition.
    pub fn definition(&self) -> clap::Command {
        self.0.borrow().definition()
    }

    /// Injects the application back-reference.
    pub fn set_app(&self, app: Rc<Application>) {
        self.0.borrow_mut().set_app(app);
    }

    /// Runs the command against parsed matches.
    pub fn run(&self, matches: &ArgMatches, out: &mut OutputBuffer) -> anyhow::Result<i32> {
        self.0.borrow_mut().handle(matches, out)
    }
}
