//! The bundled `generate` command.
//!
//! Scaffolds a new command source file from an embedded stub. The
//! destination is `{base_path}/src/commands/{snake_case(name)}.rs`; an
//! existing file is only overwritten with `--force`, and a missing or
//! unwritable destination directory fails loudly. Errors travel back to
//! the dispatcher as a diagnostic plus a non-zero exit code; the command
//! never terminates the process itself.

use std::fs;
use std::io;
use std::rc::Rc;

use clap::{Arg, ArgAction, ArgMatches};
use minijinja::{context, Environment};

use crate::app::Application;
use crate::command::Command;
use crate::error::Error;
use crate::output::OutputBuffer;

const STUB: &str = include_str!("stubs/command.rs.j2");

/// Generates a new command source file from the embedded stub.
#[derive(Default)]
pub struct GenerateCommand {
    app: Option<Rc<Application>>,
}

impl GenerateCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command for GenerateCommand {
    fn definition(&self) -> clap::Command {
        clap::Command::new("generate")
            .about("Generate a new command source file")
            .arg(
                Arg::new("name")
                    .required(true)
                    .value_name("NAME")
                    .help("Type name of the command to generate, e.g. SyncCommand"),
            )
            .arg(
                Arg::new("command")
                    .long("command")
                    .value_name("CLI_NAME")
                    .help("CLI name the generated command answers to (defaults to the kebab-cased type name)"),
            )
            .arg(
                Arg::new("description")
                    .long("description")
                    .value_name("TEXT")
                    .help("Description used for the generated command's help"),
            )
            .arg(
                Arg::new("force")
                    .long("force")
                    .action(ArgAction::SetTrue)
                    .help("Overwrite the destination file if it exists"),
            )
    }

    fn handle(&mut self, matches: &ArgMatches, out: &mut OutputBuffer) -> anyhow::Result<i32> {
        let app = self
            .app
            .clone()
            .ok_or_else(|| anyhow::anyhow!("generate requires an application context"))?;

        let name = matches
            .get_one::<String>("name")
            .expect("required argument");
        let command = matches
            .get_one::<String>("command")
            .cloned()
            .unwrap_or_else(|| default_command_name(name));
        let description = matches
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_else(|| format!("The {} command", command));
        let force = matches.get_flag("force");

        let dest_dir = app.path("src/commands");
        let dest = dest_dir.join(format!("{}.rs", snake_case(name)));

        if dest.exists() && !force {
            return Err(Error::DestinationExists(dest).into());
        }
        if !dest_dir.is_dir() {
            return Err(Error::NotWritable(dest_dir).into());
        }

        let compiled = compile_stub(name, &command, &description)?;
        fs::write(&dest, compiled).map_err(|err| match err.kind() {
            io::ErrorKind::PermissionDenied => Error::NotWritable(dest_dir.clone()),
            _ => Error::Io(err),
        })?;

        out.info(&format!("Command generated at {}.", dest.display()));
        out.line("");
        out.line(&format!(
            "Bind and register \"{}\" in your application to make it runnable.",
            command
        ));
        Ok(0)
    }

    fn set_app(&mut self, app: Rc<Application>) {
        self.app = Some(app);
    }
}

fn compile_stub(name: &str, command: &str, description: &str) -> Result<String, Error> {
    let env = Environment::new();
    Ok(env.render_str(STUB, context! { name, command, description })?)
}

/// `SyncFiles` → `sync_files`. ASCII-only; word boundaries are
/// lower-to-upper transitions, dashes, and spaces.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else if ch == '-' || ch == ' ' {
            out.push('_');
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// Default CLI name: the type name minus a trailing `Command`, kebab-cased.
fn default_command_name(name: &str) -> String {
    let trimmed = name
        .strip_suffix("Command")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name);
    snake_case(trimmed).replace('_', "-")
}
