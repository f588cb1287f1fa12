//! The command dispatcher.
//!
//! [`Console`] owns the set of resolved, runnable commands. Identifiers are
//! resolved through [`Application::make`], the application back-reference
//! is injected, and each command is registered under its declared clap
//! name. Registering a second command under a name the set already holds
//! overwrites the first (last registration wins).
//!
//! Every run buffers its output: [`Console::run`] and [`Console::call`]
//! acquire a fresh [`OutputBuffer`] per invocation and record it, so
//! [`Console::output`] always reflects the most recent run only.

use std::collections::HashMap;
use std::rc::Rc;

use crate::app::Application;
use crate::command::BoxedCommand;
use crate::error::Error;
use crate::output::OutputBuffer;

/// Dispatcher over the resolved, runnable command set.
pub struct Console {
    app: Rc<Application>,
    name: String,
    version: String,
    commands: HashMap<String, Rc<BoxedCommand>>,
    last_output: Option<String>,
}

impl Console {
    /// Creates a dispatcher for an application. The display name is taken
    /// from the application; the version string is the caller's.
    pub fn new(app: Rc<Application>, version: impl Into<String>) -> Self {
        let name = app.name();
        Self {
            app,
            name,
            version: version.into(),
            commands: HashMap::new(),
            last_output: None,
        }
    }

    /// Registers a resolved command under its declared name, injecting the
    /// application back-reference first. Last registration wins.
    pub fn add(&mut self, command: Rc<BoxedCommand>) {
        command.set_app(self.app.clone());
        let name = command.name();
        if self.commands.insert(name.clone(), command).is_some() {
            log::debug!("command '{}' re-registered, last one wins", name);
        }
    }

    /// Resolves one identifier through the application and registers the
    /// command it produces.
    pub fn resolve(&mut self, id: &str) -> Result<(), Error> {
        let service = self.app.make(id)?;
        let command = service
            .downcast::<BoxedCommand>()
            .map_err(|_| Error::NotRunnable(id.to_string()))?;
        self.add(command);
        Ok(())
    }

    /// Resolves a list of identifiers in order.
    pub fn resolve_commands<I, S>(&mut self, ids: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.resolve(id.as_ref())?;
        }
        Ok(self)
    }

    /// Runs a command by argument vector: the first element names the
    /// command, the rest are parsed against its declared signature. Output
    /// goes into a fresh buffer retrievable via [`output`](Self::output);
    /// the returned exit code is non-zero for unknown names, validation
    /// failures, and handler errors. The process is never terminated here.
    pub fn run(&mut self, argv: &[String]) -> i32 {
        let mut out = OutputBuffer::new();
        let code = self.run_into(argv, &mut out);
        self.last_output = Some(out.into_string());
        code
    }

    fn run_into(&mut self, argv: &[String], out: &mut OutputBuffer) -> i32 {
        let Some((name, rest)) = argv.split_first() else {
            self.write_listing(out);
            return 0;
        };
        let Some(command) = self.commands.get(name.as_str()).cloned() else {
            out.error(&Error::CommandNotFound(name.clone()).to_string());
            return 1;
        };

        let args = std::iter::once(name.as_str()).chain(rest.iter().map(String::as_str));
        let matches = match command.definition().try_get_matches_from(args) {
            Ok(matches) => matches,
            // Covers --help/--version as well: clap renders the text and
            // reports exit code 0 for those.
            Err(err) => {
                out.write(&err.render().to_string());
                return err.exit_code();
            }
        };

        log::debug!("running command '{}'", name);
        match command.run(&matches, out) {
            Ok(code) => code,
            Err(err) => {
                out.error(&format!("{:#}", err));
                1
            }
        }
    }

    /// Programmatic invocation. `params` is an ordered mapping: `--key`
    /// entries become options (`--key=value`, or a bare flag when the
    /// value is empty) and all other entries contribute their value as the
    /// next positional argument. A fresh output buffer is allocated for
    /// this single invocation; anything captured before is discarded.
    pub fn call(&mut self, command: &str, params: &[(&str, &str)]) -> i32 {
        let mut argv = vec![command.to_string()];
        for (key, value) in params {
            if let Some(option) = key.strip_prefix("--") {
                if value.is_empty() {
                    argv.push(format!("--{}", option));
                } else {
                    argv.push(format!("--{}={}", option, value));
                }
            } else {
                argv.push((*value).to_string());
            }
        }
        self.run(&argv)
    }

    /// The captured text of the most recent `run`/`call`, or `""` when
    /// nothing has run yet.
    pub fn output(&self) -> &str {
        self.last_output.as_deref().unwrap_or("")
    }

    /// Every registered command, keyed by declared name.
    pub fn all(&self) -> &HashMap<String, Rc<BoxedCommand>> {
        &self.commands
    }

    /// The version string supplied at construction.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn write_listing(&self, out: &mut OutputBuffer) {
        out.line(&format!("{} {}", self.name, self.version));
        if self.commands.is_empty() {
            return;
        }
        out.line("");
        out.line("Available commands:");
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        for name in names {
            out.line(&format!("  {}", name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use clap::{Arg, ArgAction, ArgMatches};
    use tempfile::TempDir;

    struct Echo {
        name: &'static str,
        app_name: Option<String>,
    }

    impl Echo {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                app_name: None,
            }
        }
    }

    impl Command for Echo {
        fn definition(&self) -> clap::Command {
            clap::Command::new(self.name)
                .about("Echoes its input")
                .arg(Arg::new("word").required(true))
                .arg(Arg::new("loud").long("loud").action(ArgAction::SetTrue))
        }

        fn handle(&mut self, matches: &ArgMatches, out: &mut OutputBuffer) -> anyhow::Result<i32> {
            let word = matches
                .get_one::<String>("word")
                .expect("required argument");
            let word = if matches.get_flag("loud") {
                word.to_uppercase()
            } else {
                word.clone()
            };
            match &self.app_name {
                Some(app_name) => out.line(&format!("{} from {}", word, app_name)),
                None => out.line(&word),
            }
            Ok(0)
        }

        fn set_app(&mut self, app: Rc<Application>) {
            self.app_name = Some(app.name());
        }
    }

    struct Failing;

    impl Command for Failing {
        fn definition(&self) -> clap::Command {
            clap::Command::new("fail")
        }

        fn handle(&mut self, _m: &ArgMatches, _out: &mut OutputBuffer) -> anyhow::Result<i32> {
            anyhow::bail!("handler exploded")
        }
    }

    fn console() -> (TempDir, Console) {
        let dir = TempDir::new().unwrap();
        let app = Rc::new(
            Application::builder()
                .base_path(dir.path())
                .build()
                .unwrap(),
        );
        let version = app.version();
        (dir, Console::new(app, version))
    }

    fn args(argv: &[&str]) -> Vec<String> {
        argv.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_dispatches_by_declared_name() {
        let (_dir, mut console) = console();
        console.app.bind_command("echo", || Echo::named("echo"));
        console.resolve("echo").unwrap();

        let code = console.run(&args(&["echo", "hello"]));
        assert_eq!(code, 0);
        assert_eq!(console.output(), "hello from drover\n");
    }

    #[test]
    fn test_unknown_command_fails_without_terminating() {
        let (_dir, mut console) = console();
        let code = console.run(&args(&["missing"]));
        assert_eq!(code, 1);
        assert!(console.output().contains("command not found: 'missing'"));
    }

    #[test]
    fn test_validation_failure_is_nonzero() {
        let (_dir, mut console) = console();
        console.app.bind_command("echo", || Echo::named("echo"));
        console.resolve("echo").unwrap();

        // Missing the required positional.
        let code = console.run(&args(&["echo"]));
        assert_ne!(code, 0);
        assert!(console.output().contains("Usage"));
    }

    #[test]
    fn test_help_flag_renders_and_exits_zero() {
        let (_dir, mut console) = console();
        console.app.bind_command("echo", || Echo::named("echo"));
        console.resolve("echo").unwrap();

        let code = console.run(&args(&["echo", "--help"]));
        assert_eq!(code, 0);
        assert!(console.output().contains("Echoes its input"));
    }

    #[test]
    fn test_handler_error_becomes_diagnostic() {
        let (_dir, mut console) = console();
        console.app.bind_command("fail", || Failing);
        console.resolve("fail").unwrap();

        let code = console.run(&args(&["fail"]));
        assert_eq!(code, 1);
        assert!(console.output().contains("error: handler exploded"));
    }

    #[test]
    fn test_call_translates_params() {
        let (_dir, mut console) = console();
        console.app.bind_command("echo", || Echo::named("echo"));
        console.resolve("echo").unwrap();

        let code = console.call("echo", &[("word", "hi"), ("--loud", "")]);
        assert_eq!(code, 0);
        assert_eq!(console.output(), "HI from drover\n");
    }

    #[test]
    fn test_call_uses_a_fresh_buffer_each_time() {
        let (_dir, mut console) = console();
        console.app.bind_command("echo", || Echo::named("echo"));
        console.resolve("echo").unwrap();

        console.call("echo", &[("word", "first")]);
        console.call("echo", &[("word", "second")]);

        assert!(console.output().contains("second"));
        assert!(!console.output().contains("first"));
    }

    #[test]
    fn test_output_empty_before_any_run() {
        let (_dir, console) = console();
        assert_eq!(console.output(), "");
    }

    #[test]
    fn test_duplicate_name_last_registration_wins() {
        struct Fixed(&'static str);

        impl Command for Fixed {
            fn definition(&self) -> clap::Command {
                clap::Command::new("dup")
            }

            fn handle(&mut self, _m: &ArgMatches, out: &mut OutputBuffer) -> anyhow::Result<i32> {
                out.line(self.0);
                Ok(0)
            }
        }

        let (_dir, mut console) = console();
        console.app.bind_command("dup.first", || Fixed("first"));
        console.app.bind_command("dup.second", || Fixed("second"));
        console
            .resolve_commands(["dup.first", "dup.second"])
            .unwrap();

        assert_eq!(console.all().len(), 1);
        console.run(&args(&["dup"]));
        assert_eq!(console.output(), "second\n");
    }

    #[test]
    fn test_resolving_non_command_service_fails() {
        let (_dir, mut console) = console();
        console
            .app
            .container()
            .instance("not-a-command", Rc::new(5u8));

        let err = console.resolve("not-a-command").unwrap_err();
        assert!(matches!(err, Error::NotRunnable(_)));
    }

    #[test]
    fn test_empty_argv_lists_commands() {
        let (_dir, mut console) = console();
        console.app.bind_command("echo", || Echo::named("echo"));
        console.resolve("echo").unwrap();

        let code = console.run(&[]);
        assert_eq!(code, 0);
        assert!(console.output().contains("Available commands:"));
        assert!(console.output().contains("  echo"));
    }
}
