//! The application object.
//!
//! [`Application`] composes the three registries everything else hangs off:
//! the [`ConfigStore`], the service [`Container`], and the
//! [`LazyBindingRegistry`]. It owns base-path resolution, the ordered list
//! of command identifiers to expose, and `make`, the central extension
//! point through which commands and services alike are resolved.
//!
//! # Base path
//!
//! An explicit base path always wins. Without one, the base path is derived
//! from the working directory according to the [`RunMode`]: a standalone
//! CLI process uses the working directory itself, while an embedded
//! application (invoked from inside a subdirectory such as a `public/` web
//! root) uses its parent. Both inputs are plain builder arguments, so tests
//! never have to touch the process environment.
//!
//! # Lazy services
//!
//! The built-in binder table exposes `"config"` (aliased as
//! `"config.store"`) and the bundled `"generate"` command. Each binder runs
//! at most once, on first demand, and installs the real bindings into the
//! container. Embedders add their own through
//! [`Application::binders`].

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use drover_container::{Container, ContainerError, LazyBindingRegistry, Params, Service};

use crate::command::{BoxedCommand, Command};
use crate::commands::GenerateCommand;
use crate::config::ConfigStore;
use crate::error::Error;

/// Framework name used when the `app` namespace declares none.
pub const FRAMEWORK_NAME: &str = "drover";

/// Framework version used when the `app` namespace declares none.
pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How the process was invoked; drives base-path derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Standalone CLI process: the working directory is the project root.
    #[default]
    Cli,
    /// Embedded in a host that runs from a subdirectory of the project
    /// root: the parent of the working directory is the project root.
    Embedded,
}

/// Builder for constructing an [`Application`].
#[derive(Debug, Default)]
pub struct ApplicationBuilder {
    base_path: Option<PathBuf>,
    run_mode: RunMode,
    working_dir: Option<PathBuf>,
    fallback_config_dir: Option<PathBuf>,
}

impl ApplicationBuilder {
    /// Creates a builder with default settings (`RunMode::Cli`, working
    /// directory taken from the process at build time).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit base path, overriding the run-mode heuristic.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the run mode used to derive the base path.
    pub fn run_mode(mut self, mode: RunMode) -> Self {
        self.run_mode = mode;
        self
    }

    /// Sets the working directory instead of asking the process.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets a directory of framework-shipped default config files,
    /// searched when the project config directory has no file for a
    /// namespace.
    pub fn fallback_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_config_dir = Some(dir.into());
        self
    }

    /// Builds the application: resolves the base path, loads the `app`
    /// config namespace, seeds the command list from its `commands` key,
    /// and installs the built-in lazy binders.
    pub fn build(self) -> Result<Application, Error> {
        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let base = match self.base_path {
            Some(path) => path,
            None => match self.run_mode {
                RunMode::Cli => working_dir.clone(),
                RunMode::Embedded => working_dir
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or(working_dir),
            },
        };
        log::debug!("application base path: {}", base.display());

        let mut config = ConfigStore::new(base.join("config"), self.fallback_config_dir);
        config.load("app")?;

        let declared: Vec<String> = match config.get("app.commands").cloned() {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                log::warn!("ignoring malformed app.commands: {}", err);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let app = Application {
            base,
            config: Rc::new(RefCell::new(config)),
            container: Container::new(),
            binders: LazyBindingRegistry::new(),
            commands: RefCell::new(Vec::new()),
            providers: RefCell::new(HashSet::new()),
        };
        app.register_commands(&declared);
        app.install_default_binders();
        Ok(app)
    }
}

/// The composition root: config + container + lazy binders + the command
/// identifier list.
pub struct Application {
    base: PathBuf,
    config: Rc<RefCell<ConfigStore>>,
    container: Container,
    binders: LazyBindingRegistry,
    commands: RefCell<Vec<String>>,
    providers: RefCell<HashSet<String>>,
}

impl Application {
    /// Creates a new builder.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    fn install_default_binders(&self) {
        let config = self.config.clone();
        self.binders.register(
            &["config", "config.store"],
            "bind_config",
            Rc::new(move |container: &Container| {
                container.instance("config", config.clone());
                container.alias("config.store", "config");
                Ok(())
            }),
        );

        self.binders.register(
            &["generate"],
            "bind_generate",
            Rc::new(|container: &Container| {
                container.bind(
                    "generate",
                    Rc::new(|_c, _p| Ok(BoxedCommand::service(GenerateCommand::new()))),
                );
                Ok(())
            }),
        );
    }

    /// The resolved base path. Stable for the application's lifetime.
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Joins a relative suffix onto the base path.
    pub fn path(&self, suffix: impl AsRef<Path>) -> PathBuf {
        self.base.join(suffix)
    }

    /// Loads a config namespace (idempotently).
    pub fn configure(&self, namespace: &str) -> Result<(), Error> {
        self.config()?.borrow_mut().load(namespace)
    }

    /// Resolves an identifier through the lazy binder table and the
    /// container. This is the central extension point: the config store,
    /// commands, and embedder services all come out of here.
    pub fn make(&self, id: &str) -> Result<Service, ContainerError> {
        self.make_with(id, &Params::new())
    }

    /// Like [`make`](Self::make), with constructor overrides passed
    /// through to the factory.
    pub fn make_with(&self, id: &str, params: &Params) -> Result<Service, ContainerError> {
        let canonical = self.container.canonical(id)?;
        self.binders.run_pending(&canonical, &self.container)?;
        self.container.resolve(&canonical, params)
    }

    /// The shared config store, resolved through the container like any
    /// other service.
    pub fn config(&self) -> Result<Rc<RefCell<ConfigStore>>, ContainerError> {
        self.make("config")?
            .downcast::<RefCell<ConfigStore>>()
            .map_err(|_| ContainerError::TypeMismatch("config".into()))
    }

    /// The application name, from `app.name` when configured.
    pub fn name(&self) -> String {
        self.config()
            .ok()
            .and_then(|config| config.borrow().get_str("app.name"))
            .unwrap_or_else(|| FRAMEWORK_NAME.to_string())
    }

    /// The application version, from `app.version` when configured.
    pub fn version(&self) -> String {
        self.config()
            .ok()
            .and_then(|config| config.borrow().get_str("app.version"))
            .unwrap_or_else(|| FRAMEWORK_VERSION.to_string())
    }

    /// Appends a command identifier if it is not already present.
    pub fn register_command(&self, id: &str) {
        let mut commands = self.commands.borrow_mut();
        if !commands.iter().any(|existing| existing == id) {
            commands.push(id.to_string());
        }
    }

    /// Merges a list of command identifiers, de-duplicating while
    /// preserving first-seen order.
    pub fn register_commands<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.register_command(id.as_ref());
        }
    }

    /// The ordered, duplicate-free command identifier list.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Binds a command factory under an identifier. Resolution produces a
    /// fresh command per call; pair with
    /// [`register_command`](Self::register_command) to expose it.
    pub fn bind_command<C, F>(&self, id: &str, factory: F)
    where
        C: Command + 'static,
        F: Fn() -> C + 'static,
    {
        self.container.bind(
            id,
            Rc::new(move |_c, _p| Ok(BoxedCommand::service(factory()))),
        );
    }

    /// Runs a service provider's `register` and `boot` phases exactly once
    /// per provider name; a repeat registration is a no-op.
    pub fn register(&self, provider: &dyn ServiceProvider) -> Result<(), Error> {
        if !self
            .providers
            .borrow_mut()
            .insert(provider.name().to_string())
        {
            return Ok(());
        }
        log::debug!("registering provider '{}'", provider.name());
        provider.register(self)?;
        provider.boot(self)
    }

    /// The underlying container, for embedders installing bindings
    /// directly.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The lazy binder table, for embedders deferring service setup.
    pub fn binders(&self) -> &LazyBindingRegistry {
        &self.binders
    }
}

/// A unit of service registration with distinct `register` and `boot`
/// phases.
pub trait ServiceProvider {
    /// Unique name used to de-duplicate registration.
    fn name(&self) -> &str;

    /// Installs bindings; runs before `boot`.
    fn register(&self, app: &Application) -> Result<(), Error>;

    /// Runs after `register`; default is a no-op.
    fn boot(&self, _app: &Application) -> Result<(), Error> {
        Ok(())
    }
}
