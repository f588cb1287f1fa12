//! Configuration namespaces.
//!
//! A namespace is one named mapping loaded from one TOML file,
//! `{configDir}/{namespace}.toml`. Two directories are searched: the
//! project config directory first, then an optional fallback directory of
//! framework-shipped defaults. A namespace with no file in either place is
//! simply empty, which is not an error.
//!
//! Loading is idempotent: a namespace is marked loaded on the first
//! [`ConfigStore::load`] and never read from disk again, so values written
//! with [`ConfigStore::set`] survive repeated `load` calls.
//!
//! Keys are dot-separated paths whose first segment names the namespace:
//! `"app.name"` reads the `name` key of the `app` namespace, and deeper
//! paths descend nested tables.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Error;

/// Loader and dotted-key accessor for configuration namespaces.
#[derive(Debug)]
pub struct ConfigStore {
    project_dir: PathBuf,
    fallback_dir: Option<PathBuf>,
    loaded: HashSet<String>,
    namespaces: HashMap<String, Value>,
}

impl ConfigStore {
    /// Creates a store searching `project_dir` first and `fallback_dir`
    /// (if any) second.
    pub fn new(project_dir: impl Into<PathBuf>, fallback_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            fallback_dir,
            loaded: HashSet::new(),
            namespaces: HashMap::new(),
        }
    }

    /// Resolves the file a namespace would be loaded from, preferring the
    /// project directory. `None` when neither directory has the file.
    pub fn config_path(&self, namespace: &str) -> Option<PathBuf> {
        let file = format!("{}.toml", namespace);
        let project = self.project_dir.join(&file);
        if project.is_file() {
            return Some(project);
        }
        self.fallback_dir
            .as_ref()
            .map(|dir| dir.join(&file))
            .filter(|path| path.is_file())
    }

    /// Loads a namespace once. Subsequent calls are no-ops, and a
    /// namespace with no file is silently left empty.
    ///
    /// A file that exists but fails to parse is an error.
    pub fn load(&mut self, namespace: &str) -> Result<(), Error> {
        if !self.loaded.insert(namespace.to_string()) {
            return Ok(());
        }
        let Some(path) = self.config_path(namespace) else {
            log::trace!("no config file for namespace '{}'", namespace);
            return Ok(());
        };
        log::debug!(
            "loading config namespace '{}' from {}",
            namespace,
            path.display()
        );
        let content = fs::read_to_string(&path)?;
        let value: Value =
            toml::from_str(&content).map_err(|source| Error::Config { path, source })?;
        self.namespaces.insert(namespace.to_string(), value);
        Ok(())
    }

    /// Returns true if the namespace has been through [`load`](Self::load).
    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.loaded.contains(namespace)
    }

    /// Looks up a dotted key. The first segment names the namespace; the
    /// rest descend nested tables. `"app"` alone yields the whole
    /// namespace mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let namespace = segments.next()?;
        let mut current = self.namespaces.get(namespace)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Looks up a dotted key, falling back to `default` when absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Looks up a dotted key as a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    /// Writes a dotted key, creating intermediate tables as needed. Works
    /// on namespaces that were never loaded from disk.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut segments = key.split('.');
        let Some(namespace) = segments.next() else {
            return;
        };
        let segments: Vec<&str> = segments.collect();

        let root = self
            .namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Default::default()));

        if segments.is_empty() {
            *root = value;
            return;
        }

        let mut current = root;
        for segment in &segments[..segments.len() - 1] {
            if !current.is_object() {
                *current = Value::Object(Default::default());
            }
            current = current
                .as_object_mut()
                .expect("intermediate config node is an object")
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
        }
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        current
            .as_object_mut()
            .expect("intermediate config node is an object")
            .insert(segments[segments.len() - 1].to_string(), value);
    }

    /// The project config directory this store searches first.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
