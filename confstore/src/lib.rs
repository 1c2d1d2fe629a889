//! JSON-backed key-value configuration store.
//!
//! This crate handles loading, saving and accessing a flat set of
//! configuration keys persisted in a single JSON document on disk.
//! Every public operation re-reads the backing file first, so the
//! store reflects external edits on the next call.

use log::{debug, info};
use serde_json::Value;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use confstore_core::{value_kind, ConfigMap, Error, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};

/// Key-value store backed by a JSON file.
///
/// Reads and writes are blocking filesystem calls on the caller's
/// thread. There is no locking: two stores pointed at the same file,
/// or an external writer, can race and lose updates.
pub struct ConfigStore {
    /// Path to the backing file.
    path: PathBuf,

    /// In-memory snapshot, refreshed from disk before every operation.
    data: ConfigMap,

    /// Seed map written out when the backing file is first created.
    defaults: ConfigMap,
}

impl ConfigStore {
    /// Create a store bound to the path named by the `CONFIG_PATH`
    /// environment variable, or to `config.json` in the current
    /// working directory if the variable is unset. Does not touch
    /// the filesystem.
    pub fn new() -> Self {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::with_file(path),
            Err(_) => Self::with_file(DEFAULT_CONFIG_FILE),
        }
    }

    /// Create a store bound to an explicit path. No I/O happens until
    /// the first operation.
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            data: ConfigMap::new(),
            defaults: ConfigMap::new(),
        }
    }

    /// Attach a default data map. It seeds the file created by
    /// [`ensure_exists`](Self::ensure_exists) and stands in for the
    /// file's content whenever the file is missing.
    pub fn with_defaults(mut self, defaults: ConfigMap) -> Self {
        self.data = defaults.clone();
        self.defaults = defaults;
        self
    }

    /// Check whether the backing file exists, creating it from the
    /// defaults if not. Returns `Ok(true)` if the file pre-existed,
    /// `Ok(false)` if it was newly created. Never overwrites an
    /// existing file.
    pub fn ensure_exists(&mut self) -> Result<bool, Error> {
        if self.path.exists() {
            self.reload()?;
            return Ok(true);
        }
        info!(
            "no configuration file at {}, creating one",
            self.path.display()
        );
        self.data = self.defaults.clone();
        self.persist()?;
        self.reload()?;
        Ok(false)
    }

    /// Look up a key and return the raw value, if any.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>, Error> {
        self.reload()?;
        Ok(self.data.get(key).cloned())
    }

    /// Look up a string-valued key. An absent key is `Ok(None)`; a
    /// present key of any other kind is a type-mismatch error.
    pub fn get_string(&mut self, key: &str) -> Result<Option<String>, Error> {
        match self.get(key)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "string", &other)),
        }
    }

    /// Look up an array-valued key.
    pub fn get_array(&mut self, key: &str) -> Result<Option<Vec<Value>>, Error> {
        match self.get(key)? {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(key, "array", &other)),
        }
    }

    /// Look up an object-valued key as a nested map.
    pub fn get_map(&mut self, key: &str) -> Result<Option<ConfigMap>, Error> {
        match self.get(key)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(mismatch(key, "object", &other)),
        }
    }

    /// Assign a value under a key and persist the whole map back to
    /// disk. The file is rewritten in full; there is no atomic
    /// replace.
    pub fn set<K, V>(&mut self, key: K, value: V) -> Result<(), Error>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.reload()?;
        self.data.insert(key.into(), value.into());
        self.persist()
    }

    /// The default data map attached at construction.
    pub fn defaults(&self) -> &ConfigMap {
        &self.defaults
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory snapshot with the file's content. A
    /// missing file reads as the defaults; a present but malformed
    /// file is an error.
    fn reload(&mut self) -> Result<(), Error> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "no file at {}, snapshot falls back to defaults",
                    self.path.display()
                );
                self.data = self.defaults.clone();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let document: Value = serde_json::from_str(&raw).map_err(|e| {
            Error::Parse(format!("invalid JSON in {}: {}", self.path.display(), e))
        })?;
        match document {
            Value::Object(map) => {
                self.data = map;
                Ok(())
            }
            other => Err(Error::Parse(format!(
                "expected a JSON object at the top level of {}, found {}",
                self.path.display(),
                value_kind(&other)
            ))),
        }
    }

    /// Serialize the snapshot with two-space indentation and write it
    /// over the backing file.
    fn persist(&self) -> Result<(), Error> {
        let mut rendered = serde_json::to_string_pretty(&self.data)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        rendered.push('\n');
        fs::write(&self.path, rendered)?;
        debug!(
            "wrote {} keys to {}",
            self.data.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        found: value_kind(found),
    }
}
