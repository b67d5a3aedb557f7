//! Persisted viewer preferences (`isPlaying`, `showText`)
//!
//! Preferences are read once at startup and written on every toggle. Any
//! storage failure is logged and replaced by the default value; callers never
//! see an error from this module's `Preferences` API.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::warn;

use crate::{Error, Result};

pub const KEY_IS_PLAYING: &str = "isPlaying";
pub const KEY_SHOW_TEXT: &str = "showText";

/// Key-value storage boundary for preferences
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// JSON object file, one key per preference
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("read {}: {}", self.path.display(), e)))?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(Error::Storage(format!(
                "corrupt {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        // A corrupt file is replaced rather than blocking every future write
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::Storage(format!("write {}: {}", self.path.display(), e)))
    }
}

/// In-memory store, for hosts without a writable data directory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub is_playing: bool,
    pub show_text: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            is_playing: true,
            show_text: true,
        }
    }
}

impl Preferences {
    /// Read both preferences, falling back per key to the default
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();
        Self {
            is_playing: read_bool(store, KEY_IS_PLAYING, defaults.is_playing),
            show_text: read_bool(store, KEY_SHOW_TEXT, defaults.show_text),
        }
    }

    pub fn save_is_playing(store: &mut dyn PreferenceStore, value: bool) {
        write_bool(store, KEY_IS_PLAYING, value);
    }

    pub fn save_show_text(store: &mut dyn PreferenceStore, value: bool) {
        write_bool(store, KEY_SHOW_TEXT, value);
    }
}

fn read_bool(store: &dyn PreferenceStore, key: &str, default: bool) -> bool {
    match store.get(key) {
        Ok(Some(Value::Bool(value))) => value,
        Ok(Some(other)) => {
            warn!("Preference {} has non-boolean value {}, using default", key, other);
            default
        }
        Ok(None) => default,
        Err(e) => {
            warn!("Failed to read preference {}: {}", key, e);
            default
        }
    }
}

fn write_bool(store: &mut dyn PreferenceStore, key: &str, value: bool) {
    if let Err(e) = store.set(key, Value::Bool(value)) {
        warn!("Failed to save preference {}: {}", key, e);
    }
}
