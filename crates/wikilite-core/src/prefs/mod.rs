//! Durable key-value preferences.
//!
//! The shell remembers exactly one thing across restarts: the path of the
//! last database it resolved. Preferences are a flat JSON object stored in
//! the platform config directory.

mod atomic;

pub use atomic::{atomic_read_json, atomic_write_json};

use crate::config::PathsConfig;
use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed string preferences.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Open the store backed by `path`. The file is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open the store in `dir` under the default file name.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(PathsConfig::PREFS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value. A missing or unreadable file reads as empty.
    pub fn get(&self, key: &str) -> Option<String> {
        match atomic_read_json::<BTreeMap<String, String>>(&self.path) {
            Ok(values) => values.and_then(|mut v| v.remove(key)),
            Err(e) => {
                warn!("Ignoring unreadable preferences {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Write a value, keeping the other keys.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = atomic_read_json::<BTreeMap<String, String>>(&self.path)
            .ok()
            .flatten()
            .unwrap_or_default();

        if values.get(key).map(String::as_str) == Some(value) {
            debug!("Preference {} unchanged", key);
            return Ok(());
        }

        values.insert(key.to_string(), value.to_string());
        atomic_write_json(&self.path, &values)
    }

    /// Last database path that was resolved, if any.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.get(PathsConfig::DB_PATH_KEY)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// Remember the resolved database path.
    pub fn set_db_path(&self, path: &Path) -> Result<()> {
        self.set(PathsConfig::DB_PATH_KEY, &path.to_string_lossy())
    }
}
