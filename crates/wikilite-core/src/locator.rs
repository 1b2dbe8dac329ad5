//! Discovery of the content database.
//!
//! The locator probes a fixed, ordered list of candidate directories for a
//! file named [`AppConfig::DB_FILENAME`]. When none holds one it falls back to
//! the path remembered from an earlier run. Whatever it resolves is written
//! back to the preference store so the next start can recall it.

use crate::config::AppConfig;
use crate::error::{Result, WikiliteError};
use crate::platform;
use crate::prefs::PreferenceStore;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Absolute path to an existing content database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePath(PathBuf);

impl DatabasePath {
    /// Validate `path`: it must exist and be named exactly like the database.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.file_name().and_then(|n| n.to_str()) != Some(AppConfig::DB_FILENAME) {
            return Err(WikiliteError::InvalidDatabasePath {
                path: path.to_path_buf(),
                reason: format!("file name is not {}", AppConfig::DB_FILENAME),
            });
        }
        if !path.is_file() {
            return Err(WikiliteError::InvalidDatabasePath {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| WikiliteError::io_with_path(e, path))?
                .join(path)
        };
        Ok(Self(absolute))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for DatabasePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Where a resolved database came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Found in the candidate directory with this priority index.
    Discovered(usize),
    /// Recalled from the preference store.
    Remembered,
}

/// Finds the content database.
#[derive(Debug, Clone)]
pub struct DatabaseLocator {
    candidates: Vec<PathBuf>,
    prefs: PreferenceStore,
}

impl DatabaseLocator {
    /// Create a locator over explicit candidate directories, highest priority first.
    pub fn new(candidates: Vec<PathBuf>, prefs: PreferenceStore) -> Self {
        Self { candidates, prefs }
    }

    /// Create a locator over the platform's storage directories, remembering
    /// the result in the platform config directory.
    pub fn platform_default() -> Result<Self> {
        Ok(Self::new(
            platform::candidate_dirs()?,
            PreferenceStore::in_dir(platform::config_dir()?),
        ))
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Resolve the database path.
    ///
    /// Returns [`WikiliteError::DatabaseNotFound`] when neither a candidate
    /// directory nor the remembered path yields a valid database.
    pub fn locate(&self) -> Result<DatabasePath> {
        self.locate_with_source().map(|(path, _)| path)
    }

    /// Resolve the database path and report where it came from.
    pub fn locate_with_source(&self) -> Result<(DatabasePath, Resolution)> {
        let (path, source) = match self.discover() {
            Some((path, index)) => (path, Resolution::Discovered(index)),
            None => match self.recall() {
                Some(path) => (path, Resolution::Remembered),
                None => {
                    warn!("No content database found, provisioning required");
                    return Err(WikiliteError::DatabaseNotFound {
                        searched: self.candidate_files(),
                    });
                }
            },
        };

        if let Err(e) = self.prefs.set_db_path(path.as_path()) {
            warn!("Failed to remember database path {}: {}", path, e);
        }

        info!(path = %path, ?source, "Resolved content database");
        Ok((path, source))
    }

    fn candidate_files(&self) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .map(|dir| dir.join(AppConfig::DB_FILENAME))
            .collect()
    }

    fn discover(&self) -> Option<(DatabasePath, usize)> {
        self.candidate_files()
            .into_iter()
            .enumerate()
            .find_map(|(index, file)| {
                debug!("Probing {}", file.display());
                DatabasePath::new(&file).ok().map(|path| (path, index))
            })
    }

    fn recall(&self) -> Option<DatabasePath> {
        let remembered = self.prefs.db_path()?;
        match DatabasePath::new(&remembered) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("Remembered database rejected: {}", e);
                None
            }
        }
    }
}
