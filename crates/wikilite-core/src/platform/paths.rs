//! Platform-specific path utilities.
//!
//! This module provides functions to get platform-specific paths for:
//! - Storage directories probed for the content database
//! - The shell's private data and configuration directories
//! - The dynamic library search path variable

use crate::config::AppConfig;
use crate::error::{Result, WikiliteError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// External (user-visible) storage directories, in priority order.
///
/// # Platform Behavior
/// Uses the `dirs` crate, so each entry follows the platform convention:
/// - `{documents}/wikilite`
/// - `{downloads}/wikilite`
/// - `{downloads}`
///
/// Directories the platform does not define are skipped.
pub fn external_storage_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(documents) = dirs::document_dir() {
        dirs.push(documents.join(AppConfig::APP_NAME));
    }
    if let Some(downloads) = dirs::download_dir() {
        dirs.push(downloads.join(AppConfig::APP_NAME));
        dirs.push(downloads);
    }
    dirs
}

/// The shell's private data directory, used as the internal fallback location.
///
/// # Platform Behavior
/// - **Linux**: `~/.local/share/wikilite`
/// - **Windows**: `%LOCALAPPDATA%\wikilite`
/// - **macOS**: `~/Library/Application Support/wikilite`
pub fn internal_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| WikiliteError::Config {
        message: "Could not determine local data directory".to_string(),
    })?;
    Ok(data_dir.join(AppConfig::APP_NAME))
}

/// The shell's configuration directory, where preferences are persisted.
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| WikiliteError::Config {
        message: "Could not determine platform config directory".to_string(),
    })?;
    Ok(config_dir.join(AppConfig::APP_NAME))
}

/// All candidate directories for the database: external storage first, then
/// the internal data directory.
pub fn candidate_dirs() -> Result<Vec<PathBuf>> {
    let mut dirs = external_storage_dirs();
    dirs.push(internal_data_dir()?);
    Ok(dirs)
}

/// Name of the environment variable the dynamic loader searches.
///
/// # Platform Behavior
/// - **Linux**: `LD_LIBRARY_PATH`
/// - **macOS**: `DYLD_LIBRARY_PATH`
/// - **Windows**: `PATH`
pub fn library_path_var() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "DYLD_LIBRARY_PATH"
    }
    #[cfg(windows)]
    {
        "PATH"
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        "LD_LIBRARY_PATH"
    }
}

/// Prepend `dir` to a search path value, keeping the existing entries.
pub fn prepend_search_path(dir: &Path, existing: Option<OsString>) -> Result<OsString> {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(existing) = existing {
        entries.extend(std::env::split_paths(&existing).filter(|p| !p.as_os_str().is_empty()));
    }
    std::env::join_paths(entries).map_err(|e| WikiliteError::Config {
        message: format!("Cannot add {} to search path: {}", dir.display(), e),
    })
}
