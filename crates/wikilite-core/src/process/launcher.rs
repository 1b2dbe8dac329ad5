//! Engine process launching.

use crate::config::{AppConfig, EngineConfig, PathsConfig};
use crate::error::{Result, WikiliteError};
use crate::locator::DatabasePath;
use crate::platform::paths::{library_path_var, prepend_search_path};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, error, info};

/// Configuration for launching the search engine.
#[derive(Debug, Clone)]
pub struct EngineLaunchConfig {
    /// Path to the engine executable.
    pub binary_path: PathBuf,
    /// Private working directory; also used as the engine's home and temp dir.
    pub work_dir: PathBuf,
    /// Directory holding the engine's shared libraries.
    pub library_dir: PathBuf,
    /// Database to serve.
    pub db_path: DatabasePath,
    /// Address the engine binds its web server to.
    pub addr: SocketAddr,
    /// Additional arguments appended after the fixed ones.
    pub extra_args: Vec<String>,
    /// Environment variables set on top of the fixed overrides.
    pub env_vars: HashMap<String, String>,
    /// File receiving a copy of the engine's output.
    pub log_file: Option<PathBuf>,
}

impl EngineLaunchConfig {
    /// Create a launch config with the fixed address and the binary's own
    /// directory as library directory.
    pub fn new(
        binary_path: impl AsRef<Path>,
        work_dir: impl AsRef<Path>,
        db_path: DatabasePath,
    ) -> Self {
        let binary_path = binary_path.as_ref().to_path_buf();
        let library_dir = binary_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            binary_path,
            work_dir: work_dir.as_ref().to_path_buf(),
            library_dir,
            db_path,
            addr: EngineConfig::socket_addr(),
            extra_args: vec![],
            env_vars: HashMap::new(),
            log_file: None,
        }
    }

    /// Create a launch config rooted in the shell's data directory:
    /// `{data_dir}/cache` as working directory and a timestamped log under
    /// `{data_dir}/cache/logs`.
    pub fn in_data_dir(
        binary_path: impl AsRef<Path>,
        data_dir: impl AsRef<Path>,
        db_path: DatabasePath,
    ) -> Self {
        let work_dir = data_dir.as_ref().join(PathsConfig::WORK_DIR_NAME);
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_file = work_dir
            .join(PathsConfig::LOGS_DIR_NAME)
            .join(format!("{}_{}.log", AppConfig::APP_NAME, timestamp));

        Self::new(binary_path, work_dir, db_path).with_log_file(log_file)
    }

    /// Set the shared library directory.
    pub fn with_library_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.library_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the bind address.
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Add an extra argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Set the log file path.
    pub fn with_log_file(mut self, path: impl AsRef<Path>) -> Self {
        self.log_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Command-line arguments passed to the engine.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--db".into(),
            self.db_path.as_path().as_os_str().to_os_string(),
            "--web".into(),
            "--web-port".into(),
            self.addr.port().to_string().into(),
            "--web-host".into(),
            self.addr.ip().to_string().into(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    /// Environment overrides applied to the engine, inherited variables aside.
    pub fn env_overrides(&self) -> Result<Vec<(OsString, OsString)>> {
        let work_dir = self.work_dir.as_os_str().to_os_string();
        let lib_var = library_path_var();

        let mut env = vec![
            ("HOME".into(), work_dir.clone()),
            ("TMPDIR".into(), work_dir),
            (
                lib_var.into(),
                prepend_search_path(&self.library_dir, std::env::var_os(lib_var))?,
            ),
        ];
        if lib_var != "PATH" {
            env.push((
                "PATH".into(),
                prepend_search_path(&self.library_dir, std::env::var_os("PATH"))?,
            ));
        }
        env.extend(
            self.env_vars
                .iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        );
        Ok(env)
    }
}

/// Spawns the engine.
pub struct EngineLauncher;

impl EngineLauncher {
    /// Build the command for `config` without running it.
    ///
    /// Both output streams are piped so the supervisor can drain them.
    pub fn command(config: &EngineLaunchConfig) -> Result<Command> {
        let mut cmd = Command::new(&config.binary_path);
        cmd.args(config.args())
            .current_dir(&config.work_dir)
            .envs(config.env_overrides()?)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }

    /// Create the working directory and spawn the engine.
    pub fn spawn(config: &EngineLaunchConfig) -> Result<Child> {
        if !config.binary_path.exists() {
            return Err(WikiliteError::LaunchFailed {
                binary: config.binary_path.clone(),
                message: "binary not found".to_string(),
            });
        }

        fs::create_dir_all(&config.work_dir)
            .map_err(|e| WikiliteError::io_with_path(e, &config.work_dir))?;

        let mut cmd = Self::command(config)?;

        info!(
            "Launching {} against {} on {}",
            config.binary_path.display(),
            config.db_path,
            config.addr
        );
        debug!("Engine arguments: {:?}", config.args());

        let child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn engine: {}", e);
            WikiliteError::LaunchFailed {
                binary: config.binary_path.clone(),
                message: e.to_string(),
            }
        })?;

        info!("Launched engine with PID {:?}", child.id());
        Ok(child)
    }
}
