//! The startup flow of the shell.
//!
//! Locate the database, start the engine against it, wait for the readiness
//! gate, then load the client. [`DatabaseNotFound`](crate::WikiliteError::DatabaseNotFound)
//! is the only error that stops the flow; it is returned so the caller can
//! hand over to provisioning. Everything after the locator degrades instead
//! of failing.

use crate::client::{ClientController, ClientOptions, View};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::locator::{DatabaseLocator, DatabasePath};
use crate::network::HttpEngineApi;
use crate::platform;
use crate::process::{
    EngineLaunchConfig, FixedDelayGate, Readiness, ReadinessGate, ServiceHandle,
    ServiceSupervisor, SupervisorSettings,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Builder for configuring a [`WikiliteShell`].
///
/// # Example
///
/// ```rust,ignore
/// use wikilite_core::{TcpProbeGate, WikiliteShell};
///
/// let shell = WikiliteShell::builder("/opt/wikilite/wikilite")
///     .data_dir("/var/lib/wikilite")
///     .readiness_gate(TcpProbeGate::default())
///     .build()?;
/// ```
pub struct ShellBuilder {
    engine_binary: PathBuf,
    data_dir: Option<PathBuf>,
    locator: Option<DatabaseLocator>,
    settings: SupervisorSettings,
    gate: Option<Box<dyn ReadinessGate>>,
    options: ClientOptions,
    addr: SocketAddr,
    log_to_file: bool,
}

impl ShellBuilder {
    pub fn new(engine_binary: impl Into<PathBuf>) -> Self {
        Self {
            engine_binary: engine_binary.into(),
            data_dir: None,
            locator: None,
            settings: SupervisorSettings::default(),
            gate: None,
            options: ClientOptions::default(),
            addr: EngineConfig::socket_addr(),
            log_to_file: true,
        }
    }

    /// Directory holding the engine's working directory and logs.
    ///
    /// Default: the platform's internal data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Use `locator` instead of the platform's candidate directories.
    pub fn locator(mut self, locator: DatabaseLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn supervisor_settings(mut self, settings: SupervisorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Default: [`FixedDelayGate`].
    pub fn readiness_gate(mut self, gate: impl ReadinessGate + 'static) -> Self {
        self.gate = Some(Box::new(gate));
        self
    }

    pub fn client_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Address the engine is told to serve on and the client connects to.
    pub fn engine_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Append engine output to a timestamped file under the data directory.
    ///
    /// Default: `true`.
    pub fn log_to_file(mut self, enable: bool) -> Self {
        self.log_to_file = enable;
        self
    }

    pub fn build(self) -> Result<WikiliteShell> {
        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => platform::internal_data_dir()?,
        };
        let locator = match self.locator {
            Some(locator) => locator,
            None => DatabaseLocator::platform_default()?,
        };
        let gate: Box<dyn ReadinessGate> = match self.gate {
            Some(gate) => gate,
            None => Box::new(FixedDelayGate::default()),
        };

        Ok(WikiliteShell {
            engine_binary: self.engine_binary,
            data_dir,
            locator,
            supervisor: ServiceSupervisor::new(self.settings),
            gate,
            options: self.options,
            addr: self.addr,
            log_to_file: self.log_to_file,
        })
    }
}

/// A started shell: the resolved database, the engine and the client.
pub struct Session {
    pub database: DatabasePath,
    pub engine: ServiceHandle,
    pub readiness: Readiness,
    pub client: ClientController,
    /// View after loading the engine's root page.
    pub initial_view: View,
}

/// Composition of locator, supervisor, readiness gate and client.
pub struct WikiliteShell {
    engine_binary: PathBuf,
    data_dir: PathBuf,
    locator: DatabaseLocator,
    supervisor: ServiceSupervisor,
    gate: Box<dyn ReadinessGate>,
    options: ClientOptions,
    addr: SocketAddr,
    log_to_file: bool,
}

impl WikiliteShell {
    pub fn builder(engine_binary: impl Into<PathBuf>) -> ShellBuilder {
        ShellBuilder::new(engine_binary)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn locator(&self) -> &DatabaseLocator {
        &self.locator
    }

    /// Launch config for `database`.
    pub fn launch_config(&self, database: DatabasePath) -> EngineLaunchConfig {
        let config = EngineLaunchConfig::in_data_dir(&self.engine_binary, &self.data_dir, database)
            .with_addr(self.addr);
        if self.log_to_file {
            config
        } else {
            EngineLaunchConfig {
                log_file: None,
                ..config
            }
        }
    }

    /// Run the startup flow.
    ///
    /// Fails only when no database can be located.
    pub async fn launch(&self) -> Result<Session> {
        let database = self.locator.locate()?;
        let config = self.launch_config(database.clone());

        let engine = self.supervisor.start(&config).await;
        if let Some(reason) = engine.launch_error() {
            warn!("Continuing without an engine: {}", reason);
        }

        warn!(
            gate = self.gate.name(),
            grace_period = ?self.supervisor.settings().grace_period,
            "Client loading is gated independently of the engine liveness check; \
             a slow engine may not be serving yet"
        );
        let readiness = self.gate.until_ready(config.addr).await;
        info!(?readiness, state = ?engine.state(), "Loading client");

        let api = HttpEngineApi::new(&format!("http://{}/", config.addr))?;
        let mut client = ClientController::new(Arc::new(api), self.options);
        let initial_view = client.load_root().await;

        Ok(Session {
            database,
            engine,
            readiness,
            client,
            initial_view,
        })
    }
}

impl std::fmt::Debug for WikiliteShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiliteShell")
            .field("engine_binary", &self.engine_binary)
            .field("data_dir", &self.data_dir)
            .field("gate", &self.gate.name())
            .field("addr", &self.addr)
            .finish()
    }
}
