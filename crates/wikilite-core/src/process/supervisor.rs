//! Supervision of the engine process.
//!
//! The supervisor spawns the engine once, drains its output, and after a
//! fixed grace period performs a single liveness check. A running engine is
//! handed to a reaper task that records its exit status. Nothing is ever
//! restarted here: relaunching is up to the hosting application.

use super::launcher::{EngineLaunchConfig, EngineLauncher};
use super::output::{self, FileSink, LogSink, TracingSink};
use crate::config::SupervisorConfig;
use std::process::ExitStatus;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::process::Child;
use tokio::sync::{watch, Notify};
use tracing::{error, info, warn};

/// Lifecycle of the supervised engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Spawned, grace period not yet over.
    Starting,
    /// Alive at the liveness check.
    Running,
    /// Could not be spawned, or exited during the grace period.
    FailedToStart,
    /// Exited after having been classified as running. `None` when the
    /// process was ended by a signal.
    Exited(Option<i32>),
}

impl ServiceState {
    /// Whether no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceState::FailedToStart | ServiceState::Exited(_))
    }
}

/// Runtime settings of the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// Wait between spawn and the liveness check.
    pub grace_period: Duration,
    /// Capacity of the channel between the output reader and the log sink.
    pub log_channel_capacity: usize,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            grace_period: SupervisorConfig::GRACE_PERIOD,
            log_channel_capacity: SupervisorConfig::LOG_CHANNEL_CAPACITY,
        }
    }
}

impl SupervisorSettings {
    /// Set the grace period.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}

/// State shared between the handle, the monitor and the reaper.
///
/// The cells are written at most once, by a single task each.
#[derive(Debug)]
struct Shared {
    pid: Option<u32>,
    exit_status: OnceLock<ExitStatus>,
    launch_error: OnceLock<String>,
    stop: Notify,
}

/// Observer of a supervised engine.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    shared: Arc<Shared>,
    state: watch::Receiver<ServiceState>,
}

impl ServiceHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        *self.state.borrow()
    }

    /// PID of the engine, if it was spawned.
    pub fn pid(&self) -> Option<u32> {
        self.shared.pid
    }

    /// Exit status, once the engine has exited.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.shared.exit_status.get().copied()
    }

    /// Why spawning failed, if it did.
    pub fn launch_error(&self) -> Option<&str> {
        self.shared.launch_error.get().map(String::as_str)
    }

    /// Wait for the liveness check to classify the engine.
    pub async fn classified(&self) -> ServiceState {
        self.wait_until(|s| *s != ServiceState::Starting).await
    }

    /// Wait until the engine has failed or exited.
    pub async fn terminated(&self) -> ServiceState {
        self.wait_until(ServiceState::is_terminal).await
    }

    /// Ask the reaper to kill the engine.
    ///
    /// Has no effect once the engine is gone.
    pub fn stop(&self) {
        self.shared.stop.notify_one();
    }

    async fn wait_until(&self, done: impl FnMut(&ServiceState) -> bool) -> ServiceState {
        let mut rx = self.state.clone();
        if let Ok(state) = rx.wait_for(done).await {
            return *state;
        }
        let state = *rx.borrow();
        state
    }

    fn failed(message: String) -> Self {
        let (_, rx) = watch::channel(ServiceState::FailedToStart);
        let launch_error = OnceLock::new();
        let _ = launch_error.set(message);
        Self {
            shared: Arc::new(Shared {
                pid: None,
                exit_status: OnceLock::new(),
                launch_error,
                stop: Notify::new(),
            }),
            state: rx,
        }
    }
}

/// Spawns and monitors the engine.
#[derive(Debug, Clone, Default)]
pub struct ServiceSupervisor {
    settings: SupervisorSettings,
}

impl ServiceSupervisor {
    pub fn new(settings: SupervisorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Start the engine, logging its output to the configured log file (or
    /// to `tracing` only when none is set).
    ///
    /// Returns right after spawning; classification happens in the
    /// background. Spawn failures are logged and reported through the
    /// handle as [`ServiceState::FailedToStart`].
    pub async fn start(&self, config: &EngineLaunchConfig) -> ServiceHandle {
        let sink: Box<dyn LogSink> = match &config.log_file {
            Some(path) => {
                let sink = FileSink::open(path).await;
                info!("Engine output logged to {}", sink.path().display());
                Box::new(sink)
            }
            None => Box::new(TracingSink),
        };
        self.start_with_sink(config, sink)
    }

    /// Start the engine with an explicit log sink.
    pub fn start_with_sink(
        &self,
        config: &EngineLaunchConfig,
        sink: Box<dyn LogSink>,
    ) -> ServiceHandle {
        let mut child = match EngineLauncher::spawn(config) {
            Ok(child) => child,
            Err(e) => {
                error!("Engine failed to start: {}", e);
                return ServiceHandle::failed(e.to_string());
            }
        };

        output::drain(
            child.stdout.take(),
            child.stderr.take(),
            sink,
            self.settings.log_channel_capacity,
        );

        let shared = Arc::new(Shared {
            pid: child.id(),
            exit_status: OnceLock::new(),
            launch_error: OnceLock::new(),
            stop: Notify::new(),
        });
        let (tx, rx) = watch::channel(ServiceState::Starting);

        tokio::spawn(monitor(
            child,
            Arc::clone(&shared),
            tx,
            self.settings.grace_period,
        ));

        ServiceHandle { shared, state: rx }
    }
}

/// Wait out the grace period, check liveness once, then hand over to the reaper.
async fn monitor(
    mut child: Child,
    shared: Arc<Shared>,
    state: watch::Sender<ServiceState>,
    grace_period: Duration,
) {
    tokio::time::sleep(grace_period).await;

    match child.try_wait() {
        Ok(None) => {
            info!(pid = ?shared.pid, "Engine started successfully");
            state.send_replace(ServiceState::Running);
            tokio::spawn(reap(child, shared, state));
        }
        Ok(Some(status)) => {
            error!(%status, "Engine failed to start");
            let _ = shared.exit_status.set(status);
            state.send_replace(ServiceState::FailedToStart);
        }
        Err(e) => {
            error!("Engine liveness check failed: {}", e);
            state.send_replace(ServiceState::FailedToStart);
        }
    }
}

/// Block until the engine exits and record how it went.
async fn reap(mut child: Child, shared: Arc<Shared>, state: watch::Sender<ServiceState>) {
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = shared.stop.notified() => None,
    };

    let status = match exited {
        Some(status) => status,
        None => {
            info!("Stopping engine");
            if let Err(e) = child.start_kill() {
                warn!("Failed to signal engine: {}", e);
            }
            child.wait().await
        }
    };

    match status {
        Ok(status) => {
            if status.success() {
                info!(%status, "Engine exited");
            } else {
                warn!(%status, "Engine exited");
            }
            let _ = shared.exit_status.set(status);
            state.send_replace(ServiceState::Exited(status.code()));
        }
        Err(e) => {
            error!("Failed to wait for engine: {}", e);
            state.send_replace(ServiceState::Exited(None));
        }
    }
}
