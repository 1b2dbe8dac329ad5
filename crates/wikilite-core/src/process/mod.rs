//! Engine process management.
//!
//! Handles launching the search engine, draining its output, classifying its
//! startup, and gating the client until it is expected to serve.
//!
//! # Example
//!
//! ```rust,no_run
//! use wikilite_core::process::{
//!     EngineLaunchConfig, FixedDelayGate, ReadinessGate, ServiceSupervisor,
//! };
//! use wikilite_core::DatabaseLocator;
//!
//! #[tokio::main]
//! async fn main() -> wikilite_core::Result<()> {
//!     let db = DatabaseLocator::platform_default()?.locate()?;
//!     let config = EngineLaunchConfig::new("/opt/wikilite/wikilite", "/tmp/wikilite", db);
//!
//!     let handle = ServiceSupervisor::default().start(&config).await;
//!     FixedDelayGate::default().until_ready(config.addr).await;
//!     println!("engine state: {:?}", handle.state());
//!     Ok(())
//! }
//! ```

mod launcher;
mod output;
mod readiness;
mod supervisor;

pub use launcher::{EngineLaunchConfig, EngineLauncher};
pub use output::{FileSink, LogSink, TracingSink, ENGINE_LOG_TARGET};
pub use readiness::{FixedDelayGate, Readiness, ReadinessGate, TcpProbeGate};
pub use supervisor::{ServiceHandle, ServiceState, ServiceSupervisor, SupervisorSettings};
