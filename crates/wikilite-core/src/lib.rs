//! Wikilite Core - supervision and search client for an offline encyclopedia.
//!
//! This crate hosts a local full-text/semantic search engine over a single
//! content database and drives a search client against it:
//!
//! - [`DatabaseLocator`] finds the database and remembers where it was
//! - [`ServiceSupervisor`] spawns the engine, drains its output and classifies
//!   its startup
//! - [`ReadinessGate`] strategies decide when the client may load
//! - [`ClientController`] fans searches out over modes and navigates between
//!   results and articles
//!
//! # Example
//!
//! ```rust,no_run
//! use wikilite_core::{ClientOptions, WikiliteShell};
//!
//! #[tokio::main]
//! async fn main() -> wikilite_core::Result<()> {
//!     let shell = WikiliteShell::builder("/opt/wikilite/wikilite")
//!         .client_options(ClientOptions { ai: true })
//!         .build()?;
//!
//!     let mut session = shell.launch().await?;
//!     let view = session.client.submit("light").await;
//!     println!("{}", view.title());
//!
//!     session.engine.stop();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod locator;
pub mod models;
pub mod network;
pub mod platform;
pub mod prefs;
pub mod process;

mod shell;

// Re-export commonly used types
pub use client::{
    ArticleViewModel, BackOutcome, ClientController, ClientOptions, EventOutcome,
    NavigationState, SearchOrchestrator, SearchOutcome, UiEvent, View,
};
pub use error::{Result, WikiliteError};
pub use locator::{DatabaseLocator, DatabasePath, Resolution};
pub use models::{Article, Mode, ModeSelection, SearchRequest, SearchResult, Section};
pub use network::{EngineApi, HttpEngineApi};
pub use prefs::PreferenceStore;
pub use process::{
    EngineLaunchConfig, FixedDelayGate, Readiness, ReadinessGate, ServiceHandle, ServiceState,
    ServiceSupervisor, SupervisorSettings, TcpProbeGate,
};
pub use shell::{Session, ShellBuilder, WikiliteShell};
