//! Centralized configuration for the wikilite shell.
//!
//! This module provides the fixed constants shared by the supervisor and the
//! client: file names, the engine's address, and the two startup delays.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "wikilite";
    pub const USER_AGENT: &'static str = "wikilite-shell/0.3";
    /// File name the content database must carry.
    pub const DB_FILENAME: &'static str = "wikilite.db";
}

/// The supervised engine and the address it serves on.
pub struct EngineConfig;

impl EngineConfig {
    #[cfg(not(windows))]
    pub const BINARY_NAME: &'static str = "wikilite";
    #[cfg(windows)]
    pub const BINARY_NAME: &'static str = "wikilite.exe";

    pub const HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    pub const PORT: u16 = 35248;

    /// Socket address the engine is told to bind.
    pub fn socket_addr() -> SocketAddr {
        SocketAddr::new(Self::HOST, Self::PORT)
    }

    /// Root URL the client loads once the readiness gate opens.
    pub fn base_url() -> String {
        format!("http://{}/", Self::socket_addr())
    }
}

/// Timing of the process supervisor and the readiness gate.
pub struct SupervisorConfig;

impl SupervisorConfig {
    /// Wait between spawn and the single liveness check.
    pub const GRACE_PERIOD: Duration = Duration::from_secs(2);
    /// Wait between requesting a start and loading the client.
    pub const READINESS_DELAY: Duration = Duration::from_secs(5);
    /// Engine output lines buffered between the reader and the log sink.
    pub const LOG_CHANNEL_CAPACITY: usize = 256;
    /// Polling interval of the TCP probe readiness strategy.
    pub const PROBE_INTERVAL: Duration = Duration::from_millis(500);
    /// Give-up time of the TCP probe readiness strategy.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Search client configuration.
pub struct SearchConfig;

impl SearchConfig {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const RESULTS_TITLE: &'static str = "Search Results";
}

/// Directory and file names used by the shell.
pub struct PathsConfig;

impl PathsConfig {
    /// Private working/home/temp directory handed to the engine.
    pub const WORK_DIR_NAME: &'static str = "cache";
    pub const LOGS_DIR_NAME: &'static str = "logs";
    pub const PREFS_FILENAME: &'static str = "app_prefs.json";
    /// Key of the persisted database path.
    pub const DB_PATH_KEY: &'static str = "db_path";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_loopback() {
        assert_eq!(EngineConfig::base_url(), "http://127.0.0.1:35248/");
        assert!(EngineConfig::socket_addr().ip().is_loopback());
    }

    #[test]
    fn test_delays_are_ordered() {
        assert!(SupervisorConfig::GRACE_PERIOD < SupervisorConfig::READINESS_DELAY);
        assert!(SupervisorConfig::LOG_CHANNEL_CAPACITY > 0);
    }
}
