//! Readiness gating of the client.
//!
//! The client must not load the engine's root page before the engine serves
//! it. The default gate is a plain fixed delay that knows nothing about the
//! engine; it is a heuristic, and a slow engine will still be loaded too
//! early. Gates are strategies behind [`ReadinessGate`] so the delay can be
//! replaced by an active probe without touching callers.

use crate::config::SupervisorConfig;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// What a gate knows when it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The gate opened without looking at the engine.
    Assumed,
    /// The engine accepted a connection.
    Confirmed,
    /// The gate gave up waiting; the client is loaded anyway.
    TimedOut,
}

/// Strategy deciding when the client may load the engine's root page.
#[async_trait]
pub trait ReadinessGate: Send + Sync {
    /// Short name for logs and the command line.
    fn name(&self) -> &'static str;

    /// Resolve once the client should load `addr`.
    async fn until_ready(&self, addr: SocketAddr) -> Readiness;
}

/// Opens after a fixed delay.
#[derive(Debug, Clone)]
pub struct FixedDelayGate {
    delay: Duration,
}

impl FixedDelayGate {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelayGate {
    fn default() -> Self {
        Self::new(SupervisorConfig::READINESS_DELAY)
    }
}

#[async_trait]
impl ReadinessGate for FixedDelayGate {
    fn name(&self) -> &'static str {
        "delay"
    }

    async fn until_ready(&self, addr: SocketAddr) -> Readiness {
        debug!("Waiting {:?} before loading {}", self.delay, addr);
        sleep(self.delay).await;
        Readiness::Assumed
    }
}

/// Opens once a TCP connection to the engine succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbeGate {
    interval: Duration,
    timeout: Duration,
}

impl TcpProbeGate {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    async fn probe(addr: SocketAddr, limit: Duration) -> bool {
        matches!(timeout(limit, TcpStream::connect(addr)).await, Ok(Ok(_)))
    }
}

impl Default for TcpProbeGate {
    fn default() -> Self {
        Self::new(SupervisorConfig::PROBE_INTERVAL, SupervisorConfig::PROBE_TIMEOUT)
    }
}

#[async_trait]
impl ReadinessGate for TcpProbeGate {
    fn name(&self) -> &'static str {
        "probe"
    }

    async fn until_ready(&self, addr: SocketAddr) -> Readiness {
        let deadline = Instant::now() + self.timeout;
        info!("Waiting for engine at {} to accept connections...", addr);

        loop {
            if Self::probe(addr, Duration::from_secs(1)).await {
                info!("Engine is accepting connections");
                return Readiness::Confirmed;
            }
            if Instant::now() + self.interval >= deadline {
                warn!("Engine did not become ready within {:?}", self.timeout);
                return Readiness::TimedOut;
            }
            sleep(self.interval).await;
        }
    }
}
