// ABOUTME: Polling keep-alive tracker: decides when the next enquire_link is due
// ABOUTME: and how many consecutive failures mark the connection as dead

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Keep-alive policy for long-running sessions.
///
/// The SMSC expects periodic enquire_link PDUs during idle periods;
/// sessions that stay silent too long get dropped by many operators.
#[derive(Debug, Clone)]
pub struct KeepAliveConfig {
    /// Time between enquire_link PDUs.
    pub interval: Duration,
    /// Consecutive failures after which the connection counts as dead.
    pub max_failures: u32,
    /// When false, [`KeepAliveManager::should_ping`] never fires.
    pub enabled: bool,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_failures: 3,
            enabled: true,
        }
    }
}

impl KeepAliveConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Snapshot of keep-alive health.
#[derive(Debug, Clone, Default)]
pub struct KeepAliveStatus {
    pub running: bool,
    pub consecutive_failures: u32,
    pub total_pings: u32,
    pub total_pongs: u32,
}

/// Tracks enquire_link timing and outcomes.
///
/// This is a passive tracker, not a background task: the application polls
/// [`should_ping`](Self::should_ping) from its own loop (or calls
/// `Client::maintain_keep_alive`), which keeps all wire access on the one
/// task that owns the session.
#[derive(Debug)]
pub struct KeepAliveManager {
    config: KeepAliveConfig,
    last_ping: Option<Instant>,
    consecutive_failures: u32,
    total_pings: u32,
    total_pongs: u32,
}

impl KeepAliveManager {
    pub fn new(config: KeepAliveConfig) -> Self {
        Self {
            config,
            last_ping: None,
            consecutive_failures: 0,
            total_pings: 0,
            total_pongs: 0,
        }
    }

    /// True when an enquire_link is due: enabled, under the failure
    /// ceiling, and the interval has elapsed since the last ping.
    pub fn should_ping(&self) -> bool {
        if !self.config.enabled || self.is_connection_failed() {
            return false;
        }
        match self.last_ping {
            None => true,
            Some(last) => last.elapsed() >= self.config.interval,
        }
    }

    pub fn on_ping_sent(&mut self) {
        self.last_ping = Some(Instant::now());
        self.total_pings += 1;
    }

    pub fn on_ping_success(&mut self) {
        self.consecutive_failures = 0;
        self.total_pongs += 1;
        debug!(total = self.total_pongs, "enquire_link acknowledged");
    }

    pub fn on_ping_failure(&mut self) {
        self.consecutive_failures += 1;
        warn!(
            consecutive = self.consecutive_failures,
            "enquire_link failed"
        );
    }

    /// The failure ceiling has been reached; the caller should close and
    /// re-establish the connection.
    pub fn is_connection_failed(&self) -> bool {
        self.consecutive_failures >= self.config.max_failures
    }

    pub fn status(&self) -> KeepAliveStatus {
        KeepAliveStatus {
            running: self.config.enabled,
            consecutive_failures: self.consecutive_failures,
            total_pings: self.total_pings,
            total_pongs: self.total_pongs,
        }
    }
}
