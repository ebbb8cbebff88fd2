//! Gateway tuning knobs.
//!
//! # Invariants
//! - `max_retries` is a ceiling on total attempts, never unbounded.
//! - `max_rows` caps every caller-facing read, including "show all"
//!   listings, and is at least one.

use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_ROWS: usize = 200;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime configuration for [`crate::ValidatedQueryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Total attempts for a statement that keeps failing with BUSY/LOCKED.
    pub max_retries: u32,
    /// Upper bound on rows materialized by a single read.
    pub max_rows: usize,
    /// SQLite busy handler timeout applied to each connection.
    pub busy_timeout: Duration,
    /// Pause between attempts. Zero means immediate re-attempt.
    pub retry_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_rows: DEFAULT_MAX_ROWS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            retry_delay: Duration::ZERO,
        }
    }
}

impl GatewayConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the listing row cap; zero is raised to one.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}
