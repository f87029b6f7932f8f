//! Poll cadence and ceiling.
//!
//! # Environment variables
//!
//! - `RAG_POLL_INTERVAL_MS` = delay between status polls (optional, `2000`)
//! - `RAG_POLL_CEILING_MS`  = wall-clock limit from the start of polling (optional, `300000`)

use std::time::Duration;

use rag_gateway::error_handler::{ConfigError, GatewayError, env_opt_u64};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_POLL_CEILING_MS: u64 = 300_000;

/// Timing of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            ceiling: Duration::from_millis(DEFAULT_POLL_CEILING_MS),
        }
    }
}

impl PollPolicy {
    /// Builds a validated policy.
    ///
    /// # Errors
    /// [`ConfigError::OutOfRange`] if `interval` is zero or exceeds `ceiling`.
    pub fn new(interval: Duration, ceiling: Duration) -> Result<Self, ConfigError> {
        let policy = Self { interval, ceiling };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "poll_interval_ms",
                detail: "must be greater than zero",
            });
        }
        if self.interval > self.ceiling {
            return Err(ConfigError::OutOfRange {
                field: "poll_interval_ms",
                detail: "must not exceed poll_ceiling_ms",
            });
        }
        Ok(())
    }

    /// Reads the policy from environment, falling back to defaults.
    pub fn from_env() -> Result<Self, GatewayError> {
        let interval =
            env_opt_u64("RAG_POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let ceiling = env_opt_u64("RAG_POLL_CEILING_MS")?.unwrap_or(DEFAULT_POLL_CEILING_MS);
        Ok(Self::new(
            Duration::from_millis(interval),
            Duration::from_millis(ceiling),
        )?)
    }
}
