//! Runtime configuration of the chat subsystem.

use std::time::Duration;

use thiserror::Error;

/// Deadline for one token validation call
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(2);
/// Messages older than this are eligible for deletion
pub const DEFAULT_RETENTION_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);
/// Period between two retention sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

const DAY: u64 = 24 * 60 * 60;

/// Upper bound of the token validation deadline
pub const MAX_AUTH_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound of the retention window (about ten years)
pub const MAX_RETENTION_WINDOW: Duration = Duration::from_secs(3650 * DAY);
/// Upper bound of the sweep period
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * DAY);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("{name} must not exceed {max:?}")]
    TooLong {
        name: &'static str,
        max: Duration,
    },
}

/// Timing parameters of the chat subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatConfig {
    pub auth_timeout: Duration,
    pub retention_window: Duration,
    pub sweep_interval: Duration,
}

impl ChatConfig {
    pub fn new(
        auth_timeout: Duration,
        retention_window: Duration,
        sweep_interval: Duration,
    ) -> Result<Self, ConfigError> {
        for (name, value, max) in [
            ("auth timeout", auth_timeout, MAX_AUTH_TIMEOUT),
            ("retention window", retention_window, MAX_RETENTION_WINDOW),
            ("sweep interval", sweep_interval, MAX_SWEEP_INTERVAL),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
            if value > max {
                return Err(ConfigError::TooLong { name, max });
            }
        }

        Ok(Self {
            auth_timeout,
            retention_window,
            sweep_interval,
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            retention_window: DEFAULT_RETENTION_WINDOW,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
