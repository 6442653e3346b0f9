//! Decision loop configuration

use readsieve_core::{ControlGroup, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue depth above which the whole backlog is shed
pub const DEFAULT_OVERLOAD_THRESHOLD: usize = 300;

/// Decision loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Chunks pulled per cycle
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Control-group divisor: channels with `channel % n == 0` are held out
    #[serde(default)]
    pub control_group: ControlGroup,

    /// Hard queue-depth limit that triggers overload shedding
    #[serde(default = "default_overload_threshold")]
    pub overload_threshold: usize,

    /// Minimum interval between cycle starts, in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Wait before the first cycle, in seconds
    #[serde(default = "default_analysis_delay")]
    pub analysis_delay_secs: u64,
}

impl LoopConfig {
    /// Minimum interval between cycle starts
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Wait before the first cycle
    pub fn analysis_delay(&self) -> Duration {
        Duration::from_secs(self.analysis_delay_secs)
    }

    /// Check scalar parameters
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be non-zero"));
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            control_group: ControlGroup::default(),
            overload_threshold: default_overload_threshold(),
            throttle_ms: default_throttle_ms(),
            analysis_delay_secs: default_analysis_delay(),
        }
    }
}

fn default_batch_size() -> usize {
    30
}

fn default_overload_threshold() -> usize {
    DEFAULT_OVERLOAD_THRESHOLD
}

fn default_throttle_ms() -> u64 {
    500
}

fn default_analysis_delay() -> u64 {
    1
}
