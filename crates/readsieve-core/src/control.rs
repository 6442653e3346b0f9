//! Control-group partitioning of channels

use crate::types::Channel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Deterministic split of channels into a held-out control group and the
/// experimental group.
///
/// A channel is in the control group when `channel % divisor == 0`. Control
/// channels are never classified and never unblocked; they only get told to
/// stop delivering, which leaves their reads to finish on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ControlGroup {
    divisor: u32,
}

impl ControlGroup {
    /// Create a partitioner. A zero divisor is rejected.
    pub fn new(divisor: u32) -> Result<Self> {
        if divisor == 0 {
            return Err(Error::config("control group divisor must be non-zero"));
        }
        Ok(Self { divisor })
    }

    /// The modulus used for the split
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Whether `channel` belongs to the control group
    pub fn is_control(&self, channel: Channel) -> bool {
        channel % self.divisor == 0
    }

    /// Whether `channel` is subject to classification
    pub fn is_experimental(&self, channel: Channel) -> bool {
        !self.is_control(channel)
    }
}

impl Default for ControlGroup {
    fn default() -> Self {
        Self { divisor: 2 }
    }
}

impl TryFrom<u32> for ControlGroup {
    type Error = Error;

    fn try_from(divisor: u32) -> Result<Self> {
        Self::new(divisor)
    }
}

impl From<ControlGroup> for u32 {
    fn from(group: ControlGroup) -> Self {
        group.divisor
    }
}
