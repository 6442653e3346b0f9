//! Core types for readsieve

use crate::signal::RawSignal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one physical sequencing channel, stable for the whole run
pub type Channel = u32;

/// Per-channel read counter, monotonic over the life of a channel
pub type ReadNumber = u32;

/// Identity of one read occupying a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadInfo {
    /// Opaque read identity assigned by the instrument
    pub id: String,

    /// Read number on its channel
    pub number: ReadNumber,
}

impl ReadInfo {
    /// Create a new read identity
    pub fn new(id: impl Into<String>, number: ReadNumber) -> Self {
        Self {
            id: id.into(),
            number,
        }
    }
}

/// Snapshot of a read's raw signal as of the current polling cycle.
///
/// Chunks for the same (channel, read) across cycles are independent
/// snapshots, not deltas.
#[derive(Debug, Clone)]
pub struct ReadChunk {
    /// Channel the read occupies
    pub channel: Channel,

    /// Read identity
    pub read: ReadInfo,

    /// Buffered raw signal; `None` once cleared
    signal: Option<RawSignal>,
}

impl ReadChunk {
    /// Create a chunk carrying raw signal
    pub fn new(channel: Channel, read: ReadInfo, signal: RawSignal) -> Self {
        Self {
            channel,
            read,
            signal: Some(signal),
        }
    }

    /// Buffered raw signal, if it has not been cleared yet
    pub fn signal(&self) -> Option<&RawSignal> {
        self.signal.as_ref()
    }

    /// Drop the buffered raw signal. Clearing twice is a no-op.
    pub fn clear_signal(&mut self) {
        self.signal = None;
    }

    /// Whether the raw signal has been released
    pub fn is_cleared(&self) -> bool {
        self.signal.is_none()
    }

    /// Decode the buffered signal and release the raw bytes in one step
    pub fn take_samples(&mut self) -> Option<crate::Result<Vec<i32>>> {
        self.signal.take().map(|signal| signal.decode())
    }
}

/// The unit submitted for classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Read identity string
    pub id: String,

    /// Originating channel
    pub channel: Channel,

    /// Originating read number
    pub read_number: ReadNumber,

    /// Signal samples, widened to i32
    pub samples: Vec<i32>,
}

impl Query {
    /// Create a new query
    pub fn new(
        id: impl Into<String>,
        channel: Channel,
        read_number: ReadNumber,
        samples: Vec<i32>,
    ) -> Self {
        Self {
            id: id.into(),
            channel,
            read_number,
            samples,
        }
    }
}

/// Per-query classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Off-target: abort the read
    Reject,
    /// On-target: keep sequencing, stop asking about it
    Accept,
    /// Not enough signal yet: ask again on a later cycle
    NeedMoreSignal,
}

impl Verdict {
    /// Decode a capability verdict code (0 = reject, 1 = accept, 2 = chunked)
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Reject),
            1 => Some(Self::Accept),
            2 => Some(Self::NeedMoreSignal),
            _ => None,
        }
    }

    /// Capability verdict code for this verdict
    pub fn code(self) -> i32 {
        match self {
            Self::Reject => 0,
            Self::Accept => 1,
            Self::NeedMoreSignal => 2,
        }
    }

    /// Whether this verdict settles the read for the current cycle
    pub fn is_final(self) -> bool {
        !matches!(self, Self::NeedMoreSignal)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reject => "rejected",
            Self::Accept => "accepted",
            Self::NeedMoreSignal => "chunked",
        };
        f.write_str(label)
    }
}
