//! readsieve Core
//!
//! Core types, traits, and utilities shared across readsieve components.
//!
//! This crate provides:
//! - The read/chunk/query/verdict data model
//! - Error types and result handling
//! - The data-source capability the decision loop drives
//! - Control-group partitioning of channels

pub mod control;
pub mod error;
pub mod signal;
pub mod source;
pub mod types;

pub use control::ControlGroup;
pub use error::{Error, Result};
pub use signal::{RawSignal, SampleDtype};
pub use source::DataSource;
pub use types::{Channel, Query, ReadChunk, ReadInfo, ReadNumber, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::control::ControlGroup;
    pub use crate::error::{Error, Result};
    pub use crate::signal::{RawSignal, SampleDtype};
    pub use crate::source::DataSource;
    pub use crate::types::{Channel, Query, ReadChunk, ReadInfo, ReadNumber, Verdict};
}
