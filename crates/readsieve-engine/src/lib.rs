//! readsieve Engine
//!
//! The real-time decision loop. Each cycle it:
//! 1. sheds the whole backlog if the queue is over its hard limit
//! 2. pulls the freshest chunk per channel, up to the batch size
//! 3. splits control and experimental channels, releasing raw signal
//! 4. classifies the experimental reads as one batch
//! 5. applies the verdicts to the data source
//! 6. waits out the rest of the minimum cycle interval
//!
//! The loop ends when the data source stops running, and then releases the
//! classifier.

pub mod config;
pub mod decision_loop;
pub mod shedder;
pub mod summary;
pub mod throttle;

pub use config::LoopConfig;
pub use decision_loop::{CycleReport, DecisionLoop};
pub use shedder::{OverloadShedder, ShedReport};
pub use summary::RunSummary;
pub use throttle::Throttle;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::LoopConfig;
    pub use crate::decision_loop::{CycleReport, DecisionLoop};
    pub use crate::summary::RunSummary;
}
