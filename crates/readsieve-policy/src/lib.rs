//! readsieve Policy
//!
//! What the loop tells the data source once a read has a verdict.
//!
//! | verdict          | actions                       |
//! |------------------|-------------------------------|
//! | Reject           | unblock, then stop receiving  |
//! | Accept           | stop receiving                |
//! | NeedMoreSignal   | none (asked again next cycle) |
//!
//! Control-group reads only ever get stop-receiving.

pub mod action;
pub mod executor;

pub use action::{control_plan, shed_plan, verdict_plan, Action};
pub use executor::{ActionExecutor, ActionOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{control_plan, shed_plan, verdict_plan, Action};
    pub use crate::executor::{ActionExecutor, ActionOutcome};
}
