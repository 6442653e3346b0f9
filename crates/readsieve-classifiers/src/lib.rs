//! readsieve Classifiers
//!
//! The loop-facing side of signal classification.
//!
//! The classification engine itself is an opaque capability
//! ([`SignalClassifier`]). This crate wraps it:
//! - [`ClassifierGateway`] owns one engine instance, decodes its verdict
//!   codes and keeps the run's outcome counters
//! - [`BatchMarshaller`] turns ordered queries into a batch and zips the
//!   verdicts back onto their channels
//! - [`ClassifierLoader`] builds engine instances from [`ClassifierSettings`]
//!
//! A [`SimulatedClassifier`] is bundled for simulation runs and tests.

pub mod classifier;
pub mod config;
pub mod gateway;
pub mod loader_plugin;
pub mod marshaller;
pub mod simulated;
pub mod threshold;

pub use classifier::{BatchFailure, BatchResponse, SignalClassifier};
pub use config::ClassifierSettings;
pub use gateway::{ClassifierCounters, ClassifierGateway};
pub use loader_plugin::ClassifierLoader;
pub use marshaller::{BatchMarshaller, ClassifiedRead, MarshalOutcome};
pub use simulated::{SimulatedClassifier, SimulatedLoader};
pub use threshold::{ThresholdEntry, ThresholdTable};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{BatchFailure, SignalClassifier};
    pub use crate::config::ClassifierSettings;
    pub use crate::gateway::{ClassifierCounters, ClassifierGateway};
    pub use crate::loader_plugin::ClassifierLoader;
    pub use crate::marshaller::{BatchMarshaller, ClassifiedRead, MarshalOutcome};
}
