//! Extension point for building classifier instances.

use crate::classifier::SignalClassifier;
use crate::config::ClassifierSettings;
use readsieve_core::Result;

/// Pluggable backend that turns reference/model/parameter inputs into a
/// classifier instance.
///
/// Implement this trait in external crates to plug in the production
/// classification engine without coupling this crate to it. Any error
/// returned here is fatal: the decision loop must not start.
pub trait ClassifierLoader: Send + Sync {
    /// Build one classifier instance
    fn load(&self, settings: &ClassifierSettings) -> Result<Box<dyn SignalClassifier>>;

    /// Loader name, for logs
    fn name(&self) -> &str;
}
