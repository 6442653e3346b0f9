//! Simulated classifier for simulation runs and tests
//!
//! Not the production algorithm. It gates on query length like the real
//! engine, then compares the mean level of the query window against the
//! trained threshold.

use crate::classifier::{BatchResponse, SignalClassifier};
use crate::config::ClassifierSettings;
use crate::loader_plugin::ClassifierLoader;
use crate::threshold::ThresholdTable;
use readsieve_core::{Error, Result, Verdict};
use tracing::debug;

/// Mean-level classifier with a length gate
#[derive(Debug, Clone)]
pub struct SimulatedClassifier {
    threshold: f32,
    query_size: usize,
}

impl SimulatedClassifier {
    /// Create a classifier with an explicit threshold and window
    pub fn new(threshold: f32, query_size: usize) -> Self {
        Self {
            threshold,
            query_size,
        }
    }

    /// Score threshold in use
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn classify(&self, query: &[i32]) -> Verdict {
        if query.len() < self.query_size {
            return Verdict::NeedMoreSignal;
        }

        let window = &query[..self.query_size];
        let mean = window.iter().map(|&s| s as f64).sum::<f64>() / window.len() as f64;
        if mean as f32 >= self.threshold {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }
}

impl SignalClassifier for SimulatedClassifier {
    fn batch_classify(&mut self, queries: &[&[i32]]) -> BatchResponse {
        Ok(queries.iter().map(|q| self.classify(q).code()).collect())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Builds a [`SimulatedClassifier`] from the threshold table
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLoader;

impl ClassifierLoader for SimulatedLoader {
    fn load(&self, settings: &ClassifierSettings) -> Result<Box<dyn SignalClassifier>> {
        settings.check_inputs()?;

        let table = ThresholdTable::load(&settings.param_path)?;
        let entry = table
            .lookup(
                settings.reference_size,
                settings.power,
                settings.num_packs,
                settings.num_scouts,
            )
            .ok_or_else(|| {
                Error::classifier(format!(
                    "no threshold trained for reference_size={} power={} packs={} scouts={} in {}",
                    settings.reference_size,
                    settings.power,
                    settings.num_packs,
                    settings.num_scouts,
                    settings.param_path.display()
                ))
            })?;

        debug!(
            threshold = entry.threshold,
            specificity = entry.specificity,
            "Threshold resolved"
        );
        Ok(Box::new(SimulatedClassifier::new(
            entry.threshold,
            settings.query_size,
        )))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
