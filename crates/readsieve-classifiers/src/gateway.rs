//! Single-owner gateway around one classifier instance

use crate::classifier::{BatchFailure, SignalClassifier};
use crate::config::ClassifierSettings;
use crate::loader_plugin::ClassifierLoader;
use readsieve_core::{Result, Verdict};
use serde::Serialize;
use tracing::{info, warn};

/// Cumulative outcome counters for one classifier instance.
///
/// Only successful batches are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifierCounters {
    /// Queries that received a verdict
    pub total: u64,
    /// Accept verdicts
    pub positive: u64,
    /// NeedMoreSignal verdicts
    pub chunked: u64,
}

impl ClassifierCounters {
    /// Reject verdicts
    pub fn negative(&self) -> u64 {
        self.total - self.positive - self.chunked
    }

    fn record(&mut self, verdicts: &[Verdict]) {
        for verdict in verdicts {
            match verdict {
                Verdict::Accept => self.positive += 1,
                Verdict::NeedMoreSignal => self.chunked += 1,
                Verdict::Reject => {}
            }
        }
        self.total += verdicts.len() as u64;
    }
}

/// Owns exactly one classifier instance.
///
/// The gateway is neither `Clone` nor `Sync`, and every call takes `&mut self`,
/// so at most one batch can be in flight. Teardown consumes the gateway, so a
/// released classifier cannot be called again.
pub struct ClassifierGateway {
    classifier: Box<dyn SignalClassifier>,
    counters: ClassifierCounters,
}

impl ClassifierGateway {
    /// Build the classifier through `loader`.
    ///
    /// Any failure here is a construction failure and must stop the run
    /// before streaming starts.
    pub fn new(settings: &ClassifierSettings, loader: &dyn ClassifierLoader) -> Result<Self> {
        settings.validate()?;
        let classifier = loader.load(settings)?;
        info!(
            loader = loader.name(),
            classifier = classifier.name(),
            num_scouts = settings.num_scouts,
            num_packs = settings.num_packs,
            power = settings.power,
            query_size = settings.query_size,
            reference_size = settings.reference_size,
            "Classifier constructed"
        );
        Ok(Self::from_classifier(classifier))
    }

    /// Wrap an already-built classifier
    pub fn from_classifier(classifier: Box<dyn SignalClassifier>) -> Self {
        Self {
            classifier,
            counters: ClassifierCounters::default(),
        }
    }

    /// Classify a batch, preserving query order.
    ///
    /// An empty batch succeeds with no verdicts and leaves the engine
    /// untouched. On failure no counter moves.
    pub fn batch_classify(
        &mut self,
        queries: &[&[i32]],
    ) -> std::result::Result<Vec<Verdict>, BatchFailure> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let codes = self.classifier.batch_classify(queries)?;
        if codes.len() != queries.len() {
            return Err(BatchFailure::LengthMismatch {
                submitted: queries.len(),
                returned: codes.len(),
            });
        }

        let verdicts = codes
            .iter()
            .enumerate()
            .map(|(position, &code)| {
                Verdict::from_code(code).ok_or(BatchFailure::UnknownCode { position, code })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.counters.record(&verdicts);
        Ok(verdicts)
    }

    /// Classify a single query as a batch of one
    pub fn classify_one(&mut self, samples: &[i32]) -> std::result::Result<Verdict, BatchFailure> {
        let verdicts = self.batch_classify(&[samples])?;
        verdicts
            .into_iter()
            .next()
            .ok_or(BatchFailure::LengthMismatch {
                submitted: 1,
                returned: 0,
            })
    }

    /// Counters so far
    pub fn counters(&self) -> ClassifierCounters {
        self.counters
    }

    /// Name of the wrapped classifier
    pub fn name(&self) -> &str {
        self.classifier.name()
    }

    /// Release the classifier and report the final counters
    pub fn destroy(self) -> ClassifierCounters {
        let counters = self.counters;
        if counters.total == 0 {
            warn!(
                classifier = self.classifier.name(),
                "Classifier released without classifying anything"
            );
        }
        info!(
            classifier = self.classifier.name(),
            positive = counters.positive,
            negative = counters.negative(),
            chunked = counters.chunked,
            total = counters.total,
            "Classifier released"
        );
        drop(self.classifier);
        counters
    }
}
