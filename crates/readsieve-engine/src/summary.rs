//! End-of-run summary

use readsieve_classifiers::ClassifierCounters;
use readsieve_telemetry::MetricsSnapshot;
use serde::Serialize;
use tracing::info;

/// Classifier counters and loop metrics at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub classifier: ClassifierCounters,
    pub loop_metrics: MetricsSnapshot,
}

impl RunSummary {
    pub fn new(classifier: ClassifierCounters, loop_metrics: MetricsSnapshot) -> Self {
        Self {
            classifier,
            loop_metrics,
        }
    }

    /// Emit the summary as one log record
    pub fn log(&self) {
        info!(
            positive = self.classifier.positive,
            negative = self.classifier.negative(),
            chunked = self.classifier.chunked,
            total = self.classifier.total,
            cycles = self.loop_metrics.cycles,
            shed_passes = self.loop_metrics.shed_passes,
            shed_reads = self.loop_metrics.shed_reads,
            control_reads = self.loop_metrics.control_reads,
            failed_batches = self.loop_metrics.failed_batches,
            avg_cycle_latency_us = self.loop_metrics.avg_cycle_latency_us(),
            "Run finished"
        );
    }

    /// Summary as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let summary = RunSummary::new(ClassifierCounters::default(), MetricsSnapshot::default());
        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(value["classifier"]["total"], 0);
        assert_eq!(value["loop_metrics"]["cycles"], 0);
    }
}
