//! Metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    ::metrics::describe_counter!("readsieve_cycles_total", "Decision cycles completed");
    ::metrics::describe_counter!(
        "readsieve_shed_passes_total",
        "Overload shedding passes triggered by queue depth"
    );
    ::metrics::describe_counter!(
        "readsieve_shed_reads_total",
        "Reads force-closed by overload shedding"
    );
    ::metrics::describe_counter!(
        "readsieve_control_reads_total",
        "Control-group reads left to finish passively"
    );
    ::metrics::describe_counter!(
        "readsieve_queries_total",
        "Experimental reads submitted for classification"
    );
    ::metrics::describe_counter!(
        "readsieve_verdicts_total",
        "Verdicts applied, by verdict"
    );
    ::metrics::describe_counter!("readsieve_unblocks_total", "Unblock commands sent");
    ::metrics::describe_counter!(
        "readsieve_stop_receiving_total",
        "Stop-receiving commands sent"
    );
    ::metrics::describe_counter!(
        "readsieve_failed_batches_total",
        "Batches that produced no verdicts"
    );
    ::metrics::describe_counter!(
        "readsieve_undecodable_chunks_total",
        "Chunks skipped because their raw signal could not be decoded"
    );
    ::metrics::describe_gauge!(
        "readsieve_queue_length",
        "Pending chunks seen at the start of the last cycle"
    );
    ::metrics::describe_histogram!(
        "readsieve_cycle_latency_us",
        ::metrics::Unit::Microseconds,
        "Time from batch pull to last decision, per cycle"
    );
    debug!("Metric descriptions registered");
}

/// Metrics collector for the decision loop
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    cycles: AtomicU64,
    shed_passes: AtomicU64,
    shed_reads: AtomicU64,
    control_reads: AtomicU64,
    queries: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    chunked: AtomicU64,
    unblocks: AtomicU64,
    stops: AtomicU64,
    failed_batches: AtomicU64,
    undecodable_chunks: AtomicU64,
    total_cycle_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished cycle and its latency
    pub fn record_cycle(&self, latency: Duration) {
        let latency_us = latency.as_micros() as u64;
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_cycle_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        ::metrics::counter!("readsieve_cycles_total").increment(1);
        ::metrics::histogram!("readsieve_cycle_latency_us").record(latency_us as f64);
    }

    /// Record the queue depth seen at the start of a cycle
    pub fn record_queue_length(&self, depth: usize) {
        ::metrics::gauge!("readsieve_queue_length").set(depth as f64);
    }

    /// Record an overload shedding pass that closed `reads` reads
    pub fn record_shed(&self, reads: usize) {
        self.inner.shed_passes.fetch_add(1, Ordering::Relaxed);
        self.inner
            .shed_reads
            .fetch_add(reads as u64, Ordering::Relaxed);
        ::metrics::counter!("readsieve_shed_passes_total").increment(1);
        ::metrics::counter!("readsieve_shed_reads_total").increment(reads as u64);
    }

    /// Record control-group reads seen in a cycle
    pub fn record_control_reads(&self, count: usize) {
        self.inner
            .control_reads
            .fetch_add(count as u64, Ordering::Relaxed);
        ::metrics::counter!("readsieve_control_reads_total").increment(count as u64);
    }

    /// Record reads submitted for classification
    pub fn record_queries(&self, count: usize) {
        self.inner.queries.fetch_add(count as u64, Ordering::Relaxed);
        ::metrics::counter!("readsieve_queries_total").increment(count as u64);
    }

    /// Record applied verdicts
    pub fn record_verdicts(&self, accepted: usize, rejected: usize, chunked: usize) {
        for (counter, label, count) in [
            (&self.inner.accepted, "accepted", accepted),
            (&self.inner.rejected, "rejected", rejected),
            (&self.inner.chunked, "chunked", chunked),
        ] {
            counter.fetch_add(count as u64, Ordering::Relaxed);
            ::metrics::counter!("readsieve_verdicts_total", "verdict" => label)
                .increment(count as u64);
        }
    }

    /// Record data-source commands sent
    pub fn record_commands(&self, unblocks: usize, stops: usize) {
        self.inner
            .unblocks
            .fetch_add(unblocks as u64, Ordering::Relaxed);
        self.inner.stops.fetch_add(stops as u64, Ordering::Relaxed);
        ::metrics::counter!("readsieve_unblocks_total").increment(unblocks as u64);
        ::metrics::counter!("readsieve_stop_receiving_total").increment(stops as u64);
    }

    /// Record a batch that produced no verdicts
    pub fn record_failed_batch(&self) {
        self.inner.failed_batches.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("readsieve_failed_batches_total").increment(1);
    }

    /// Record a chunk skipped because its signal could not be decoded
    pub fn record_undecodable_chunk(&self) {
        self.inner
            .undecodable_chunks
            .fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("readsieve_undecodable_chunks_total").increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            cycles: load(&self.inner.cycles),
            shed_passes: load(&self.inner.shed_passes),
            shed_reads: load(&self.inner.shed_reads),
            control_reads: load(&self.inner.control_reads),
            queries: load(&self.inner.queries),
            accepted: load(&self.inner.accepted),
            rejected: load(&self.inner.rejected),
            chunked: load(&self.inner.chunked),
            unblocks: load(&self.inner.unblocks),
            stops: load(&self.inner.stops),
            failed_batches: load(&self.inner.failed_batches),
            undecodable_chunks: load(&self.inner.undecodable_chunks),
            total_cycle_latency_us: load(&self.inner.total_cycle_latency_us),
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub shed_passes: u64,
    pub shed_reads: u64,
    pub control_reads: u64,
    pub queries: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub chunked: u64,
    pub unblocks: u64,
    pub stops: u64,
    pub failed_batches: u64,
    pub undecodable_chunks: u64,
    pub total_cycle_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average cycle latency
    pub fn avg_cycle_latency_us(&self) -> u64 {
        if self.cycles == 0 {
            0
        } else {
            self.total_cycle_latency_us / self.cycles
        }
    }

    /// Fraction of decided experimental reads that were rejected
    pub fn reject_rate(&self) -> f64 {
        let decided = self.accepted + self.rejected;
        if decided == 0 {
            0.0
        } else {
            self.rejected as f64 / decided as f64
        }
    }
}
