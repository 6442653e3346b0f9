//! Overload shedding
//!
//! When the data source reports more pending chunks than the loop could ever
//! catch up on, every pending read is force-closed before the normal pull.
//! Reads on experimental channels are unblocked and stopped; control-group
//! reads are only stopped.

use readsieve_core::{ControlGroup, DataSource, Result};
use readsieve_policy::{shed_plan, ActionExecutor, ActionOutcome};
use readsieve_telemetry::MetricsCollector;
use tracing::warn;

/// What one shedding pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShedReport {
    /// Queue depth that triggered the pass
    pub queue_length: usize,

    /// Chunks drained
    pub drained: usize,

    /// Commands issued while draining
    pub actions: ActionOutcome,
}

/// Drains the whole backlog once queue depth exceeds a hard limit
#[derive(Debug, Clone, Copy)]
pub struct OverloadShedder {
    threshold: usize,
    control: ControlGroup,
}

impl OverloadShedder {
    /// Create a shedder that triggers on `queue_length > threshold`
    pub fn new(threshold: usize, control: ControlGroup) -> Self {
        Self { threshold, control }
    }

    /// Trigger threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Check whether this queue depth calls for shedding
    pub fn is_overloaded(&self, queue_length: usize) -> bool {
        queue_length > self.threshold
    }

    /// Shed the backlog if `queue_length` is over the limit.
    ///
    /// Returns `None` when no shedding was needed.
    pub async fn shed(
        &self,
        source: &dyn DataSource,
        queue_length: usize,
        metrics: &MetricsCollector,
    ) -> Result<Option<ShedReport>> {
        if !self.is_overloaded(queue_length) {
            return Ok(None);
        }

        let mut chunks = source.get_read_chunks(queue_length, true).await?;
        let mut executor = ActionExecutor::new(source);
        for chunk in &mut chunks {
            chunk.clear_signal();
            let plan = shed_plan(self.control.is_control(chunk.channel));
            executor
                .execute(chunk.channel, chunk.read.number, plan)
                .await?;
        }

        let actions = executor.finish();
        metrics.record_shed(chunks.len());
        metrics.record_commands(actions.unblocked, actions.stopped);
        warn!(
            queue_length,
            threshold = self.threshold,
            drained = chunks.len(),
            unblocked = actions.unblocked,
            "Read queue overloaded; shed backlog"
        );

        Ok(Some(ShedReport {
            queue_length,
            drained: chunks.len(),
            actions,
        }))
    }
}
