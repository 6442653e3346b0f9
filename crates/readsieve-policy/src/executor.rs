//! Action executor for verdict enforcement
//!
//! Issues planned actions to the data source in order and tallies what was
//! sent. Data-source errors are returned to the caller untouched; they belong
//! to whoever supervises the run.

use crate::action::{verdict_plan, Action};
use readsieve_core::{Channel, DataSource, ReadNumber, Result, Verdict};
use tracing::debug;

/// Tally of commands issued and verdicts applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Unblock commands sent
    pub unblocked: usize,

    /// Stop-receiving commands sent
    pub stopped: usize,

    /// Accept verdicts applied
    pub accepted: usize,

    /// Reject verdicts applied
    pub rejected: usize,

    /// NeedMoreSignal verdicts (no command sent)
    pub chunked: usize,
}

impl ActionOutcome {
    /// Create a new empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any command was sent
    pub fn has_commands(&self) -> bool {
        self.unblocked > 0 || self.stopped > 0
    }

    /// Merge another outcome into this one
    pub fn merge(&mut self, other: ActionOutcome) {
        self.unblocked += other.unblocked;
        self.stopped += other.stopped;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.chunked += other.chunked;
    }
}

/// Applies actions to a data source
pub struct ActionExecutor<'a> {
    source: &'a dyn DataSource,
    outcome: ActionOutcome,
}

impl<'a> ActionExecutor<'a> {
    /// Create an executor issuing commands to `source`
    pub fn new(source: &'a dyn DataSource) -> Self {
        Self {
            source,
            outcome: ActionOutcome::new(),
        }
    }

    /// Issue `actions` for one read, in order
    pub async fn execute(
        &mut self,
        channel: Channel,
        read_number: ReadNumber,
        actions: &[Action],
    ) -> Result<()> {
        for action in actions {
            match action {
                Action::Unblock => {
                    self.source.unblock_read(channel, read_number).await?;
                    self.outcome.unblocked += 1;
                }
                Action::StopReceiving => {
                    self.source.stop_receiving_read(channel, read_number).await?;
                    self.outcome.stopped += 1;
                }
            }
        }
        Ok(())
    }

    /// Apply a verdict for an experimental read
    pub async fn apply_verdict(
        &mut self,
        verdict: Verdict,
        channel: Channel,
        read_number: ReadNumber,
        id: &str,
    ) -> Result<()> {
        self.execute(channel, read_number, verdict_plan(verdict))
            .await?;

        match verdict {
            Verdict::Reject => {
                self.outcome.rejected += 1;
                debug!(id, channel, read = read_number, "Rejected");
            }
            Verdict::Accept => {
                self.outcome.accepted += 1;
                debug!(id, channel, read = read_number, "Accepted");
            }
            Verdict::NeedMoreSignal => {
                self.outcome.chunked += 1;
                debug!(id, channel, read = read_number, "Chunked");
            }
        }
        Ok(())
    }

    /// Tally so far
    pub fn outcome(&self) -> ActionOutcome {
        self.outcome
    }

    /// Finish and return the tally
    pub fn finish(self) -> ActionOutcome {
        self.outcome
    }
}
