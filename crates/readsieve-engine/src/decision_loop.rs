//! The per-cycle read-until decision loop

use crate::config::LoopConfig;
use crate::shedder::{OverloadShedder, ShedReport};
use crate::summary::RunSummary;
use crate::throttle::Throttle;
use readsieve_classifiers::{BatchMarshaller, ClassifierGateway, MarshalOutcome};
use readsieve_core::{ControlGroup, DataSource, Error, Query, ReadChunk, Result};
use readsieve_policy::{control_plan, ActionExecutor, ActionOutcome};
use readsieve_telemetry::MetricsCollector;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What one cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Shedding pass run before the pull, if any
    pub shed: Option<ShedReport>,

    /// Chunks returned by the normal pull
    pub pulled: usize,

    /// Control-group chunks among them
    pub control: usize,

    /// Experimental reads submitted for classification
    pub submitted: usize,

    /// Chunks skipped because their signal could not be decoded
    pub undecodable: usize,

    /// Whether the batch produced verdicts
    pub classified: bool,

    /// Commands issued and verdicts applied after the pull
    pub actions: ActionOutcome,

    /// Time from pull to last decision
    pub elapsed: Duration,

    /// Time spent waiting for the next cycle
    pub slept: Duration,
}

/// Drives one data source against one classifier until the source stops.
///
/// The loop is the only owner of the classifier. Classification runs on the
/// blocking pool; the marshaller moves there for the call and comes back with
/// the outcome, so there is never more than one batch in flight.
pub struct DecisionLoop {
    source: Arc<dyn DataSource>,
    marshaller: Option<BatchMarshaller>,
    shedder: OverloadShedder,
    throttle: Throttle,
    config: LoopConfig,
    metrics: MetricsCollector,
}

impl DecisionLoop {
    /// Create a loop over `source` that classifies through `gateway`
    pub fn new(
        source: Arc<dyn DataSource>,
        gateway: ClassifierGateway,
        config: LoopConfig,
        metrics: MetricsCollector,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            marshaller: Some(BatchMarshaller::new(gateway)),
            shedder: OverloadShedder::new(config.overload_threshold, config.control_group),
            throttle: Throttle::new(config.throttle()),
            config,
            metrics,
        })
    }

    /// Loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run cycles until the data source stops, then release the classifier.
    ///
    /// The classifier is released on the error path too; the error is
    /// returned after teardown.
    pub async fn run(mut self) -> Result<RunSummary> {
        tokio::time::sleep(self.config.analysis_delay()).await;
        info!(
            batch_size = self.config.batch_size,
            control_group = self.config.control_group.divisor(),
            overload_threshold = self.config.overload_threshold,
            throttle_ms = self.config.throttle_ms,
            "Starting analysis of reads"
        );

        let result = self.run_cycles().await;

        let counters = self
            .marshaller
            .take()
            .map(|marshaller| marshaller.into_gateway().destroy());
        result?;
        let counters = counters.ok_or_else(|| Error::internal("classifier lost before teardown"))?;

        info!("Finished analysis of reads");
        let summary = RunSummary::new(counters, self.metrics.snapshot());
        summary.log();
        Ok(summary)
    }

    async fn run_cycles(&mut self) -> Result<()> {
        while self.source.is_running() {
            self.cycle().await?;
        }
        Ok(())
    }

    /// Run a single cycle: shed, pull, partition, classify, act, throttle
    pub async fn cycle(&mut self) -> Result<CycleReport> {
        let source = Arc::clone(&self.source);

        let queue_length = source.queue_length();
        self.metrics.record_queue_length(queue_length);
        let shed = self
            .shedder
            .shed(source.as_ref(), queue_length, &self.metrics)
            .await?;

        let start = Instant::now();
        let chunks = source
            .get_read_chunks(self.config.batch_size, true)
            .await?;
        let pulled = chunks.len();

        let mut executor = ActionExecutor::new(source.as_ref());
        let (queries, control, undecodable) = partition(
            self.config.control_group,
            &self.metrics,
            &mut executor,
            chunks,
        )
        .await?;
        let submitted = queries.len();
        self.metrics.record_control_reads(control);
        self.metrics.record_queries(submitted);

        let classified = match self.classify(queries).await? {
            MarshalOutcome::Classified(reads) => {
                for read in &reads {
                    executor
                        .apply_verdict(read.verdict, read.channel, read.read_number, &read.id)
                        .await?;
                }
                true
            }
            MarshalOutcome::Unavailable(failure) => {
                warn!(
                    %failure,
                    queries = submitted,
                    "Classification failed; reads stay open for the next cycle"
                );
                self.metrics.record_failed_batch();
                false
            }
        };

        let actions = executor.finish();
        self.metrics
            .record_verdicts(actions.accepted, actions.rejected, actions.chunked);
        self.metrics
            .record_commands(actions.unblocked, actions.stopped);

        let elapsed = start.elapsed();
        self.metrics.record_cycle(elapsed);
        debug!(
            reads = pulled,
            queries = submitted,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Processed {} reads in {:?}",
            pulled,
            elapsed
        );

        let slept = self.throttle.wait(start).await;

        Ok(CycleReport {
            shed,
            pulled,
            control,
            submitted,
            undecodable,
            classified,
            actions,
            elapsed,
            slept,
        })
    }

    async fn classify(&mut self, queries: Vec<Query>) -> Result<MarshalOutcome> {
        let mut marshaller = self
            .marshaller
            .take()
            .ok_or_else(|| Error::internal("classifier already released"))?;

        if queries.is_empty() {
            let outcome = marshaller.classify(&queries);
            self.marshaller = Some(marshaller);
            return Ok(outcome);
        }

        let (marshaller, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = marshaller.classify(&queries);
            (marshaller, outcome)
        })
        .await
        .map_err(|e| Error::internal(format!("classification task failed: {}", e)))?;

        self.marshaller = Some(marshaller);
        Ok(outcome)
    }
}

/// Stop control-group reads and turn experimental chunks into queries.
///
/// Every chunk's raw signal is released here. Returns the queries in pull
/// order with the control and undecodable counts.
async fn partition(
    control_group: ControlGroup,
    metrics: &MetricsCollector,
    executor: &mut ActionExecutor<'_>,
    chunks: Vec<ReadChunk>,
) -> Result<(Vec<Query>, usize, usize)> {
    let mut queries = Vec::with_capacity(chunks.len());
    let mut control = 0;
    let mut undecodable = 0;

    for mut chunk in chunks {
        let channel = chunk.channel;
        let read_number = chunk.read.number;

        if control_group.is_control(channel) {
            chunk.clear_signal();
            executor.execute(channel, read_number, control_plan()).await?;
            control += 1;
            continue;
        }

        match chunk.take_samples() {
            Some(Ok(samples)) => {
                queries.push(Query::new(chunk.read.id, channel, read_number, samples));
            }
            Some(Err(e)) => {
                warn!(
                    channel,
                    read = read_number,
                    error = %e,
                    "Skipping chunk with undecodable signal"
                );
                metrics.record_undecodable_chunk();
                undecodable += 1;
            }
            None => {
                debug!(channel, read = read_number, "Chunk arrived without signal");
            }
        }
    }

    Ok((queries, control, undecodable))
}
