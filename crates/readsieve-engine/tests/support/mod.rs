//! Scripted data source and classifier shared by the loop tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use readsieve_classifiers::{BatchResponse, ClassifierGateway, SignalClassifier};
use readsieve_core::{
    Channel, ControlGroup, DataSource, Error, RawSignal, ReadChunk, ReadInfo, ReadNumber, Result,
};
use readsieve_engine::LoopConfig;
use std::collections::VecDeque;
use std::sync::Arc;

/// Everything the loop asked of the data source, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Pull { batch_size: usize, last: bool },
    Unblock(Channel, ReadNumber),
    Stop(Channel, ReadNumber),
}

impl Event {
    pub fn is_command(&self) -> bool {
        !matches!(self, Event::Pull { .. })
    }
}

/// What the source looks like for one cycle
pub struct Step {
    pub queue_length: usize,
    pub backlog: Option<Vec<ReadChunk>>,
    pub batch: Vec<ReadChunk>,
}

impl Step {
    pub fn batch(batch: Vec<ReadChunk>) -> Self {
        Self {
            queue_length: batch.len(),
            backlog: None,
            batch,
        }
    }

    pub fn overloaded(backlog: Vec<ReadChunk>, batch: Vec<ReadChunk>) -> Self {
        Self {
            queue_length: backlog.len(),
            backlog: Some(backlog),
            batch,
        }
    }
}

/// Plays back one `Step` per cycle and stops running when the script ends
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    events: Mutex<Vec<Event>>,
    fail_pull: bool,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    /// A source whose every pull fails
    pub fn failing(steps: Vec<Step>) -> Self {
        Self {
            fail_pull: true,
            ..Self::new(steps)
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn commands(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_command).collect()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn is_running(&self) -> bool {
        !self.steps.lock().is_empty()
    }

    fn queue_length(&self) -> usize {
        self.steps.lock().front().map_or(0, |step| step.queue_length)
    }

    async fn get_read_chunks(&self, batch_size: usize, last: bool) -> Result<Vec<ReadChunk>> {
        self.events.lock().push(Event::Pull { batch_size, last });
        if self.fail_pull {
            return Err(Error::data_source("instrument disconnected"));
        }

        let mut steps = self.steps.lock();
        if let Some(backlog) = steps.front_mut().and_then(|step| step.backlog.take()) {
            return Ok(backlog);
        }
        Ok(steps.pop_front().map(|step| step.batch).unwrap_or_default())
    }

    async fn unblock_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()> {
        self.events.lock().push(Event::Unblock(channel, read_number));
        Ok(())
    }

    async fn stop_receiving_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()> {
        self.events.lock().push(Event::Stop(channel, read_number));
        Ok(())
    }
}

/// Replays canned responses and records which channels it was asked about.
///
/// Every sample of a scripted chunk is its channel number, so the first
/// sample of each query identifies where it came from. Once the script runs
/// out, every query is rejected.
pub struct ScriptedClassifier {
    responses: VecDeque<BatchResponse>,
    seen: Arc<Mutex<Vec<Vec<i32>>>>,
}

impl ScriptedClassifier {
    pub fn new(responses: Vec<BatchResponse>) -> (Self, Arc<Mutex<Vec<Vec<i32>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let classifier = Self {
            responses: responses.into(),
            seen: Arc::clone(&seen),
        };
        (classifier, seen)
    }

    pub fn into_gateway(self) -> ClassifierGateway {
        ClassifierGateway::from_classifier(Box::new(self))
    }
}

impl SignalClassifier for ScriptedClassifier {
    fn batch_classify(&mut self, queries: &[&[i32]]) -> BatchResponse {
        self.seen
            .lock()
            .push(queries.iter().map(|q| q[0]).collect());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Ok(vec![0; queries.len()]))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A chunk whose samples all equal its channel number
pub fn chunk(channel: Channel, read_number: ReadNumber) -> ReadChunk {
    ReadChunk::new(
        channel,
        ReadInfo::new(format!("read-{}-{}", channel, read_number), read_number),
        RawSignal::from_i16(&[channel as i16; 8]),
    )
}

/// Loop config with no startup delay and no throttling
pub fn fast_config(control_divisor: u32) -> LoopConfig {
    LoopConfig {
        control_group: ControlGroup::new(control_divisor).unwrap(),
        throttle_ms: 0,
        analysis_delay_secs: 0,
        ..Default::default()
    }
}
