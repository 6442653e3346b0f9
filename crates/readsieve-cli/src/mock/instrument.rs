//! Simulated sequencing instrument
//!
//! Every channel always has one active read. A streaming task appends samples
//! to each read on a fixed tick; once a read holds `min_chunk_size` samples
//! its freshest snapshot is offered to the decision loop, until the loop
//! either unblocks the read or stops receiving it. Reads also end on their
//! own after a random length.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use readsieve_core::{
    Channel, DataSource, Error, RawSignal, ReadChunk, ReadInfo, ReadNumber, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Mean signal level of on-target reads
pub const TARGET_LEVEL: i16 = 600;

/// Mean signal level of off-target reads
pub const BACKGROUND_LEVEL: i16 = 400;

const NOISE: i16 = 100;

/// Natural read length bounds, as multiples of `min_chunk_size`
const MIN_READ_CHUNKS: usize = 4;
const MAX_READ_CHUNKS: usize = 8;

/// Simulated instrument settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSettings {
    /// Number of channels, numbered from 1
    #[serde(default = "default_channels")]
    pub channels: u32,

    /// Seconds until the instrument stops streaming
    #[serde(default = "default_run_time")]
    pub run_time_secs: u64,

    /// Samples a read needs before it is offered for classification
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    /// Fraction of reads that come from the target
    #[serde(default = "default_target_fraction")]
    pub target_fraction: f64,

    /// Samples appended to every active read per tick
    #[serde(default = "default_samples_per_tick")]
    pub samples_per_tick: usize,

    /// Tick interval in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl InstrumentSettings {
    pub fn run_time(&self) -> Duration {
        Duration::from_secs(self.run_time_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Check scalar parameters
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(Error::config("instrument needs at least one channel"));
        }
        if self.min_chunk_size == 0 || self.samples_per_tick == 0 || self.tick_ms == 0 {
            return Err(Error::config(
                "min_chunk_size, samples_per_tick and tick_ms must be non-zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.target_fraction) {
            return Err(Error::config(format!(
                "target_fraction must be within [0, 1], got {}",
                self.target_fraction
            )));
        }
        Ok(())
    }
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            run_time_secs: default_run_time(),
            min_chunk_size: default_min_chunk_size(),
            target_fraction: default_target_fraction(),
            samples_per_tick: default_samples_per_tick(),
            tick_ms: default_tick_ms(),
            seed: None,
        }
    }
}

fn default_channels() -> u32 {
    512
}

fn default_run_time() -> u64 {
    900
}

fn default_min_chunk_size() -> usize {
    3500
}

fn default_target_fraction() -> f64 {
    0.1
}

fn default_samples_per_tick() -> usize {
    400
}

fn default_tick_ms() -> u64 {
    100
}

/// One channel's active read
#[derive(Debug)]
struct ChannelState {
    read_number: ReadNumber,
    samples: Vec<i16>,
    length: usize,
    target: bool,
    receiving: bool,
    pending: bool,
}

impl ChannelState {
    fn new(read_number: ReadNumber) -> Self {
        Self {
            read_number,
            samples: Vec::new(),
            length: 0,
            target: false,
            receiving: true,
            pending: false,
        }
    }

    /// Replace the active read with the next one
    fn next_read(&mut self, settings: &InstrumentSettings, rng: &mut StdRng) {
        self.read_number += 1;
        self.samples.clear();
        self.length = rng.gen_range(
            settings.min_chunk_size * MIN_READ_CHUNKS..=settings.min_chunk_size * MAX_READ_CHUNKS,
        );
        self.target = rng.gen_bool(settings.target_fraction);
        self.receiving = true;
        self.pending = false;
    }
}

struct Flowcell {
    channels: Vec<ChannelState>,
    rng: StdRng,
    cursor: usize,
    reads_started: u64,
}

/// In-process instrument implementing [`DataSource`]
pub struct SimulatedInstrument {
    settings: InstrumentSettings,
    flowcell: Mutex<Flowcell>,
    running: AtomicBool,
}

impl SimulatedInstrument {
    pub fn new(settings: InstrumentSettings) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let channels = (0..settings.channels)
            .map(|_| {
                let mut channel = ChannelState::new(0);
                channel.next_read(&settings, &mut rng);
                channel
            })
            .collect();

        Self {
            flowcell: Mutex::new(Flowcell {
                channels,
                rng,
                cursor: 0,
                reads_started: u64::from(settings.channels),
            }),
            settings,
            running: AtomicBool::new(true),
        }
    }

    /// Stop streaming; the decision loop sees `is_running() == false`
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Instrument stopping");
        }
    }

    /// Reads started so far, including the initial read on every channel
    pub fn reads_started(&self) -> u64 {
        self.flowcell.lock().reads_started
    }

    /// Stream samples until `run_time` elapses or [`stop`](Self::stop) is called
    pub async fn stream(self: Arc<Self>) -> Result<()> {
        let deadline = Instant::now() + self.settings.run_time();
        let mut interval = tokio::time::interval(self.settings.tick());
        info!(
            channels = self.settings.channels,
            run_time_secs = self.settings.run_time_secs,
            "Instrument streaming"
        );

        while self.is_running() {
            interval.tick().await;
            if Instant::now() >= deadline {
                break;
            }
            self.advance();
        }

        self.stop();
        info!(reads = self.reads_started(), "Instrument stopped");
        Ok(())
    }

    /// Append one tick of signal to every channel
    pub fn advance(&self) {
        let mut flowcell = self.flowcell.lock();
        let Flowcell {
            channels,
            rng,
            reads_started,
            ..
        } = &mut *flowcell;

        for channel in channels.iter_mut() {
            let level = if channel.target {
                TARGET_LEVEL
            } else {
                BACKGROUND_LEVEL
            };
            channel.samples.extend(
                (0..self.settings.samples_per_tick).map(|_| level + rng.gen_range(-NOISE..=NOISE)),
            );

            if channel.samples.len() >= channel.length {
                channel.next_read(&self.settings, rng);
                *reads_started += 1;
            } else if channel.receiving && channel.samples.len() >= self.settings.min_chunk_size {
                channel.pending = true;
            }
        }
    }

    fn channel_index(&self, channel: Channel) -> Option<usize> {
        let index = channel.checked_sub(1)? as usize;
        (index < self.settings.channels as usize).then_some(index)
    }
}

#[async_trait]
impl DataSource for SimulatedInstrument {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn queue_length(&self) -> usize {
        self.flowcell
            .lock()
            .channels
            .iter()
            .filter(|c| c.pending)
            .count()
    }

    async fn get_read_chunks(&self, batch_size: usize, _last: bool) -> Result<Vec<ReadChunk>> {
        let mut flowcell = self.flowcell.lock();
        let count = flowcell.channels.len();
        let start = flowcell.cursor;
        let mut chunks = Vec::new();

        for offset in 0..count {
            if chunks.len() == batch_size {
                break;
            }
            let index = (start + offset) % count;
            let channel = &mut flowcell.channels[index];
            if !channel.pending {
                continue;
            }
            channel.pending = false;

            let number = index as Channel + 1;
            let read_id = format!("sim-{:04}-{:06}", number, channel.read_number);
            chunks.push(ReadChunk::new(
                number,
                ReadInfo::new(read_id, channel.read_number),
                RawSignal::from_i16(&channel.samples),
            ));
            flowcell.cursor = (index + 1) % count;
        }

        Ok(chunks)
    }

    async fn unblock_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()> {
        let index = self
            .channel_index(channel)
            .ok_or_else(|| Error::data_source(format!("no such channel: {}", channel)))?;

        let mut flowcell = self.flowcell.lock();
        let Flowcell {
            channels,
            rng,
            reads_started,
            ..
        } = &mut *flowcell;
        let state = &mut channels[index];
        if state.read_number == read_number {
            state.next_read(&self.settings, rng);
            *reads_started += 1;
        } else {
            debug!(channel, read = read_number, "Unblock for a read that already ended");
        }
        Ok(())
    }

    async fn stop_receiving_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()> {
        let index = self
            .channel_index(channel)
            .ok_or_else(|| Error::data_source(format!("no such channel: {}", channel)))?;

        let mut flowcell = self.flowcell.lock();
        let state = &mut flowcell.channels[index];
        if state.read_number == read_number {
            state.receiving = false;
            state.pending = false;
        }
        Ok(())
    }
}
