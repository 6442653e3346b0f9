use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "readsieve")]
#[command(
    author,
    version,
    about = "Real-time selective sequencing against a simulated instrument"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "READSIEVE_CONFIG")]
    pub config: String,

    /// Chunks pulled per cycle
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Control-group divisor (channels with channel % n == 0 are held out)
    #[arg(long)]
    pub control_group: Option<u32>,

    /// Minimum time between cycle starts, in milliseconds
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Run length in seconds
    #[arg(short, long)]
    pub run_time: Option<u64>,

    /// Samples a read needs before it is classified
    #[arg(long)]
    pub min_chunk_size: Option<usize>,

    /// Reference sequence path
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Pore model path
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Threshold parameter table path
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Use the interactive reference size instead of the live one
    #[arg(long)]
    pub interactive: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long, env = "READSIEVE_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
