//! Data-source capability driven by the decision loop
//!
//! The decision loop never touches instrument I/O directly. It only sees this
//! surface, which the streaming side must make safe to call concurrently with
//! its own ingestion.

use crate::types::{Channel, ReadChunk, ReadNumber};
use crate::Result;
use async_trait::async_trait;

/// Live stream of per-channel read chunks plus per-read controls
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Whether the source is still streaming. The loop stops once this is false.
    fn is_running(&self) -> bool;

    /// Number of chunks waiting to be pulled
    fn queue_length(&self) -> usize;

    /// Pull up to `batch_size` chunks.
    ///
    /// With `last` set, only the freshest chunk per channel is returned, not
    /// its history.
    async fn get_read_chunks(&self, batch_size: usize, last: bool) -> Result<Vec<ReadChunk>>;

    /// Abort the read (eject the molecule from the pore)
    async fn unblock_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()>;

    /// Stop delivering chunks for the read. Must be a no-op for a read that
    /// has already stopped.
    async fn stop_receiving_read(&self, channel: Channel, read_number: ReadNumber) -> Result<()>;
}
