//! Durable storage port for the batch counter.

use crate::error::Result;

/// Persistence port for the 16-bit log bucket counter.
///
/// Bucket ids tag outgoing batches and must stay unique across process
/// restarts (modulo 16-bit wraparound), so the collector seeds its counter
/// from this store and writes every increment back. Implementations typically
/// delegate to the device state store.
pub trait StatusStore: Send {
    /// Last persisted bucket id, or `0` if none was ever written.
    fn log_bucket_id(&self) -> Result<u16>;

    /// Persists `bucket_id` as the last used value.
    fn set_log_bucket_id(&mut self, bucket_id: u16) -> Result<()>;
}

/// Non-durable store keeping the counter in memory.
///
/// Suitable for tests and for embedders that accept bucket id reuse after a
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    bucket_id: u16,
}

impl InMemoryStatusStore {
    pub fn new(bucket_id: u16) -> Self {
        InMemoryStatusStore { bucket_id }
    }
}

impl StatusStore for InMemoryStatusStore {
    fn log_bucket_id(&self) -> Result<u16> {
        Ok(self.bucket_id)
    }

    fn set_log_bucket_id(&mut self, bucket_id: u16) -> Result<()> {
        self.bucket_id = bucket_id;
        Ok(())
    }
}
