//! Pluggable storage contract for buffered log records.
//!
//! The collector never owns record data itself. A [`LogStorage`]
//! implementation holds every accepted record, remembers which records were
//! drained into which bucket, and applies its own retention policy when asked
//! to shrink. A [`StorageStatusView`] exposes the backend's occupancy to the
//! upload decision policy without granting mutation access.

use crate::record::LogRecord;

/// Point-in-time occupancy of a storage backend.
///
/// Invariant: `total_size` is the sum of the sizes of all currently retained
/// records and `records_count` is their number. Records drained into an
/// in-flight bucket remain retained until they are acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageStatus {
    pub records_count: u16,
    pub total_size: usize,
}

/// Read-only view of a backend's occupancy.
pub trait StorageStatusView: Send + Sync {
    /// Number of currently retained records.
    fn records_count(&self) -> u16;

    /// Total size in bytes of currently retained records.
    fn total_size(&self) -> usize;

    fn snapshot(&self) -> StorageStatus {
        StorageStatus {
            records_count: self.records_count(),
            total_size: self.total_size(),
        }
    }
}

/// Storage backend owning the actual log records.
///
/// Implementations decide retention order, eviction policy and whether
/// per-bucket outcomes are tracked at all. The two acknowledgment callbacks
/// default to no-ops: a backend that does not track outcomes simply leaves
/// them unimplemented.
///
/// # Thread Safety
///
/// The collector issues all calls from a single thread and adds no locking of
/// its own beyond the shared handle it was given. A backend accessed
/// concurrently from ingestion and transport paths must be internally
/// thread-safe.
pub trait LogStorage: Send {
    /// Accepts ownership of one serialized record.
    fn add_log_record(&mut self, record: LogRecord);

    /// Returns the next record to place into the batch identified by
    /// `bucket_id`, or `None` when no eligible record fits.
    ///
    /// `remaining` is the batch budget still available in bytes. A returned
    /// record will occupy `4 + aligned_size(record.size())` of it, so the
    /// backend must only offer records for which that footprint fits.
    /// Returned records move to the in-flight set for `bucket_id` and stay
    /// retained until [`upload_succeeded`](LogStorage::upload_succeeded) or
    /// [`upload_failed`](LogStorage::upload_failed) resolves them.
    fn get_record(&mut self, bucket_id: u16, remaining: usize) -> Option<LogRecord>;

    /// Shrinks retained storage down to at most `target_bytes`.
    ///
    /// Eviction order is backend-defined.
    fn shrink_to_size(&mut self, target_bytes: usize);

    /// The batch `bucket_id` was delivered; its records may be released.
    fn upload_succeeded(&mut self, _bucket_id: u16) {}

    /// The batch `bucket_id` failed; its records may be re-offered later.
    fn upload_failed(&mut self, _bucket_id: u16) {}

    /// Releases backend resources. Invoked when the collector drops the
    /// backend or is re-initialized with a new one.
    fn destroy(&mut self) {}
}
