//! In-memory reference storage backend.
//!
//! Records are retained in a FIFO queue. Draining a record into a batch moves
//! it to a per-bucket in-flight set where it stays retained (and counted by
//! the status view) until the batch outcome arrives: success drops the
//! bucket's records, failure re-offers them at the front of the queue so the
//! next batch picks them up first.
//!
//! Cleanup evicts oldest pending records first; in-flight records are never
//! evicted, since their batch may still be acknowledged.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::record::LogRecord;
use crate::storage::{LogStorage, StorageStatusView};
use crate::wire::aligned_size;

#[derive(Debug, Default)]
pub struct MemoryLogStorage {
    pending: VecDeque<LogRecord>,
    in_flight: HashMap<u16, Vec<LogRecord>>,
    records_count: usize,
    total_size: usize,
}

impl MemoryLogStorage {
    pub fn new() -> Self {
        MemoryLogStorage::default()
    }

    /// Wraps the storage in a shared handle and returns a status view backed
    /// by the same instance.
    pub fn shared(self) -> (Arc<Mutex<MemoryLogStorage>>, MemoryStorageStatus) {
        let storage = Arc::new(Mutex::new(self));
        let status = MemoryStorageStatus {
            inner: Arc::clone(&storage),
        };
        (storage, status)
    }

    pub fn records_count(&self) -> usize {
        self.records_count
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }
}

impl LogStorage for MemoryLogStorage {
    fn add_log_record(&mut self, record: LogRecord) {
        self.records_count += 1;
        self.total_size += record.size();
        self.pending.push_back(record);
    }

    fn get_record(&mut self, bucket_id: u16, remaining: usize) -> Option<LogRecord> {
        let front = self.pending.front()?;
        if 4 + aligned_size(front.size()) > remaining {
            return None;
        }
        let record = self.pending.pop_front()?;
        self.in_flight
            .entry(bucket_id)
            .or_default()
            .push(record.clone());
        Some(record)
    }

    fn shrink_to_size(&mut self, target_bytes: usize) {
        while self.total_size > target_bytes {
            let Some(evicted) = self.pending.pop_front() else {
                // Only in-flight records remain; they are kept until their
                // batch outcome arrives.
                break;
            };
            warn!(
                "Log storage over limit, dropping oldest record ({} bytes)",
                evicted.size()
            );
            self.records_count -= 1;
            self.total_size -= evicted.size();
        }
    }

    fn upload_succeeded(&mut self, bucket_id: u16) {
        if let Some(records) = self.in_flight.remove(&bucket_id) {
            debug!(
                "Bucket {} delivered, releasing {} records",
                bucket_id,
                records.len()
            );
            for record in records {
                self.records_count -= 1;
                self.total_size -= record.size();
            }
        }
    }

    fn upload_failed(&mut self, bucket_id: u16) {
        if let Some(records) = self.in_flight.remove(&bucket_id) {
            debug!(
                "Bucket {} failed, re-offering {} records",
                bucket_id,
                records.len()
            );
            for record in records.into_iter().rev() {
                self.pending.push_front(record);
            }
        }
    }

    fn destroy(&mut self) {
        self.pending.clear();
        self.in_flight.clear();
        self.records_count = 0;
        self.total_size = 0;
    }
}

/// Read-only occupancy view over a shared [`MemoryLogStorage`].
#[derive(Debug, Clone)]
pub struct MemoryStorageStatus {
    inner: Arc<Mutex<MemoryLogStorage>>,
}

#[allow(clippy::expect_used)]
impl StorageStatusView for MemoryStorageStatus {
    fn records_count(&self) -> u16 {
        let storage = self.inner.lock().expect("lock poisoned");
        storage.records_count.min(u16::MAX as usize) as u16
    }

    fn total_size(&self) -> usize {
        let storage = self.inner.lock().expect("lock poisoned");
        storage.total_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(len: usize, fill: u8) -> LogRecord {
        LogRecord::new(vec![fill; len])
    }

    #[test]
    fn test_add_updates_status() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(10, 1));
        storage.add_log_record(record(20, 2));

        assert_eq!(storage.records_count(), 2);
        assert_eq!(storage.total_size(), 30);
    }

    #[test]
    fn test_get_record_is_fifo() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(4, 1));
        storage.add_log_record(record(4, 2));

        let first = storage.get_record(1, 1024).unwrap();
        let second = storage.get_record(1, 1024).unwrap();
        assert_eq!(first.data()[0], 1);
        assert_eq!(second.data()[0], 2);
        assert!(storage.get_record(1, 1024).is_none());
    }

    #[test]
    fn test_get_record_respects_budget() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(10, 1)); // needs 4 + 12 = 16
        assert!(storage.get_record(1, 15).is_none());
        assert!(storage.get_record(1, 16).is_some());
    }

    #[test]
    fn test_drained_records_stay_retained() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(10, 1));
        let _ = storage.get_record(7, 1024).unwrap();

        // Still counted until the bucket is acknowledged
        assert_eq!(storage.records_count(), 1);
        assert_eq!(storage.total_size(), 10);
    }

    #[test]
    fn test_upload_succeeded_releases_bucket() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(10, 1));
        storage.add_log_record(record(10, 2));
        let _ = storage.get_record(7, 1024).unwrap();
        let _ = storage.get_record(7, 1024).unwrap();

        storage.upload_succeeded(7);
        assert_eq!(storage.records_count(), 0);
        assert_eq!(storage.total_size(), 0);
    }

    #[test]
    fn test_upload_failed_reoffers_in_order() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(4, 1));
        storage.add_log_record(record(4, 2));
        storage.add_log_record(record(4, 3));
        let _ = storage.get_record(7, 16).unwrap(); // record 1 only

        storage.upload_failed(7);

        let next = storage.get_record(8, 1024).unwrap();
        assert_eq!(next.data()[0], 1);
    }

    #[test]
    fn test_ack_for_unknown_bucket_is_ignored() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(4, 1));
        storage.upload_succeeded(99);
        storage.upload_failed(99);
        assert_eq!(storage.records_count(), 1);
    }

    #[test]
    fn test_shrink_evicts_oldest_first() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(40, 1));
        storage.add_log_record(record(40, 2));
        storage.add_log_record(record(40, 3));

        storage.shrink_to_size(80);

        assert_eq!(storage.records_count(), 2);
        assert_eq!(storage.total_size(), 80);
        let next = storage.get_record(1, 1024).unwrap();
        assert_eq!(next.data()[0], 2);
    }

    #[test]
    fn test_shrink_keeps_in_flight_records() {
        let mut storage = MemoryLogStorage::new();
        storage.add_log_record(record(40, 1));
        let _ = storage.get_record(7, 1024).unwrap();

        storage.shrink_to_size(0);

        // In-flight record survives until its bucket resolves
        assert_eq!(storage.total_size(), 40);
        storage.upload_succeeded(7);
        assert_eq!(storage.total_size(), 0);
    }

    #[test]
    fn test_shared_status_view() {
        let (storage, status) = MemoryLogStorage::new().shared();
        {
            #[allow(clippy::unwrap_used)]
            let mut guard = storage.lock().unwrap();
            guard.add_log_record(record(10, 1));
        }
        assert_eq!(status.records_count(), 1);
        assert_eq!(status.total_size(), 10);
    }
}
