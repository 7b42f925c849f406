//! Mock implementations of the pluggable contracts for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use telemetry_log_uplink::wire::aligned_size;
use telemetry_log_uplink::{
    LogRecord, LogStorage, Result, ServiceKind, StatusStore, StorageStatusView, SyncHandler,
    TransportRegistry, UplinkError,
};

/// Storage backend that records every call made against it.
#[derive(Debug, Default)]
pub struct RecordingStorage {
    pub pending: VecDeque<LogRecord>,
    pub succeeded: Vec<u16>,
    pub failed: Vec<u16>,
    pub shrink_targets: Vec<usize>,
    pub destroyed: bool,
}

impl LogStorage for RecordingStorage {
    fn add_log_record(&mut self, record: LogRecord) {
        self.pending.push_back(record);
    }

    fn get_record(&mut self, _bucket_id: u16, remaining: usize) -> Option<LogRecord> {
        let front = self.pending.front()?;
        if 4 + aligned_size(front.size()) > remaining {
            return None;
        }
        self.pending.pop_front()
    }

    fn shrink_to_size(&mut self, target_bytes: usize) {
        self.shrink_targets.push(target_bytes);
    }

    fn upload_succeeded(&mut self, bucket_id: u16) {
        self.succeeded.push(bucket_id);
    }

    fn upload_failed(&mut self, bucket_id: u16) {
        self.failed.push(bucket_id);
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Status view over a shared [`RecordingStorage`].
pub struct RecordingStorageStatus(pub Arc<Mutex<RecordingStorage>>);

impl StorageStatusView for RecordingStorageStatus {
    fn records_count(&self) -> u16 {
        self.0.lock().unwrap().pending.len() as u16
    }

    fn total_size(&self) -> usize {
        self.0
            .lock()
            .unwrap()
            .pending
            .iter()
            .map(LogRecord::size)
            .sum()
    }
}

/// Sync handler that captures every sync request.
#[derive(Default)]
pub struct RecordingSyncHandler {
    pub calls: Mutex<Vec<Vec<ServiceKind>>>,
}

impl SyncHandler for RecordingSyncHandler {
    fn request_sync(&self, services: &[ServiceKind]) {
        self.calls.lock().unwrap().push(services.to_vec());
    }
}

/// Registry exposing a single handler for the logging service.
pub struct LoggingOnlyRegistry {
    pub handler: Arc<RecordingSyncHandler>,
}

impl TransportRegistry for LoggingOnlyRegistry {
    fn sync_handler(&self, service: ServiceKind) -> Option<Arc<dyn SyncHandler>> {
        (service == ServiceKind::Logging).then(|| Arc::clone(&self.handler) as Arc<dyn SyncHandler>)
    }
}

/// Status store whose durable backend is unavailable.
pub struct FailingStatusStore;

impl StatusStore for FailingStatusStore {
    fn log_bucket_id(&self) -> Result<u16> {
        Err(UplinkError::BadState("status storage unavailable".into()))
    }

    fn set_log_bucket_id(&mut self, _bucket_id: u16) -> Result<()> {
        Err(UplinkError::BadState("status storage unavailable".into()))
    }
}
