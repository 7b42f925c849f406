pub mod mocks;

use std::sync::{Arc, Mutex};

use telemetry_log_uplink::{
    InMemoryStatusStore, LogCollector, LogStorage, MemoryLogStorage, NoopTransportRegistry,
    StorageStatus, UploadDecision, UploadProperties,
};

use mocks::{RecordingStorage, RecordingStorageStatus};

/// Policy that never triggers anything.
pub fn passive_policy() -> Box<dyn telemetry_log_uplink::UploadPolicy> {
    Box::new(|_: StorageStatus, _: &UploadProperties| UploadDecision::NoAction)
}

/// Collector over the in-memory backend with a policy that never triggers.
pub fn passive_collector(properties: UploadProperties) -> LogCollector {
    let mut collector = LogCollector::new(
        Arc::new(Mutex::new(InMemoryStatusStore::default())),
        Arc::new(NoopTransportRegistry),
    );
    let (storage, status) = MemoryLogStorage::new().shared();
    collector.init(storage, properties, Arc::new(status), passive_policy());
    collector
}

/// Collector over a recording mock backend; returns the shared backend so
/// tests can inspect the calls it received.
pub fn recording_collector(
    properties: UploadProperties,
) -> (LogCollector, Arc<Mutex<RecordingStorage>>) {
    let storage = Arc::new(Mutex::new(RecordingStorage::default()));
    let mut collector = LogCollector::new(
        Arc::new(Mutex::new(InMemoryStatusStore::default())),
        Arc::new(NoopTransportRegistry),
    );
    collector.init(
        Arc::clone(&storage) as Arc<Mutex<dyn LogStorage>>,
        properties,
        Arc::new(RecordingStorageStatus(Arc::clone(&storage))),
        passive_policy(),
    );
    (collector, storage)
}
