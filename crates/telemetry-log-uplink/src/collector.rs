//! Log collection orchestration.
//!
//! The [`LogCollector`] ties the pluggable pieces together: it serializes
//! incoming entries into the storage backend, evaluates the upload decision
//! policy after every state change, drains the backend into size-bounded wire
//! batches tagged with a durable bucket id, and reconciles server
//! acknowledgments back into the backend.
//!
//! ```text
//!   application ──add_record──> LogCollector ──> LogStorage
//!                                    │
//!                                    ├── UploadPolicy ──> shrink / sync trigger
//!                                    │
//!   transport ──build_request──> wire batch (bucket id, records)
//!   transport ──handle_response──> upload_succeeded / upload_failed
//! ```
//!
//! All operations run synchronously on the caller's thread; the collector
//! takes no locks beyond the shared handles it was given and leaves
//! concurrent-access discipline to the caller or the backend.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, trace, warn};

use crate::constants::{
    EXTENSION_HEADER_SIZE, LOGGING_EXTENSION_TYPE, MAX_PADDING_LENGTH, RECEIVE_UPDATES_FLAG,
};
use crate::error::{Result, UplinkError};
use crate::policy::{UploadDecision, UploadPolicy};
use crate::properties::UploadProperties;
use crate::record::{LogEntry, LogRecord};
use crate::status::StatusStore;
use crate::storage::{LogStorage, StorageStatusView};
use crate::transport::{ServiceKind, TransportRegistry};
use crate::wire::{self, FrameReader, FrameWriter, UploadResult};

const LOGGING_SYNC_SERVICES: [ServiceKind; 1] = [ServiceKind::Logging];

/// Orchestrator of the log collection and upload pipeline.
///
/// Created once at client startup with the durable status store and the
/// transport registry, then bound to a storage backend, upload properties,
/// status view and decision policy via [`init`](LogCollector::init).
/// Operations invoked before `init` fail with
/// [`NotReady`](UplinkError::NotReady) or
/// [`NotInitialized`](UplinkError::NotInitialized).
pub struct LogCollector {
    log_bucket_id: u16,
    storage: Option<Arc<Mutex<dyn LogStorage>>>,
    properties: Option<UploadProperties>,
    status_view: Option<Arc<dyn StorageStatusView>>,
    policy: Option<Box<dyn UploadPolicy>>,
    status_store: Arc<Mutex<dyn StatusStore>>,
    transport: Arc<dyn TransportRegistry>,
}

#[allow(clippy::expect_used)]
impl LogCollector {
    pub fn new(
        status_store: Arc<Mutex<dyn StatusStore>>,
        transport: Arc<dyn TransportRegistry>,
    ) -> Self {
        LogCollector {
            log_bucket_id: 0,
            storage: None,
            properties: None,
            status_view: None,
            policy: None,
            status_store,
            transport,
        }
    }

    /// Binds the pluggable components.
    ///
    /// A previously bound backend is destroyed first, so `init` can be used
    /// to swap storage implementations at runtime.
    pub fn init(
        &mut self,
        storage: Arc<Mutex<dyn LogStorage>>,
        properties: UploadProperties,
        status_view: Arc<dyn StorageStatusView>,
        policy: Box<dyn UploadPolicy>,
    ) {
        if let Some(previous) = self.storage.take() {
            previous.lock().expect("lock poisoned").destroy();
        }
        self.storage = Some(storage);
        self.properties = Some(properties);
        self.status_view = Some(status_view);
        self.policy = Some(policy);
        info!(
            "Initialized log collector: max storage volume {}, max block size {}",
            properties.max_log_storage_volume, properties.max_log_block_size
        );
    }

    /// Serializes `entry` into the storage backend.
    ///
    /// On success the decision policy is evaluated once; this is the single
    /// ingestion-side point where an upload or cleanup can be triggered.
    pub fn add_record(&mut self, entry: &dyn LogEntry) -> Result<()> {
        debug!("Adding new log record");
        let storage = self
            .storage
            .as_ref()
            .ok_or(UplinkError::NotReady("storage backend is not bound"))?;
        if self.properties.is_none() || self.status_view.is_none() || self.policy.is_none() {
            return Err(UplinkError::NotReady(
                "upload properties, status view and policy are not bound",
            ));
        }

        let size = entry.size();
        trace!("Record size is {size}");
        if size == 0 {
            return Err(UplinkError::InvalidArgument(
                "log entry has zero serialized size".to_string(),
            ));
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| UplinkError::OutOfMemory(size))?;
        entry.serialize(&mut buf);

        {
            let mut storage = storage.lock().expect("lock poisoned");
            trace!("Adding serialized record to log storage");
            storage.add_log_record(LogRecord::new(buf));
        }
        self.evaluate_policy();
        Ok(())
    }

    /// Worst-case upper bound on the next request's size, used by the
    /// transport layer to pre-size an outgoing frame.
    pub fn estimate_request_size(&self) -> Result<usize> {
        let status_view = self
            .status_view
            .as_ref()
            .ok_or(UplinkError::NotInitialized("storage status view is not bound"))?;
        let properties = self
            .properties
            .as_ref()
            .ok_or(UplinkError::NotInitialized("upload properties are not bound"))?;

        let records_count = status_view.records_count() as usize;
        let total_size = status_view.total_size();
        let worst_case = records_count * 4 + records_count * MAX_PADDING_LENGTH + total_size;
        Ok(EXTENSION_HEADER_SIZE + 4 + worst_case.min(properties.max_log_block_size))
    }

    /// Builds one logging extension carrying as many pending records as fit
    /// within `max_log_block_size`.
    ///
    /// An empty extension (record count 0) is emitted when no records are
    /// eligible; that is not an error. If the writer runs out of capacity the
    /// whole batch is aborted: the backend is notified via `upload_failed`
    /// and [`WriteFailed`](UplinkError::WriteFailed) is returned.
    pub fn build_request(&mut self, writer: &mut FrameWriter) -> Result<()> {
        let storage = self
            .storage
            .clone()
            .ok_or(UplinkError::NotReady("storage backend is not bound"))?;
        let properties = self
            .properties
            .ok_or(UplinkError::NotReady("upload properties are not bound"))?;

        trace!("Going to compile log request");
        let length_at =
            wire::write_extension_header(writer, LOGGING_EXTENSION_TYPE, RECEIVE_UPDATES_FLAG)?;

        {
            let mut store = self.status_store.lock().expect("lock poisoned");
            if self.log_bucket_id == 0 {
                self.log_bucket_id = store.log_bucket_id().map_err(|err| {
                    UplinkError::BadState(format!("failed to read log bucket id: {err}"))
                })?;
            }
            self.log_bucket_id = self.log_bucket_id.wrapping_add(1);
            store.set_log_bucket_id(self.log_bucket_id).map_err(|err| {
                UplinkError::BadState(format!("failed to persist log bucket id: {err}"))
            })?;
        }

        writer.put_u16(self.log_bucket_id)?;
        let count_at = writer.reserve_u16()?;

        let mut remaining = properties.max_log_block_size;
        trace!("Extracting log records... (block size is {remaining})");

        let mut records_count: u16 = 0;
        let mut storage = storage.lock().expect("lock poisoned");
        while let Some(record) = storage.get_record(self.log_bucket_id, remaining) {
            trace!("Got record, size: {}", record.size());
            records_count += 1;
            remaining = remaining.saturating_sub(4 + wire::aligned_size(record.size()));

            let written = writer
                .put_u32(record.size() as u32)
                .and_then(|()| writer.put_aligned(record.data()));
            if let Err(err) = written {
                storage.upload_failed(self.log_bucket_id);
                return Err(err);
            }
        }
        drop(storage);

        // Counts the length field itself, the bucket id, the record count
        // and all record bytes including padding.
        let body_length = writer.position() - length_at;
        writer.patch_u32(length_at, body_length as u32);
        writer.patch_u16(count_at, records_count);

        trace!(
            "Extracted log records. Records count = {records_count}, extension body length = {body_length}"
        );
        Ok(())
    }

    /// Maps one server acknowledgment back onto the storage backend, then
    /// re-evaluates the decision policy.
    pub fn handle_response(
        &mut self,
        reader: &mut FrameReader<'_>,
        _extension_options: u32,
        _extension_length: usize,
    ) -> Result<()> {
        let storage = self
            .storage
            .clone()
            .ok_or(UplinkError::NotInitialized("storage backend is not bound"))?;

        info!("Received log sync response");
        let (bucket_id, result) = wire::read_upload_ack(reader)?;
        debug!(
            "Log block with id {bucket_id}: {}",
            match result {
                UploadResult::Success => "uploaded successfully",
                UploadResult::Failure => "upload failed",
            }
        );

        {
            let mut storage = storage.lock().expect("lock poisoned");
            match result {
                UploadResult::Success => storage.upload_succeeded(bucket_id),
                UploadResult::Failure => storage.upload_failed(bucket_id),
            }
        }
        self.evaluate_policy();
        Ok(())
    }

    fn evaluate_policy(&self) {
        let (Some(storage), Some(properties), Some(status_view), Some(policy)) = (
            self.storage.as_ref(),
            self.properties.as_ref(),
            self.status_view.as_ref(),
            self.policy.as_ref(),
        ) else {
            return;
        };

        let status = status_view.snapshot();
        match policy.decide(status, properties) {
            UploadDecision::Cleanup => {
                warn!(
                    "Need to cleanup log storage. Current size: {}, maximal volume: {}",
                    status.total_size, properties.max_log_storage_volume
                );
                storage
                    .lock()
                    .expect("lock poisoned")
                    .shrink_to_size(properties.max_log_storage_volume);
            }
            UploadDecision::Upload => {
                info!("Initiating log upload...");
                if let Some(handler) = self.transport.sync_handler(ServiceKind::Logging) {
                    handler.request_sync(&LOGGING_SYNC_SERVICES);
                }
            }
            UploadDecision::NoAction => {
                trace!("Upload shall not be triggered now");
            }
        }
    }
}

impl Drop for LogCollector {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            if let Ok(mut storage) = storage.lock() {
                storage.destroy();
            }
        }
    }
}
