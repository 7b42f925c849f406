//! Upload decision policy.
//!
//! After every record insertion and every handled server response the
//! collector asks the policy what to do next. The policy is a pure function
//! of the current storage occupancy and the static upload properties; it
//! holds no state of its own and triggers no side effects.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::properties::UploadProperties;
use crate::storage::StorageStatus;

/// Outcome of a single policy evaluation.
///
/// The collector performs at most one action per evaluation, exactly as
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadDecision {
    /// Nothing to do.
    NoAction,
    /// Request a synchronization pass from the transport layer.
    Upload,
    /// Shrink retained storage down to the configured maximum volume.
    Cleanup,
}

/// Pluggable decision function.
pub trait UploadPolicy: Send {
    fn decide(&self, status: StorageStatus, properties: &UploadProperties) -> UploadDecision;
}

/// Plain closures work as policies.
impl<F> UploadPolicy for F
where
    F: Fn(StorageStatus, &UploadProperties) -> UploadDecision + Send,
{
    fn decide(&self, status: StorageStatus, properties: &UploadProperties) -> UploadDecision {
        self(status, properties)
    }
}

/// Threshold-based default policy.
///
/// Returns [`Cleanup`](UploadDecision::Cleanup) when the buffered volume
/// exceeds `max_log_storage_volume`, [`Upload`](UploadDecision::Upload) when
/// either the buffered volume or the record count crosses its threshold, and
/// [`NoAction`](UploadDecision::NoAction) otherwise.
///
/// Thresholds must be positive; with the defaults an empty storage always
/// yields `NoAction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultUploadPolicy {
    /// Buffered volume in bytes at which an upload is requested.
    pub upload_volume_threshold: usize,
    /// Buffered record count at which an upload is requested.
    pub upload_count_threshold: u16,
}

impl Default for DefaultUploadPolicy {
    fn default() -> Self {
        DefaultUploadPolicy {
            upload_volume_threshold: constants::DEFAULT_UPLOAD_VOLUME_THRESHOLD,
            upload_count_threshold: constants::DEFAULT_UPLOAD_COUNT_THRESHOLD,
        }
    }
}

impl UploadPolicy for DefaultUploadPolicy {
    fn decide(&self, status: StorageStatus, properties: &UploadProperties) -> UploadDecision {
        if status.total_size > properties.max_log_storage_volume {
            UploadDecision::Cleanup
        } else if status.total_size >= self.upload_volume_threshold
            || status.records_count >= self.upload_count_threshold
        {
            UploadDecision::Upload
        } else {
            UploadDecision::NoAction
        }
    }
}
