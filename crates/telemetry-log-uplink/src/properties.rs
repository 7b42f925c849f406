//! Static upload configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Immutable limits governing local buffering and batch building.
///
/// # Caller Contract
///
/// `max_log_block_size <= max_log_storage_volume` is expected but not
/// enforced by this core: a block larger than the retained volume is never
/// useful, but nothing here breaks if the caller violates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProperties {
    /// Maximum total volume of buffered log records in bytes.
    ///
    /// The cleanup decision shrinks the backend down to this size.
    pub max_log_storage_volume: usize,

    /// Maximum size of a single upload batch body in bytes, including
    /// per-record size fields and alignment padding.
    pub max_log_block_size: usize,
}

impl Default for UploadProperties {
    fn default() -> Self {
        UploadProperties {
            max_log_storage_volume: constants::DEFAULT_MAX_LOG_STORAGE_VOLUME,
            max_log_block_size: constants::DEFAULT_MAX_LOG_BLOCK_SIZE,
        }
    }
}
