//! Protocol constants and default limits for the log uplink.

/// Extension type tag identifying the logging service in an outgoing
/// device-to-server message.
pub const LOGGING_EXTENSION_TYPE: u8 = 0x07;

/// Extension option flag requesting delivery acknowledgments from the server.
///
/// Set in the low byte of the 3-byte options field (bit 0).
pub const RECEIVE_UPDATES_FLAG: u32 = 0x01;

/// Size of the generic extension header: 1-byte type, 3-byte options and a
/// 4-byte big-endian body length.
pub const EXTENSION_HEADER_SIZE: usize = 8;

/// Record payloads are padded on the wire to this alignment.
pub const RECORD_ALIGNMENT: usize = 4;

/// Worst-case padding appended to a single record payload.
pub const MAX_PADDING_LENGTH: usize = RECORD_ALIGNMENT - 1;

/// Default cap on the total volume of buffered log records.
///
/// The value is 1 MB. When the cleanup decision fires, the backend is asked
/// to shrink down to this many bytes.
pub const DEFAULT_MAX_LOG_STORAGE_VOLUME: usize = 1024 * 1024;

/// Default cap on the size of a single upload batch body.
///
/// The value is 32 KB. A batch never carries more record bytes (including
/// per-record size fields and padding) than this.
pub const DEFAULT_MAX_LOG_BLOCK_SIZE: usize = 32 * 1024;

/// Default buffered-volume threshold at which the default policy requests an
/// upload.
pub const DEFAULT_UPLOAD_VOLUME_THRESHOLD: usize = 8 * 1024;

/// Default buffered-record-count threshold at which the default policy
/// requests an upload.
pub const DEFAULT_UPLOAD_COUNT_THRESHOLD: u16 = 64;
