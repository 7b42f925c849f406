//! Log record types shared between the collector and storage backends.

use bytes::Bytes;

/// One serialized application log entry.
///
/// A record is an opaque byte sequence. It is owned by the storage backend
/// from the moment [`add_record`] accepts it until it is either acknowledged
/// by the server or evicted during cleanup.
///
/// [`add_record`]: crate::collector::LogCollector::add_record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    data: Bytes,
}

impl LogRecord {
    pub fn new(data: impl Into<Bytes>) -> Self {
        LogRecord { data: data.into() }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Payload bytes, without any wire padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Producer-side view of one log entry in its unserialized application form.
///
/// The collector queries [`size`](LogEntry::size) first, allocates a buffer of
/// exactly that many bytes and then asks the entry to serialize itself into
/// it. Implementations must write exactly `size()` bytes.
pub trait LogEntry {
    /// Serialized size of the entry in bytes.
    fn size(&self) -> usize;

    /// Writes the serialized form of the entry into `out`.
    fn serialize(&self, out: &mut Vec<u8>);
}

/// Already-serialized payloads can be handed to the collector directly.
impl LogEntry for &[u8] {
    fn size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl LogEntry for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl LogEntry for Bytes {
    fn size(&self) -> usize {
        self.len()
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}
