//! Wire framing for the logging extension.
//!
//! All multi-byte integers are big-endian. An outgoing logging extension is
//! framed as:
//!
//! ```text
//! [type: u8][options: 3 bytes][body length: u32]      <- 8-byte header
//! [bucket id: u16][record count: u16]
//! repeated: [record size: u32][payload, padded to a 4-byte boundary]
//! ```
//!
//! The body length and record count are known only after the batch has been
//! drained, so both are reserved up front and back-patched. Padding bytes are
//! not covered by the record size field but do count against the on-wire
//! footprint and the block budget.
//!
//! The incoming acknowledgment is `[bucket id: u16][result: u8][pad: u8]`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{LOGGING_EXTENSION_TYPE, RECORD_ALIGNMENT};
use crate::error::{Result, UplinkError};

/// Rounds `size` up to the next multiple of the record alignment.
pub const fn aligned_size(size: usize) -> usize {
    (size + RECORD_ALIGNMENT - 1) & !(RECORD_ALIGNMENT - 1)
}

/// Growable frame buffer with a hard capacity bound.
///
/// Every write checks the bound first: a write that would exceed it fails
/// with [`UplinkError::WriteFailed`] and leaves the buffer unchanged, so a
/// caller can abort a batch without having emitted a partial record.
#[derive(Debug)]
pub struct FrameWriter {
    buf: BytesMut,
    capacity: usize,
}

impl FrameWriter {
    pub fn new(capacity: usize) -> Self {
        FrameWriter {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Bytes still available under the capacity bound.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(UplinkError::WriteFailed { needed, remaining });
        }
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.ensure(1)?;
        self.buf.put_u8(value);
        Ok(())
    }

    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.ensure(2)?;
        self.buf.put_u16(value);
        Ok(())
    }

    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.ensure(4)?;
        self.buf.put_u32(value);
        Ok(())
    }

    /// Writes `slice` followed by zero padding up to the record alignment.
    pub fn put_aligned(&mut self, slice: &[u8]) -> Result<()> {
        let padded = aligned_size(slice.len());
        self.ensure(padded)?;
        self.buf.put_slice(slice);
        self.buf.put_bytes(0, padded - slice.len());
        Ok(())
    }

    /// Reserves a zeroed `u16` slot for later back-patching and returns its
    /// offset.
    pub fn reserve_u16(&mut self) -> Result<usize> {
        let offset = self.buf.len();
        self.put_u16(0)?;
        Ok(offset)
    }

    /// Reserves a zeroed `u32` slot for later back-patching and returns its
    /// offset.
    pub fn reserve_u32(&mut self) -> Result<usize> {
        let offset = self.buf.len();
        self.put_u32(0)?;
        Ok(offset)
    }

    /// Overwrites a previously reserved `u16` slot.
    ///
    /// `offset` must come from [`reserve_u16`](FrameWriter::reserve_u16).
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        self.buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Overwrites a previously reserved `u32` slot.
    ///
    /// `offset` must come from [`reserve_u32`](FrameWriter::reserve_u32).
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Writes the generic extension header and returns the offset of the
/// reserved body-length field.
///
/// Only the low 24 bits of `options` are carried on the wire.
pub fn write_extension_header(
    writer: &mut FrameWriter,
    extension_type: u8,
    options: u32,
) -> Result<usize> {
    writer.put_u8(extension_type)?;
    writer.put_u8((options >> 16) as u8)?;
    writer.put_u8((options >> 8) as u8)?;
    writer.put_u8(options as u8)?;
    writer.reserve_u32()
}

/// Cursor over an incoming frame.
#[derive(Debug)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        FrameReader { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(UplinkError::Truncated {
                expected: n,
                actual: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }
}

/// Per-batch delivery outcome reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadResult {
    Success,
    Failure,
}

const UPLOAD_RESULT_SUCCESS: u8 = 0x00;

/// Reads one acknowledgment: a bucket id followed by a result code occupying
/// a 2-byte-aligned slot.
///
/// Zero means delivered; any nonzero code, including codes this client does
/// not know, is a failure.
pub fn read_upload_ack(reader: &mut FrameReader<'_>) -> Result<(u16, UploadResult)> {
    let bucket_id = reader.read_u16()?;
    let code = reader.read_u8()?;
    reader.skip(1)?;
    let result = if code == UPLOAD_RESULT_SUCCESS {
        UploadResult::Success
    } else {
        UploadResult::Failure
    };
    Ok((bucket_id, result))
}

/// Decoded view of a serialized logging extension.
///
/// This is the server-side reading of [`build_request`] output; the client
/// uses it for round-trip verification and debugging.
///
/// [`build_request`]: crate::collector::LogCollector::build_request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLogRequest {
    pub bucket_id: u16,
    pub receive_updates: bool,
    pub records: Vec<Bytes>,
}

/// Parses a complete logging extension frame.
pub fn parse_log_request(frame: &[u8]) -> Result<ParsedLogRequest> {
    let mut reader = FrameReader::new(frame);

    let extension_type = reader.read_u8()?;
    if extension_type != LOGGING_EXTENSION_TYPE {
        return Err(UplinkError::InvalidArgument(format!(
            "unexpected extension type 0x{extension_type:02x}"
        )));
    }
    let options = ((reader.read_u8()? as u32) << 16)
        | ((reader.read_u8()? as u32) << 8)
        | reader.read_u8()? as u32;
    let body_length = reader.read_u32()? as usize;

    let bucket_id = reader.read_u16()?;
    let records_count = reader.read_u16()?;

    // The body length counts the 8 header-field bytes plus all record bytes.
    let mut consumed = 8;
    let mut records = Vec::with_capacity(records_count as usize);
    for _ in 0..records_count {
        let size = reader.read_u32()? as usize;
        let payload = reader.read_bytes(size)?;
        reader.skip(aligned_size(size) - size)?;
        consumed += 4 + aligned_size(size);
        records.push(Bytes::copy_from_slice(payload));
    }

    if consumed != body_length {
        return Err(UplinkError::InvalidArgument(format!(
            "body length mismatch: declared {body_length}, found {consumed}"
        )));
    }

    Ok(ParsedLogRequest {
        bucket_id,
        receive_updates: options & crate::constants::RECEIVE_UPDATES_FLAG != 0,
        records,
    })
}
