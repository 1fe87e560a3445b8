//! Binary codec for the queue header and element frames.
//!
//! This module handles serialization and deserialization of the fixed 16-byte
//! queue header and the 4-byte frame length prefix. It is pure data
//! transformation -- no file I/O, no placement arithmetic.
//!
//! All integers are big-endian `u32`. A 16-byte header read is always
//! decodable: there is no magic number, version field, or checksum. Partial
//! reads are the caller's concern.

use crate::error::Error;

/// Size of the queue header in bytes. The data region starts here.
pub const HEADER_SIZE: u32 = 16;

/// Size of the length prefix preceding each element's payload.
pub const FRAME_PREFIX_SIZE: u32 = 4;

/// Length-prefix value the producer plants at an abandoned tail when a
/// frame wraps to the start of the data region.
///
/// No legal frame can carry this prefix: a payload is capped at
/// `file_length - HEADER_SIZE - FRAME_PREFIX_SIZE`, which is at most
/// `u32::MAX - 20`. Zero-length payloads in particular remain ordinary
/// frames.
pub const WRAP_SENTINEL: u32 = u32::MAX;

/// The fixed header at offset 0 of the backing store.
///
/// The header is the queue's sole commit record: every successful enqueue or
/// dequeue ends by rewriting these 16 bytes, and a fresh engine reconstructs
/// the entire logical queue from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueHeader {
    /// Capacity in bytes of the buffer region (header plus data region).
    /// Fixed at first initialization; authoritative over the store's
    /// physical length on re-open.
    pub file_length: u32,
    /// Number of elements currently in the queue.
    pub queue_size: u32,
    /// Byte offset of the oldest element's frame.
    pub head_position: u32,
    /// Byte offset immediately after the newest element's frame.
    pub tail_position: u32,
}

impl QueueHeader {
    /// The header of an empty queue with the given capacity: no elements,
    /// head and tail both at the start of the data region.
    pub fn new(capacity: u32) -> QueueHeader {
        QueueHeader {
            file_length: capacity,
            queue_size: 0,
            head_position: HEADER_SIZE,
            tail_position: HEADER_SIZE,
        }
    }

    /// Encode the header as the fixed 16-byte on-disk representation.
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..4].copy_from_slice(&self.file_length.to_be_bytes());
        buf[4..8].copy_from_slice(&self.queue_size.to_be_bytes());
        buf[8..12].copy_from_slice(&self.head_position.to_be_bytes());
        buf[12..16].copy_from_slice(&self.tail_position.to_be_bytes());
        buf
    }

    /// Decode a header from its fixed 16-byte on-disk representation.
    ///
    /// Decoding is infallible; use [`QueueHeader::validate`] to check that
    /// the decoded fields describe a layout this engine can operate on.
    pub fn decode(buf: &[u8; HEADER_SIZE as usize]) -> QueueHeader {
        QueueHeader {
            file_length: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            queue_size: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            head_position: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            tail_position: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
        }
    }

    /// Check that the header fields are mutually consistent offsets.
    ///
    /// Both positions must lie inside `[HEADER_SIZE, file_length]`. Offsets
    /// outside that range would send frame reads past the capacity bound or
    /// into the header region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] naming the out-of-range field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.file_length < HEADER_SIZE {
            return Err(Error::InvalidHeader(format!(
                "file length {} smaller than the {HEADER_SIZE}-byte header",
                self.file_length
            )));
        }
        if self.head_position < HEADER_SIZE || self.head_position > self.file_length {
            return Err(Error::InvalidHeader(format!(
                "head position {} outside [{HEADER_SIZE}, {}]",
                self.head_position, self.file_length
            )));
        }
        if self.tail_position < HEADER_SIZE || self.tail_position > self.file_length {
            return Err(Error::InvalidHeader(format!(
                "tail position {} outside [{HEADER_SIZE}, {}]",
                self.tail_position, self.file_length
            )));
        }
        Ok(())
    }
}

/// Encode a frame length prefix as 4 big-endian bytes.
///
/// Also used to plant [`WRAP_SENTINEL`] at an abandoned tail.
pub fn encode_frame_prefix(len: u32) -> [u8; FRAME_PREFIX_SIZE as usize] {
    len.to_be_bytes()
}

/// Decode a frame length prefix from 4 big-endian bytes.
pub fn decode_frame_prefix(buf: &[u8; FRAME_PREFIX_SIZE as usize]) -> u32 {
    u32::from_be_bytes(*buf)
}
