//! The queue engine.
//!
//! `Queue` owns the backing store and an in-memory cache of the on-disk
//! header, and is the only writer to the store. Every mutation follows the
//! same commit discipline: frame bytes first, then the 16-byte header at
//! offset 0. The header write is the sole commit point -- a crash anywhere
//! before it leaves the previous logical queue intact, because a fresh
//! engine reconstructs the queue from the header alone.
//!
//! Placement is a ring over the data region `[16, file_length)`. Frames are
//! contiguous and never straddle the capacity bound; when a frame does not
//! fit between the tail and the end of the buffer, it is placed at the start
//! of the data region instead, provided the space in front of the head is
//! large enough.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::codec::{self, QueueHeader, FRAME_PREFIX_SIZE, HEADER_SIZE, WRAP_SENTINEL};
use crate::error::Error;
use crate::store::BackingStore;
use crate::types::QueueOptions;

/// A FIFO queue of byte payloads persisted in a single backing store.
///
/// The engine is single-threaded and non-reentrant: it assumes exclusive
/// ownership of the store for its lifetime. Concurrent use of one store from
/// multiple engines is undefined.
pub struct Queue<S> {
    /// Exclusively owned backing store.
    store: S,
    /// Cached copy of the on-disk header. Authoritative between operations
    /// on this instance; the on-disk header is authoritative on re-attach.
    header: QueueHeader,
    /// Set when a header write fails mid-commit. From that point the cache
    /// and the disk may disagree, so every subsequent operation is refused.
    poisoned: bool,
}

impl<S: BackingStore> Queue<S> {
    /// Bind a queue to `store` with the default options.
    ///
    /// Equivalent to [`Queue::with_options`] with [`QueueOptions::default`].
    ///
    /// # Errors
    ///
    /// See [`Queue::with_options`].
    pub fn new(store: S) -> Result<Queue<S>, Error> {
        Queue::with_options(store, QueueOptions::default())
    }

    /// Bind a queue to `store`, initializing an empty store to
    /// `options.capacity` bytes.
    ///
    /// Attempts to read 16 bytes from offset 0:
    ///
    /// - A full header is decoded, bounds-checked, and adopted. The
    ///   configured capacity is ignored; the persisted layout is
    ///   authoritative.
    /// - End of input on the first byte means the store is empty: the
    ///   default header with the configured capacity is installed and
    ///   written. This is the only path that establishes capacity.
    /// - A partial header (1-15 bytes) fails initialization without
    ///   modifying the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] for a partial or out-of-range
    /// header, or [`Error::Io`] if the store fails.
    pub fn with_options(mut store: S, options: QueueOptions) -> Result<Queue<S>, Error> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        let mut filled = 0;
        while filled < buf.len() {
            match store.read_at(filled as u64, &mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        let header = match filled {
            0 => {
                let header = QueueHeader::new(options.capacity);
                header.validate()?;
                store.write_at(0, &header.encode())?;
                debug!(capacity = header.file_length, "installed fresh queue header");
                header
            }
            len if len == buf.len() => {
                let header = QueueHeader::decode(&buf);
                header.validate()?;
                debug!(
                    capacity = header.file_length,
                    size = header.queue_size,
                    head = header.head_position,
                    tail = header.tail_position,
                    "adopted persisted queue header"
                );
                header
            }
            len => {
                return Err(Error::InvalidHeader(format!("short header: {len} bytes")));
            }
        };

        Ok(Queue {
            store,
            header,
            poisoned: false,
        })
    }

    /// Append `payload` to the back of the queue.
    ///
    /// The payload is framed with a 4-byte length prefix and written
    /// contiguously at the tail, or at the start of the data region when the
    /// tail space is exhausted and the space reclaimed in front of the head
    /// is large enough (the wrap). The header write that follows the frame
    /// write commits the operation.
    ///
    /// # Errors
    ///
    /// - [`Error::ElementTooLarge`] if the frame exceeds the data region.
    /// - [`Error::QueueFull`] if no placement fits; the store is untouched.
    /// - [`Error::Io`] if the store fails. A failed frame write leaves the
    ///   committed state intact; a failed header write poisons the engine.
    pub fn enqueue(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.check_poisoned()?;

        let max_frame = self.header.file_length - HEADER_SIZE;
        let frame_len = payload.len() as u64 + FRAME_PREFIX_SIZE as u64;
        if frame_len > max_frame as u64 {
            return Err(Error::ElementTooLarge {
                size: frame_len,
                max: max_frame,
            });
        }
        let frame_len = frame_len as u32;

        let head = self.header.head_position;
        let tail = self.header.tail_position;
        let wrapped = self.header.queue_size > 0 && tail <= head;

        let write_position = if wrapped {
            // Tail and head share one contiguous gap; writing past the head
            // would overwrite unread frames.
            if frame_len <= head - tail {
                tail
            } else {
                return Err(Error::QueueFull);
            }
        } else if frame_len <= self.header.file_length - tail {
            tail
        } else if frame_len <= head - HEADER_SIZE {
            // Wrap: the frame moves to the start of the data region. When
            // the abandoned tail still has room for a length prefix, plant
            // the sentinel there so the consumer can tell dead space from a
            // frame.
            if self.header.file_length - tail >= FRAME_PREFIX_SIZE {
                self.store
                    .write_at(tail as u64, &codec::encode_frame_prefix(WRAP_SENTINEL))?;
            }
            trace!(abandoned_tail = tail, "wrapping tail to start of data region");
            HEADER_SIZE
        } else {
            return Err(Error::QueueFull);
        };

        let mut frame = Vec::with_capacity(frame_len as usize);
        frame.extend_from_slice(&codec::encode_frame_prefix(payload.len() as u32));
        frame.extend_from_slice(payload);
        self.store.write_at(write_position as u64, &frame)?;

        self.header.tail_position = write_position + frame_len;
        self.header.queue_size += 1;
        self.sync_header()
    }

    /// Remove and return the payload at the front of the queue.
    ///
    /// Reads the frame at the head (wrapping the head to the start of the
    /// data region when no frame fits before the capacity bound), advances
    /// the head past it, and commits with a header write. Draining the last
    /// element resets both positions to the start of the data region,
    /// reclaiming all space.
    ///
    /// # Errors
    ///
    /// - [`Error::QueueEmpty`] if the queue holds no elements.
    /// - [`Error::Io`] if the store fails. A failed frame read leaves the
    ///   committed state intact; a failed header write poisons the engine.
    pub fn dequeue(&mut self) -> Result<Bytes, Error> {
        self.check_poisoned()?;
        if self.header.queue_size == 0 {
            return Err(Error::QueueEmpty);
        }

        let (payload, next_head) = self.read_front()?;

        self.header.queue_size -= 1;
        if self.header.queue_size == 0 {
            self.header.head_position = HEADER_SIZE;
            self.header.tail_position = HEADER_SIZE;
        } else {
            self.header.head_position = next_head;
        }
        self.sync_header()?;

        Ok(payload)
    }

    /// Return the payload at the front of the queue without removing it.
    ///
    /// Follows the same wrap-aware read path as [`Queue::dequeue`] but
    /// writes nothing: the header, on disk and in memory, is unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::QueueEmpty`] if the queue holds no elements.
    /// - [`Error::Io`] if the store fails.
    pub fn peek(&mut self) -> Result<Bytes, Error> {
        self.check_poisoned()?;
        if self.header.queue_size == 0 {
            return Err(Error::QueueEmpty);
        }
        let (payload, _) = self.read_front()?;
        Ok(payload)
    }

    /// Number of elements currently in the queue.
    pub fn len(&self) -> usize {
        self.header.queue_size as usize
    }

    /// Whether the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.header.queue_size == 0
    }

    /// Capacity in bytes of the buffer region, header included. Fixed at
    /// first initialization.
    pub fn capacity(&self) -> u32 {
        self.header.file_length
    }

    /// Release the queue and hand back the backing store.
    ///
    /// The store still carries the full committed state; a queue attached
    /// to it later resumes from the same point.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Read the frame at the front of the queue.
    ///
    /// Returns the payload and the offset immediately after the frame. Only
    /// called with a non-empty queue. In the wrapped regime the head may sit
    /// in the dead space the producer abandoned: fewer than 4 bytes left
    /// before the capacity bound, or a [`WRAP_SENTINEL`] length prefix, both
    /// mean the next frame starts at the beginning of the data region.
    fn read_front(&mut self) -> Result<(Bytes, u32), Error> {
        let wrapped = self.header.tail_position <= self.header.head_position;
        let mut head = self.header.head_position;

        if wrapped && self.header.file_length - head < FRAME_PREFIX_SIZE {
            trace!(head, "head wraps to start of data region");
            head = HEADER_SIZE;
        }

        let mut prefix = [0u8; FRAME_PREFIX_SIZE as usize];
        self.store.read_exact_at(head as u64, &mut prefix)?;
        let mut payload_len = codec::decode_frame_prefix(&prefix);

        if wrapped && payload_len == WRAP_SENTINEL && head != HEADER_SIZE {
            trace!(head, "hit wrap sentinel; head wraps to start of data region");
            head = HEADER_SIZE;
            self.store.read_exact_at(head as u64, &mut prefix)?;
            payload_len = codec::decode_frame_prefix(&prefix);
        }

        let mut payload = vec![0u8; payload_len as usize];
        self.store
            .read_exact_at((head + FRAME_PREFIX_SIZE) as u64, &mut payload)?;

        Ok((Bytes::from(payload), head + FRAME_PREFIX_SIZE + payload_len))
    }

    /// Write the cached header to offset 0 -- the commit point.
    ///
    /// On failure the engine is poisoned: the write may have partially
    /// reached the store, so the cache can no longer be reconciled with the
    /// disk from here. Re-attaching a fresh queue re-reads whichever header
    /// the store actually holds.
    fn sync_header(&mut self) -> Result<(), Error> {
        if let Err(e) = self.store.write_at(0, &self.header.encode()) {
            self.poisoned = true;
            return Err(e.into());
        }
        Ok(())
    }

    fn check_poisoned(&self) -> Result<(), Error> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        Ok(())
    }
}
