//! queuefold: a crash-safe FIFO queue stored in a single fixed-capacity
//! ring file.
//!
//! Producers enqueue variable-length byte payloads; consumers dequeue them
//! in insertion order. All state lives in one backing store (typically a
//! regular file), so a queue re-attached to the same store after a restart
//! -- graceful or abrupt -- resumes exactly where the last committed
//! operation left it.
//!
//! File format:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Header (16 bytes, big-endian u32 fields)                        │
//! │ file_length │ queue_size │ head_position │ tail_position        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Frame1 │ Frame2 │ ... │ FrameN │ [dead space] │ FrameN+1'       │
//! │        │        │     │        │              │ (wrapped)       │
//! └─────────────────────────────────────────────────────────────────┘
//!          ↑                       ↑
//!     head_position          tail_position
//! ```
//!
//! Each frame is a 4-byte big-endian length prefix followed by the payload.
//! Frames never straddle the capacity bound: a frame that does not fit
//! before `file_length` is placed at the start of the data region instead,
//! provided the space in front of the head allows it.
//!
//! Every mutation writes frame bytes first and the header last; the header
//! write is the sole commit point. The engine is single-threaded and owns
//! its store exclusively -- concurrent access is not supported, and no
//! fsync is issued after the commit (wrap the store if power-loss
//! durability is required).
//!
//! ```
//! use queuefold::{Queue, QueueOptions};
//! use std::io::Cursor;
//!
//! let store = Cursor::new(Vec::new());
//! let mut queue = Queue::with_options(store, QueueOptions::with_capacity(1024))?;
//! queue.enqueue(b"first")?;
//! queue.enqueue(b"second")?;
//! assert_eq!(queue.dequeue()?, "first");
//! # Ok::<(), queuefold::Error>(())
//! ```

pub mod codec;
pub mod error;
pub mod queue;
pub mod store;
pub mod types;

pub use codec::{QueueHeader, FRAME_PREFIX_SIZE, HEADER_SIZE};
pub use error::Error;
pub use queue::Queue;
pub use store::BackingStore;
pub use types::{QueueOptions, DEFAULT_CAPACITY};

#[cfg(test)]
mod tests {
    // Verify that the public surface is accessible at the crate root.

    use std::io::Cursor;

    #[test]
    fn reexport_queue_and_options() {
        let store = Cursor::new(Vec::new());
        let queue = crate::Queue::with_options(store, crate::QueueOptions::with_capacity(64))
            .expect("init should succeed");
        assert_eq!(queue.capacity(), 64);
    }

    #[test]
    fn reexport_header_and_constants() {
        assert_eq!(crate::HEADER_SIZE, 16);
        assert_eq!(crate::FRAME_PREFIX_SIZE, 4);
        assert_eq!(crate::DEFAULT_CAPACITY, 4096);

        let header = crate::QueueHeader::new(crate::DEFAULT_CAPACITY);
        assert_eq!(header.file_length, 4096);
    }

    #[test]
    fn reexport_error() {
        let err = crate::Error::QueueFull;
        assert_eq!(err.to_string(), "queue is full");
    }

    #[test]
    fn backing_store_usable_through_reexport() {
        use crate::BackingStore;

        let mut store = Cursor::new(Vec::new());
        store.write_at(0, b"abc").expect("write_at");
        let mut buf = [0u8; 3];
        store.read_exact_at(0, &mut buf).expect("read_exact_at");
        assert_eq!(&buf, b"abc");
    }
}
