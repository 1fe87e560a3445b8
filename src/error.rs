//! Error types for queuefold.
//!
//! This module defines the unified error enum used throughout the crate. All
//! fallible operations return `Result<T, Error>`. Expected conditions
//! (`QueueFull`, `QueueEmpty`, `ElementTooLarge`) leave both the on-disk
//! and in-memory queue state untouched; `Io` and `Poisoned` indicate the
//! engine instance should be discarded and re-attached.

/// Unified error type for all queuefold operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No placement fits the element: neither the space between the tail and
    /// the end of the buffer nor the reclaimed space in front of the head is
    /// large enough. The queue must be drained before this element can be
    /// accepted.
    #[error("queue is full")]
    QueueFull,

    /// The queue holds no elements.
    #[error("cannot dequeue from empty queue")]
    QueueEmpty,

    /// The framed element could never fit in the data region, even into an
    /// empty queue. Remediation is growing the capacity, not draining.
    #[error("element too large: {size}-byte frame exceeds the {max}-byte data region")]
    ElementTooLarge {
        /// Size of the frame (length prefix plus payload) in bytes.
        size: u64,
        /// Size of the data region in bytes; the largest frame the store
        /// can ever hold.
        max: u32,
    },

    /// The backing store holds a partial or out-of-range header.
    #[error("invalid queue header: {0}")]
    InvalidHeader(String),

    /// A header write failed mid-commit, so the cached header can no longer
    /// be trusted to match the backing store. Re-attach a fresh queue to the
    /// store to reconcile.
    #[error("queue poisoned by a failed commit; re-attach to the backing store")]
    Poisoned,

    /// An I/O error from the backing store, propagated verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
