//! Restart-fidelity integration tests.
//!
//! A queue re-attached to the same backing store must resume with the same
//! observable contents and ordering as the last committed operation
//! produced. These tests exercise that guarantee over real files: build up
//! state, drop the engine, re-open the file, and continue.

use std::fs::{File, OpenOptions};
use std::path::Path;

use queuefold::{Error, Queue, QueueHeader, QueueOptions, HEADER_SIZE};

fn open_queue(path: &Path, capacity: u32) -> Queue<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .expect("open backing file");
    Queue::with_options(file, QueueOptions::with_capacity(capacity)).expect("init should succeed")
}

/// Decode the committed on-disk header directly from the file.
fn disk_header(path: &Path) -> QueueHeader {
    let bytes = std::fs::read(path).expect("read backing file");
    let header: [u8; 16] = bytes[..16].try_into().expect("file holds a header");
    QueueHeader::decode(&header)
}

#[test]
fn restart_resumes_committed_contents() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    let mut queue = open_queue(&path, 4096);
    queue.enqueue(b"x").expect("enqueue x");
    queue.enqueue(b"y").expect("enqueue y");
    drop(queue);

    let mut queue = open_queue(&path, 4096);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dequeue().expect("dequeue"), "x");
    assert_eq!(queue.dequeue().expect("dequeue"), "y");
    assert!(matches!(queue.dequeue(), Err(Error::QueueEmpty)));
}

#[test]
fn restart_mid_sequence_continues_in_order() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    let mut queue = open_queue(&path, 4096);
    for payload in [b"one".as_slice(), b"two", b"three", b"four"] {
        queue.enqueue(payload).expect("enqueue");
    }
    assert_eq!(queue.dequeue().expect("dequeue"), "one");
    drop(queue);

    // Interleave re-attaches with further operations.
    let mut queue = open_queue(&path, 4096);
    assert_eq!(queue.dequeue().expect("dequeue"), "two");
    queue.enqueue(b"five").expect("enqueue");
    drop(queue);

    let mut queue = open_queue(&path, 4096);
    assert_eq!(queue.dequeue().expect("dequeue"), "three");
    assert_eq!(queue.dequeue().expect("dequeue"), "four");
    assert_eq!(queue.dequeue().expect("dequeue"), "five");
}

#[test]
fn restart_preserves_wrapped_state() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    // Drive the queue into the wrapped regime: frames at the end of the
    // buffer plus one frame back at the start of the data region.
    let mut queue = open_queue(&path, 64);
    queue.enqueue(&[b'a'; 20]).expect("enqueue a");
    queue.enqueue(&[b'b'; 20]).expect("enqueue b");
    queue.dequeue().expect("dequeue a");
    queue.enqueue(&[b'c'; 20]).expect("enqueue c");
    drop(queue);

    let mut queue = open_queue(&path, 64);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dequeue().expect("dequeue"), [b'b'; 20].as_slice());
    assert_eq!(queue.dequeue().expect("dequeue"), [b'c'; 20].as_slice());
    assert!(queue.is_empty());
}

#[test]
fn restart_after_drain_shows_reset_header() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    let mut queue = open_queue(&path, 4096);
    queue.enqueue(b"transient").expect("enqueue");
    queue.dequeue().expect("dequeue");
    drop(queue);

    let header = disk_header(&path);
    assert_eq!(header.queue_size, 0);
    assert_eq!(header.head_position, HEADER_SIZE);
    assert_eq!(header.tail_position, HEADER_SIZE);

    let queue = open_queue(&path, 4096);
    assert!(queue.is_empty());
}

#[test]
fn configured_capacity_ignored_once_header_exists() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    let mut queue = open_queue(&path, 64);
    queue.enqueue(&[b'k'; 20]).expect("enqueue");
    drop(queue);

    // Re-open asking for a much larger capacity: the persisted 64 wins,
    // and the placement arithmetic keeps honoring it.
    let mut queue = open_queue(&path, 4096);
    assert_eq!(queue.capacity(), 64);
    assert!(matches!(
        queue.enqueue(&[0u8; 60]),
        Err(Error::ElementTooLarge { .. })
    ));
    assert_eq!(queue.dequeue().expect("dequeue"), [b'k'; 20].as_slice());
}

#[test]
fn rejected_enqueue_survives_restart_byte_identical() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    let mut queue = open_queue(&path, 64);
    queue.enqueue(&[b'x'; 20]).expect("enqueue");
    queue.enqueue(&[b'y'; 20]).expect("enqueue");
    drop(queue);

    let before = std::fs::read(&path).expect("read file");

    let mut queue = open_queue(&path, 64);
    assert!(matches!(queue.enqueue(&[b'z'; 20]), Err(Error::QueueFull)));
    drop(queue);

    let after = std::fs::read(&path).expect("read file");
    assert_eq!(before, after, "a rejected enqueue must not touch the file");

    let mut queue = open_queue(&path, 64);
    assert_eq!(queue.dequeue().expect("dequeue"), [b'x'; 20].as_slice());
}

#[test]
fn truncated_header_fails_initialization_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");
    std::fs::write(&path, [0u8; 9]).expect("seed partial header");

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .expect("open backing file");
    match Queue::new(file) {
        Err(Error::InvalidHeader(msg)) => {
            assert!(msg.contains("9"), "expected byte count in: {msg}");
        }
        Err(other) => panic!("expected InvalidHeader, got: {other:?}"),
        Ok(_) => panic!("expected InvalidHeader, but init succeeded"),
    }

    let bytes = std::fs::read(&path).expect("read file");
    assert_eq!(bytes, [0u8; 9], "failed init must not modify the store");
}

#[test]
fn physical_file_never_exceeds_capacity() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("queue.dat");

    let mut queue = open_queue(&path, 64);
    for round in 0u8..30 {
        match queue.enqueue(&[round; 13]) {
            Ok(()) | Err(Error::QueueFull) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
        if round % 2 == 0 {
            match queue.dequeue() {
                Ok(_) | Err(Error::QueueEmpty) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
    }
    drop(queue);

    let len = std::fs::metadata(&path).expect("metadata").len();
    assert!(len <= 64, "file grew to {len} bytes");
}
