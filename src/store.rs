//! The backing-store seam.
//!
//! The engine depends only on [`BackingStore`]: a seekable, byte-addressable
//! store with positioned reads and writes that persists across engine
//! instances. A blanket implementation covers every `Read + Write + Seek`
//! type, so regular files, in-memory cursors, and fault-injecting wrappers
//! in tests all qualify without further code.

use std::io::{self, Read, Seek, SeekFrom, Write};

/// A persistent sequence of bytes addressable by 64-bit offsets.
///
/// Reads past the current end of the store report end-of-input by returning
/// zero bytes read; writes may extend the store. The engine is the only
/// writer for the lifetime of a queue instance.
pub trait BackingStore {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; zero means end of input. Short
    /// reads are permitted.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying store.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `buf` starting at `offset`, extending the store if the
    /// write reaches past its current end.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying store.
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()>;

    /// Fill `buf` completely from `offset`.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::UnexpectedEof` if the store ends before `buf` is
    /// filled, or any I/O error from the underlying store.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_at(offset + filled as u64, &mut buf[filled..])? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "backing store ended mid-read",
                    ));
                }
                n => filled += n,
            }
        }
        Ok(())
    }
}

impl<S: Read + Write + Seek> BackingStore for S {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        self.read(buf)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(buf)
    }
}
