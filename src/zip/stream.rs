//! Byte streams over a shared archive source.
//!
//! Every stream returned by [`ZipArchive::reader`](super::ZipArchive::reader)
//! shares the archive's one underlying handle. A stream never owns the
//! handle: it holds the archive's `Arc<Mutex<..>>` slot plus its own
//! offset/limit window, and each read is a single locked seek-then-read so
//! two streams can never interleave a seek from one with a read from the
//! other. Closing the archive empties the slot; streams that are still alive
//! observe that as a clean failure on their next read.

use std::io::{self, BufReader, Read};
use std::sync::{Arc, Mutex};

use flate2::bufread::DeflateDecoder;

use crate::error::ZipError;
use crate::io::RandomRead;

/// The archive's shared handle slot. `None` once the archive is closed.
pub(crate) type SharedHandle = Arc<Mutex<Option<Box<dyn RandomRead>>>>;

/// A read-only view of the byte range `[offset, limit)` of the shared
/// source.
///
/// `offset` only ever moves forward and never past `limit`; reads clamp to
/// the window and report end-of-stream at its edge.
pub struct BoundedStream {
    source: SharedHandle,
    offset: u64,
    limit: u64,
}

impl BoundedStream {
    pub(crate) fn new(source: SharedHandle, offset: u64, limit: u64) -> Self {
        debug_assert!(offset <= limit);
        Self {
            source,
            offset,
            limit,
        }
    }

    /// Bytes left in the window.
    pub fn remaining(&self) -> u64 {
        self.limit - self.offset
    }

    /// Advance the window without touching the source. Returns how far the
    /// offset actually moved, which is less than `n` when the window runs
    /// out first.
    pub fn skip(&mut self, n: u64) -> u64 {
        let n = n.min(self.remaining());
        self.offset += n;
        n
    }
}

impl Read for BoundedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = (buf.len() as u64).min(self.remaining()) as usize;
        if want == 0 {
            return Ok(0);
        }

        let mut guard = self
            .source
            .lock()
            .map_err(|_| io::Error::other("shared source lock poisoned"))?;
        let source = guard.as_mut().ok_or_else(|| ZipError::Closed.into_io())?;

        let n = source.read_at(self.offset, &mut buf[..want])?;
        self.offset += n as u64;
        Ok(n)
    }
}

/// Decompressed (or raw) view of one entry's data.
///
/// Stored entries pass the bounded window straight through; deflated entries
/// run it through a raw-deflate decoder. Either way [`available`] reports
/// the exact number of payload bytes not yet produced.
///
/// [`available`]: EntryReader::available
pub struct EntryReader {
    inner: Inner,
}

enum Inner {
    Stored(BoundedStream),
    Deflated {
        decoder: DeflateDecoder<BufReader<BoundedStream>>,
        uncompressed_size: u64,
    },
}

impl EntryReader {
    pub(crate) fn stored(stream: BoundedStream) -> Self {
        Self {
            inner: Inner::Stored(stream),
        }
    }

    pub(crate) fn deflated(stream: BoundedStream, uncompressed_size: u64) -> Self {
        // Sized to the payload, within sane bounds, so small entries do not
        // pay for a 64K buffer and large ones do not thrash tiny reads.
        let buf_size = 1024u64.max(uncompressed_size.min(65535)) as usize;
        Self {
            inner: Inner::Deflated {
                decoder: DeflateDecoder::new(BufReader::with_capacity(buf_size, stream)),
                uncompressed_size,
            },
        }
    }

    /// Exact number of payload bytes still to be read.
    pub fn available(&self) -> u64 {
        match &self.inner {
            Inner::Stored(stream) => stream.remaining(),
            Inner::Deflated {
                decoder,
                uncompressed_size,
            } => uncompressed_size.saturating_sub(decoder.total_out()),
        }
    }
}

impl Read for EntryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Stored(stream) => stream.read(buf),
            Inner::Deflated { decoder, .. } => decoder.read(buf),
        }
    }
}
