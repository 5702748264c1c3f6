mod http;
mod local;

pub use http::{HttpSource, TransferCounter};
pub use local::FileSource;

use std::io;

/// Trait for random access reading from a byte source.
///
/// Implementations take `&mut self` because a source may carry a physical
/// cursor (a file descriptor's position, for instance). Callers that share
/// one source across logical streams are responsible for serializing access;
/// [`ZipArchive`](crate::zip::ZipArchive) does this with a single mutex so a
/// seek and its read can never interleave with another stream's.
pub trait RandomRead: Send {
    /// Read data at the specified offset into the buffer, returning the
    /// number of bytes read. A return of 0 means the source is exhausted at
    /// `offset`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Total size of the byte source.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read exactly `buf.len()` bytes at `offset`, failing with
    /// [`io::ErrorKind::UnexpectedEof`] if the source runs out first.
    fn read_exact_at(&mut self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf)? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "byte source exhausted before the requested range",
                    ));
                }
                n => {
                    offset += n as u64;
                    buf = &mut buf[n..];
                }
            }
        }
        Ok(())
    }
}

impl RandomRead for std::io::Cursor<Vec<u8>> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.get_ref();
        if offset >= data.len() as u64 {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn len(&self) -> u64 {
        self.get_ref().len() as u64
    }
}
