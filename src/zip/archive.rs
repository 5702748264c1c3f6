use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, ZipError};
use crate::io::RandomRead;

use super::parser;
use super::stream::{BoundedStream, EntryReader, SharedHandle};
use super::structures::{CompressionMethod, ZipEntry};

/// A ZIP archive opened for random access.
///
/// Opening pays once to read the trailer and the whole Central Directory
/// into an in-memory index; after that, lookup by name is O(1) and any entry
/// can be streamed any number of times, from any thread, without rescanning
/// the container.
///
/// The archive owns the single underlying byte source. Streams produced by
/// [`reader`](Self::reader) share it behind one mutex, each with its own
/// logical position, so concurrent reads of different entries only contend
/// for the brief seek-then-read critical section.
///
/// [`close`](Self::close) invalidates the shared handle: open streams fail
/// on their next read and further queries return [`ZipError::Closed`].
/// Dropping the archive does the same, so the handle is never leaked.
pub struct ZipArchive {
    source: SharedHandle,
    entries: Vec<ZipEntry>,
    index: HashMap<String, usize>,
}

impl ZipArchive {
    /// Open an archive over `source`.
    ///
    /// Construction is all-or-nothing: it locates the trailer, parses every
    /// Central Directory record and builds the name index before returning.
    /// Any failure, including a duplicate entry name, rejects the whole
    /// archive.
    pub fn open<S: RandomRead + 'static>(mut source: S) -> Result<Self> {
        let (entry_count, cd_offset) = parser::find_trailer(&mut source)?;
        let entries = parser::read_directory(&mut source, cd_offset, entry_count)?;

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.name.clone(), i).is_some() {
                return Err(ZipError::format(format!(
                    "duplicate entry name: {}",
                    entry.name
                )));
            }
        }

        Ok(Self {
            source: Arc::new(Mutex::new(Some(Box::new(source)))),
            entries,
            index,
        })
    }

    fn check_open(&self) -> Result<()> {
        let guard = self.source.lock().map_err(|_| {
            ZipError::Io(std::io::Error::other("shared source lock poisoned"))
        })?;
        if guard.is_none() {
            return Err(ZipError::Closed);
        }
        Ok(())
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> Result<usize> {
        self.check_open()?;
        Ok(self.entries.len())
    }

    /// Iterate over the entries in the order their directory records appear
    /// on disk.
    pub fn entries(&self) -> Result<std::slice::Iter<'_, ZipEntry>> {
        self.check_open()?;
        Ok(self.entries.iter())
    }

    /// Look up an entry by name.
    ///
    /// Directory entries are recorded with a trailing `/`; a miss on `name`
    /// retries `name/` so callers can ask for directories without the
    /// separator.
    pub fn entry(&self, name: &str) -> Result<Option<&ZipEntry>> {
        self.check_open()?;
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => match self.index.get(&format!("{name}/")) {
                Some(&i) => i,
                None => return Ok(None),
            },
        };
        Ok(Some(&self.entries[i]))
    }

    /// Open a byte stream over an entry's decompressed data.
    ///
    /// `entry` is re-resolved by name first, so a descriptor from a
    /// different archive yields `Ok(None)` rather than garbage reads. The
    /// entry's local header is then consulted for the actual data start:
    /// its extra-field length may differ from the central record's, so the
    /// central value is never trusted for this computation.
    pub fn reader(&self, entry: &ZipEntry) -> Result<Option<EntryReader>> {
        let Some(entry) = self.entry(&entry.name)? else {
            return Ok(None);
        };

        // One critical section for both local-header reads.
        let data_start = {
            let mut guard = self.source.lock().map_err(|_| {
                ZipError::Io(std::io::Error::other("shared source lock poisoned"))
            })?;
            let source = guard.as_mut().ok_or(ZipError::Closed)?;
            parser::data_start(source.as_mut(), entry)?
        };

        let stream = BoundedStream::new(
            Arc::clone(&self.source),
            data_start,
            data_start + entry.compressed_size,
        );

        let reader = match entry.compression_method {
            CompressionMethod::Stored => EntryReader::stored(stream),
            CompressionMethod::Deflate => {
                EntryReader::deflated(stream, entry.uncompressed_size)
            }
            CompressionMethod::Unknown(m) => {
                return Err(ZipError::unsupported(format!(
                    "unknown compression method: {m}"
                )));
            }
        };

        Ok(Some(reader))
    }

    /// Close the archive, invalidating the shared source.
    ///
    /// Idempotent. Runs under the same mutex the streams use, so an
    /// in-flight read either finishes against the still-valid handle or
    /// observes the archive as closed; never a torn read.
    pub fn close(&self) {
        if let Ok(mut guard) = self.source.lock() {
            guard.take();
        }
    }
}

impl Drop for ZipArchive {
    fn drop(&mut self) {
        self.close();
    }
}
