use super::RandomRead;
use crate::error::Result;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Local file source with random access support.
///
/// Reads go through an ordinary seek-then-read pair on one file handle
/// rather than a per-read positional syscall; the archive layer already
/// serializes every access, so the moving cursor is never observed by two
/// streams at once and the same handle works on every platform.
pub struct FileSource {
    file: File,
    size: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl RandomRead for FileSource {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read(buf)
    }

    fn len(&self) -> u64 {
        self.size
    }
}
