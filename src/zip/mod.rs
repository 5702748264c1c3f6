//! ZIP archive reading.
//!
//! ## Architecture
//!
//! - `structures`: data structures for the on-disk ZIP records (trailer,
//!   directory record, local header constants) and entry descriptors
//! - `parser`: low-level decoding of those records from a byte source
//! - `archive`: the [`ZipArchive`] facade, owning the shared source and
//!   the name index
//! - `stream`: bounded, optionally decompressed streams over entry data
//!
//! ## Format overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each entry
//! 2. A Central Directory with metadata for all entries
//! 3. An End of Central Directory record at the end
//!
//! The reader starts at the end: it finds the trailer (scanning past an
//! optional archive comment), walks the Central Directory once to build an
//! index, and only touches an entry's data when a stream is opened for it.
//! Entries are never scanned front-to-back, which is what makes HTTP Range
//! sources and O(1) lookup work.
//!
//! ## Supported
//!
//! - Standard single-volume ZIP (PKZIP APPNOTE 6.3.x layout)
//! - STORED and DEFLATE entries
//! - UTF-8 and CP437 entry names
//!
//! ## Not supported
//!
//! - Encryption
//! - Multi-volume (spanned) archives
//! - ZIP64 extensions

mod archive;
mod parser;
mod stream;
mod structures;

pub use archive::ZipArchive;
pub use stream::{BoundedStream, EntryReader};
pub use structures::{CompressionMethod, ZipEntry};
