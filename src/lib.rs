//! # razip
//!
//! A random-access ZIP reader with HTTP Range request support.
//!
//! This library opens ZIP archives from the local filesystem or from remote
//! HTTP servers. It reads the archive's trailing directory once, builds an
//! in-memory index, and then answers name lookups and serves independent
//! decompressed byte streams for any entry without rescanning the container.
//! For remote files it issues HTTP Range requests, so listing or extracting
//! a few entries from a huge archive only transfers the bytes involved.
//!
//! ## Features
//!
//! - Open ZIP archives from the local filesystem or HTTP/HTTPS URLs
//! - O(1) entry lookup by name after a single directory pass
//! - STORED (uncompressed) and DEFLATE entries
//! - Independent, concurrently usable streams over one shared file handle
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Read;
//! use razip::{FileSource, ZipArchive};
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = FileSource::open(std::path::Path::new("archive.zip"))?;
//!     let archive = ZipArchive::open(source)?;
//!
//!     for entry in archive.entries()? {
//!         println!("{}", entry.name);
//!     }
//!
//!     if let Some(entry) = archive.entry("readme.txt")? {
//!         let mut text = String::new();
//!         if let Some(mut reader) = archive.reader(entry)? {
//!             reader.read_to_string(&mut text)?;
//!         }
//!         println!("{text}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Result, ZipError};
pub use io::{FileSource, HttpSource, RandomRead, TransferCounter};
pub use zip::{CompressionMethod, EntryReader, ZipArchive, ZipEntry};
