//! In-memory ZIP fixture builder for the integration tests.
//!
//! Writes the same record layout the reader decodes: local file headers with
//! payload, then the Central Directory, then the End of Central Directory
//! record. Knobs exist for the corruption cases the reader must reject
//! (duplicate names, spanned-volume markers) and for format quirks it must
//! tolerate (archive comments, local extra fields that differ from the
//! central record's).

// Each test binary compiles its own copy and uses a different subset.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

/// One entry to be written into a fixture archive.
pub struct EntrySpec {
    pub name: String,
    pub method: u16,
    /// Uncompressed payload.
    pub raw: Vec<u8>,
    /// Bytes as written after the local header.
    pub data: Vec<u8>,
    pub flags: u16,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
}

impl EntrySpec {
    pub fn stored(name: &str, payload: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            method: 0,
            raw: payload.to_vec(),
            data: payload.to_vec(),
            flags: 0,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
        }
    }

    pub fn deflated(name: &str, payload: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        let data = encoder.finish().unwrap();
        Self {
            name: name.to_string(),
            method: 8,
            raw: payload.to_vec(),
            data,
            flags: 0,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_local_extra(mut self, extra: &[u8]) -> Self {
        self.local_extra = extra.to_vec();
        self
    }

    fn crc32(&self) -> u32 {
        let mut crc = flate2::Crc::new();
        crc.update(&self.raw);
        crc.sum()
    }
}

#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<EntrySpec>,
    comment: Vec<u8>,
    disk_number: u16,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, payload: &[u8]) -> Self {
        self.entry(EntrySpec::stored(name, payload))
    }

    pub fn deflated(self, name: &str, payload: &[u8]) -> Self {
        self.entry(EntrySpec::deflated(name, payload))
    }

    pub fn entry(mut self, spec: EntrySpec) -> Self {
        self.entries.push(spec);
        self
    }

    /// Archive comment appended after the trailer.
    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Mark the archive as part of a spanned set.
    pub fn disk_number(mut self, n: u16) -> Self {
        self.disk_number = n;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut local_offsets = Vec::with_capacity(self.entries.len());

        for spec in &self.entries {
            local_offsets.push(out.len() as u32);
            write_local_header(&mut out, spec);
            out.extend_from_slice(&spec.data);
        }

        let cd_offset = out.len() as u32;
        for (spec, &offset) in self.entries.iter().zip(&local_offsets) {
            write_central_record(&mut out, spec, offset);
        }
        let cd_size = out.len() as u32 - cd_offset;

        // End of Central Directory record.
        out.extend_from_slice(b"PK\x05\x06");
        out.write_u16::<LittleEndian>(self.disk_number).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap(); // disk with cd
        out.write_u16::<LittleEndian>(self.entries.len() as u16)
            .unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16)
            .unwrap();
        out.write_u32::<LittleEndian>(cd_size).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16)
            .unwrap();
        out.extend_from_slice(&self.comment);

        out
    }
}

fn write_local_header(out: &mut Vec<u8>, spec: &EntrySpec) {
    out.extend_from_slice(b"PK\x03\x04");
    out.write_u16::<LittleEndian>(20).unwrap(); // version needed
    out.write_u16::<LittleEndian>(spec.flags).unwrap();
    out.write_u16::<LittleEndian>(spec.method).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap(); // mod time
    out.write_u16::<LittleEndian>(0).unwrap(); // mod date
    out.write_u32::<LittleEndian>(spec.crc32()).unwrap();
    out.write_u32::<LittleEndian>(spec.data.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(spec.raw.len() as u32).unwrap();
    out.write_u16::<LittleEndian>(spec.name.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(spec.local_extra.len() as u16)
        .unwrap();
    out.extend_from_slice(spec.name.as_bytes());
    out.extend_from_slice(&spec.local_extra);
}

fn write_central_record(out: &mut Vec<u8>, spec: &EntrySpec, local_offset: u32) {
    out.extend_from_slice(b"PK\x01\x02");
    out.write_u16::<LittleEndian>(20).unwrap(); // version made by
    out.write_u16::<LittleEndian>(20).unwrap(); // version needed
    out.write_u16::<LittleEndian>(spec.flags).unwrap();
    out.write_u16::<LittleEndian>(spec.method).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap(); // mod time
    out.write_u16::<LittleEndian>(0).unwrap(); // mod date
    out.write_u32::<LittleEndian>(spec.crc32()).unwrap();
    out.write_u32::<LittleEndian>(spec.data.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(spec.raw.len() as u32).unwrap();
    out.write_u16::<LittleEndian>(spec.name.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(spec.central_extra.len() as u16)
        .unwrap();
    out.write_u16::<LittleEndian>(0).unwrap(); // comment length
    out.write_u16::<LittleEndian>(0).unwrap(); // disk number start
    out.write_u16::<LittleEndian>(0).unwrap(); // internal attributes
    out.write_u32::<LittleEndian>(0).unwrap(); // external attributes
    out.write_u32::<LittleEndian>(local_offset).unwrap();
    out.extend_from_slice(spec.name.as_bytes());
    out.extend_from_slice(&spec.central_extra);
}
