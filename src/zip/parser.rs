//! Low-level ZIP structure parsing.
//!
//! ZIP archives are read from the end: the End of Central Directory record
//! sits at the very tail (possibly preceded by an archive comment), and
//! points at the Central Directory, which carries one record per entry. The
//! bytes of an entry are only touched later, when a stream is opened for it.
//!
//! Reading back-to-front like this means a source only has to answer ranged
//! reads, which is what makes HTTP Range sources practical.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Result, ZipError};
use crate::io::RandomRead;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// Bounds the backward search for the trailer: the record must end within
/// this many bytes (plus its own size) of the end of the source.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Locate and decode the End of Central Directory record.
///
/// Scans backward from `len - 22` through the comment window, one candidate
/// offset at a time; the first signature match from the end wins. Junk or a
/// comment after the record is tolerated, junk *inside* the window that
/// happens to contain the signature is not distinguishable from a real
/// record, which matches every other reader of this format.
///
/// Returns `(entry_count, central_directory_offset)`.
pub fn find_trailer<S: RandomRead + ?Sized>(source: &mut S) -> Result<(u16, u64)> {
    let len = source.len();
    if len < EndOfCentralDirectory::SIZE as u64 {
        return Err(ZipError::format(format!(
            "too short to be a ZIP archive: {len} bytes"
        )));
    }

    // One ranged read of the whole candidate window, then an in-memory scan.
    let window = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64 + 1).min(len);
    let window_start = len - window;
    let mut tail = vec![0u8; window as usize];
    source.read_exact_at(window_start, &mut tail)?;

    let last_candidate = tail.len() - EndOfCentralDirectory::SIZE;
    for i in (0..=last_candidate).rev() {
        if &tail[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            continue;
        }
        let eocd = EndOfCentralDirectory::from_bytes(&tail[i..i + EndOfCentralDirectory::SIZE])?;
        if eocd.disk_number != 0
            || eocd.disk_with_cd != 0
            || eocd.disk_entries != eocd.total_entries
        {
            return Err(ZipError::unsupported("spanned archives are not supported"));
        }
        return Ok((eocd.total_entries, eocd.cd_offset as u64));
    }

    Err(ZipError::format(
        "end of central directory record not found",
    ))
}

/// Read all `entry_count` Central Directory records starting at `cd_offset`.
///
/// Records are decoded strictly sequentially; each consumes exactly
/// `46 + name + extra + comment` bytes, with the three lengths taken from
/// the record itself as authoritative framing. A signature mismatch is
/// unrecoverable: once one record is misread there is no way to find the
/// start of the next.
pub fn read_directory<S: RandomRead + ?Sized>(
    source: &mut S,
    cd_offset: u64,
    entry_count: u16,
) -> Result<Vec<ZipEntry>> {
    let mut entries = Vec::with_capacity(entry_count as usize);
    let mut offset = cd_offset;

    let mut record = [0u8; CDFH_SIZE];
    for _ in 0..entry_count {
        source.read_exact_at(offset, &mut record)?;
        let (entry, consumed) = parse_record(source, &record, offset)?;
        entries.push(entry);
        offset += consumed;
    }

    Ok(entries)
}

/// Decode one Central Directory record whose fixed part is in `record`,
/// reading the variable-length name from `source`. Returns the entry and the
/// record's total on-disk size.
fn parse_record<S: RandomRead + ?Sized>(
    source: &mut S,
    record: &[u8; CDFH_SIZE],
    record_offset: u64,
) -> Result<(ZipEntry, u64)> {
    if &record[0..4] != CDFH_SIGNATURE {
        return Err(ZipError::format(format!(
            "invalid central directory record at offset {record_offset}"
        )));
    }

    let mut cursor = Cursor::new(&record[4..]);

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_length = cursor.read_u16::<LittleEndian>()?;
    let comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let local_header_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name_bytes = vec![0u8; name_length as usize];
    source.read_exact_at(record_offset + CDFH_SIZE as u64, &mut name_bytes)?;
    let name = decode_name(&name_bytes, flags)?;

    // The extra field and comment are skipped, not read: their lengths only
    // matter for finding the next record.
    let consumed =
        CDFH_SIZE as u64 + name_length as u64 + extra_length as u64 + comment_length as u64;

    let entry = ZipEntry {
        name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        flags,
        name_length,
        extra_length,
        local_header_offset,
    };

    Ok((entry, consumed))
}

/// Read the fields of an entry's Local File Header that matter for finding
/// its data: the General Purpose Bit Flags and the local extra-field length.
/// The local extra length may legitimately differ from the central record's,
/// so the data start must be computed from the local value.
///
/// Callers must hold whatever lock guards `source`; this performs two plain
/// ranged reads. Returns the absolute offset of the first byte of the
/// entry's (possibly compressed) data.
pub fn data_start<S: RandomRead + ?Sized>(source: &mut S, entry: &ZipEntry) -> Result<u64> {
    let mut field = [0u8; 2];

    source.read_exact_at(entry.local_header_offset + LFH_FLAGS_OFFSET, &mut field)?;
    let flags = u16::from_le_bytes(field);
    if flags & GP_UNSUPPORTED_MASK != 0 {
        return Err(ZipError::unsupported(format!(
            "invalid General Purpose Bit Flag: {flags:#x} (encrypted entries are not supported)"
        )));
    }

    source.read_exact_at(entry.local_header_offset + LFH_EXTRA_LEN_OFFSET, &mut field)?;
    let local_extra_length = u16::from_le_bytes(field);

    Ok(entry.local_header_offset + LFH_SIZE + entry.name_length as u64 + local_extra_length as u64)
}
