use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Result, ZipError};

/// General Purpose Bit Flag, bit 0: the entry data is encrypted.
pub const GP_FLAG_ENCRYPTED: u16 = 1 << 0;

/// General Purpose Bit Flag, bit 11: name and comment are UTF-8.
pub const GP_FLAG_UTF8: u16 = 1 << 11;

/// Bits of the General Purpose Bit Flag we refuse to handle. Only the
/// encrypted bit is enforced; other exotic bits are ignored rather than
/// rejected so that otherwise-readable archives keep working.
pub const GP_UNSUPPORTED_MASK: u16 = GP_FLAG_ENCRYPTED;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::format("invalid end of central directory record"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes plus variable fields
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes plus variable fields. The data of an
/// entry starts at `LFH_SIZE + name length + local extra length` past the
/// header offset. Only the flag and extra-length fields are read back from
/// it; everything else comes from the Central Directory.
pub const LFH_SIZE: u64 = 30;
pub const LFH_FLAGS_OFFSET: u64 = 6;
pub const LFH_EXTRA_LEN_OFFSET: u64 = 28;

/// One entry of the archive, as described by its Central Directory record.
///
/// Immutable once parsed. The archive's index owns these; streams opened for
/// an entry only borrow it.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    /// General Purpose Bit Flags from the central record.
    pub flags: u16,
    /// Length in bytes of the raw (undecoded) name. Needed again when the
    /// local header is resolved, so it is kept rather than re-derived from
    /// the decoded string.
    pub name_length: u16,
    /// Extra-field length from the *central* record. The local header may
    /// legitimately carry a different one; data-start resolution reads the
    /// local value and never this field.
    pub extra_length: u16,
    pub local_header_offset: u64,
}

impl ZipEntry {
    /// Directory entries are recorded with a trailing separator.
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Decode an entry name according to its General Purpose Bit Flags: bit 11
/// selects UTF-8, anything else is CP437, the legacy ZIP code page.
pub fn decode_name(raw: &[u8], flags: u16) -> Result<String> {
    if flags & GP_FLAG_UTF8 != 0 {
        String::from_utf8(raw.to_vec())
            .map_err(|_| ZipError::format("entry name flagged UTF-8 is not valid UTF-8"))
    } else {
        Ok(raw.iter().map(|&b| cp437_char(b)).collect())
    }
}

/// CP437 to Unicode, identity-mapping the ASCII half.
fn cp437_char(b: u8) -> char {
    const HIGH: [char; 128] = [
        'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
        'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
        'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
        '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
        '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
        '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
        'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
        '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
    ];
    if b < 0x80 {
        b as char
    } else {
        HIGH[(b - 0x80) as usize]
    }
}
