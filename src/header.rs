use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Write;

use crate::constants::*;
use crate::Error;
use crate::Result;

/// Fields of a newc header in on-disk order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Field {
    /// `070701`.
    Magic,
    /// Inode number.
    Ino,
    /// File type and permission bits.
    Mode,
    /// Owner's user ID.
    Uid,
    /// Owner's group ID.
    Gid,
    /// Number of hard links.
    Nlink,
    /// Modification time in seconds since Unix epoch.
    Mtime,
    /// Size of the data that follows the name.
    FileSize,
    /// Major number of the containing device.
    DevMajor,
    /// Minor number of the containing device.
    DevMinor,
    /// Major number of the device file itself.
    RdevMajor,
    /// Minor number of the device file itself.
    RdevMinor,
    /// Length of the name including the trailing NUL byte.
    NameSize,
    /// Checksum (unused by `070701` archives).
    Check,
}

impl Field {
    /// All fields in on-disk order.
    pub const ALL: [Field; 14] = [
        Field::Magic,
        Field::Ino,
        Field::Mode,
        Field::Uid,
        Field::Gid,
        Field::Nlink,
        Field::Mtime,
        Field::FileSize,
        Field::DevMajor,
        Field::DevMinor,
        Field::RdevMajor,
        Field::RdevMinor,
        Field::NameSize,
        Field::Check,
    ];

    /// Fields that hold numbers, i.e. everything except [`Field::Magic`].
    pub const NUMERIC: [Field; 13] = [
        Field::Ino,
        Field::Mode,
        Field::Uid,
        Field::Gid,
        Field::Nlink,
        Field::Mtime,
        Field::FileSize,
        Field::DevMajor,
        Field::DevMinor,
        Field::RdevMajor,
        Field::RdevMinor,
        Field::NameSize,
        Field::Check,
    ];

    /// Byte offset from the start of the header.
    pub const fn offset(self) -> usize {
        match self {
            Field::Magic => 0,
            // `Magic` is the only field that is not 8 bytes wide.
            other => MAGIC_LEN + (other as usize - 1) * FIELD_LEN,
        }
    }

    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Field::Magic => MAGIC_LEN,
            _ => FIELD_LEN,
        }
    }

    /// Lower-case name as used in `cpio(5)`.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Magic => "magic",
            Field::Ino => "ino",
            Field::Mode => "mode",
            Field::Uid => "uid",
            Field::Gid => "gid",
            Field::Nlink => "nlink",
            Field::Mtime => "mtime",
            Field::FileSize => "filesize",
            Field::DevMajor => "devmajor",
            Field::DevMinor => "devminor",
            Field::RdevMajor => "rdevmajor",
            Field::RdevMinor => "rdevminor",
            Field::NameSize => "namesize",
            Field::Check => "check",
        }
    }

    const fn range(self) -> std::ops::Range<usize> {
        self.offset()..self.offset() + self.width()
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte offset of the mtime field within the header.
pub const MTIME_OFFSET: usize = Field::Mtime.offset();

/// Decode up to eight hexadecimal characters as a big-endian unsigned integer.
///
/// Both upper- and lower-case digits are accepted. Returns `None` for
/// an empty or too wide input and for non-hexadecimal characters
/// (including signs and whitespace).
pub fn decode_hex(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > FIELD_LEN {
        return None;
    }
    let mut value = 0_u32;
    for b in bytes {
        let nibble = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return None,
        };
        value = (value << 4) | nibble as u32;
    }
    Some(value)
}

/// Parsed newc header.
///
/// Keeps the raw 110 bytes so that writing the header back produces
/// exactly what was read, except for the fields that were explicitly changed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Header {
    raw: [u8; HEADER_LEN],
    values: [u32; 13],
}

impl Header {
    /// Parse the header from `block`.
    ///
    /// `offset` is the absolute position of the block and is only used in error messages.
    pub fn parse(block: [u8; HEADER_LEN], offset: u64) -> Result<Self> {
        if block[Field::Magic.range()] != NEWC_MAGIC {
            let mut magic = [0_u8; MAGIC_LEN];
            magic.copy_from_slice(&block[Field::Magic.range()]);
            return Err(Error::BadMagic { offset, magic });
        }
        let mut values = [0_u32; 13];
        for (value, field) in values.iter_mut().zip(Field::NUMERIC) {
            let bytes = &block[field.range()];
            *value = decode_hex(bytes).ok_or_else(|| Error::BadHex {
                field,
                offset,
                value: bytes.to_vec(),
            })?;
        }
        Ok(Self { raw: block, values })
    }

    /// Get the decoded value of the numeric field.
    ///
    /// Returns zero for [`Field::Magic`].
    pub fn get(&self, field: Field) -> u32 {
        match field {
            Field::Magic => 0,
            other => self.values[other as usize - 1],
        }
    }

    /// Raw bytes of the field.
    pub fn raw(&self, field: Field) -> &[u8] {
        &self.raw[field.range()]
    }

    /// Get file type and permission bits.
    pub fn mode(&self) -> u32 {
        self.get(Field::Mode)
    }

    /// Get modification time in seconds since Unix epoch.
    pub fn mtime(&self) -> u32 {
        self.get(Field::Mtime)
    }

    /// Get data length in bytes.
    pub fn file_size(&self) -> u32 {
        self.get(Field::FileSize)
    }

    /// Get name length in bytes including the trailing NUL.
    pub fn name_len(&self) -> u32 {
        self.get(Field::NameSize)
    }

    /// Reset modification time to [`EPOCH`].
    ///
    /// Only the mtime bytes change; the other fields are not re-encoded.
    pub fn set_epoch_mtime(&mut self) {
        self.raw[Field::Mtime.range()].copy_from_slice(&EPOCH_MTIME);
        self.values[Field::Mtime as usize - 1] = EPOCH;
    }

    /// The header as it is stored in the archive.
    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.raw
    }

    /// Write the header to `writer`.
    pub fn write<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.raw[..])
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<10} {}",
            Field::Magic.name(),
            String::from_utf8_lossy(self.raw(Field::Magic))
        )?;
        for field in Field::NUMERIC {
            writeln!(f, "{:<10} {}", field.name(), self.get(field))?;
        }
        Ok(())
    }
}
