use std::io::ErrorKind;

use crate::Field;

/// Errors produced while walking, stripping or comparing archives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The header does not start with `070701`.
    #[error("bad magic {:?} at offset {offset}", String::from_utf8_lossy(.magic))]
    BadMagic {
        /// Absolute offset of the header.
        offset: u64,
        /// The first six bytes of the header.
        magic: [u8; 6],
    },
    /// A header field is not a hexadecimal number.
    #[error("bad hexadecimal value {:?} in field `{field}` of the header at offset {offset}", String::from_utf8_lossy(.value))]
    BadHex {
        /// The offending field.
        field: Field,
        /// Absolute offset of the header.
        offset: u64,
        /// Raw field contents.
        value: Vec<u8>,
    },
    /// The archive ended before the trailer entry.
    #[error("unexpected end of archive at offset {offset}: no trailer entry")]
    MissingTrailer {
        /// Where the next header was expected.
        offset: u64,
    },
    /// Corresponding entries of the compared archives have different names.
    #[error("name mismatch in entry {index}: `{left}` != `{right}`")]
    NameMismatch {
        /// Entry index.
        index: usize,
        /// Name in the first archive.
        left: String,
        /// Name in the second archive.
        right: String,
    },
    /// Input/output error.
    #[error("cannot {op}: {source}")]
    Io {
        /// What we were doing.
        op: &'static str,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl Error {
    /// Is this an [`Error::Io`] with the given kind?
    pub fn is_io_kind(&self, kind: ErrorKind) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == kind)
    }
}

/// Result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Attach the failed operation to I/O errors.
pub(crate) trait IoResultExt<T> {
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|source| Error::Io { op, source })
    }
}
