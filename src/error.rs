//! Error types.

use core::fmt;

/// Byte offset within a backing buffer at which an error was observed.
pub type Position = usize;

/// Kinds of errors produced by this crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Tag at the current position did not match what the caller expected.
    InvalidTag {
        /// Tag actually found.
        actual: u8,
    },

    /// Byte sequence is not a well-formed DER TLV: buffer too short, length
    /// extends past the buffer, an OID arc was unparsable, a date-time
    /// string was unrecognized, or a SEQUENCE/SET payload failed to parse.
    InvalidData,

    /// A length field used more than 4 octets, or an OID string exceeded
    /// the 8 KiB cap.
    Overflow,

    /// Caller supplied a null/absent value where one is required.
    ArgNull,

    /// Fewer bytes remain in the buffer than the header or payload needs.
    Incomplete,

    /// An offset was requested of `move_to` that the offset map has never
    /// recorded.
    UnknownOffset,

    /// Bytes remained after a decode that expected to consume the input
    /// exactly.
    TrailingData,
}

impl ErrorKind {
    /// Annotate this kind with the position at which it was observed.
    pub fn at(self, position: Position) -> Error {
        Error { kind: self, position }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidTag { actual } => write!(f, "invalid tag: 0x{actual:02x}"),
            ErrorKind::InvalidData => write!(f, "invalid DER data"),
            ErrorKind::Overflow => write!(f, "length or size overflow"),
            ErrorKind::ArgNull => write!(f, "required value was absent"),
            ErrorKind::Incomplete => write!(f, "buffer too short"),
            ErrorKind::UnknownOffset => write!(f, "offset not present in offset map"),
            ErrorKind::TrailingData => write!(f, "trailing data after decode"),
        }
    }
}

/// An error, annotated with the byte offset at which it was observed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    position: Position,
}

impl Error {
    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The offset within the backing buffer at which this error occurred.
    pub fn position(&self) -> Position {
        self.position
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.kind, self.position)
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        kind.at(0)
    }
}

/// Result type used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;
