use std::fmt;
use std::io;
use std::sync::Arc;

/// Unified error type for codec operations.
///
/// Pool misuse (inverted ranges, oversized requests, foreign objects) is not
/// represented here: those are programming errors and panic.
#[derive(Debug, Clone)]
pub enum Error {
    /// Failure reported by the underlying byte channel
    Io(Arc<io::Error>),

    /// Fewer unread bytes than the decode requires
    Underflow { needed: usize, remaining: usize },

    /// Channel ended in the middle of a value
    UnexpectedEof,

    /// Varint continuation sequence does not fit in 64 bits
    VarintOverflow,

    /// Declared blob length exceeds the accepted maximum
    LengthTooLarge { len: u64, max: usize },

    /// Cursor offset outside the written region
    OffsetOutOfRange { offset: usize, len: usize },

    /// Length-prefixed string payload is not UTF-8
    InvalidUtf8,
}

impl Error {
    /// True for failures caused by the bytes being decoded rather than by the
    /// channel carrying them.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Underflow { needed, remaining } => write!(
                f,
                "Underflow: need {} bytes, {} remaining",
                needed, remaining
            ),
            Error::UnexpectedEof => write!(f, "Unexpected end of stream"),
            Error::VarintOverflow => write!(f, "Varint overflows 64 bits"),
            Error::LengthTooLarge { len, max } => {
                write!(f, "Length {} exceeds maximum {}", len, max)
            }
            Error::OffsetOutOfRange { offset, len } => {
                write!(f, "Offset {} out of range 0..={}", offset, len)
            }
            Error::InvalidUtf8 => write!(f, "Invalid UTF-8 in string payload"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(Arc::new(e))
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(inner) => io::Error::new(inner.kind(), inner.to_string()),
            Error::UnexpectedEof => io::ErrorKind::UnexpectedEof.into(),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;
