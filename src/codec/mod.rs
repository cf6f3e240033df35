//! Primitive binary encodings.
//!
//! Two codecs share one set of encodings for varints and length-prefixed
//! blobs but differ in fixed-width byte order:
//!
//! - [`BufferCursor`] works on owned in-memory storage, little-endian.
//! - [`StreamReader`] / [`StreamWriter`] work on byte channels, big-endian,
//!   and pin the first error they see.
//!
//! Mixing the two against one wire format corrupts every fixed-width field.

mod channel;
mod cursor;
mod reader;
pub mod varint;
mod writer;

pub use channel::{ByteRead, ByteWrite};
pub use cursor::BufferCursor;
pub use reader::{StreamReader, DEFAULT_MAX_BYTES_LEN};
pub use writer::StreamWriter;
