//! Byte channels consumed by the stream codecs.
//!
//! [`ByteRead`] and [`ByteWrite`] extend `Read`/`Write` with a single-byte
//! primitive. The provided method falls back to a one-byte `read_exact` /
//! `write_all`; channels that already hold their bytes in memory override it
//! to touch the byte directly.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;

use bytes::{Buf, BufMut};

use crate::codec::BufferCursor;

/// A readable channel with a single-byte read.
pub trait ByteRead: Read {
    /// Read exactly one byte, failing with `UnexpectedEof` at end of input.
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }
}

/// A writable channel with a single-byte write.
pub trait ByteWrite: Write {
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.write_all(&[b])
    }
}

#[inline]
fn eof() -> io::Error {
    io::ErrorKind::UnexpectedEof.into()
}

impl ByteRead for &[u8] {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        let (&b, rest) = self.split_first().ok_or_else(eof)?;
        *self = rest;
        Ok(b)
    }
}

impl<T: AsRef<[u8]>> ByteRead for io::Cursor<T> {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        let pos = self.position();
        let b = usize::try_from(pos)
            .ok()
            .and_then(|i| self.get_ref().as_ref().get(i).copied())
            .ok_or_else(eof)?;
        self.set_position(pos + 1);
        Ok(b)
    }
}

impl<R: Read> ByteRead for BufReader<R> {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        let b = *self.fill_buf()?.first().ok_or_else(eof)?;
        self.consume(1);
        Ok(b)
    }
}

impl<B: Buf> ByteRead for bytes::buf::Reader<B> {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        let buf = self.get_mut();
        if !buf.has_remaining() {
            return Err(eof());
        }
        Ok(buf.get_u8())
    }
}

impl ByteRead for VecDeque<u8> {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        self.pop_front().ok_or_else(eof)
    }
}

impl ByteRead for BufferCursor {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        self.decode_u8().map_err(|_| eof())
    }
}

impl ByteRead for io::StdinLock<'_> {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        let b = *self.fill_buf()?.first().ok_or_else(eof)?;
        self.consume(1);
        Ok(b)
    }
}

impl ByteRead for File {}
impl ByteRead for TcpStream {}
impl ByteRead for io::Stdin {}
impl ByteRead for io::Empty {}
impl<R: Read> ByteRead for io::Take<R> {}
#[cfg(unix)]
impl ByteRead for std::os::unix::net::UnixStream {}

impl<R: ByteRead + ?Sized> ByteRead for &mut R {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }
}

impl<R: ByteRead + ?Sized> ByteRead for Box<R> {
    #[inline]
    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }
}

impl ByteWrite for Vec<u8> {
    #[inline]
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.push(b);
        Ok(())
    }
}

impl ByteWrite for VecDeque<u8> {
    #[inline]
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.push_back(b);
        Ok(())
    }
}

impl<B: BufMut> ByteWrite for bytes::buf::Writer<B> {
    #[inline]
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        let buf = self.get_mut();
        if !buf.has_remaining_mut() {
            return Err(io::ErrorKind::WriteZero.into());
        }
        buf.put_u8(b);
        Ok(())
    }
}

impl ByteWrite for BufferCursor {
    #[inline]
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.encode_u8(b);
        Ok(())
    }
}

impl<W: Write> ByteWrite for BufWriter<W> {}
impl ByteWrite for io::Cursor<Vec<u8>> {}
impl ByteWrite for io::Cursor<&mut [u8]> {}
impl ByteWrite for io::Cursor<&mut Vec<u8>> {}
impl ByteWrite for File {}
impl ByteWrite for TcpStream {}
impl ByteWrite for io::Sink {}
impl ByteWrite for io::Stdout {}
impl ByteWrite for io::Stderr {}
#[cfg(unix)]
impl ByteWrite for std::os::unix::net::UnixStream {}

impl<W: ByteWrite + ?Sized> ByteWrite for &mut W {
    #[inline]
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        (**self).write_byte(b)
    }
}

impl<W: ByteWrite + ?Sized> ByteWrite for Box<W> {
    #[inline]
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        (**self).write_byte(b)
    }
}
