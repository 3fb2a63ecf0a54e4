//! Byte sinks and sources used by the avro-interop binary codec.
//!
//! The codec never touches `std::io` directly: encoders write into a
//! [`ByteSink`] and decoders pull from a [`ByteSource`]. In-memory work uses
//! the growable [`Writer`] and the slice-backed [`Reader`]; streams go through
//! [`IoSink`] and [`IoSource`].

mod error;
mod reader;
mod stream;
mod writer;

pub use error::BufferError;
pub use reader::Reader;
pub use stream::{IoSink, IoSource};
pub use writer::Writer;

/// Destination for encoded bytes.
pub trait ByteSink {
    /// Appends `bytes` to the sink.
    fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError>;

    /// Appends a single byte.
    #[inline]
    fn write_u8(&mut self, byte: u8) -> Result<(), BufferError> {
        self.write(&[byte])
    }
}

/// Sequential source of encoded bytes.
pub trait ByteSource {
    /// Reads one byte, failing with [`BufferError::EndOfBuffer`] when the
    /// source is exhausted.
    fn read_u8(&mut self) -> Result<u8, BufferError>;

    /// Fills `dst` completely or fails with [`BufferError::EndOfBuffer`].
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError>;

    /// Reads exactly `len` bytes into a fresh vector.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        let mut out = vec![0u8; len];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Discards exactly `len` bytes.
    fn skip(&mut self, len: usize) -> Result<(), BufferError> {
        let mut scratch = [0u8; 256];
        let mut left = len;
        while left > 0 {
            let n = left.min(scratch.len());
            self.read_into(&mut scratch[..n])?;
            left -= n;
        }
        Ok(())
    }

    /// Returns `true` when no further byte can be read.
    fn is_exhausted(&mut self) -> Result<bool, BufferError>;
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn write_u8(&mut self, byte: u8) -> Result<(), BufferError> {
        self.push(byte);
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        (**self).write(bytes)
    }

    #[inline]
    fn write_u8(&mut self, byte: u8) -> Result<(), BufferError> {
        (**self).write_u8(byte)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_u8(&mut self) -> Result<u8, BufferError> {
        (**self).read_u8()
    }

    #[inline]
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        (**self).read_into(dst)
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        (**self).read_vec(len)
    }

    fn skip(&mut self, len: usize) -> Result<(), BufferError> {
        (**self).skip(len)
    }

    fn is_exhausted(&mut self) -> Result<bool, BufferError> {
        (**self).is_exhausted()
    }
}
