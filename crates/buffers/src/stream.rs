//! `std::io` adapters for streamed encode/decode.

use std::io::{self, Read, Write};

use crate::{BufferError, ByteSink, ByteSource};

/// Chunk size used when reading a length-prefixed payload from a stream.
const READ_CHUNK: usize = 8 * 1024;

/// [`ByteSource`] over any [`Read`] implementation.
///
/// Holds at most one byte of lookahead so [`ByteSource::is_exhausted`] can be
/// answered without consuming input.
pub struct IoSource<R> {
    inner: R,
    peeked: Option<u8>,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill_one(&mut self) -> Result<Option<u8>, BufferError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_u8(&mut self) -> Result<u8, BufferError> {
        if let Some(byte) = self.peeked.take() {
            return Ok(byte);
        }
        self.fill_one()?.ok_or(BufferError::EndOfBuffer)
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        if dst.is_empty() {
            return Ok(());
        }
        let mut start = 0;
        if let Some(byte) = self.peeked.take() {
            dst[0] = byte;
            start = 1;
        }
        self.inner.read_exact(&mut dst[start..])?;
        Ok(())
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        // Grow with the data actually received instead of trusting `len`.
        let mut out = Vec::with_capacity(len.min(READ_CHUNK));
        let mut left = len;
        let mut chunk = [0u8; READ_CHUNK];
        while left > 0 {
            let n = left.min(READ_CHUNK);
            self.read_into(&mut chunk[..n])?;
            out.extend_from_slice(&chunk[..n]);
            left -= n;
        }
        Ok(out)
    }

    fn is_exhausted(&mut self) -> Result<bool, BufferError> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        self.peeked = self.fill_one()?;
        Ok(self.peeked.is_none())
    }
}

/// [`ByteSink`] over any [`Write`] implementation.
pub struct IoSink<W> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), BufferError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.inner.write_all(bytes)?;
        Ok(())
    }
}
