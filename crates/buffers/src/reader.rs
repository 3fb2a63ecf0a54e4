//! Slice-backed byte source with cursor tracking.

use crate::{BufferError, ByteSource};

/// A binary buffer reader over a borrowed byte slice.
///
/// Every read is bounds-checked and leaves the cursor untouched on failure.
///
/// # Example
///
/// ```
/// use avro_interop_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.buf(2), Ok(&[0x02, 0x03][..]));
/// assert!(reader.u8().is_err());
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Checks that `n` more bytes are available from the current cursor.
    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if n > self.size() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Returns a subslice of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        self.x += size;
        Ok(&self.uint8[x..x + size])
    }
}

impl ByteSource for Reader<'_> {
    #[inline]
    fn read_u8(&mut self) -> Result<u8, BufferError> {
        self.u8()
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        dst.copy_from_slice(self.buf(dst.len())?);
        Ok(())
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        // Bounds check precedes allocation, so a corrupt length cannot
        // trigger a huge allocation.
        Ok(self.buf(len)?.to_vec())
    }

    fn skip(&mut self, len: usize) -> Result<(), BufferError> {
        self.check(len)?;
        self.x += len;
        Ok(())
    }

    fn is_exhausted(&mut self) -> Result<bool, BufferError> {
        Ok(self.size() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u8(), Ok(0x02));
        assert_eq!(reader.u8(), Ok(0x03));
        assert_eq!(reader.u8(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_u8_end_of_buffer_keeps_cursor() {
        let data: [u8; 0] = [];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.x, 0);
    }

    #[test]
    fn test_buf_partial_fails_without_advancing() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.buf(3), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.x, 0);
        assert_eq!(reader.buf(2), Ok(&data[..]));
    }

    #[test]
    fn test_skip_and_exhaustion() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        reader.skip(2).unwrap();
        assert_eq!(reader.read_u8(), Ok(0x03));
        assert!(!reader.is_exhausted().unwrap());
        assert_eq!(reader.skip(2), Err(BufferError::EndOfBuffer));
        reader.skip(1).unwrap();
        assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn test_read_vec_rejects_oversized_length() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_vec(usize::MAX), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.read_vec(2), Ok(vec![0x01, 0x02]));
    }}
