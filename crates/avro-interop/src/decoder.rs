//! Primitive Avro binary decoder.

use avro_interop_buffers::{ByteSource, Reader};

use crate::error::DecodeError;

/// Schema-free Avro decoder reading from a [`ByteSource`].
pub struct AvroDecoder<S> {
    pub source: S,
    max_bytes_len: usize,
}

impl<'a> AvroDecoder<Reader<'a>> {
    /// Decoder over an in-memory byte slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(Reader::new(data))
    }
}

impl<S: ByteSource> AvroDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_bytes_len: usize::MAX,
        }
    }

    /// Rejects bytes/string payloads longer than `limit`.
    pub fn with_max_bytes_len(mut self, limit: usize) -> Self {
        self.max_bytes_len = limit;
        self
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Whether the underlying source has no bytes left.
    pub fn is_exhausted(&mut self) -> Result<bool, DecodeError> {
        Ok(self.source.is_exhausted()?)
    }

    // ---------------------------------------------------------------- varint

    /// Reads a variable-length unsigned integer of at most 64 bits.
    pub fn read_varint_u64(&mut self) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        for i in 0..10 {
            let b = self.source.read_u8()?;
            // The tenth byte carries only the top bit.
            if i == 9 && b > 0x01 {
                return Err(DecodeError::Overflow);
            }
            result |= u64::from(b & 0x7f) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::Overflow)
    }

    /// Reads a variable-length unsigned integer of at most 32 bits.
    pub fn read_varint_u32(&mut self) -> Result<u32, DecodeError> {
        let mut result: u32 = 0;
        for i in 0..5 {
            let b = self.source.read_u8()?;
            // The fifth byte carries only the top four bits.
            if i == 4 && b > 0x0f {
                return Err(DecodeError::Overflow);
            }
            result |= u32::from(b & 0x7f) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::Overflow)
    }

    /// Reads a zigzag-decoded signed integer (Avro int).
    pub fn read_int(&mut self) -> Result<i32, DecodeError> {
        let encoded = self.read_varint_u32()?;
        Ok(((encoded >> 1) as i32) ^ -((encoded & 1) as i32))
    }

    /// Reads a zigzag-decoded signed long (Avro long).
    pub fn read_long(&mut self) -> Result<i64, DecodeError> {
        let encoded = self.read_varint_u64()?;
        Ok(((encoded >> 1) as i64) ^ -((encoded & 1) as i64))
    }

    /// Reads a bytes/string length prefix.
    fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = self.read_long()?;
        if len < 0 {
            return Err(DecodeError::NegativeLength(len));
        }
        let len = len as u64;
        match usize::try_from(len) {
            Ok(n) if n <= self.max_bytes_len => Ok(n),
            _ => Err(DecodeError::LimitExceeded {
                what: "bytes length",
                len,
                limit: self.max_bytes_len,
            }),
        }
    }

    /// Reads an array/map block header and returns its item count; `0`
    /// marks the end of the collection. A negative count is followed by the
    /// block's byte size, which is read and discarded.
    pub fn read_block_len(&mut self) -> Result<u64, DecodeError> {
        let count = self.read_long()?;
        if count < 0 {
            let _byte_size = self.read_long()?;
        }
        Ok(count.unsigned_abs())
    }

    // ---------------------------------------------------------------- primitives

    pub fn read_null(&mut self) -> Result<(), DecodeError> {
        Ok(())
    }

    pub fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        match self.source.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBoolean(other)),
        }
    }

    pub fn read_float(&mut self) -> Result<f32, DecodeError> {
        let mut bytes = [0u8; 4];
        self.source.read_into(&mut bytes)?;
        Ok(f32::from_le_bytes(bytes))
    }

    pub fn read_double(&mut self) -> Result<f64, DecodeError> {
        let mut bytes = [0u8; 8];
        self.source.read_into(&mut bytes)?;
        Ok(f64::from_le_bytes(bytes))
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_len()?;
        Ok(self.source.read_vec(len)?)
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn read_fixed(&mut self, size: usize) -> Result<Vec<u8>, DecodeError> {
        Ok(self.source.read_vec(size)?)
    }

    // ---------------------------------------------------------------- skipping

    pub fn skip_long(&mut self) -> Result<(), DecodeError> {
        self.read_varint_u64().map(|_| ())
    }

    /// Skips a bytes or string value.
    pub fn skip_bytes(&mut self) -> Result<(), DecodeError> {
        let len = self.read_len()?;
        Ok(self.source.skip(len)?)
    }

    pub fn skip_fixed(&mut self, size: usize) -> Result<(), DecodeError> {
        Ok(self.source.skip(size)?)
    }

    pub fn skip_float(&mut self) -> Result<(), DecodeError> {
        Ok(self.source.skip(4)?)
    }

    pub fn skip_double(&mut self) -> Result<(), DecodeError> {
        Ok(self.source.skip(8)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_zigzag_varints() {
        let data = [0x00, 0x01, 0x02, 84, 0xd8, 0x04, 0xff, 0xff, 0xff, 0xff, 0x0f];
        let mut dec = AvroDecoder::from_slice(&data);
        assert_eq!(dec.read_int(), Ok(0));
        assert_eq!(dec.read_int(), Ok(-1));
        assert_eq!(dec.read_int(), Ok(1));
        assert_eq!(dec.read_int(), Ok(42));
        assert_eq!(dec.read_int(), Ok(300));
        assert_eq!(dec.read_int(), Ok(i32::MIN));
        assert!(dec.is_exhausted().unwrap());
    }

    #[test]
    fn reads_extreme_longs() {
        let data = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01, //
            0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01,
        ];
        let mut dec = AvroDecoder::from_slice(&data);
        assert_eq!(dec.read_long(), Ok(i64::MIN));
        assert_eq!(dec.read_long(), Ok(i64::MAX));
    }

    #[test]
    fn int_overflow_is_detected() {
        let too_wide = [0xff, 0xff, 0xff, 0xff, 0x1f];
        assert_eq!(AvroDecoder::from_slice(&too_wide).read_int(), Err(DecodeError::Overflow));
        let too_long = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert_eq!(AvroDecoder::from_slice(&too_long).read_int(), Err(DecodeError::Overflow));
        // The same bytes are a valid long.
        assert_eq!(AvroDecoder::from_slice(&too_wide).read_long(), Ok(-(1i64 << 32)));
    }

    #[test]
    fn long_overflow_is_detected() {
        let data = [0xff; 11];
        assert_eq!(AvroDecoder::from_slice(&data).read_long(), Err(DecodeError::Overflow));
        let tenth_too_big = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert_eq!(
            AvroDecoder::from_slice(&tenth_too_big).read_long(),
            Err(DecodeError::Overflow)
        );
    }

    #[test]
    fn truncated_varint() {
        assert_eq!(AvroDecoder::from_slice(&[0x80]).read_int(), Err(DecodeError::TruncatedInput));
        assert_eq!(AvroDecoder::from_slice(&[]).read_long(), Err(DecodeError::TruncatedInput));
    }

    #[test]
    fn booleans_are_strict() {
        let mut dec = AvroDecoder::from_slice(&[0x00, 0x01, 0x02]);
        assert_eq!(dec.read_boolean(), Ok(false));
        assert_eq!(dec.read_boolean(), Ok(true));
        assert_eq!(dec.read_boolean(), Err(DecodeError::InvalidBoolean(0x02)));
    }

    #[test]
    fn floats_keep_their_bits() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-0.0f32).to_le_bytes());
        data.extend_from_slice(&f64::from_bits(0x7ff8_0000_0000_0001).to_le_bytes());
        let mut dec = AvroDecoder::from_slice(&data);
        assert_eq!(dec.read_float().unwrap().to_bits(), (-0.0f32).to_bits());
        assert_eq!(dec.read_double().unwrap().to_bits(), 0x7ff8_0000_0000_0001);
        assert_eq!(dec.read_double(), Err(DecodeError::TruncatedInput));
    }

    #[test]
    fn strings() {
        let data = [0x0c, 0xf0, 0x9f, 0xa6, 0x9e, b'k', b'e', 0x02, 0xff];
        let mut dec = AvroDecoder::from_slice(&data);
        assert_eq!(dec.read_string().as_deref(), Ok("\u{1F99E}ke"));
        assert_eq!(dec.read_string(), Err(DecodeError::InvalidUtf8));
    }

    #[test]
    fn lengths_are_validated() {
        assert_eq!(
            AvroDecoder::from_slice(&[0x01]).read_bytes(),
            Err(DecodeError::NegativeLength(-1))
        );
        assert_eq!(
            AvroDecoder::from_slice(&[0x08, 1, 2]).read_bytes(),
            Err(DecodeError::TruncatedInput)
        );
        assert_eq!(
            AvroDecoder::from_slice(&[0x08, 1, 2, 3, 4])
                .with_max_bytes_len(3)
                .read_bytes(),
            Err(DecodeError::LimitExceeded {
                what: "bytes length",
                len: 4,
                limit: 3
            })
        );
    }

    #[test]
    fn block_headers() {
        // 2 items; -3 items with a 9 byte block size; end.
        let mut dec = AvroDecoder::from_slice(&[0x04, 0x05, 0x12, 0x00]);
        assert_eq!(dec.read_block_len(), Ok(2));
        assert_eq!(dec.read_block_len(), Ok(3));
        assert_eq!(dec.read_block_len(), Ok(0));
    }

    #[test]
    fn skipping() {
        let data = [0xd8, 0x04, 0x04, b'h', b'i', 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02];
        let mut dec = AvroDecoder::from_slice(&data);
        dec.skip_long().unwrap();
        dec.skip_bytes().unwrap();
        dec.skip_fixed(2).unwrap();
        dec.skip_float().unwrap();
        dec.skip_double().unwrap();
        assert_eq!(dec.read_int(), Ok(1));
        assert_eq!(dec.skip_double(), Err(DecodeError::TruncatedInput));
    }
}
