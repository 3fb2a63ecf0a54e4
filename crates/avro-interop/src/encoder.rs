//! Primitive Avro binary encoder.
//!
//! Encoding rules:
//! - null: 0 bytes
//! - boolean: 1 byte (0 or 1)
//! - int/long: zigzag + varint
//! - float: 4 bytes IEEE 754 little-endian
//! - double: 8 bytes IEEE 754 little-endian
//! - bytes/string: long(length) + raw bytes
//! - fixed: raw bytes, length taken from the schema

use avro_interop_buffers::{ByteSink, Writer};

use crate::error::EncodeError;

/// Schema-free Avro encoder writing into a [`ByteSink`].
pub struct AvroEncoder<S = Writer> {
    pub sink: S,
}

impl Default for AvroEncoder<Writer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ByteSink> AvroEncoder<S> {
    pub fn with_sink(sink: S) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    // ---------------------------------------------------------------- varint

    /// Writes a zigzag-encoded signed integer as a varint.
    #[inline]
    pub fn write_int(&mut self, n: i32) -> Result<(), EncodeError> {
        let encoded = ((n << 1) ^ (n >> 31)) as u32;
        self.write_varint_u64(u64::from(encoded))
    }

    /// Writes a zigzag-encoded signed long as a varint.
    #[inline]
    pub fn write_long(&mut self, n: i64) -> Result<(), EncodeError> {
        let encoded = ((n << 1) ^ (n >> 63)) as u64;
        self.write_varint_u64(encoded)
    }

    /// Writes a variable-length unsigned integer (no zigzag).
    pub fn write_varint_u64(&mut self, mut n: u64) -> Result<(), EncodeError> {
        let mut buf = [0u8; 10];
        let mut len = 0;
        loop {
            let low7 = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                buf[len] = low7;
                len += 1;
                break;
            }
            buf[len] = low7 | 0x80;
            len += 1;
        }
        self.sink.write(&buf[..len])?;
        Ok(())
    }

    /// Writes a length or block count.
    #[inline]
    pub fn write_len(&mut self, len: usize) -> Result<(), EncodeError> {
        self.write_long(len as i64)
    }

    // ---------------------------------------------------------------- primitives

    pub fn write_null(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }

    pub fn write_boolean(&mut self, b: bool) -> Result<(), EncodeError> {
        self.sink.write_u8(u8::from(b))?;
        Ok(())
    }

    pub fn write_float(&mut self, f: f32) -> Result<(), EncodeError> {
        self.sink.write(&f.to_bits().to_le_bytes())?;
        Ok(())
    }

    pub fn write_double(&mut self, f: f64) -> Result<(), EncodeError> {
        self.sink.write(&f.to_bits().to_le_bytes())?;
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        self.write_len(data.len())?;
        self.sink.write(data)?;
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        self.write_bytes(s.as_bytes())
    }

    /// Writes raw bytes, which must be exactly `size` long.
    pub fn write_fixed(&mut self, data: &[u8], size: usize) -> Result<(), EncodeError> {
        if data.len() != size {
            return Err(EncodeError::SizeMismatch {
                expected: size,
                actual: data.len(),
            });
        }
        self.sink.write(data)?;
        Ok(())
    }
}

impl AvroEncoder<Writer> {
    pub fn new() -> Self {
        Self::with_sink(Writer::new())
    }

    // ---------------------------------------------------------------- encode top-level

    fn finish(&mut self, written: Result<(), EncodeError>) -> Result<Vec<u8>, EncodeError> {
        match written {
            Ok(()) => Ok(self.sink.flush()),
            Err(err) => {
                self.sink.reset();
                Err(err)
            }
        }
    }

    pub fn encode_boolean(&mut self, b: bool) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_boolean(b);
        self.finish(written)
    }

    pub fn encode_int(&mut self, n: i32) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_int(n);
        self.finish(written)
    }

    pub fn encode_long(&mut self, n: i64) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_long(n);
        self.finish(written)
    }

    pub fn encode_float(&mut self, f: f32) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_float(f);
        self.finish(written)
    }

    pub fn encode_double(&mut self, f: f64) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_double(f);
        self.finish(written)
    }

    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_bytes(data);
        self.finish(written)
    }

    pub fn encode_str(&mut self, s: &str) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_str(s);
        self.finish(written)
    }

    pub fn encode_fixed(&mut self, data: &[u8], size: usize) -> Result<Vec<u8>, EncodeError> {
        let written = self.write_fixed(data, size);
        self.finish(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_ints() {
        let mut enc = AvroEncoder::new();
        assert_eq!(enc.encode_int(0).unwrap(), [0x00]);
        assert_eq!(enc.encode_int(-1).unwrap(), [0x01]);
        assert_eq!(enc.encode_int(1).unwrap(), [0x02]);
        assert_eq!(enc.encode_int(42).unwrap(), [84]);
        assert_eq!(enc.encode_int(-64).unwrap(), [0x7f]);
        assert_eq!(enc.encode_int(64).unwrap(), [0x80, 0x01]);
        assert_eq!(enc.encode_int(300).unwrap(), [0xd8, 0x04]);
        assert_eq!(enc.encode_int(i32::MAX).unwrap(), [0xfe, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(enc.encode_int(i32::MIN).unwrap(), [0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn zigzag_longs() {
        let mut enc = AvroEncoder::new();
        assert_eq!(enc.encode_long(0).unwrap(), [0x00]);
        assert_eq!(enc.encode_long(-2).unwrap(), [0x03]);
        assert_eq!(enc.encode_long(1 << 32).unwrap(), [0x80, 0x80, 0x80, 0x80, 0x20]);
        assert_eq!(
            enc.encode_long(i64::MIN).unwrap(),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
        assert_eq!(
            enc.encode_long(i64::MAX).unwrap(),
            [0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn int_and_long_share_small_encodings() {
        let mut enc = AvroEncoder::new();
        for n in [-1000, -1, 0, 1, 63, 64, 1000] {
            assert_eq!(enc.encode_int(n).unwrap(), enc.encode_long(i64::from(n)).unwrap());
        }
    }

    #[test]
    fn floats_are_little_endian_bit_exact() {
        let mut enc = AvroEncoder::new();
        assert_eq!(enc.encode_float(1.0).unwrap(), [0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(enc.encode_float(-0.0).unwrap(), [0x00, 0x00, 0x00, 0x80]);
        assert_eq!(
            enc.encode_double(1.0).unwrap(),
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f]
        );
        let nan = f64::from_bits(0x7ff8_0000_0000_0001);
        assert_eq!(enc.encode_double(nan).unwrap(), 0x7ff8_0000_0000_0001u64.to_le_bytes());
    }

    #[test]
    fn booleans() {
        let mut enc = AvroEncoder::new();
        assert_eq!(enc.encode_boolean(false).unwrap(), [0x00]);
        assert_eq!(enc.encode_boolean(true).unwrap(), [0x01]);
    }

    #[test]
    fn strings_and_bytes_are_length_prefixed() {
        let mut enc = AvroEncoder::new();
        assert_eq!(enc.encode_str("").unwrap(), [0x00]);
        assert_eq!(enc.encode_str("foo").unwrap(), [0x06, b'f', b'o', b'o']);
        assert_eq!(
            enc.encode_str("\u{1F99E}ke").unwrap(),
            [0x0c, 0xf0, 0x9f, 0xa6, 0x9e, b'k', b'e']
        );
        assert_eq!(enc.encode_bytes(&[1, 2, 3]).unwrap(), [0x06, 1, 2, 3]);
    }

    #[test]
    fn fixed_checks_size() {
        let mut enc = AvroEncoder::new();
        assert_eq!(enc.encode_fixed(&[1, 2], 2).unwrap(), [1, 2]);
        assert_eq!(
            enc.encode_fixed(&[1, 2, 3], 2),
            Err(EncodeError::SizeMismatch {
                expected: 2,
                actual: 3
            })
        );
        // A failed write leaves nothing behind for the next datum.
        assert_eq!(enc.encode_int(1).unwrap(), [0x02]);
    }

    #[test]
    fn writes_into_any_sink() {
        let mut enc = AvroEncoder::with_sink(Vec::new());
        enc.write_int(1).unwrap();
        enc.write_str("a").unwrap();
        enc.write_null().unwrap();
        assert_eq!(enc.into_inner(), [0x02, 0x02, b'a']);
    }
}
