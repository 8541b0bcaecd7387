//! Base-128 varints, zigzag and fixed-width reads.

use alloc::vec::Vec;

use crate::{ProtobufError, ProtobufErrorKind};

/// Appends `value` as a varint.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Maps signed values onto unsigned ones so small magnitudes stay small.
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// 32-bit zigzag.
pub fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode32`].
pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// A cursor over an input buffer.
#[derive(Debug, Clone)]
pub struct Reader<'i> {
    input: &'i [u8],
    pos: usize,
}

impl<'i> Reader<'i> {
    /// A reader at the start of `input`.
    pub fn new(input: &'i [u8]) -> Self {
        Reader { input, pos: 0 }
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether the whole input has been read.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn eof(&self) -> ProtobufError {
        ProtobufError::at(ProtobufErrorKind::UnexpectedEof, self.pos)
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> Result<u8, ProtobufError> {
        let byte = *self.input.get(self.pos).ok_or_else(|| self.eof())?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a varint, rejecting anything longer than 64 bits.
    pub fn read_varint(&mut self) -> Result<u64, ProtobufError> {
        let start = self.pos;
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return Err(ProtobufError::at(ProtobufErrorKind::VarintOverflow, start));
            }
            let byte = self.read_byte()?;
            let data = u64::from(byte & 0x7F);
            // the tenth byte only has room for the top bit
            if shift == 63 && data > 1 {
                return Err(ProtobufError::at(ProtobufErrorKind::VarintOverflow, start));
            }
            result |= data << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'i [u8], ProtobufError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| self.eof())?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a varint length prefix followed by that many bytes.
    pub fn read_len_delimited(&mut self) -> Result<&'i [u8], ProtobufError> {
        let start = self.pos;
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| ProtobufError::at(ProtobufErrorKind::LengthOverflow(len), start))?;
        self.read_bytes(len)
    }

    /// Reads 4 little-endian bytes.
    pub fn read_fixed32(&mut self) -> Result<u32, ProtobufError> {
        let bytes = self.read_bytes(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads 8 little-endian bytes.
    pub fn read_fixed64(&mut self) -> Result<u64, ProtobufError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_varint(value, &mut out);
        out
    }

    #[test]
    fn varints_round_trip_at_the_boundaries() {
        tessera_testhelpers::setup();
        for value in [0, 1, 127, 128, 300, u64::from(u32::MAX), i64::MAX as u64, u64::MAX] {
            let bytes = encode(value);
            let mut reader = Reader::new(&bytes);
            assert_eq!(
                reader.read_varint().unwrap(),
                value,
                "{}",
                tessera_testhelpers::hex(&bytes)
            );
            assert!(reader.is_empty());
        }
        assert_eq!(encode(127), [0x7F]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(150), [0x96, 0x01]);
        assert_eq!(encode(u64::MAX).len(), 10);
    }

    #[test]
    fn unterminated_varints_fail() {
        tessera_testhelpers::setup();
        let err = Reader::new(&[0x80; 16]).read_varint().unwrap_err();
        assert_eq!(err.kind, ProtobufErrorKind::VarintOverflow);

        let err = Reader::new(&[0x80, 0x80]).read_varint().unwrap_err();
        assert_eq!(err, ProtobufError::at(ProtobufErrorKind::UnexpectedEof, 2));

        // ten bytes whose last one carries more than the 64th bit
        let mut bytes = [0xFF; 10];
        bytes[9] = 0x02;
        let err = Reader::new(&bytes).read_varint().unwrap_err();
        assert_eq!(err.kind, ProtobufErrorKind::VarintOverflow);
    }

    #[test]
    fn zigzag_keeps_small_negatives_small() {
        tessera_testhelpers::setup();
        for n in -1000i64..=1000 {
            assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }
        for n in [i64::MIN, i64::MAX, i64::MIN + 1] {
            assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }
        for n in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(zigzag_decode32(zigzag_encode32(n)), n);
        }
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(encode(zigzag_encode(-1)).len(), 1);
        assert_eq!(encode(-1i64 as u64).len(), 10);
    }

    #[test]
    fn fixed_widths_are_little_endian() {
        tessera_testhelpers::setup();
        let mut reader = Reader::new(&[1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(reader.read_fixed32().unwrap(), 1);
        assert_eq!(reader.read_fixed64().unwrap(), 2);
        assert!(reader.read_fixed32().is_err());
    }
}
