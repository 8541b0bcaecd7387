//! Tags and wire types.

use alloc::vec::Vec;
use core::fmt;

use crate::varint::{Reader, encode_varint};
use crate::{ProtobufError, ProtobufErrorKind};

/// Largest field number a tag can carry.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// How a value is laid out after its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Varint: integers, bools, zigzag-encoded signed integers.
    VarInt = 0,
    /// 8 bytes: doubles and 64-bit fixed integers.
    Double = 1,
    /// Length-delimited: strings, nested messages, map entries, packed lists.
    Len = 2,
    /// 4 bytes: floats and 32-bit fixed integers.
    Single = 5,
}

impl WireType {
    /// The wire type for the low three bits of a tag.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::VarInt),
            1 => Some(WireType::Double),
            2 => Some(WireType::Len),
            5 => Some(WireType::Single),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WireType::VarInt => "varint",
            WireType::Double => "i64",
            WireType::Len => "len",
            WireType::Single => "i32",
        })
    }
}

fn check_field_number(number: u64) -> Result<u32, ProtobufErrorKind> {
    match u32::try_from(number) {
        Ok(number) if (1..=MAX_FIELD_NUMBER).contains(&number) => Ok(number),
        _ => Err(ProtobufErrorKind::InvalidFieldNumber(number)),
    }
}

/// Appends a tag.
pub fn write_tag(number: u32, wire_type: WireType, out: &mut Vec<u8>) -> Result<(), ProtobufError> {
    let number = check_field_number(u64::from(number))?;
    encode_varint((u64::from(number) << 3) | wire_type as u64, out);
    Ok(())
}

/// Reads a tag into its field number and wire type.
pub fn read_tag(reader: &mut Reader<'_>) -> Result<(u32, WireType), ProtobufError> {
    let pos = reader.pos();
    let tag = reader.read_varint()?;
    let wire_type = (tag & 0x7) as u8;
    let wire_type = WireType::from_bits(wire_type)
        .ok_or_else(|| ProtobufError::at(ProtobufErrorKind::InvalidWireType(wire_type), pos))?;
    let number = check_field_number(tag >> 3).map_err(|kind| ProtobufError::at(kind, pos))?;
    Ok((number, wire_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_pack_number_and_wire_type() {
        tessera_testhelpers::setup();
        let mut out = Vec::new();
        write_tag(1, WireType::VarInt, &mut out).unwrap();
        write_tag(2, WireType::Len, &mut out).unwrap();
        write_tag(16, WireType::Double, &mut out).unwrap();
        assert_eq!(out, [0x08, 0x12, 0x81, 0x01]);

        let mut reader = Reader::new(&out);
        assert_eq!(read_tag(&mut reader).unwrap(), (1, WireType::VarInt));
        assert_eq!(read_tag(&mut reader).unwrap(), (2, WireType::Len));
        assert_eq!(read_tag(&mut reader).unwrap(), (16, WireType::Double));
    }

    #[test]
    fn groups_and_zero_numbers_are_rejected() {
        tessera_testhelpers::setup();
        let err = read_tag(&mut Reader::new(&[0x0B])).unwrap_err();
        assert_eq!(err.kind, ProtobufErrorKind::InvalidWireType(3));

        let err = read_tag(&mut Reader::new(&[0x00])).unwrap_err();
        assert_eq!(err.kind, ProtobufErrorKind::InvalidFieldNumber(0));

        let err = write_tag(MAX_FIELD_NUMBER + 1, WireType::VarInt, &mut Vec::new()).unwrap_err();
        assert!(matches!(err.kind, ProtobufErrorKind::InvalidFieldNumber(_)));
    }
}
