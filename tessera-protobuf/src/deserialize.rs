use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use tessera::{
    DecodedKind, DeserializeError, Deserializer, Deformatter, Dict, EnumKind, FieldDescriptor,
    FieldType, FloatEncoding, IntEncoding, Key, ScalarKind, Sequence, Value,
};
use tracing::{debug, trace};

use crate::numbering::FieldNumbers;
use crate::serialize::{MAP_KEY, MAP_VALUE};
use crate::varint::{Reader, zigzag_decode, zigzag_decode32};
use crate::wire::{WireType, read_tag};
use crate::{ProtobufError, ProtobufErrorKind};

/// One undecoded value, as laid out on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A varint.
    Varint(u64),
    /// 8 fixed bytes.
    Fixed64(u64),
    /// 4 fixed bytes.
    Fixed32(u32),
    /// A length-delimited payload.
    Bytes(Vec<u8>),
}

impl RawValue {
    /// The wire type the value was read with.
    pub fn wire_type(&self) -> WireType {
        match self {
            RawValue::Varint(_) => WireType::VarInt,
            RawValue::Fixed64(_) => WireType::Double,
            RawValue::Fixed32(_) => WireType::Single,
            RawValue::Bytes(_) => WireType::Len,
        }
    }
}

/// A parsed message whose fields are claimed as they are read.
///
/// Values are grouped by field number. Reading a field takes its values
/// out, so a number read twice is absent the second time.
#[derive(Debug, Clone, Default)]
pub struct ProtobufMessage {
    fields: BTreeMap<u32, Vec<RawValue>>,
    numbers: FieldNumbers,
    at_root: bool,
}

impl ProtobufMessage {
    /// Splits a message into its fields.
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtobufError> {
        let mut reader = Reader::new(bytes);
        let mut fields: BTreeMap<u32, Vec<RawValue>> = BTreeMap::new();
        while !reader.is_empty() {
            let (number, wire_type) = read_tag(&mut reader)?;
            let raw = match wire_type {
                WireType::VarInt => RawValue::Varint(reader.read_varint()?),
                WireType::Double => RawValue::Fixed64(reader.read_fixed64()?),
                WireType::Len => RawValue::Bytes(reader.read_len_delimited()?.to_vec()),
                WireType::Single => RawValue::Fixed32(reader.read_fixed32()?),
            };
            fields.entry(number).or_default().push(raw);
        }
        Ok(ProtobufMessage {
            fields,
            ..Self::default()
        })
    }

    /// The values still unread for a field number.
    pub fn get(&self, number: u32) -> Option<&[RawValue]> {
        self.fields.get(&number).map(Vec::as_slice)
    }

    fn single(number: u32, raw: RawValue) -> Self {
        let mut message = Self::default();
        message.fields.insert(number, alloc::vec![raw]);
        message
    }

    /// Claims the next field number and its value. The last occurrence of a
    /// non-repeated field wins.
    fn take(&mut self, field: &FieldDescriptor) -> Option<(u32, RawValue)> {
        let number = self.numbers.assign(field);
        let raw = self.fields.remove(&number)?.pop()?;
        Some((number, raw))
    }

    fn take_all(&mut self, field: &FieldDescriptor) -> (u32, Option<Vec<RawValue>>) {
        self.at_root = false;
        let number = self.numbers.assign(field);
        (number, self.fields.remove(&number))
    }
}

/// Reads protobuf messages into objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufDeformatter;

fn mismatch(number: u32, expected: WireType, found: &RawValue) -> ProtobufError {
    ProtobufErrorKind::WireTypeMismatch {
        field: number,
        expected,
        found: found.wire_type(),
    }
    .into()
}

fn unsigned(value: u64, encoding: IntEncoding) -> Result<i64, ProtobufError> {
    i64::try_from(value).map_err(|_| {
        ProtobufErrorKind::ValueOutOfRange {
            value: i128::from(value),
            encoding,
        }
        .into()
    })
}

fn int_wire_type(encoding: IntEncoding) -> WireType {
    match encoding {
        IntEncoding::Fixed64 | IntEncoding::SFixed64 => WireType::Double,
        IntEncoding::Fixed32 | IntEncoding::SFixed32 => WireType::Single,
        _ => WireType::VarInt,
    }
}

fn float_wire_type(encoding: FloatEncoding) -> WireType {
    match encoding {
        FloatEncoding::Double => WireType::Double,
        FloatEncoding::Float => WireType::Single,
    }
}

fn decode_int(number: u32, raw: RawValue, encoding: IntEncoding) -> Result<i64, ProtobufError> {
    match (raw, encoding) {
        (RawValue::Varint(v), IntEncoding::SInt64) => Ok(zigzag_decode(v)),
        (RawValue::Varint(v), IntEncoding::SInt32) => Ok(i64::from(zigzag_decode32(v as u32))),
        (RawValue::Varint(v), IntEncoding::Int32) => Ok(i64::from(v as u32 as i32)),
        (RawValue::Varint(v), IntEncoding::UInt32) => Ok(i64::from(v as u32)),
        (RawValue::Varint(v) | RawValue::Fixed64(v), IntEncoding::UInt64 | IntEncoding::Fixed64) => {
            unsigned(v, encoding)
        }
        (RawValue::Varint(v) | RawValue::Fixed64(v), _) => Ok(v as i64),
        (
            RawValue::Fixed32(v),
            IntEncoding::SFixed32 | IntEncoding::Int32 | IntEncoding::SInt32,
        ) => Ok(i64::from(v as i32)),
        (RawValue::Fixed32(v), _) => Ok(i64::from(v)),
        (raw @ RawValue::Bytes(_), _) => Err(mismatch(number, int_wire_type(encoding), &raw)),
    }
}

/// How a packed repeated field lays out its elements.
#[derive(Debug, Clone, Copy)]
enum Packing {
    Varint,
    Fixed64,
    Fixed32,
}

fn packing(element: &FieldDescriptor) -> Option<Packing> {
    let wire_type = match element.field_type {
        FieldType::Scalar(ScalarKind::Int) => int_wire_type(element.int_encoding()),
        FieldType::Scalar(ScalarKind::Float) => float_wire_type(element.float_encoding()),
        FieldType::Scalar(ScalarKind::Bool) | FieldType::Enum(EnumKind::Int) => WireType::VarInt,
        _ => return None,
    };
    Some(match wire_type {
        WireType::Double => Packing::Fixed64,
        WireType::Single => Packing::Fixed32,
        _ => Packing::Varint,
    })
}

fn unpack(bytes: &[u8], packing: Packing, out: &mut Vec<RawValue>) -> Result<(), ProtobufError> {
    let mut reader = Reader::new(bytes);
    while !reader.is_empty() {
        out.push(match packing {
            Packing::Varint => RawValue::Varint(reader.read_varint()?),
            Packing::Fixed64 => RawValue::Fixed64(reader.read_fixed64()?),
            Packing::Fixed32 => RawValue::Fixed32(reader.read_fixed32()?),
        });
    }
    Ok(())
}

impl Deformatter for ProtobufDeformatter {
    type Input<'i> = &'i [u8];
    type Decoded = ProtobufMessage;

    fn format(&self) -> &'static str {
        "protobuf"
    }

    fn init(&self, input: Self::Input<'_>) -> Result<Self::Decoded, DeserializeError> {
        let mut message = ProtobufMessage::parse(input)?;
        message.at_root = true;
        debug!(bytes = input.len(), fields = message.fields.len(), "protobuf message read");
        Ok(message)
    }

    fn deserialize_int(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        let Some((number, raw)) = decoded.take(field) else {
            return Ok(None);
        };
        let value = decode_int(number, raw, field.int_encoding())?;
        Ok(Some(Value::Int(value)))
    }

    fn deserialize_float(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        let Some((number, raw)) = decoded.take(field) else {
            return Ok(None);
        };
        let value = match raw {
            RawValue::Fixed64(bits) => f64::from_bits(bits),
            RawValue::Fixed32(bits) => f64::from(f32::from_bits(bits)),
            raw => {
                let expected = float_wire_type(field.float_encoding());
                return Err(mismatch(number, expected, &raw).into());
            }
        };
        Ok(Some(Value::Float(value)))
    }

    fn deserialize_bool(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        match decoded.take(field) {
            None => Ok(None),
            Some((_, RawValue::Varint(v))) => Ok(Some(Value::Bool(v != 0))),
            Some((number, raw)) => Err(mismatch(number, WireType::VarInt, &raw).into()),
        }
    }

    fn deserialize_string(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        match decoded.take(field) {
            None => Ok(None),
            Some((_, RawValue::Bytes(bytes))) => String::from_utf8(bytes)
                .map(|s| Some(Value::String(s)))
                .map_err(|_| ProtobufErrorKind::InvalidUtf8.into()),
            Some((number, raw)) => Err(mismatch(number, WireType::Len, &raw).into()),
        }
    }

    fn deserialize_sequence(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
        deserializer: &mut Deserializer<'_, Self>,
    ) -> Result<Option<Sequence>, DeserializeError> {
        let (number, Some(raws)) = decoded.take_all(field) else {
            return Ok(None);
        };
        let packing = packing(&field.element_field(&Key::Int(0)));

        let mut elements = Vec::with_capacity(raws.len());
        for raw in raws {
            match (raw, packing) {
                (RawValue::Bytes(bytes), Some(packing)) => unpack(&bytes, packing, &mut elements)?,
                (raw, _) => elements.push(raw),
            }
        }
        trace!(field = %field.name, number, len = elements.len(), "repeated");

        let mut sequence = Sequence::new();
        for (index, raw) in elements.into_iter().enumerate() {
            let mut element = field.element_field(&Key::Int(index as i64));
            element.field_number = Some(1);
            let mut item = ProtobufMessage::single(1, raw);
            let value = deserializer
                .deserialize(&mut item, &element)?
                .unwrap_or(Value::Null);
            sequence.push(element, value);
        }
        Ok(Some(sequence))
    }

    fn deserialize_dictionary(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
        deserializer: &mut Deserializer<'_, Self>,
    ) -> Result<Option<Dict>, DeserializeError> {
        let (number, Some(raws)) = decoded.take_all(field) else {
            return Ok(None);
        };
        trace!(field = %field.name, number, len = raws.len(), "map");

        let mut dict = Dict::new();
        for raw in raws {
            let RawValue::Bytes(bytes) = raw else {
                return Err(mismatch(number, WireType::Len, &raw).into());
            };
            let mut entry = ProtobufMessage::parse(&bytes)?;
            let key = match entry.fields.remove(&MAP_KEY).and_then(|mut raws| raws.pop()) {
                Some(RawValue::Varint(v)) => Key::Int(v as i64),
                Some(RawValue::Bytes(bytes)) => {
                    Key::String(String::from_utf8(bytes).map_err(|_| ProtobufErrorKind::InvalidUtf8)?)
                }
                _ => return Err(ProtobufErrorKind::InvalidMapKey.into()),
            };
            let mut value_field = field.element_field(&key);
            value_field.field_number = Some(MAP_VALUE);
            let value = deserializer
                .deserialize(&mut entry, &value_field)?
                .unwrap_or(Value::Null);
            dict.push(key, value_field, value);
        }
        Ok(Some(dict))
    }

    fn deserialize_object(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Self::Decoded>, DeserializeError> {
        if core::mem::take(&mut decoded.at_root) {
            return Ok(Some(ProtobufMessage {
                fields: core::mem::take(&mut decoded.fields),
                ..ProtobufMessage::default()
            }));
        }
        match decoded.take(field) {
            None => Ok(None),
            Some((_, RawValue::Bytes(bytes))) => Ok(Some(ProtobufMessage::parse(&bytes)?)),
            Some((number, raw)) => Err(mismatch(number, WireType::Len, &raw).into()),
        }
    }

    fn introspect(&self, decoded: &Self::Decoded, field: &FieldDescriptor) -> Option<DecodedKind> {
        let number = decoded.numbers.peek(field);
        let Some(raws) = decoded.fields.get(&number) else {
            return Some(DecodedKind::Missing);
        };
        if raws.len() > 1 {
            return Some(DecodedKind::Sequence);
        }
        let suggested = field.mixed_settings().and_then(|m| m.suggested).is_some();
        Some(match raws.last()? {
            RawValue::Varint(_) => DecodedKind::Scalar(ScalarKind::Int),
            RawValue::Fixed64(_) | RawValue::Fixed32(_) => DecodedKind::Scalar(ScalarKind::Float),
            RawValue::Bytes(_) if suggested => DecodedKind::Dictionary,
            RawValue::Bytes(_) => DecodedKind::Scalar(ScalarKind::String),
        })
    }
}
