use alloc::vec::Vec;

use tessera::{
    Dict, FieldDescriptor, FloatEncoding, Formatter, IntEncoding, Key, ScalarKind, SerializeError,
    Sequence, Serializer,
};
use tracing::{debug, trace};

use crate::numbering::FieldNumbers;
use crate::varint::{encode_varint, zigzag_encode, zigzag_encode32};
use crate::wire::{WireType, write_tag};
use crate::{ProtobufError, ProtobufErrorKind};

/// Map entries keep their key in field 1 and their value in field 2.
pub(crate) const MAP_KEY: u32 = 1;
pub(crate) const MAP_VALUE: u32 = 2;

/// Writes objects as protobuf messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufFormatter;

/// A message being written.
#[derive(Debug, Clone)]
pub struct ProtobufBuffer {
    bytes: Vec<u8>,
    numbers: FieldNumbers,
    at_root: bool,
}

impl ProtobufBuffer {
    fn new(at_root: bool) -> Self {
        ProtobufBuffer {
            bytes: Vec::new(),
            numbers: FieldNumbers::new(),
            at_root,
        }
    }

    /// The bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn tag(&mut self, field: &FieldDescriptor, wire_type: WireType) -> Result<(), ProtobufError> {
        let number = self.numbers.assign(field);
        write_tag(number, wire_type, &mut self.bytes)
    }

    fn frame(&mut self, number: u32, payload: &[u8]) -> Result<(), ProtobufError> {
        write_tag(number, WireType::Len, &mut self.bytes)?;
        encode_varint(payload.len() as u64, &mut self.bytes);
        self.bytes.extend_from_slice(payload);
        Ok(())
    }
}

fn out_of_range(value: i64, encoding: IntEncoding) -> ProtobufError {
    ProtobufErrorKind::ValueOutOfRange {
        value: i128::from(value),
        encoding,
    }
    .into()
}

fn to_i32(value: i64, encoding: IntEncoding) -> Result<i32, ProtobufError> {
    i32::try_from(value).map_err(|_| out_of_range(value, encoding))
}

fn to_u32(value: i64, encoding: IntEncoding) -> Result<u32, ProtobufError> {
    u32::try_from(value).map_err(|_| out_of_range(value, encoding))
}

fn to_u64(value: i64, encoding: IntEncoding) -> Result<u64, ProtobufError> {
    u64::try_from(value).map_err(|_| out_of_range(value, encoding))
}

impl Formatter for ProtobufFormatter {
    type Running = ProtobufBuffer;
    type Output = Vec<u8>;

    fn format(&self) -> &'static str {
        "protobuf"
    }

    fn init(&self, _root: &FieldDescriptor) -> Self::Running {
        ProtobufBuffer::new(true)
    }

    fn finalize(&self, running: Self::Running) -> Result<Self::Output, SerializeError> {
        debug!(bytes = running.bytes.len(), "protobuf message written");
        Ok(running.bytes)
    }

    fn serialize_int(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: i64,
    ) -> Result<(), SerializeError> {
        let encoding = field.int_encoding();
        match encoding {
            IntEncoding::Int64 => {
                running.tag(field, WireType::VarInt)?;
                encode_varint(value as u64, &mut running.bytes);
            }
            IntEncoding::Int32 => {
                // negative int32 values are sign-extended to ten bytes
                let value = to_i32(value, encoding)?;
                running.tag(field, WireType::VarInt)?;
                encode_varint(i64::from(value) as u64, &mut running.bytes);
            }
            IntEncoding::UInt64 => {
                let value = to_u64(value, encoding)?;
                running.tag(field, WireType::VarInt)?;
                encode_varint(value, &mut running.bytes);
            }
            IntEncoding::UInt32 => {
                let value = to_u32(value, encoding)?;
                running.tag(field, WireType::VarInt)?;
                encode_varint(u64::from(value), &mut running.bytes);
            }
            IntEncoding::SInt64 => {
                running.tag(field, WireType::VarInt)?;
                encode_varint(zigzag_encode(value), &mut running.bytes);
            }
            IntEncoding::SInt32 => {
                let value = to_i32(value, encoding)?;
                running.tag(field, WireType::VarInt)?;
                encode_varint(u64::from(zigzag_encode32(value)), &mut running.bytes);
            }
            IntEncoding::Fixed64 => {
                let value = to_u64(value, encoding)?;
                running.tag(field, WireType::Double)?;
                running.bytes.extend_from_slice(&value.to_le_bytes());
            }
            IntEncoding::Fixed32 => {
                let value = to_u32(value, encoding)?;
                running.tag(field, WireType::Single)?;
                running.bytes.extend_from_slice(&value.to_le_bytes());
            }
            IntEncoding::SFixed64 => {
                running.tag(field, WireType::Double)?;
                running.bytes.extend_from_slice(&value.to_le_bytes());
            }
            IntEncoding::SFixed32 => {
                let value = to_i32(value, encoding)?;
                running.tag(field, WireType::Single)?;
                running.bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        Ok(())
    }

    fn serialize_float(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: f64,
    ) -> Result<(), SerializeError> {
        match field.float_encoding() {
            FloatEncoding::Double => {
                running.tag(field, WireType::Double)?;
                running.bytes.extend_from_slice(&value.to_le_bytes());
            }
            FloatEncoding::Float => {
                running.tag(field, WireType::Single)?;
                running.bytes.extend_from_slice(&(value as f32).to_le_bytes());
            }
        }
        Ok(())
    }

    fn serialize_bool(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: bool,
    ) -> Result<(), SerializeError> {
        running.tag(field, WireType::VarInt)?;
        encode_varint(u64::from(value), &mut running.bytes);
        Ok(())
    }

    fn serialize_string(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: &str,
    ) -> Result<(), SerializeError> {
        let number = running.numbers.assign(field);
        running.frame(number, value.as_bytes())?;
        Ok(())
    }

    fn serialize_null(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
    ) -> Result<(), SerializeError> {
        let number = running.numbers.assign(field);
        trace!(field = %field.name, number, "null");
        Ok(())
    }

    fn serialize_sequence(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        sequence: &Sequence,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError> {
        running.at_root = false;
        let number = running.numbers.assign(field);
        running.numbers.lock(number)?;
        trace!(field = %field.name, number, len = sequence.len(), "repeated");
        let result = sequence
            .iter()
            .try_for_each(|item| serializer.serialize(running, &item.field, &item.value));
        running.numbers.unlock();
        result
    }

    fn serialize_dictionary(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        dict: &Dict,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError> {
        running.at_root = false;
        if running.numbers.is_locked() {
            let field = running.numbers.peek(field);
            return Err(ProtobufErrorKind::NestedRepeated { field }.into());
        }
        let number = running.numbers.assign(field);
        trace!(field = %field.name, number, len = dict.len(), "map");

        for item in dict {
            let mut entry = ProtobufBuffer::new(false);
            match &item.key {
                Key::Int(i) => {
                    let key = FieldDescriptor::scalar("key", ScalarKind::Int)
                        .field_number(MAP_KEY)
                        .build();
                    self.serialize_int(&mut entry, &key, *i)?;
                }
                Key::String(s) => {
                    let key = FieldDescriptor::scalar("key", ScalarKind::String)
                        .field_number(MAP_KEY)
                        .build();
                    self.serialize_string(&mut entry, &key, s)?;
                }
            }

            let mut value_field = item.field.clone();
            value_field.field_number = Some(MAP_VALUE);
            serializer.serialize(&mut entry, &value_field, &item.value)?;

            running.frame(number, &entry.bytes)?;
        }
        Ok(())
    }

    fn serialize_object(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        dict: &Dict,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError> {
        if core::mem::take(&mut running.at_root) {
            // the top-level message has no enclosing tag
            for item in dict {
                serializer.serialize(running, &item.field, &item.value)?;
            }
            return Ok(());
        }

        let number = running.numbers.assign(field);
        let mut message = ProtobufBuffer::new(false);
        for item in dict {
            serializer.serialize(&mut message, &item.field, &item.value)?;
        }
        trace!(field = %field.name, number, bytes = message.bytes.len(), "message");
        running.frame(number, &message.bytes)?;
        Ok(())
    }
}
