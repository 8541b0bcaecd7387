use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use tessera::{
    ClassDescriptor, DeserializeError, DeserializeOptions, Describe, DictionaryField, ElementType,
    EnumDescriptor, EnumKind, FieldDescriptor, FloatEncoding, IntEncoding, ReflectEnum, Registry,
    ScalarKind, SequenceField, SerializeError, StaticTypeMap, Tessera, TimeResolution, Value,
};
use tessera_protobuf::{
    ProtobufDeformatter, ProtobufError, ProtobufErrorKind, WireType, from_slice, to_vec,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Counter {
    count: i64,
}

tessera::reflect_fields!(Counter { count });

impl Describe for Counter {
    const TYPE_NAME: &'static str = "Counter";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Counter")
            .field(FieldDescriptor::scalar("count", ScalarKind::Int))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Profile {
    nickname: Option<String>,
    age: i64,
}

tessera::reflect_fields!(Profile { nickname, age });

impl Describe for Profile {
    const TYPE_NAME: &'static str = "Profile";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Profile")
            .field(FieldDescriptor::scalar("nickname", ScalarKind::String).nullable())
            .field(FieldDescriptor::scalar("age", ScalarKind::Int))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Pinned {
    a: i64,
    b: i64,
}

tessera::reflect_fields!(Pinned { a, b });

impl Describe for Pinned {
    const TYPE_NAME: &'static str = "Pinned";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Pinned")
            .field(FieldDescriptor::scalar("a", ScalarKind::Int).field_number(5))
            .field(FieldDescriptor::scalar("b", ScalarKind::Int))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Address {
    city: String,
    zip: Option<String>,
}

tessera::reflect_fields!(Address { city, zip });
tessera::object_value!(Address);

impl Describe for Address {
    const TYPE_NAME: &'static str = "Address";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Address")
            .field(FieldDescriptor::scalar("city", ScalarKind::String))
            .field(FieldDescriptor::scalar("zip", ScalarKind::String).nullable())
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Customer {
    name: String,
    home: Option<Address>,
    billing: Option<Address>,
    tags: Vec<String>,
    scores: IndexMap<String, i64>,
    visits: Vec<i64>,
}

tessera::reflect_fields!(Customer { name, home, billing, tags, scores, visits });

impl Describe for Customer {
    const TYPE_NAME: &'static str = "Customer";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Customer")
            .field(FieldDescriptor::scalar("name", ScalarKind::String))
            .field(FieldDescriptor::object("home", "Address").nullable())
            .field(FieldDescriptor::object("billing", "Address").nullable().flatten())
            .field(FieldDescriptor::sequence(
                "tags",
                SequenceField::of(ElementType::Scalar(ScalarKind::String)),
            ))
            .field(FieldDescriptor::dictionary(
                "scores",
                DictionaryField::of(ElementType::Scalar(ScalarKind::Int)),
            ))
            .field(FieldDescriptor::sequence(
                "visits",
                SequenceField::of(ElementType::Scalar(ScalarKind::Int)),
            ))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Numbers {
    small: i32,
    signed: i64,
    fixed: u32,
    sfixed: i64,
    unsigned: u32,
    half: f64,
}

tessera::reflect_fields!(Numbers { small, signed, fixed, sfixed, unsigned, half });

impl Describe for Numbers {
    const TYPE_NAME: &'static str = "Numbers";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Numbers")
            .field(FieldDescriptor::scalar("small", ScalarKind::Int).int_encoding(IntEncoding::Int32))
            .field(
                FieldDescriptor::scalar("signed", ScalarKind::Int).int_encoding(IntEncoding::SInt64),
            )
            .field(
                FieldDescriptor::scalar("fixed", ScalarKind::Int).int_encoding(IntEncoding::Fixed32),
            )
            .field(
                FieldDescriptor::scalar("sfixed", ScalarKind::Int)
                    .int_encoding(IntEncoding::SFixed64),
            )
            .field(
                FieldDescriptor::scalar("unsigned", ScalarKind::Int)
                    .int_encoding(IntEncoding::UInt32),
            )
            .field(
                FieldDescriptor::scalar("half", ScalarKind::Float)
                    .float_encoding(FloatEncoding::Float),
            )
            .build()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Priority {
    #[default]
    Low,
    High,
}

impl ReflectEnum for Priority {
    const TYPE_NAME: &'static str = "Priority";

    fn describe() -> EnumDescriptor {
        EnumDescriptor::int_backed("Priority", &[("Low", 1), ("High", 10)])
    }

    fn case_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::High => "High",
        }
    }

    fn from_case_name(name: &str) -> Option<Self> {
        match name {
            "Low" => Some(Priority::Low),
            "High" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Color {
    #[default]
    Red,
    Green,
}

impl ReflectEnum for Color {
    const TYPE_NAME: &'static str = "Color";

    fn describe() -> EnumDescriptor {
        EnumDescriptor::unit("Color", &["Red", "Green"])
    }

    fn case_name(&self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Green => "Green",
        }
    }

    fn from_case_name(name: &str) -> Option<Self> {
        match name {
            "Red" => Some(Color::Red),
            "Green" => Some(Color::Green),
            _ => None,
        }
    }
}

tessera::enum_value!(Priority, Color);

#[derive(Debug, Clone, Default, PartialEq)]
struct Ticket {
    priority: Priority,
    color: Color,
}

tessera::reflect_fields!(Ticket { priority, color });

impl Describe for Ticket {
    const TYPE_NAME: &'static str = "Ticket";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Ticket")
            .field(FieldDescriptor::enumeration("priority", "Priority", EnumKind::Int))
            .field(FieldDescriptor::enumeration("color", "Color", EnumKind::Unit))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct BigTask {
    name: String,
}

tessera::reflect_fields!(BigTask { name });

impl Describe for BigTask {
    const TYPE_NAME: &'static str = "BigTask";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("BigTask")
            .field(FieldDescriptor::scalar("name", ScalarKind::String))
            .build()
    }

    fn supertypes() -> &'static [&'static str] {
        &["Task"]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Event {
    at: Option<DateTime<FixedOffset>>,
    stamp: Option<DateTime<FixedOffset>>,
}

tessera::reflect_fields!(Event { at, stamp });

impl Describe for Event {
    const TYPE_NAME: &'static str = "Event";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Event")
            .field(FieldDescriptor::date_time("at").nullable())
            .field(
                FieldDescriptor::date_time("stamp")
                    .nullable()
                    .unix_time(TimeResolution::Seconds),
            )
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Bag {
    anything: Value,
    after: i64,
}

tessera::reflect_fields!(Bag { anything, after });

impl Describe for Bag {
    const TYPE_NAME: &'static str = "Bag";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Bag")
            .field(FieldDescriptor::mixed("anything"))
            .field(FieldDescriptor::scalar("after", ScalarKind::Int))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Grid {
    rows: Vec<Vec<i64>>,
}

tessera::reflect_fields!(Grid { rows });

impl Describe for Grid {
    const TYPE_NAME: &'static str = "Grid";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Grid")
            .field(FieldDescriptor::sequence("rows", SequenceField::default()))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    first: String,
    other: IndexMap<String, Value>,
}

tessera::reflect_fields!(Person { first, other });

impl Describe for Person {
    const TYPE_NAME: &'static str = "Person";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Person")
            .field(FieldDescriptor::scalar("first", ScalarKind::String))
            .field(FieldDescriptor::dictionary("other", DictionaryField::default()).flatten())
            .build()
    }
}

fn engine() -> Tessera {
    let mut registry = Registry::new();
    registry
        .register::<Counter>()
        .unwrap()
        .register::<Profile>()
        .unwrap()
        .register::<Pinned>()
        .unwrap()
        .register::<Address>()
        .unwrap()
        .register::<Customer>()
        .unwrap()
        .register::<Numbers>()
        .unwrap()
        .register::<Ticket>()
        .unwrap()
        .register::<BigTask>()
        .unwrap()
        .register::<Event>()
        .unwrap()
        .register::<Bag>()
        .unwrap()
        .register::<Grid>()
        .unwrap()
        .register::<Person>()
        .unwrap()
        .register::<Narrow>()
        .unwrap()
        .register_enum::<Priority>()
        .unwrap()
        .register_enum::<Color>()
        .unwrap()
        .register_type_map("Task", StaticTypeMap::new("size", [("big", "BigTask")]));
    Tessera::new(registry)
}

fn serialize_kind(err: &SerializeError) -> &ProtobufErrorKind {
    match err {
        SerializeError::Format(inner) => match inner.downcast_ref::<ProtobufError>() {
            Some(err) => &err.kind,
            None => panic!("not a protobuf error: {inner}"),
        },
        other => panic!("not a format error: {other}"),
    }
}

fn deserialize_kind(err: &DeserializeError) -> &ProtobufErrorKind {
    match err {
        DeserializeError::Format(inner) => match inner.downcast_ref::<ProtobufError>() {
            Some(err) => &err.kind,
            None => panic!("not a protobuf error: {inner}"),
        },
        other => panic!("not a format error: {other}"),
    }
}

#[test]
fn writes_the_canonical_varint_example() {
    tessera_testhelpers::setup();
    let engine = engine();
    let bytes = to_vec(&engine, &Counter { count: 150 }).unwrap();
    assert_eq!(bytes, [0x08, 0x96, 0x01]);
    assert_eq!(from_slice::<Counter>(&engine, &bytes).unwrap(), Counter { count: 150 });
}

#[test]
fn nulls_take_a_field_number() {
    tessera_testhelpers::setup();
    let engine = engine();
    let absent = Profile {
        nickname: None,
        age: 7,
    };
    let bytes = to_vec(&engine, &absent).unwrap();
    assert_eq!(bytes, [0x10, 0x07]);
    assert_eq!(from_slice::<Profile>(&engine, &bytes).unwrap(), absent);

    let present = Profile {
        nickname: Some("x".into()),
        age: 7,
    };
    let bytes = to_vec(&engine, &present).unwrap();
    assert_eq!(bytes, [0x0A, 0x01, b'x', 0x10, 0x07]);
    assert_eq!(from_slice::<Profile>(&engine, &bytes).unwrap(), present);
}

#[test]
fn pinned_numbers_reset_the_counter() {
    tessera_testhelpers::setup();
    let engine = engine();
    let pinned = Pinned { a: 1, b: 2 };
    let bytes = to_vec(&engine, &pinned).unwrap();
    assert_eq!(bytes, [0x28, 0x01, 0x30, 0x02]);
    assert_eq!(from_slice::<Pinned>(&engine, &bytes).unwrap(), pinned);
}

#[test]
fn later_occurrences_win() {
    tessera_testhelpers::setup();
    let counter: Counter = from_slice(&engine(), &[0x08, 0x01, 0x08, 0x02]).unwrap();
    assert_eq!(counter.count, 2);
}

#[test]
fn objects_collections_and_flattening_round_trip() {
    tessera_testhelpers::setup();
    let engine = engine();
    let customer = Customer {
        name: "Larry".into(),
        home: Some(Address {
            city: "Chicago".into(),
            zip: None,
        }),
        billing: Some(Address {
            city: "Springfield".into(),
            zip: Some("62701".into()),
        }),
        tags: vec!["a".into(), "b".into()],
        scores: IndexMap::from([("math".to_string(), 90), ("art".to_string(), -3)]),
        visits: vec![1, 2, 3],
    };
    let bytes = to_vec(&engine, &customer).unwrap();

    // name(1), home(2), billing's city(3) and zip(4), tags(5), scores(6), visits(7)
    let message = tessera_protobuf::ProtobufMessage::parse(&bytes).unwrap();
    assert_eq!(message.get(3).map(<[_]>::len), Some(1));
    assert_eq!(message.get(5).map(<[_]>::len), Some(2));
    assert_eq!(message.get(6).map(<[_]>::len), Some(2));
    assert_eq!(message.get(7).map(<[_]>::len), Some(3));

    assert_eq!(from_slice::<Customer>(&engine, &bytes).unwrap(), customer);
}

#[test]
fn absent_flattened_objects_keep_their_numbers() {
    tessera_testhelpers::setup();
    let engine = engine();
    let customer = Customer {
        name: "Larry".into(),
        billing: None,
        tags: vec!["a".into(), "b".into()],
        visits: vec![1, 2, 3],
        ..Customer::default()
    };
    let bytes = to_vec(&engine, &customer).unwrap();

    // billing's city(3) and zip(4) are skipped but still counted
    let message = tessera_protobuf::ProtobufMessage::parse(&bytes).unwrap();
    assert_eq!(message.get(3), None);
    assert_eq!(message.get(4), None);
    let hex = tessera_testhelpers::hex(&bytes);
    assert_eq!(message.get(5).map(<[_]>::len), Some(2), "{hex}");
    assert_eq!(message.get(7).map(<[_]>::len), Some(3), "{hex}");

    assert_eq!(from_slice::<Customer>(&engine, &bytes).unwrap(), customer);
}

#[test]
fn nested_messages_are_length_delimited() {
    tessera_testhelpers::setup();
    let customer = Customer {
        name: "L".into(),
        home: Some(Address {
            city: "C".into(),
            zip: None,
        }),
        billing: Some(Address::default()),
        ..Customer::default()
    };
    let bytes = to_vec(&engine(), &customer).unwrap();
    assert_eq!(
        &bytes[..8],
        [0x0A, 0x01, b'L', 0x12, 0x03, 0x0A, 0x01, b'C'],
        "{}",
        tessera_testhelpers::hex(&bytes)
    );
}

#[test]
fn map_entries_hold_key_and_value() {
    tessera_testhelpers::setup();
    let customer = Customer {
        billing: Some(Address::default()),
        scores: IndexMap::from([("a".to_string(), 1)]),
        ..Customer::default()
    };
    let bytes = to_vec(&engine(), &customer).unwrap();
    let message = tessera_protobuf::ProtobufMessage::parse(&bytes).unwrap();
    assert_eq!(
        message.get(6),
        Some(&[tessera_protobuf::RawValue::Bytes(vec![0x0A, 0x01, b'a', 0x10, 0x01])][..])
    );
}

#[test]
fn packed_repeated_scalars_are_accepted() {
    tessera_testhelpers::setup();
    let engine = engine();
    // visits (field 7) packed as one length-delimited run
    let mut bytes = to_vec(
        &engine,
        &Customer {
            billing: Some(Address::default()),
            ..Customer::default()
        },
    )
    .unwrap();
    bytes.extend_from_slice(&[0x3A, 0x04, 0x01, 0x02, 0x96, 0x01]);

    let customer: Customer = from_slice(&engine, &bytes).unwrap();
    assert_eq!(customer.visits, [1, 2, 150]);
}

#[test]
fn encodings_follow_the_field() {
    tessera_testhelpers::setup();
    let engine = engine();
    let numbers = Numbers {
        small: -1,
        signed: -1,
        fixed: 1,
        sfixed: -2,
        unsigned: 300,
        half: 0.5,
    };
    let bytes = to_vec(&engine, &numbers).unwrap();

    let mut expected = vec![0x08];
    expected.extend([0xFF; 9]);
    expected.push(0x01);
    expected.extend([0x10, 0x01]);
    expected.extend([0x1D, 0x01, 0x00, 0x00, 0x00]);
    expected.push(0x21);
    expected.extend((-2i64).to_le_bytes());
    expected.extend([0x28, 0xAC, 0x02]);
    expected.extend([0x35, 0x00, 0x00, 0x00, 0x3F]);
    assert_eq!(bytes, expected);

    assert_eq!(from_slice::<Numbers>(&engine, &bytes).unwrap(), numbers);
}

#[test]
fn out_of_range_values_are_rejected() {
    tessera_testhelpers::setup();
    let engine = engine();

    let err = to_vec(
        &engine,
        &Narrow {
            wide: 1 << 40,
            natural: 1,
        },
    )
    .unwrap_err();
    assert_eq!(
        *serialize_kind(&err),
        ProtobufErrorKind::ValueOutOfRange {
            value: 1 << 40,
            encoding: IntEncoding::Int32,
        }
    );

    let err = to_vec(
        &engine,
        &Narrow {
            wide: 1,
            natural: -1,
        },
    )
    .unwrap_err();
    assert!(matches!(
        serialize_kind(&err),
        ProtobufErrorKind::ValueOutOfRange {
            value: -1,
            encoding: IntEncoding::UInt64,
        }
    ));
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Narrow {
    wide: i64,
    natural: i64,
}

tessera::reflect_fields!(Narrow { wide, natural });

impl Describe for Narrow {
    const TYPE_NAME: &'static str = "Narrow";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Narrow")
            .field(FieldDescriptor::scalar("wide", ScalarKind::Int).int_encoding(IntEncoding::Int32))
            .field(
                FieldDescriptor::scalar("natural", ScalarKind::Int)
                    .int_encoding(IntEncoding::UInt64),
            )
            .build()
    }
}

#[test]
fn enums_use_their_backing() {
    tessera_testhelpers::setup();
    let engine = engine();
    let ticket = Ticket {
        priority: Priority::High,
        color: Color::Green,
    };
    let bytes = to_vec(&engine, &ticket).unwrap();
    assert_eq!(bytes, [0x08, 0x0A, 0x12, 0x05, b'G', b'r', b'e', b'e', b'n']);
    assert_eq!(from_slice::<Ticket>(&engine, &bytes).unwrap(), ticket);
}

#[test]
fn type_maps_write_the_discriminator_first() {
    tessera_testhelpers::setup();
    let engine = engine();
    let bytes = to_vec(
        &engine,
        &BigTask {
            name: "huge".into(),
        },
    )
    .unwrap();
    assert_eq!(
        bytes,
        [0x0A, 0x03, b'b', b'i', b'g', 0x12, 0x04, b'h', b'u', b'g', b'e']
    );

    let task = engine
        .deserialize_dyn(&ProtobufDeformatter, &bytes, "Task", &DeserializeOptions::default())
        .unwrap();
    assert_eq!(task.type_name(), "BigTask");
    assert_eq!(task.get("name"), Some(Value::from("huge")));
}

#[test]
fn dates_round_trip_as_strings_and_timestamps() {
    tessera_testhelpers::setup();
    let engine = engine();
    let at = DateTime::parse_from_rfc3339("2024-05-01T12:30:00+02:00").unwrap();
    let event = Event {
        at: Some(at),
        stamp: Some(at),
    };
    let bytes = to_vec(&engine, &event).unwrap();
    let back: Event = from_slice(&engine, &bytes).unwrap();
    assert_eq!(back, event);
    assert_eq!(back.at.unwrap().offset().local_minus_utc(), 7200);
}

#[test]
fn mixed_fields_follow_the_wire_type() {
    tessera_testhelpers::setup();
    let engine = engine();
    for anything in [Value::Int(5), Value::from("five"), Value::Float(2.5)] {
        let bag = Bag {
            anything,
            after: 9,
        };
        let bytes = to_vec(&engine, &bag).unwrap();
        assert_eq!(from_slice::<Bag>(&engine, &bytes).unwrap(), bag);
    }

    let empty = Bag {
        anything: Value::Null,
        after: 9,
    };
    let bytes = to_vec(&engine, &empty).unwrap();
    assert_eq!(bytes, [0x10, 0x09]);
    assert_eq!(from_slice::<Bag>(&engine, &bytes).unwrap(), empty);
}

#[test]
fn lists_of_lists_cannot_be_written() {
    tessera_testhelpers::setup();
    let grid = Grid {
        rows: vec![vec![1, 2], vec![3]],
    };
    let err = to_vec(&engine(), &grid).unwrap_err();
    assert_eq!(
        *serialize_kind(&err),
        ProtobufErrorKind::NestedRepeated { field: 1 }
    );
}

#[test]
fn collecting_fields_are_unsupported() {
    tessera_testhelpers::setup();
    let err = from_slice::<Person>(&engine(), &[0x0A, 0x01, b'L']).unwrap_err();
    assert!(matches!(
        err,
        DeserializeError::CollectingUnsupported {
            format: "protobuf",
            ..
        }
    ));
}

#[test]
fn corrupt_input_fails_cleanly() {
    tessera_testhelpers::setup();
    let engine = engine();

    let err = from_slice::<Counter>(&engine, &[0x08]).unwrap_err();
    assert_eq!(*deserialize_kind(&err), ProtobufErrorKind::UnexpectedEof);

    let mut unterminated = vec![0x08];
    unterminated.extend([0x80; 10]);
    unterminated.push(0x01);
    let err = from_slice::<Counter>(&engine, &unterminated).unwrap_err();
    assert_eq!(*deserialize_kind(&err), ProtobufErrorKind::VarintOverflow);

    let err = from_slice::<Profile>(&engine, &[0x08, 0x01]).unwrap_err();
    assert_eq!(
        *deserialize_kind(&err),
        ProtobufErrorKind::WireTypeMismatch {
            field: 1,
            expected: WireType::Len,
            found: WireType::VarInt,
        }
    );
    insta::assert_snapshot!(err.to_string(), @"field 1: expected wire type len, found varint");
}
