use std::sync::Arc;

use indexmap::IndexMap;
use tessera::{
    ClassDescriptor, CustomImporter, DeserializeError, DeserializeOptions, Describe,
    ElementType, FieldDescriptor, FieldType, FromValue, Key, Reflect, ReflectError, Registry,
    RwLock, ScalarKind, SequenceField, SerializeError, Tessera, ToValue, Value,
};
use tessera_array::{ArrayDeformatter, JsonError, from_value, json, to_value};

#[derive(Debug, Clone, Default, PartialEq)]
struct Money {
    cents: i64,
    currency: String,
}

impl Describe for Money {
    const TYPE_NAME: &'static str = "Money";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Money").native().build()
    }
}

impl Reflect for Money {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn get(&self, _property: &str) -> Option<Value> {
        None
    }

    fn set(&mut self, property: &str, _value: Value) -> Result<(), ReflectError> {
        Err(ReflectError::no_such_property(Self::TYPE_NAME, property))
    }

    fn native_serialize(&self) -> Option<IndexMap<String, Value>> {
        let mut data = IndexMap::new();
        data.insert("amount".into(), Value::Int(self.cents));
        data.insert("currency".into(), self.currency.to_value());
        Some(data)
    }

    fn native_unserialize(&mut self, mut data: IndexMap<String, Value>) -> Result<(), ReflectError> {
        self.cents = i64::from_value(data.shift_remove("amount").unwrap_or_default())?;
        self.currency = String::from_value(data.shift_remove("currency").unwrap_or_default())?;
        Ok(())
    }
}

tessera::object_value!(Money);

#[derive(Debug, Clone, Default, PartialEq)]
struct Wallet {
    owner: String,
    balance: Money,
}

tessera::reflect_fields!(Wallet { owner, balance });

impl Describe for Wallet {
    const TYPE_NAME: &'static str = "Wallet";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Wallet")
            .field(FieldDescriptor::scalar("owner", ScalarKind::String))
            .field(FieldDescriptor::object("balance", "Money"))
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Playlist {
    songs: Vec<String>,
}

tessera::reflect_fields!(Playlist { songs });

impl Describe for Playlist {
    const TYPE_NAME: &'static str = "Playlist";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Playlist")
            .field(FieldDescriptor::sequence(
                "songs",
                SequenceField::of(ElementType::Scalar(ScalarKind::String)),
            ))
            .build()
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    name: String,
    next: Option<Arc<RwLock<Node>>>,
}

tessera::reflect_fields!(Node { name, next });

impl Describe for Node {
    const TYPE_NAME: &'static str = "Node";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::builder("Node")
            .field(FieldDescriptor::scalar("name", ScalarKind::String))
            .field(FieldDescriptor::object("next", "Node").nullable())
            .build()
    }
}

/// Trims every string read from an array.
struct Trim;

impl CustomImporter for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn can_import(&self, field: &FieldDescriptor, format: &str) -> bool {
        format == "array" && field.field_type == FieldType::STRING
    }

    fn read_as(&self, field: &FieldDescriptor) -> FieldDescriptor {
        field.clone()
    }

    fn convert(&self, _field: &FieldDescriptor, value: Value) -> Result<Value, DeserializeError> {
        Ok(match value {
            Value::String(s) => Value::String(s.trim().into()),
            other => other,
        })
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<Money>()
        .unwrap()
        .register::<Wallet>()
        .unwrap()
        .register::<Playlist>()
        .unwrap()
        .register::<Node>()
        .unwrap();
    registry
}

fn dict<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Dict(
        entries
            .into_iter()
            .map(|(k, v)| (Key::from(k), v))
            .collect(),
    )
}

#[test]
fn native_classes_write_their_own_data() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry());
    let wallet = Wallet {
        owner: "ada".into(),
        balance: Money {
            cents: 1250,
            currency: "EUR".into(),
        },
    };

    let value = to_value(&engine, &wallet).unwrap();
    assert_eq!(
        value,
        dict([
            ("owner", Value::from("ada")),
            (
                "balance",
                dict([("amount", Value::Int(1250)), ("currency", Value::from("EUR"))]),
            ),
        ])
    );

    let back: Wallet = from_value(&engine, value).unwrap();
    assert_eq!(back, wallet);
}

#[test]
fn keyed_lists_read_as_sequences() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry());
    let value = dict([(
        "songs",
        dict([("0", Value::from("intro")), ("1", Value::from("outro"))]),
    )]);
    let playlist: Playlist = from_value(&engine, value).unwrap();
    assert_eq!(playlist.songs, ["intro", "outro"]);
}

#[test]
fn sequences_reject_scalars() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry());
    let err = from_value::<Playlist>(&engine, dict([("songs", Value::Int(3))])).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"field `songs`: expected sequence, found int");
}

#[test]
fn custom_importers_see_what_the_chain_read() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry()).with_importer(Trim);
    let wallet: Wallet = json::from_str(
        &engine,
        r#"{"owner": "  ada ", "balance": {"amount": 5, "currency": "EUR"}}"#,
    )
    .unwrap();
    assert_eq!(wallet.owner, "ada");
    assert_eq!(wallet.balance.cents, 5);
}

#[test]
fn cycles_cannot_be_written() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry());
    let a = Arc::new(RwLock::new(Node {
        name: "a".into(),
        next: None,
    }));
    let b = Arc::new(RwLock::new(Node {
        name: "b".into(),
        next: Some(Arc::clone(&a)),
    }));
    a.write().next = Some(Arc::clone(&b));

    let err = json::to_string(&engine, &*b.read()).unwrap_err();
    assert!(
        matches!(
            err,
            JsonError::Serialize(SerializeError::CircularReferenceDetected { type_name: "Node" })
        ),
        "{err}"
    );

    // break the cycle so the nodes are freed
    a.write().next = None;
}

#[test]
fn shared_objects_read_back_as_a_chain() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry());
    let node: Node = json::from_str(
        &engine,
        r#"{"name": "a", "next": {"name": "b", "next": null}}"#,
    )
    .unwrap();
    assert_eq!(node.name, "a");
    let next = node.next.unwrap();
    assert_eq!(next.read().name, "b");
    assert!(next.read().next.is_none());
}

#[test]
fn deep_input_is_rejected() {
    tessera_testhelpers::setup();
    let engine = Tessera::new(registry());
    let input = json::from_json(serde_json::json!({
        "name": "1",
        "next": {"name": "2", "next": {"name": "3", "next": {"name": "4"}}}
    }));

    let options = DeserializeOptions::new().max_depth(3);
    let err = engine
        .deserialize_with::<Node, _>(&ArrayDeformatter, input.clone(), &options)
        .unwrap_err();
    assert!(matches!(err, DeserializeError::DepthLimitExceeded { limit: 3 }));

    let options = DeserializeOptions::new().max_depth(4);
    let node = engine
        .deserialize_with::<Node, _>(&ArrayDeformatter, input, &options)
        .unwrap();
    assert_eq!(node.name, "1");
}
