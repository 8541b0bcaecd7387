//! Per-field metadata.

use alloc::string::String;
use alloc::vec::Vec;

use chrono::FixedOffset;
use indexmap::IndexMap;

use crate::{Key, RenameRule, TypeMapping, Value, ValueKind};

/// Type name used for date/time object fields.
pub const DATE_TIME: &str = "DateTime";

/// The scalar kinds every format understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
}

impl ScalarKind {
    /// Lowercase name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
        }
    }
}

/// How an enum is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// Cases without backing values, serialized by name.
    Unit,
    /// Cases backed by integers.
    Int,
    /// Cases backed by strings.
    String,
}

/// The category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A scalar.
    Scalar(ScalarKind),
    /// A nested object, identified by the field's type name.
    Object,
    /// A sequence or dictionary.
    Array,
    /// An enum, identified by the field's type name.
    Enum(EnumKind),
    /// A field that can only ever be null.
    Null,
    /// A field whose type is only known at runtime.
    Mixed,
}

impl FieldType {
    /// `Scalar(Int)`
    pub const INT: FieldType = FieldType::Scalar(ScalarKind::Int);
    /// `Scalar(Float)`
    pub const FLOAT: FieldType = FieldType::Scalar(ScalarKind::Float);
    /// `Scalar(Bool)`
    pub const BOOL: FieldType = FieldType::Scalar(ScalarKind::Bool);
    /// `Scalar(String)`
    pub const STRING: FieldType = FieldType::Scalar(ScalarKind::String);

    /// Lowercase name of the category.
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Scalar(kind) => kind.name(),
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Enum(_) => "enum",
            FieldType::Null => "null",
            FieldType::Mixed => "mixed",
        }
    }
}

/// The declared type of sequence and dictionary elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Scalars of one kind.
    Scalar(ScalarKind),
    /// Objects of a registered class.
    Object(&'static str),
    /// Cases of a registered enum.
    Enum(&'static str, EnumKind),
}

impl ElementType {
    fn field_type(self) -> (FieldType, Option<&'static str>) {
        match self {
            ElementType::Scalar(kind) => (FieldType::Scalar(kind), None),
            ElementType::Object(name) => (FieldType::Object, Some(name)),
            ElementType::Enum(name, kind) => (FieldType::Enum(kind), Some(name)),
        }
    }
}

/// Sequence-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceField {
    /// Element type; runtime types are used when absent.
    pub element: Option<ElementType>,
    /// When set, the sequence is written as one string joined by this separator.
    pub implode_on: Option<String>,
    /// Trim whitespace from exploded parts.
    pub trim: bool,
}

impl SequenceField {
    /// A sequence of `element`.
    pub fn of(element: ElementType) -> Self {
        SequenceField {
            element: Some(element),
            ..SequenceField::default()
        }
    }

    /// Writes the sequence as one string joined by `separator`.
    pub fn implode_on(mut self, separator: impl Into<String>) -> Self {
        self.implode_on = Some(separator.into());
        self
    }

    /// Trims exploded parts.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }
}

/// Key type of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Keys must be integers; numeric strings are converted.
    Int,
    /// Keys are strings.
    String,
}

/// Dictionary-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryField {
    /// Value type; runtime types are used when absent.
    pub element: Option<ElementType>,
    /// Key type; keys are left as found when absent.
    pub key_type: Option<KeyType>,
    /// When set with `join_on`, entries are written as `key<join>value`
    /// pairs separated by this string.
    pub implode_on: Option<String>,
    /// Separator between key and value in imploded form.
    pub join_on: Option<String>,
    /// Trim whitespace from exploded parts.
    pub trim: bool,
}

impl DictionaryField {
    /// A dictionary of `element` values.
    pub fn of(element: ElementType) -> Self {
        DictionaryField {
            element: Some(element),
            ..DictionaryField::default()
        }
    }

    /// Sets the key type.
    pub fn keys(mut self, key_type: KeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }

    /// Writes the dictionary as `key<join>value` pairs joined by `separator`.
    pub fn implode_on(mut self, separator: impl Into<String>, join: impl Into<String>) -> Self {
        self.implode_on = Some(separator.into());
        self.join_on = Some(join.into());
        self
    }

    /// Trims exploded parts.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }
}

/// Settings for date/time fields written as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateField {
    /// A strftime format; RFC 3339 when absent.
    pub format: Option<String>,
    /// Offset applied before formatting, and assumed when parsing a string
    /// without one.
    pub timezone: Option<FixedOffset>,
}

/// Precision of a unix timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeResolution {
    /// Whole seconds.
    #[default]
    Seconds,
    /// Milliseconds.
    Milliseconds,
    /// Microseconds.
    Microseconds,
}

/// Settings for date/time fields written as integer timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnixTimeField {
    /// Timestamp precision.
    pub resolution: TimeResolution,
}

/// Wire encodings for integers, honored by binary formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IntEncoding {
    /// Plain varint of a 64-bit value.
    #[default]
    Int64,
    /// Plain varint, range-checked to 32 bits.
    Int32,
    /// Varint of a non-negative 64-bit value.
    UInt64,
    /// Varint of a non-negative 32-bit value.
    UInt32,
    /// Zigzag varint, 64-bit.
    SInt64,
    /// Zigzag varint, 32-bit.
    SInt32,
    /// 8 bytes, unsigned.
    Fixed64,
    /// 4 bytes, unsigned.
    Fixed32,
    /// 8 bytes, signed.
    SFixed64,
    /// 4 bytes, signed.
    SFixed32,
}

/// Wire encodings for floats, honored by binary formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FloatEncoding {
    /// 8-byte double.
    #[default]
    Double,
    /// 4-byte float.
    Float,
}

/// Numeric wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberField {
    /// Encoding for an int field.
    Int(IntEncoding),
    /// Encoding for a float field.
    Float(FloatEncoding),
}

/// Settings for mixed fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixedField {
    /// Class to use when the input holds an object and the format cannot
    /// say which.
    pub suggested: Option<&'static str>,
}

/// Extra settings that only make sense for some field categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRefinement {
    /// For array fields holding a list.
    Sequence(SequenceField),
    /// For array fields holding a map.
    Dictionary(DictionaryField),
    /// For date/time fields written as strings.
    Date(DateField),
    /// For date/time fields written as timestamps.
    UnixTime(UnixTimeField),
    /// For numeric scalar fields.
    Number(NumberField),
    /// For mixed fields.
    Mixed(MixedField),
}

impl TypeRefinement {
    /// Short name used in schema errors.
    pub const fn name(&self) -> &'static str {
        match self {
            TypeRefinement::Sequence(_) => "sequence",
            TypeRefinement::Dictionary(_) => "dictionary",
            TypeRefinement::Date(_) => "date",
            TypeRefinement::UnixTime(_) => "unix time",
            TypeRefinement::Number(_) => "number",
            TypeRefinement::Mixed(_) => "mixed",
        }
    }

    /// Whether the refinement can be attached to a field of this shape.
    pub fn applies_to(&self, field_type: FieldType, type_name: Option<&str>) -> bool {
        match self {
            TypeRefinement::Sequence(_) | TypeRefinement::Dictionary(_) => {
                field_type == FieldType::Array
            }
            TypeRefinement::Date(_) | TypeRefinement::UnixTime(_) => {
                field_type == FieldType::Object && type_name == Some(DATE_TIME)
            }
            TypeRefinement::Number(NumberField::Int(_)) => field_type == FieldType::INT,
            TypeRefinement::Number(NumberField::Float(_)) => field_type == FieldType::FLOAT,
            TypeRefinement::Mixed(_) => field_type == FieldType::Mixed,
        }
    }
}

/// Metadata describing one property of a class.
///
/// Descriptors are built once per class through [`FieldBuilder`]; the
/// serialized name is resolved at build time and never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Property name on the object.
    pub name: String,
    /// Key used in formatted output.
    pub serialized_name: String,
    /// Category.
    pub field_type: FieldType,
    /// Class or enum name for object and enum fields.
    pub type_name: Option<&'static str>,
    /// Null is a legal value.
    pub nullable: bool,
    /// Object fields: write the child's fields into the parent.
    /// Array fields: collect every unclaimed input key.
    pub flatten: bool,
    /// Never read or written.
    pub exclude: bool,
    /// Declared for serialization even when the class excludes fields by
    /// default.
    pub include: bool,
    /// Deserialization fails when the input has no value.
    pub require_value: bool,
    /// Value used when the input has none.
    pub default: Option<Value>,
    /// Whether `default` is applied.
    pub use_default: bool,
    /// Alternative input keys.
    pub aliases: Vec<String>,
    /// Reject values that only fit after coercion.
    pub strict: bool,
    /// Scopes the field belongs to; the class's scopes when absent.
    pub scopes: Option<Vec<String>>,
    /// Discriminator map for polymorphic object fields.
    pub type_map: Option<TypeMapping>,
    /// Category-specific settings.
    pub refinement: Option<TypeRefinement>,
    /// Pinned field number for positional formats.
    pub field_number: Option<u32>,
    /// Constant key/value pairs written before the object's own fields.
    pub extra_properties: IndexMap<String, Value>,
}

impl FieldDescriptor {
    /// Starts building a field.
    pub fn builder(name: impl Into<String>, field_type: FieldType) -> FieldBuilder {
        FieldBuilder::new(name.into(), field_type)
    }

    /// A scalar field.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> FieldBuilder {
        Self::builder(name, FieldType::Scalar(kind))
    }

    /// An object field of the given class.
    pub fn object(name: impl Into<String>, type_name: &'static str) -> FieldBuilder {
        Self::builder(name, FieldType::Object).type_name(type_name)
    }

    /// An enum field.
    pub fn enumeration(
        name: impl Into<String>,
        type_name: &'static str,
        kind: EnumKind,
    ) -> FieldBuilder {
        Self::builder(name, FieldType::Enum(kind)).type_name(type_name)
    }

    /// A date/time field.
    pub fn date_time(name: impl Into<String>) -> FieldBuilder {
        Self::object(name, DATE_TIME)
    }

    /// A sequence field.
    pub fn sequence(name: impl Into<String>, sequence: SequenceField) -> FieldBuilder {
        Self::builder(name, FieldType::Array).refine(TypeRefinement::Sequence(sequence))
    }

    /// A dictionary field.
    pub fn dictionary(name: impl Into<String>, dictionary: DictionaryField) -> FieldBuilder {
        Self::builder(name, FieldType::Array).refine(TypeRefinement::Dictionary(dictionary))
    }

    /// A mixed field. Mixed fields are nullable.
    pub fn mixed(name: impl Into<String>) -> FieldBuilder {
        Self::builder(name, FieldType::Mixed).nullable()
    }

    /// The field that stands for a whole object being (de)serialized.
    pub fn root(type_name: &'static str) -> Self {
        Self::object("root", type_name).build()
    }

    /// A string field carrying a type-map discriminator.
    pub fn discriminator(key: &str) -> Self {
        Self::scalar(key, ScalarKind::String).build()
    }

    /// A field typed after a runtime value, for synthesized entries.
    pub fn for_value(name: impl Into<String>, value: &Value) -> Self {
        let (field_type, type_name) = match value {
            Value::Null => (FieldType::Null, None),
            Value::Bool(_) => (FieldType::BOOL, None),
            Value::Int(_) => (FieldType::INT, None),
            Value::Float(_) => (FieldType::FLOAT, None),
            Value::String(_) => (FieldType::STRING, None),
            Value::Enum(e) => (FieldType::Enum(EnumKind::Unit), Some(e.type_name)),
            Value::DateTime(_) => (FieldType::Object, Some(DATE_TIME)),
            Value::Sequence(_) | Value::Dict(_) => (FieldType::Array, None),
            Value::Object(o) => (FieldType::Object, Some(o.type_name())),
        };
        let mut builder = Self::builder(name, field_type).nullable();
        builder.field.type_name = type_name;
        builder.build()
    }

    /// The field describing one element of this sequence or dictionary.
    ///
    /// Elements inherit strictness; their type comes from the declared
    /// element type, and is mixed otherwise.
    pub fn element_field(&self, key: &Key) -> Self {
        let element = match &self.refinement {
            Some(TypeRefinement::Sequence(s)) => s.element,
            Some(TypeRefinement::Dictionary(d)) => d.element,
            _ => None,
        };
        let (field_type, type_name) = match element {
            Some(element) => element.field_type(),
            None => (FieldType::Mixed, None),
        };
        let mut builder = Self::builder(key.to_name(), field_type).nullable();
        builder.field.type_name = type_name;
        builder.field.strict = self.strict;
        builder.build()
    }

    /// The field describing one element about to be exported.
    ///
    /// Uses the declared element type, or the value's own type when there
    /// is none.
    pub fn export_element_field(&self, key: &Key, value: &Value) -> Self {
        let declared = match &self.refinement {
            Some(TypeRefinement::Sequence(s)) => s.element.is_some(),
            Some(TypeRefinement::Dictionary(d)) => d.element.is_some(),
            _ => false,
        };
        if declared {
            self.element_field(key)
        } else {
            Self::for_value(key.to_name(), value)
        }
    }

    /// A copy of this field retyped, keeping names and flags.
    pub fn with_type(&self, field_type: FieldType, type_name: Option<&'static str>) -> Self {
        let mut field = self.clone();
        field.field_type = field_type;
        field.type_name = type_name;
        field.refinement = match field_type {
            FieldType::Array => Some(TypeRefinement::Sequence(SequenceField::default())),
            _ => None,
        };
        field
    }

    /// A copy of this field retyped as a dictionary with untyped values.
    pub fn as_dictionary(&self) -> Self {
        let mut field = self.with_type(FieldType::Array, None);
        field.refinement = Some(TypeRefinement::Dictionary(DictionaryField::default()));
        field
    }

    /// Serialized name followed by aliases, in lookup order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        core::iter::once(self.serialized_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether the field is a flattened array collecting unclaimed keys.
    pub fn is_collecting(&self) -> bool {
        self.flatten && self.field_type == FieldType::Array
    }

    /// Whether this value kind can be stored without conversion.
    pub fn accepts(&self, kind: ValueKind) -> bool {
        match (self.field_type, kind) {
            (_, ValueKind::Null) => self.nullable || self.field_type == FieldType::Null,
            (FieldType::Mixed, _) => true,
            (FieldType::Scalar(ScalarKind::Int), ValueKind::Int) => true,
            (FieldType::Scalar(ScalarKind::Float), ValueKind::Float | ValueKind::Int) => true,
            (FieldType::Scalar(ScalarKind::Bool), ValueKind::Bool) => true,
            (FieldType::Scalar(ScalarKind::String), ValueKind::String) => true,
            _ => false,
        }
    }

    /// Sequence settings, if any.
    pub fn sequence_settings(&self) -> Option<&SequenceField> {
        match &self.refinement {
            Some(TypeRefinement::Sequence(s)) => Some(s),
            _ => None,
        }
    }

    /// Dictionary settings, if any.
    pub fn dictionary_settings(&self) -> Option<&DictionaryField> {
        match &self.refinement {
            Some(TypeRefinement::Dictionary(d)) => Some(d),
            _ => None,
        }
    }

    /// Date settings, if any.
    pub fn date_settings(&self) -> Option<&DateField> {
        match &self.refinement {
            Some(TypeRefinement::Date(d)) => Some(d),
            _ => None,
        }
    }

    /// Timestamp settings, if any.
    pub fn unix_time_settings(&self) -> Option<&UnixTimeField> {
        match &self.refinement {
            Some(TypeRefinement::UnixTime(u)) => Some(u),
            _ => None,
        }
    }

    /// Mixed settings, if any.
    pub fn mixed_settings(&self) -> Option<&MixedField> {
        match &self.refinement {
            Some(TypeRefinement::Mixed(m)) => Some(m),
            _ => None,
        }
    }

    /// Declared integer encoding, `Int64` by default.
    pub fn int_encoding(&self) -> IntEncoding {
        match self.refinement {
            Some(TypeRefinement::Number(NumberField::Int(encoding))) => encoding,
            _ => IntEncoding::default(),
        }
    }

    /// Declared float encoding, `Double` by default.
    pub fn float_encoding(&self) -> FloatEncoding {
        match self.refinement {
            Some(TypeRefinement::Number(NumberField::Float(encoding))) => encoding,
            _ => FloatEncoding::default(),
        }
    }

    /// Whether the field is a date/time object field.
    pub fn is_date_time(&self) -> bool {
        self.field_type == FieldType::Object && self.type_name == Some(DATE_TIME)
    }
}

/// Builder for [`FieldDescriptor`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: FieldDescriptor,
    serialized_name: Option<String>,
    rename: Option<RenameRule>,
}

impl FieldBuilder {
    fn new(name: String, field_type: FieldType) -> Self {
        FieldBuilder {
            field: FieldDescriptor {
                serialized_name: String::new(),
                name,
                field_type,
                type_name: None,
                nullable: false,
                flatten: false,
                exclude: false,
                include: false,
                require_value: false,
                default: None,
                use_default: true,
                aliases: Vec::new(),
                strict: true,
                scopes: None,
                type_map: None,
                refinement: None,
                field_number: None,
                extra_properties: IndexMap::new(),
            },
            serialized_name: None,
            rename: None,
        }
    }

    /// Sets the class or enum name.
    pub fn type_name(mut self, type_name: &'static str) -> Self {
        self.field.type_name = Some(type_name);
        self
    }

    /// Overrides the serialized name.
    pub fn serialized_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    /// Derives the serialized name from the property name.
    ///
    /// An explicit [`serialized_name`](Self::serialized_name) wins.
    pub fn rename(mut self, rule: RenameRule) -> Self {
        self.rename = Some(rule);
        self
    }

    /// Allows null.
    pub fn nullable(mut self) -> Self {
        self.field.nullable = true;
        self
    }

    /// Flattens the field into its parent.
    pub fn flatten(mut self) -> Self {
        self.field.flatten = true;
        self
    }

    /// Excludes the field from serialization.
    pub fn exclude(mut self) -> Self {
        self.field.exclude = true;
        self
    }

    /// Includes the field in classes that exclude fields by default.
    pub fn include(mut self) -> Self {
        self.field.include = true;
        self
    }

    /// Requires a value on input.
    pub fn require_value(mut self) -> Self {
        self.field.require_value = true;
        self
    }

    /// Sets the default used when the input has no value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.field.default = Some(value.into());
        self
    }

    /// Disables the default.
    pub fn no_default(mut self) -> Self {
        self.field.use_default = false;
        self
    }

    /// Adds an alternative input key.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.field.aliases.push(alias.into());
        self
    }

    /// Allows lenient coercion of input values.
    pub fn lenient(mut self) -> Self {
        self.field.strict = false;
        self
    }

    /// Sets strictness explicitly.
    pub fn strict(mut self, strict: bool) -> Self {
        self.field.strict = strict;
        self
    }

    /// Restricts the field to these scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Attaches a type map.
    pub fn type_map(mut self, map: impl Into<TypeMapping>) -> Self {
        self.field.type_map = Some(map.into());
        self
    }

    /// Attaches a type refinement.
    pub fn refine(mut self, refinement: TypeRefinement) -> Self {
        self.field.refinement = Some(refinement);
        self
    }

    /// Sets the integer wire encoding.
    pub fn int_encoding(self, encoding: IntEncoding) -> Self {
        self.refine(TypeRefinement::Number(NumberField::Int(encoding)))
    }

    /// Sets the float wire encoding.
    pub fn float_encoding(self, encoding: FloatEncoding) -> Self {
        self.refine(TypeRefinement::Number(NumberField::Float(encoding)))
    }

    /// Formats a date/time field with a strftime pattern.
    pub fn date_format(self, format: impl Into<String>) -> Self {
        let timezone = match &self.field.refinement {
            Some(TypeRefinement::Date(d)) => d.timezone,
            _ => None,
        };
        self.refine(TypeRefinement::Date(DateField {
            format: Some(format.into()),
            timezone,
        }))
    }

    /// Converts a date/time field to this offset before formatting.
    pub fn timezone(self, offset: FixedOffset) -> Self {
        let format = match &self.field.refinement {
            Some(TypeRefinement::Date(d)) => d.format.clone(),
            _ => None,
        };
        self.refine(TypeRefinement::Date(DateField {
            format,
            timezone: Some(offset),
        }))
    }

    /// Writes a date/time field as a unix timestamp.
    pub fn unix_time(self, resolution: TimeResolution) -> Self {
        self.refine(TypeRefinement::UnixTime(UnixTimeField { resolution }))
    }

    /// Suggests a class for a mixed field holding an object.
    pub fn suggest(self, type_name: &'static str) -> Self {
        self.refine(TypeRefinement::Mixed(MixedField {
            suggested: Some(type_name),
        }))
    }

    /// Pins the field number used by positional formats.
    pub fn field_number(mut self, number: u32) -> Self {
        self.field.field_number = Some(number);
        self
    }

    /// Adds a constant key/value written before the object's own fields.
    pub fn extra_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field.extra_properties.insert(key.into(), value.into());
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> FieldDescriptor {
        let FieldBuilder {
            mut field,
            serialized_name,
            rename,
        } = self;
        field.serialized_name = match (serialized_name, rename) {
            (Some(explicit), _) => explicit,
            (None, Some(rule)) => rule.apply(&field.name),
            (None, None) => field.name.clone(),
        };
        field
    }

    /// The class-level rename rule, applied unless the field has its own.
    pub(crate) fn default_rename(mut self, rule: Option<RenameRule>) -> Self {
        if self.rename.is_none() {
            self.rename = rule;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_name_is_resolved_once() {
        let field = FieldDescriptor::scalar("firstName", ScalarKind::String)
            .rename(RenameRule::SnakeCase)
            .build();
        assert_eq!(field.serialized_name, "first_name");

        let field = FieldDescriptor::scalar("firstName", ScalarKind::String)
            .rename(RenameRule::SnakeCase)
            .serialized_name("given")
            .build();
        assert_eq!(field.serialized_name, "given");
    }

    #[test]
    fn defaults_are_strict_and_use_defaults() {
        let field = FieldDescriptor::scalar("a", ScalarKind::Int).build();
        assert!(field.strict);
        assert!(field.use_default);
        assert!(!field.nullable);
        assert_eq!(field.int_encoding(), IntEncoding::Int64);
        assert_eq!(field.float_encoding(), FloatEncoding::Double);
    }

    #[test]
    fn element_fields_follow_the_declared_type() {
        let field = FieldDescriptor::sequence("tags", SequenceField::of(ElementType::Scalar(ScalarKind::String)))
            .lenient()
            .build();
        let element = field.element_field(&Key::Int(3));
        assert_eq!(element.name, "3");
        assert_eq!(element.field_type, FieldType::STRING);
        assert!(!element.strict);

        let untyped = FieldDescriptor::builder("bag", FieldType::Array).build();
        assert_eq!(untyped.element_field(&Key::from("x")).field_type, FieldType::Mixed);
        assert_eq!(
            untyped.export_element_field(&Key::from("x"), &Value::Int(1)).field_type,
            FieldType::INT
        );
    }

    #[test]
    fn names_list_aliases_after_the_serialized_name() {
        let field = FieldDescriptor::scalar("a", ScalarKind::Int)
            .serialized_name("b")
            .alias("c")
            .alias("d")
            .build();
        assert_eq!(field.names().collect::<Vec<_>>(), ["b", "c", "d"]);
    }

    #[test]
    fn refinements_check_their_category() {
        let date = TypeRefinement::Date(DateField::default());
        assert!(date.applies_to(FieldType::Object, Some(DATE_TIME)));
        assert!(!date.applies_to(FieldType::Object, Some("Address")));
        let int = TypeRefinement::Number(NumberField::Int(IntEncoding::SInt32));
        assert!(int.applies_to(FieldType::INT, None));
        assert!(!int.applies_to(FieldType::FLOAT, None));
    }
}
