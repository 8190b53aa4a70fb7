//! Document encoding.
//!
//! Encoding happens in two steps. [`ValueSerializer`] turns any `T: Serialize`
//! into a [`Value`] tree keyed by structural field names; the document
//! [`Serializer`] then walks that tree against the record's [`RecordSchema`],
//! writing the heading and one bullet per field in declaration order.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_mdcodec::{record, to_string};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Point { x: i32, y: i32 }
//!
//! record! { Point { x: i32, y: i32 } }
//!
//! let text = to_string(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(text, "# Point\n\n- **x**: 1\n- **y**: 2\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! Records without a Rust type can be written from a [`Value`] and a schema:
//!
//! ```rust
//! use serde_mdcodec::{FieldDescriptor, Kind, Options, RecordMap, RecordSchema, Serializer, Value};
//!
//! let schema = RecordSchema::new("Tag").field(FieldDescriptor::new("label", Kind::String));
//! let mut fields = RecordMap::new();
//! fields.insert("label".to_string(), Value::from("urgent"));
//!
//! let mut serializer = Serializer::new(Options::new());
//! serializer.write_document(&Value::Record(fields), &schema).unwrap();
//! assert_eq!(serializer.into_inner(), "# Tag\n\n- **label**: urgent\n");
//! ```

use crate::coerce::render_scalar;
use crate::schema::ResolvedRecord;
use crate::{Error, FieldDescriptor, Kind, Options, RecordMap, RecordSchema, Result, Value};
use serde::ser::{self, Impossible};
use serde::Serialize;

/// The document serializer.
///
/// Writes [`Value`] records as heading + bullet-list text.
pub struct Serializer {
    output: String,
    options: Options,
}

impl Serializer {
    pub fn new(options: Options) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes `value` as the outermost record of a document.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `value` is not a record, or its fields
    ///   disagree with `schema`
    /// - [`Error::UnsupportedType`] for field values with no text form
    pub fn write_document(&mut self, value: &Value, schema: &RecordSchema) -> Result<()> {
        let fields = expect_record(value, schema.name())?;
        let resolved = schema.resolve()?;

        self.write_heading(&resolved, fields, 0)?;
        self.output.push('\n');
        self.write_fields(&resolved, fields, 0)
    }

    fn write_indent(&mut self, level: usize) {
        for _ in 0..level * self.options.indent {
            self.output.push(' ');
        }
    }

    fn write_heading(
        &mut self,
        resolved: &ResolvedRecord<'_>,
        fields: &RecordMap,
        level: usize,
    ) -> Result<()> {
        self.write_indent(level);
        self.output.push_str("# ");
        match resolved.title() {
            Some(title) => {
                let text = match field_value(fields, title, resolved.name())? {
                    Value::String(s) => s,
                    other => {
                        return Err(Error::invalid_argument(format!(
                            "title field `{}` of `{}` holds a {}",
                            title.name(),
                            resolved.name(),
                            other.kind_name()
                        )))
                    }
                };
                self.output.push_str(text);
                self.output.push_str(" (");
                self.output.push_str(resolved.name());
                self.output.push(')');
            }
            None => self.output.push_str(resolved.name()),
        }
        self.output.push('\n');
        Ok(())
    }

    fn write_fields(
        &mut self,
        resolved: &ResolvedRecord<'_>,
        fields: &RecordMap,
        level: usize,
    ) -> Result<()> {
        for field in resolved.body() {
            let value = field_value(fields, field, resolved.name())?;
            check_kind(field, value, resolved.name())?;
            self.write_field(field, value, level)?;
        }
        Ok(())
    }

    fn write_label(&mut self, label: &str, level: usize) {
        self.write_indent(level);
        self.output.push_str("- **");
        self.output.push_str(label);
        self.output.push_str("**:");
    }

    fn write_field(&mut self, field: &FieldDescriptor, value: &Value, level: usize) -> Result<()> {
        self.write_label(field.display_name(), level);

        match field.kind() {
            Kind::Record(schema) => {
                self.output.push('\n');
                self.write_nested(schema(), value, level + 1)
            }
            Kind::List(item) => {
                self.output.push('\n');
                let items = value.as_list().map(Vec::as_slice).unwrap_or_default();
                for element in items {
                    self.write_element(item, element, level + 1)?;
                }
                Ok(())
            }
            _ => {
                let text = render_scalar(value, &self.options)?;
                if !text.is_empty() {
                    self.output.push(' ');
                    self.output.push_str(&text);
                }
                self.output.push('\n');
                Ok(())
            }
        }
    }

    /// Nested records get no heading of their own unless they carry a title.
    fn write_nested(&mut self, schema: &RecordSchema, value: &Value, level: usize) -> Result<()> {
        let fields = expect_record(value, schema.name())?;
        let resolved = schema.resolve()?;

        if resolved.title().is_some() {
            self.write_heading(&resolved, fields, level)?;
        }
        self.write_fields(&resolved, fields, level)
    }

    fn write_element(&mut self, kind: &Kind, value: &Value, level: usize) -> Result<()> {
        match kind {
            Kind::Record(schema) => {
                let schema = schema();
                self.write_label(schema.name(), level);
                self.output.push('\n');
                self.write_nested(schema, value, level + 1)
            }
            Kind::List(_) => Err(Error::unsupported_type("nested lists")),
            scalar => {
                if !kind_accepts(scalar, value) {
                    return Err(Error::invalid_argument(format!(
                        "list element declared as {} holds a {}",
                        scalar,
                        value.kind_name()
                    )));
                }
                let text = render_scalar(value, &self.options)?;
                self.write_indent(level);
                self.output.push_str("- ");
                self.output.push_str(&text);
                self.output.push('\n');
                Ok(())
            }
        }
    }
}

fn expect_record<'v>(value: &'v Value, name: &str) -> Result<&'v RecordMap> {
    match value {
        Value::Record(fields) => Ok(fields),
        other => Err(Error::invalid_argument(format!(
            "expected a `{}` record, found {}",
            name,
            other.kind_name()
        ))),
    }
}

fn field_value<'v>(fields: &'v RecordMap, field: &FieldDescriptor, record: &str) -> Result<&'v Value> {
    fields.get(field.name()).ok_or_else(|| {
        Error::invalid_argument(format!(
            "`{}` record has no value for field `{}`",
            record,
            field.name()
        ))
    })
}

fn kind_accepts(kind: &Kind, value: &Value) -> bool {
    match (kind, value) {
        (Kind::Char, Value::String(s)) => s.chars().count() == 1,
        (Kind::BoundedInteger { min, max }, Value::Integer(n)) => (*min..=*max).contains(n),
        _ => matches!(
            (kind, value),
            (Kind::String, Value::String(_))
                | (Kind::Integer, Value::Integer(_))
                | (Kind::Float, Value::Float(_) | Value::Integer(_))
                | (Kind::Bool, Value::Bool(_))
                | (Kind::Record(_), Value::Record(_))
                | (Kind::List(_), Value::List(_))
        ),
    }
}

fn check_kind(field: &FieldDescriptor, value: &Value, record: &str) -> Result<()> {
    if kind_accepts(field.kind(), value) {
        return Ok(());
    }
    if value.is_null() {
        return Err(Error::unsupported_type(&format!(
            "field `{}` of `{}` holds an absent value",
            field.name(),
            record
        )));
    }
    let found = match (field.kind(), value) {
        (Kind::BoundedInteger { min, max }, Value::Integer(n)) => {
            format!("{} outside {}..={}", n, min, max)
        }
        (Kind::Char, Value::String(s)) => format!("`{}`", s),
        _ => format!("a {}", value.kind_name()),
    };
    Err(Error::invalid_argument(format!(
        "field `{}` of `{}` is declared as {} but holds {}",
        field.name(),
        record,
        field.kind(),
        found
    )))
}

/// Serializer producing a [`Value`] tree.
///
/// Struct fields keep their serde names and order. Maps, tuples, byte strings
/// and data-carrying enum variants have no document form and are rejected.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeRecord {
    map: RecordMap,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = Impossible<Value, Error>;
    type SerializeTupleStruct = Impossible<Value, Error>;
    type SerializeTupleVariant = Impossible<Value, Error>;
    type SerializeMap = Impossible<Value, Error>;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = Impossible<Value, Error>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| Error::unsupported_type(&format!("integer {} exceeds i64 range", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value> {
        Err(Error::unsupported_type("byte strings"))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::unsupported_type("newtype variants"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::unsupported_type("tuples"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::unsupported_type("tuple structs"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported_type("tuple variants"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::unsupported_type("maps"))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord {
            map: RecordMap::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::unsupported_type("struct variants"))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::List(self.vec))
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn address() -> &'static RecordSchema {
        static SCHEMA: OnceLock<RecordSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::new("Address")
                .field(FieldDescriptor::new("Street", Kind::String))
                .field(FieldDescriptor::new("City", Kind::String))
        })
    }

    fn pet() -> &'static RecordSchema {
        static SCHEMA: OnceLock<RecordSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::new("Pet")
                .field(FieldDescriptor::new("Name", Kind::String).title())
                .field(FieldDescriptor::new("Legs", Kind::Integer))
        })
    }

    fn record(entries: Vec<(&str, Value)>) -> Value {
        Value::Record(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn encode(value: &Value, schema: &RecordSchema) -> Result<String> {
        let mut serializer = Serializer::new(Options::default());
        serializer.write_document(value, schema)?;
        Ok(serializer.into_inner())
    }

    #[test]
    fn test_nested_record_is_indented_under_its_bullet() {
        let schema = RecordSchema::new("Person")
            .field(FieldDescriptor::new("Name", Kind::String).title())
            .field(FieldDescriptor::new("Age", Kind::Integer))
            .field(FieldDescriptor::new("Address", Kind::Record(address)));
        let value = record(vec![
            ("Name", Value::from("John Doe")),
            ("Age", Value::from(30)),
            (
                "Address",
                record(vec![
                    ("Street", Value::from("123 Maple St.")),
                    ("City", Value::from("Springfield")),
                ]),
            ),
        ]);

        assert_eq!(
            encode(&value, &schema).unwrap(),
            "# John Doe (Person)\n\n- **Age**: 30\n- **Address**:\n  - **Street**: 123 Maple St.\n  - **City**: Springfield\n"
        );
    }

    #[test]
    fn test_record_list_elements_are_consecutive_blocks() {
        let schema = RecordSchema::new("Owner")
            .field(FieldDescriptor::new("Pets", Kind::List(Box::new(Kind::Record(pet)))));
        let value = record(vec![(
            "Pets",
            Value::List(vec![
                record(vec![("Name", Value::from("Rex")), ("Legs", Value::from(4))]),
                record(vec![("Name", Value::from("Polly")), ("Legs", Value::from(2))]),
            ]),
        )]);

        assert_eq!(
            encode(&value, &schema).unwrap(),
            "# Owner\n\n- **Pets**:\n  - **Pet**:\n    # Rex (Pet)\n    - **Legs**: 4\n  - **Pet**:\n    # Polly (Pet)\n    - **Legs**: 2\n"
        );
    }

    #[test]
    fn test_scalar_list_and_empty_string() {
        let schema = RecordSchema::new("Note")
            .field(FieldDescriptor::new("Body", Kind::String))
            .field(FieldDescriptor::new("Tags", Kind::List(Box::new(Kind::String))));
        let value = record(vec![
            ("Body", Value::from("")),
            ("Tags", Value::List(vec![Value::from("a"), Value::from("b")])),
        ]);

        assert_eq!(
            encode(&value, &schema).unwrap(),
            "# Note\n\n- **Body**:\n- **Tags**:\n  - a\n  - b\n"
        );
    }

    #[test]
    fn test_non_record_input_is_invalid_argument() {
        let schema = RecordSchema::new("Person");
        assert!(matches!(
            encode(&Value::Null, &schema),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(&Value::from(3), &schema),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_kind_disagreement_is_rejected() {
        let schema = RecordSchema::new("Counter").field(FieldDescriptor::new("n", Kind::Integer));
        let err = encode(&record(vec![("n", Value::from("x"))]), &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = encode(&record(vec![("n", Value::Null)]), &schema).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));

        let err = encode(&record(vec![]), &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg.contains("no value for field `n`")));
    }

    #[test]
    fn test_bounded_kinds_check_the_value() {
        let schema = RecordSchema::new("Cell")
            .field(FieldDescriptor::new("n", Kind::BoundedInteger { min: 0, max: 255 }))
            .field(FieldDescriptor::new("c", Kind::Char));

        let out = encode(&record(vec![("n", Value::from(255)), ("c", Value::from("x"))]), &schema).unwrap();
        assert_eq!(out, "# Cell\n\n- **n**: 255\n- **c**: x\n");

        let err = encode(&record(vec![("n", Value::from(256)), ("c", Value::from("x"))]), &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg.contains("256 outside 0..=255")));

        let err = encode(&record(vec![("n", Value::from(1)), ("c", Value::from("xy"))]), &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_custom_indent() {
        let schema = RecordSchema::new("Outer")
            .field(FieldDescriptor::new("Address", Kind::Record(address)));
        let value = record(vec![(
            "Address",
            record(vec![("Street", Value::from("Elm")), ("City", Value::from("Oslo"))]),
        )]);

        let mut serializer = Serializer::new(Options::new().with_indent(4));
        serializer.write_document(&value, &schema).unwrap();
        assert_eq!(
            serializer.into_inner(),
            "# Outer\n\n- **Address**:\n    - **Street**: Elm\n    - **City**: Oslo\n"
        );
    }

    #[test]
    fn test_value_serializer_rejects_maps_and_tuples() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("k", 1);
        assert!(matches!(
            map.serialize(ValueSerializer),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            (1, 2).serialize(ValueSerializer),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            u64::MAX.serialize(ValueSerializer),
            Err(Error::UnsupportedType(_))
        ));
    }
}
