//! Document decoding.
//!
//! The [`Deserializer`] reads a document line by line against a
//! [`RecordSchema`], producing a [`Value`] record. Typed records are then
//! built from that tree through [`ValueDeserializer`].
//!
//! ## Overview
//!
//! - **Headings** (`# Title (Type)` or `# Type`) set the record's title field and
//!   check the type name
//! - **Scalar bullets** (`- **Name**: value`) are coerced to the field's kind
//! - **Nested bullets** (`- **Name**:`) own the indented block below them, which
//!   holds a nested record, a list of record elements, or `- value` items
//! - Blank lines and any other text are ignored
//!
//! Every field starts at its zero value, so fields the document omits come back
//! as `""`, `0`, `0.0`, `false` or an empty list.
//!
//! ## Usage
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_mdcodec::{from_str, record};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! record! { Data { x: i32, y: i32 } }
//!
//! let data: Data = from_str("# Data\n\n- **x**: 1\n- **y**: 2\n").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```

use crate::block::{extract_block, split_elements, split_lines, Line};
use crate::coerce::parse_scalar;
use crate::{Error, FieldDescriptor, Kind, LabelMatch, RecordMap, RecordSchema, Result, Value};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use tracing::{debug, trace};

/// What a single document line means to the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Heading {
        title: Option<&'a str>,
        type_name: &'a str,
    },
    Field {
        label: &'a str,
        value: &'a str,
    },
    Other,
}

fn classify(text: &str) -> LineKind<'_> {
    if let Some(rest) = text.strip_prefix("# ") {
        let rest = rest.trim_end();
        // the title is everything up to the single space before `(Type)`
        if let Some((title, type_name)) = rest
            .strip_suffix(')')
            .and_then(|inner| inner.rsplit_once('('))
            .and_then(|(title, type_name)| Some((title.strip_suffix(' ')?, type_name)))
        {
            return LineKind::Heading {
                title: Some(title),
                type_name: type_name.trim(),
            };
        }
        return LineKind::Heading {
            title: None,
            type_name: rest.trim(),
        };
    }

    if let Some((label, value)) = text
        .strip_prefix("- **")
        .and_then(|rest| rest.split_once("**:"))
    {
        return LineKind::Field {
            label,
            value: value.strip_prefix(' ').unwrap_or(value),
        };
    }

    LineKind::Other
}

/// Text of a `- value` list item; a bare `-` is the empty string.
fn item_text(text: &str) -> Option<&str> {
    if text == "-" {
        Some("")
    } else {
        text.strip_prefix("- ")
    }
}

/// The document deserializer.
///
/// Holds a document and the schema of its outermost record. A document is
/// consumed by a single [`decode`](Deserializer::decode) call.
pub struct Deserializer<'a> {
    lines: Vec<Line<'a>>,
    schema: &'a RecordSchema,
    /// Record types currently being decoded, outermost first.
    stack: Vec<&'static str>,
}

impl<'a> Deserializer<'a> {
    pub fn new(input: &'a str, schema: &'a RecordSchema) -> Self {
        Deserializer {
            lines: split_lines(input),
            schema,
            stack: Vec::new(),
        }
    }

    /// Decodes the document into a record value.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the schema does not resolve
    /// - [`Error::UnknownField`], [`Error::TypeMismatch`] and
    ///   [`Error::MalformedDocument`] for documents that do not fit the schema
    /// - [`Error::InvalidNumber`] and [`Error::InvalidBoolean`] for bad scalars
    pub fn decode(mut self) -> Result<Value> {
        let lines = std::mem::take(&mut self.lines);
        let schema = self.schema;
        debug!(record = schema.name(), lines = lines.len(), "decoding document");

        let mut fields = schema.zero_record();
        self.decode_record(&lines, schema, true, &mut fields)?;
        debug!(record = schema.name(), fields = fields.len(), "decoded document");
        Ok(Value::Record(fields))
    }

    fn path(&self) -> String {
        self.stack.join(".")
    }

    /// Fills `fields` from the lines of one record scope.
    ///
    /// At document level a heading for another type, or a second heading,
    /// ends the record. Inside a nested block a foreign heading is an error.
    fn decode_record(
        &mut self,
        lines: &[Line<'_>],
        schema: &RecordSchema,
        outermost: bool,
        fields: &mut RecordMap,
    ) -> Result<()> {
        let resolved = schema.resolve()?;
        self.stack.push(resolved.name());

        let mut seen_heading = false;
        let mut rest = lines;

        while let Some((line, after)) = rest.split_first() {
            rest = after;

            match classify(line.text) {
                LineKind::Heading { title, type_name } => {
                    if type_name != resolved.name() {
                        if outermost {
                            debug!(line = line.number, found = type_name, "document boundary");
                            break;
                        }
                        return Err(Error::type_mismatch(
                            line.number,
                            resolved.name(),
                            type_name,
                        ));
                    }
                    if outermost && seen_heading {
                        debug!(line = line.number, "second heading ends document");
                        break;
                    }
                    seen_heading = true;

                    if let (Some(field), Some(title)) = (resolved.title(), title) {
                        fields.insert(field.name().to_string(), Value::String(title.to_string()));
                    }
                }
                LineKind::Field { label, value } => {
                    let (field, stage) = resolved
                        .lookup(label)
                        .ok_or_else(|| Error::unknown_field(line.number, label))?;
                    if stage == LabelMatch::Structural {
                        trace!(label, line = line.number, "matched structural field name");
                    }

                    let decoded = if field.kind().is_scalar() {
                        parse_scalar(value, field.kind(), line.number)?
                    } else {
                        if !value.trim().is_empty() {
                            return Err(Error::malformed(
                                line.number,
                                &format!(
                                    "field `{}` expects a nested block, found inline value",
                                    label
                                ),
                            ));
                        }
                        let (block, remaining) = extract_block(rest, line.indent);
                        rest = remaining;
                        self.decode_nested(field, line, block)?
                    };

                    trace!(path = %self.path(), field = field.name(), "assigned field");
                    fields.insert(field.name().to_string(), decoded);
                }
                LineKind::Other => {}
            }
        }

        self.stack.pop();
        Ok(())
    }

    fn decode_nested(
        &mut self,
        field: &FieldDescriptor,
        intro: &Line<'_>,
        block: &[Line<'_>],
    ) -> Result<Value> {
        match field.kind() {
            Kind::Record(schema) => self.decode_block_record(schema(), intro, block),
            Kind::List(item) => self.decode_list(item, block),
            scalar => Err(Error::unsupported_type(&format!(
                "{} cannot hold a nested block",
                scalar
            ))),
        }
    }

    fn decode_block_record(
        &mut self,
        schema: &RecordSchema,
        intro: &Line<'_>,
        block: &[Line<'_>],
    ) -> Result<Value> {
        if block.is_empty() && !schema.fields().is_empty() {
            return Err(Error::malformed(
                intro.number,
                &format!("missing nested block for `{}`", schema.name()),
            ));
        }

        let mut fields = schema.zero_record();
        self.decode_record(block, schema, false, &mut fields)?;
        Ok(Value::Record(fields))
    }

    fn decode_list(&mut self, item: &Kind, block: &[Line<'_>]) -> Result<Value> {
        let elements = split_elements(block);
        let mut items = Vec::with_capacity(elements.len());

        for element in elements {
            let head = element.head;
            let value = match item {
                Kind::Record(schema) => {
                    let schema = schema();
                    match classify(head.text) {
                        LineKind::Field { label, value } if value.trim().is_empty() => {
                            if label != schema.name() {
                                return Err(Error::type_mismatch(head.number, schema.name(), label));
                            }
                        }
                        _ => {
                            return Err(Error::malformed(
                                head.number,
                                &format!("expected a `- **{}**:` list element", schema.name()),
                            ))
                        }
                    }
                    self.decode_block_record(schema, head, element.body)?
                }
                Kind::List(_) => return Err(Error::unsupported_type("nested lists")),
                scalar => {
                    if !element.body.is_empty() {
                        return Err(Error::malformed(
                            element.body[0].number,
                            "unexpected nested block under a list item",
                        ));
                    }
                    let text = item_text(head.text).ok_or_else(|| {
                        Error::malformed(head.number, "expected a `- value` list item")
                    })?;
                    parse_scalar(text, scalar, head.number)?
                }
            };
            items.push(value);
        }

        Ok(Value::List(items))
    }
}

impl<'de, 'a> de::Deserializer<'de> for Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_any(ValueDeserializer::new(self.decode()?), visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// Deserializer reading typed values out of a [`Value`] tree.
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::List(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Record(fields) => visitor.visit_map(MapDeserializer::new(fields)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(variant.into_deserializer()),
            other => Err(Error::unsupported_type(&format!(
                "enum from a {} value",
                other.kind_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(fields: RecordMap) -> Self {
        MapDeserializer {
            iter: fields.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
