//! Record schemas and field metadata resolution.
//!
//! Every record type carries a static table of [`FieldDescriptor`]s, exposed
//! through the [`Record`] trait and normally generated by the
//! [`record!`](crate::record) macro. The encoder and decoder only ever look at
//! this table; they never inspect a Rust type directly.
//!
//! A descriptor records the field's structural name (the Rust/serde field
//! name), an optional display name override, its value [`Kind`] and its
//! [`Role`]. Before use a schema is resolved into a [`ResolvedRecord`], which
//! validates the table and answers lookups in both directions.

use crate::{Error, RecordMap, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Accessor for a nested record type's schema.
///
/// Stored as a function pointer so that self-referential record types (a
/// `Vec<Node>` inside `Node`) do not build an infinite descriptor tree.
pub type SchemaFn = fn() -> &'static RecordSchema;

/// The value kind of a field.
#[derive(Clone)]
pub enum Kind {
    String,
    /// A single character, written verbatim.
    Char,
    Integer,
    /// An integer restricted to `min..=max`, for Rust types narrower than
    /// `i64`.
    BoundedInteger { min: i64, max: i64 },
    Float,
    Bool,
    Record(SchemaFn),
    List(Box<Kind>),
}

impl Kind {
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Kind::String
                | Kind::Char
                | Kind::Integer
                | Kind::BoundedInteger { .. }
                | Kind::Float
                | Kind::Bool
        )
    }

    /// The value a field of this kind holds before the decoder assigns it.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            Kind::String => Value::String(String::new()),
            Kind::Char => Value::String("\0".to_string()),
            Kind::Integer | Kind::BoundedInteger { .. } => Value::Integer(0),
            Kind::Float => Value::Float(0.0),
            Kind::Bool => Value::Bool(false),
            Kind::Record(schema) => schema().zero_value(),
            Kind::List(_) => Value::List(Vec::new()),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => f.write_str("string"),
            Kind::Char => f.write_str("character"),
            Kind::Integer | Kind::BoundedInteger { .. } => f.write_str("integer"),
            Kind::Float => f.write_str("float"),
            Kind::Bool => f.write_str("boolean"),
            Kind::Record(schema) => write!(f, "record {}", schema().name()),
            Kind::List(item) => write!(f, "list of {}", item),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Role flags of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Plain,
    /// The field's value is promoted into the record heading.
    Title,
}

/// Metadata for one field of a record type.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::{FieldDescriptor, Kind, Role};
///
/// let field = FieldDescriptor::new("age", Kind::Integer).rename("Age");
/// assert_eq!(field.name(), "age");
/// assert_eq!(field.display_name(), "Age");
/// assert_eq!(field.role(), Role::Plain);
/// ```
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    rename: Option<&'static str>,
    kind: Kind,
    role: Role,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: &'static str, kind: Kind) -> Self {
        FieldDescriptor {
            name,
            rename: None,
            kind,
            role: Role::Plain,
        }
    }

    /// Overrides the name written in documents.
    #[must_use]
    pub fn rename(mut self, display: &'static str) -> Self {
        self.rename = Some(display);
        self
    }

    /// Marks the field as the record's title.
    #[must_use]
    pub fn title(mut self) -> Self {
        self.role = Role::Title;
        self
    }

    /// The structural (Rust/serde) field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name written in documents: the override if present, else the
    /// structural name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_title(&self) -> bool {
        self.role == Role::Title
    }
}

/// The descriptor table of one record type, in declaration order.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::{FieldDescriptor, Kind, RecordSchema};
///
/// let schema = RecordSchema::new("Person")
///     .field(FieldDescriptor::new("name", Kind::String).title())
///     .field(FieldDescriptor::new("age", Kind::Integer).rename("Age"));
///
/// let resolved = schema.resolve().unwrap();
/// assert_eq!(resolved.title().map(|f| f.name()), Some("name"));
/// assert_eq!(resolved.body().count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct RecordSchema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        RecordSchema {
            name,
            fields: Vec::new(),
        }
    }

    /// Appends a field; fields are emitted in the order they are added.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// The record type name used in headings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// A record with every field at its kind's zero value.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        Value::Record(self.zero_record())
    }

    /// The fields of [`zero_value`](Self::zero_value), in declaration order.
    #[must_use]
    pub fn zero_record(&self) -> RecordMap {
        self.fields
            .iter()
            .map(|field| (field.name.to_string(), field.kind.zero_value()))
            .collect()
    }

    /// Validates the table and prepares it for lookups.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if more than one field has the title role,
    ///   the title field is not a string, or two fields share a display name.
    /// - [`Error::UnsupportedType`] if a field is a list of lists.
    pub fn resolve(&self) -> Result<ResolvedRecord<'_>> {
        let mut title: Option<&FieldDescriptor> = None;

        for (index, field) in self.fields.iter().enumerate() {
            if field.is_title() {
                if let Some(first) = title {
                    return Err(Error::invalid_argument(format!(
                        "record type `{}` declares more than one title field (`{}`, `{}`)",
                        self.name, first.name, field.name
                    )));
                }
                if !matches!(field.kind, Kind::String) {
                    return Err(Error::invalid_argument(format!(
                        "title field `{}` of `{}` must be a string, found {}",
                        field.name, self.name, field.kind
                    )));
                }
                title = Some(field);
            }

            if let Kind::List(item) = &field.kind {
                if matches!(**item, Kind::List(_)) {
                    return Err(Error::unsupported_type(&format!(
                        "field `{}` of `{}` is a nested list",
                        field.name, self.name
                    )));
                }
            }

            let display = field.display_name();
            if self.fields[..index]
                .iter()
                .any(|other| other.display_name() == display)
            {
                return Err(Error::invalid_argument(format!(
                    "record type `{}` uses the field name `{}` twice",
                    self.name, display
                )));
            }
        }

        Ok(ResolvedRecord {
            schema: self,
            title,
        })
    }
}

/// Which resolution stage matched a document label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelMatch {
    /// The label equals the field's display name.
    Display,
    /// No display name matched; the label equals the structural name.
    Structural,
}

/// A validated record schema.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedRecord<'s> {
    schema: &'s RecordSchema,
    title: Option<&'s FieldDescriptor>,
}

impl<'s> ResolvedRecord<'s> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    #[must_use]
    pub fn schema(&self) -> &'s RecordSchema {
        self.schema
    }

    /// The title field, if the record type has one.
    #[must_use]
    pub fn title(&self) -> Option<&'s FieldDescriptor> {
        self.title
    }

    /// Fields written as bullets: every field except the title, in
    /// declaration order.
    pub fn body(&self) -> impl Iterator<Item = &'s FieldDescriptor> {
        self.schema.fields.iter().filter(|field| !field.is_title())
    }

    /// Maps a document label back to a field.
    ///
    /// Display names are tried first across all fields; only if none matches
    /// is the label compared with structural names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mdcodec::{FieldDescriptor, Kind, LabelMatch, RecordSchema};
    ///
    /// let schema = RecordSchema::new("Person")
    ///     .field(FieldDescriptor::new("age", Kind::Integer).rename("Age"));
    /// let resolved = schema.resolve().unwrap();
    ///
    /// let (field, stage) = resolved.lookup("Age").unwrap();
    /// assert_eq!((field.name(), stage), ("age", LabelMatch::Display));
    ///
    /// let (field, stage) = resolved.lookup("age").unwrap();
    /// assert_eq!((field.name(), stage), ("age", LabelMatch::Structural));
    /// ```
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<(&'s FieldDescriptor, LabelMatch)> {
        let fields = &self.schema.fields;
        fields
            .iter()
            .find(|field| field.display_name() == label)
            .map(|field| (field, LabelMatch::Display))
            .or_else(|| {
                fields
                    .iter()
                    .find(|field| field.name == label)
                    .map(|field| (field, LabelMatch::Structural))
            })
    }
}

/// A Rust type with a registered record schema.
///
/// Implemented by the [`record!`](crate::record) macro. The schema's structural
/// field names must match the names serde uses for the type.
pub trait Record: Serialize + DeserializeOwned {
    fn schema() -> &'static RecordSchema;
}

/// Maps a Rust field type to its document [`Kind`].
pub trait FieldType {
    fn kind() -> Kind;
}

macro_rules! impl_field_type {
    ($kind:ident: $($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }
            }
        )*
    };
}

macro_rules! impl_bounded_integer {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                fn kind() -> Kind {
                    Kind::BoundedInteger {
                        min: i64::try_from(<$ty>::MIN).unwrap_or(i64::MIN),
                        max: i64::try_from(<$ty>::MAX).unwrap_or(i64::MAX),
                    }
                }
            }
        )*
    };
}

impl_field_type!(String: String);
impl_field_type!(Char: char);
impl_field_type!(Integer: i64);
impl_field_type!(Float: f32, f64);
impl_field_type!(Bool: bool);
impl_bounded_integer!(i8, i16, i32, isize, u8, u16, u32, u64, usize);

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> Kind {
        Kind::List(Box::new(T::kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_schema() -> &'static RecordSchema {
        static SCHEMA: std::sync::OnceLock<RecordSchema> = std::sync::OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::new("Address")
                .field(FieldDescriptor::new("street", Kind::String).rename("Street"))
                .field(FieldDescriptor::new("city", Kind::String).rename("City"))
        })
    }

    fn person_schema() -> RecordSchema {
        RecordSchema::new("Person")
            .field(FieldDescriptor::new("name", Kind::String).title())
            .field(FieldDescriptor::new("age", Kind::Integer).rename("Age"))
            .field(FieldDescriptor::new("address", Kind::Record(address_schema)).rename("Address"))
    }

    #[test]
    fn test_title_is_excluded_from_body() {
        let schema = person_schema();
        let resolved = schema.resolve().unwrap();
        let body: Vec<_> = resolved.body().map(FieldDescriptor::display_name).collect();
        assert_eq!(body, vec!["Age", "Address"]);
        assert_eq!(resolved.title().map(FieldDescriptor::name), Some("name"));
    }

    #[test]
    fn test_display_name_defaults_to_structural_name() {
        let field = FieldDescriptor::new("street", Kind::String);
        assert_eq!(field.display_name(), "street");
    }

    #[test]
    fn test_display_stage_takes_precedence_over_structural() {
        // `first` is displayed as "second", which is also the other field's
        // structural name.
        let schema = RecordSchema::new("Pair")
            .field(FieldDescriptor::new("first", Kind::Integer).rename("second"))
            .field(FieldDescriptor::new("second", Kind::Integer).rename("Other"));
        let resolved = schema.resolve().unwrap();

        let (field, stage) = resolved.lookup("second").unwrap();
        assert_eq!(field.name(), "first");
        assert_eq!(stage, LabelMatch::Display);

        let (field, stage) = resolved.lookup("first").unwrap();
        assert_eq!(field.name(), "first");
        assert_eq!(stage, LabelMatch::Structural);

        assert!(resolved.lookup("third").is_none());
    }

    #[test]
    fn test_two_title_fields_are_rejected() {
        let schema = RecordSchema::new("Book")
            .field(FieldDescriptor::new("title", Kind::String).title())
            .field(FieldDescriptor::new("subtitle", Kind::String).title());
        let err = schema.resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg.contains("more than one title")));
    }

    #[test]
    fn test_non_string_title_is_rejected() {
        let schema =
            RecordSchema::new("Counter").field(FieldDescriptor::new("n", Kind::Integer).title());
        assert!(matches!(schema.resolve(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_duplicate_display_names_are_rejected() {
        let schema = RecordSchema::new("Dup")
            .field(FieldDescriptor::new("a", Kind::String).rename("Name"))
            .field(FieldDescriptor::new("b", Kind::String).rename("Name"));
        assert!(matches!(schema.resolve(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_nested_lists_are_unsupported() {
        let schema = RecordSchema::new("Grid").field(FieldDescriptor::new(
            "cells",
            <Vec<Vec<i32>> as FieldType>::kind(),
        ));
        assert!(matches!(schema.resolve(), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_zero_value_recurses_into_nested_records() {
        let zero = person_schema().zero_value();
        let map = zero.as_record().unwrap();
        assert_eq!(map.get("name"), Some(&Value::from("")));
        assert_eq!(map.get("age"), Some(&Value::Integer(0)));
        let address = map.get("address").and_then(Value::as_record).unwrap();
        assert_eq!(address.get("city"), Some(&Value::from("")));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(<Vec<u8> as FieldType>::kind().to_string(), "list of integer");
        assert_eq!(Kind::Record(address_schema).to_string(), "record Address");
        assert_eq!(<char as FieldType>::kind().to_string(), "character");
    }

    #[test]
    fn test_integer_kinds_carry_their_range() {
        assert!(matches!(
            <u8 as FieldType>::kind(),
            Kind::BoundedInteger { min: 0, max: 255 }
        ));
        assert!(matches!(
            <i16 as FieldType>::kind(),
            Kind::BoundedInteger { min: -32768, max: 32767 }
        ));
        assert!(matches!(
            <u64 as FieldType>::kind(),
            Kind::BoundedInteger { min: 0, max: i64::MAX }
        ));
        assert!(matches!(<i64 as FieldType>::kind(), Kind::Integer));
    }

    #[test]
    fn test_char_zero_value_is_nul() {
        assert_eq!(Kind::Char.zero_value(), Value::from("\0"));
    }
}
