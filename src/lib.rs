//! # serde_mdcodec
//!
//! A Serde-compatible codec between typed records and a nested bulleted-list
//! document format, the kind of structured Markdown that reads well in a plain
//! text editor and stays easy to diff.
//!
//! ## The Document Format
//!
//! ```text
//! # John Doe (Person)
//!
//! - **Age**: 30
//! - **Address**:
//!   - **Street**: 123 Maple St.
//!   - **City**: Springfield
//! ```
//!
//! - **Heading**: `# <Title> (<TypeName>)`, or `# <TypeName>` when the record has
//!   no title field
//! - **Scalar field**: `- **<Name>**: <value>`
//! - **Nested field**: `- **<Name>**:` followed by a block indented one level deeper
//! - **List of records**: each element is an `- **<ElementType>**:` bullet with its
//!   own nested block
//! - **List of scalars**: one `- <value>` line per element
//!
//! Blocks are delimited by indentation alone. Blank lines may appear anywhere.
//!
//! ## Quick Start
//!
//! Record types derive serde's traits and declare their document schema with
//! [`record!`]:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_mdcodec::{from_str, record, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Address { street: String, city: String }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Person { name: String, age: u32, address: Address }
//!
//! record! {
//!     Address {
//!         #[rename = "Street"] street: String,
//!         #[rename = "City"] city: String,
//!     }
//! }
//!
//! record! {
//!     Person {
//!         #[title] name: String,
//!         #[rename = "Age"] age: u32,
//!         #[rename = "Address"] address: Address,
//!     }
//! }
//!
//! let person = Person {
//!     name: "John Doe".to_string(),
//!     age: 30,
//!     address: Address {
//!         street: "123 Maple St.".to_string(),
//!         city: "Springfield".to_string(),
//!     },
//! };
//!
//! let doc = to_string(&person).unwrap();
//! assert_eq!(
//!     doc,
//!     "# John Doe (Person)\n\n- **Age**: 30\n- **Address**:\n  - **Street**: 123 Maple St.\n  - **City**: Springfield\n"
//! );
//!
//! let back: Person = from_str(&doc).unwrap();
//! assert_eq!(back, person);
//! ```
//!
//! ## Field Lookup
//!
//! Decoding matches a bullet label against display names first and falls back
//! to structural (Rust) field names, so `- **age**: 30` also fills the `age`
//! field above.
//!
//! ## Schemas Without Rust Types
//!
//! [`encode_value`] and [`decode_value`] work on [`Value`] trees against a
//! [`RecordSchema`] built at runtime.
//!
//! ## Logging
//!
//! Encoding and decoding emit [`tracing`] events at `debug` and `trace` level.
//! The crate installs no subscriber.

pub mod block;
pub mod coerce;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod schema;
pub mod ser;
pub mod value;

pub use de::{Deserializer, ValueDeserializer};
pub use error::{Error, Result};
pub use map::RecordMap;
pub use options::Options;
pub use schema::{
    FieldDescriptor, FieldType, Kind, LabelMatch, Record, RecordSchema, ResolvedRecord, Role,
    SchemaFn,
};
pub use ser::{Serializer, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use tracing::debug;

/// Encode a record as a document string.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_mdcodec::{record, to_string};
///
/// #[derive(Serialize, Deserialize)]
/// struct Point { x: i32, y: i32 }
///
/// record! { Point { x: i32, y: i32 } }
///
/// let doc = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(doc, "# Point\n\n- **x**: 1\n- **y**: 2\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the record's schema does not resolve or
/// its values disagree with it, and [`Error::UnsupportedType`] for values the
/// format cannot carry.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: Record,
{
    to_string_with_options(value, Options::default())
}

/// Encode a record as a document string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_mdcodec::{record, to_string_with_options, Options};
///
/// #[derive(Serialize, Deserialize)]
/// struct Reading { celsius: f64 }
///
/// record! { Reading { celsius: f64 } }
///
/// let options = Options::new().with_float_precision(2);
/// let doc = to_string_with_options(&Reading { celsius: 21.5 }, options).unwrap();
/// assert_eq!(doc, "# Reading\n\n- **celsius**: 21.50\n");
/// ```
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: Options) -> Result<String>
where
    T: Record,
{
    let value = to_value(value)?;
    encode_value(&value, T::schema(), options)
}

/// Encode a record into a writer.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_mdcodec::{record, to_writer};
///
/// #[derive(Serialize, Deserialize)]
/// struct Flag { on: bool }
///
/// record! { Flag { on: bool } }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Flag { on: true }).unwrap();
/// assert_eq!(buffer, b"# Flag\n\n- **on**: true\n");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Record,
{
    to_writer_with_options(writer, value, Options::default())
}

/// Encode a record into a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: Options) -> Result<()>
where
    W: io::Write,
    T: Record,
{
    let doc = to_string_with_options(value, options)?;
    writer
        .write_all(doc.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Encode a [`Value`] record against a schema.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::{encode_value, FieldDescriptor, Kind, Options, RecordMap, RecordSchema, Value};
///
/// let schema = RecordSchema::new("City")
///     .field(FieldDescriptor::new("name", Kind::String).title())
///     .field(FieldDescriptor::new("population", Kind::Integer).rename("Population"));
///
/// let mut fields = RecordMap::new();
/// fields.insert("name".to_string(), Value::from("Oslo"));
/// fields.insert("population".to_string(), Value::from(709_000));
///
/// let doc = encode_value(&Value::Record(fields), &schema, Options::default()).unwrap();
/// assert_eq!(doc, "# Oslo (City)\n\n- **Population**: 709000\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `value` is not a record matching
/// `schema`, and [`Error::UnsupportedType`] for values with no document form.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_value(value: &Value, schema: &RecordSchema, options: Options) -> Result<String> {
    debug!(record = schema.name(), "encoding document");
    let mut serializer = Serializer::new(options);
    serializer.write_document(value, schema)?;
    let doc = serializer.into_inner();
    debug!(record = schema.name(), bytes = doc.len(), "encoded document");
    Ok(doc)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_mdcodec::{to_value, Value};
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_record());
/// assert_eq!(value.as_record().and_then(|r| r.get("y")), Some(&Value::Integer(2)));
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for maps, tuples, bytes, data-carrying
/// enum variants and integers beyond `i64`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Decode a record from a document string.
///
/// Fields the document leaves out keep their zero values.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_mdcodec::{from_str, record};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// record! { Point { x: i32, y: i32 } }
///
/// let point: Point = from_str("# Point\n- **x**: 1\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 0 });
/// ```
///
/// # Errors
///
/// Returns the first error found, with the document line it occurred on:
/// [`Error::UnknownField`], [`Error::TypeMismatch`], [`Error::InvalidNumber`],
/// [`Error::InvalidBoolean`] or [`Error::MalformedDocument`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: Record,
{
    T::deserialize(Deserializer::new(s, T::schema()))
}

/// Decode a record from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_mdcodec::{from_reader, record};
/// use std::io::Cursor;
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// record! { Point { x: i32, y: i32 } }
///
/// let cursor = Cursor::new(b"# Point\n- **x**: 1\n- **y**: 2\n");
/// let point: Point = from_reader(cursor).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the document does not decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: Record,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Decode a record from UTF-8 bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or the document does not
/// decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: Record,
{
    let s = std::str::from_utf8(v).map_err(Error::invalid_argument)?;
    from_str(s)
}

/// Decode a document into a [`Value`] record against a schema.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::{decode_value, FieldDescriptor, Kind, RecordSchema, Value};
///
/// let schema = RecordSchema::new("City")
///     .field(FieldDescriptor::new("name", Kind::String).title())
///     .field(FieldDescriptor::new("population", Kind::Integer).rename("Population"));
///
/// let value = decode_value("# Oslo (City)\n\n- **Population**: 709000\n", &schema).unwrap();
/// let fields = value.as_record().unwrap();
/// assert_eq!(fields.get("name"), Some(&Value::from("Oslo")));
/// assert_eq!(fields.get("population"), Some(&Value::Integer(709_000)));
/// ```
///
/// # Errors
///
/// Same as [`from_str`], plus [`Error::InvalidArgument`] if `schema` does not
/// resolve.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_value(s: &str, schema: &RecordSchema) -> Result<Value> {
    Deserializer::new(s, schema).decode()
}

/// Build a `T` out of a [`Value`].
///
/// # Errors
///
/// Returns an error if the value's shape does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}
