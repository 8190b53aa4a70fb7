//! Error types for document encoding and decoding.
//!
//! Every failure is reported to the immediate caller; decoding is fail-fast and
//! stops at the first problem it meets.
//!
//! ## Error Categories
//!
//! - **Shape errors**: [`Error::InvalidArgument`] for values or schemas that are not
//!   a usable record, [`Error::UnsupportedType`] for kinds with no text form
//! - **Document errors**: [`Error::UnknownField`], [`Error::TypeMismatch`] and
//!   [`Error::MalformedDocument`], all carrying the 1-based line number
//! - **Coercion errors**: [`Error::InvalidNumber`] and [`Error::InvalidBoolean`]
//! - **I/O errors**: reading or writing failures from the reader/writer helpers
//!
//! ## Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_mdcodec::{from_str, record, Error};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Person { name: String, age: u32 }
//!
//! record! { Person { #[title] name: String, #[rename = "Age"] age: u32 } }
//!
//! let result: Result<Person, Error> = from_str("# Ann (Person)\n\n- **Age**: Thirty\n");
//! assert!(matches!(result, Err(Error::InvalidNumber { line: 3, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while transcoding documents.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The value or schema handed to the codec is not a usable record.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A bullet names a field the target record type does not have.
    #[error("Unknown field `{name}` at line {line}")]
    UnknownField { line: usize, name: String },

    /// A heading or element bullet names a different record type than expected,
    /// or a character field holds other than one character.
    #[error("Type mismatch at line {line}: expected {expected}, found {found}")]
    TypeMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    /// Text that should hold an integer or float does not parse as one, or
    /// lies outside the field's range.
    #[error("Invalid number at line {line}: `{text}`")]
    InvalidNumber { line: usize, text: String },

    /// Text that should hold a boolean is neither `true` nor `false`.
    #[error("Invalid boolean at line {line}: `{text}` (expected `true` or `false`)")]
    InvalidBoolean { line: usize, text: String },

    /// A value kind with no document representation.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// The document does not have the structure the target record requires.
    #[error("Malformed document at line {line}: {msg}")]
    MalformedDocument { line: usize, msg: String },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error, usually raised by serde-derived code
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an invalid argument error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mdcodec::Error;
    ///
    /// let err = Error::invalid_argument("expected a record, found null");
    /// assert!(err.to_string().contains("found null"));
    /// ```
    pub fn invalid_argument<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates an unknown field error for the bullet at `line`.
    pub fn unknown_field(line: usize, name: &str) -> Self {
        Error::UnknownField {
            line,
            name: name.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mdcodec::Error;
    ///
    /// let err = Error::type_mismatch(4, "Address", "Pet");
    /// assert!(err.to_string().contains("expected Address, found Pet"));
    /// ```
    pub fn type_mismatch(line: usize, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn invalid_number(line: usize, text: &str) -> Self {
        Error::InvalidNumber {
            line,
            text: text.to_string(),
        }
    }

    pub fn invalid_boolean(line: usize, text: &str) -> Self {
        Error::InvalidBoolean {
            line,
            text: text.to_string(),
        }
    }

    /// Creates an unsupported type error for kinds that have no text form.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a malformed document error for the line at `line`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mdcodec::Error;
    ///
    /// let err = Error::malformed(7, "missing nested block for `Address`");
    /// assert!(err.to_string().contains("line 7"));
    /// ```
    pub fn malformed(line: usize, msg: &str) -> Self {
        Error::MalformedDocument {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the document line the error points at, if it has one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::UnknownField { line, .. }
            | Error::TypeMismatch { line, .. }
            | Error::InvalidNumber { line, .. }
            | Error::InvalidBoolean { line, .. }
            | Error::MalformedDocument { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
