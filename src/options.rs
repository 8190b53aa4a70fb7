//! Configuration options for document encoding.
//!
//! Decoding needs no options: nested blocks are delimited by relative
//! indentation, so documents written with any indent width read back.
//!
//! ## Examples
//!
//! ```rust
//! use serde_mdcodec::Options;
//!
//! // Four spaces per nesting level, floats with two fractional digits
//! let options = Options::new().with_indent(4).with_float_precision(2);
//! assert_eq!(options.indent, 4);
//! assert_eq!(options.float_precision, Some(2));
//! ```

/// Configuration options for document encoding.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::Options;
///
/// let options = Options::new();
/// assert_eq!(options.indent, 2);
/// assert_eq!(options.float_precision, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Spaces added per nesting level.
    pub indent: usize,
    /// Fixed number of fractional digits for floats. `None` writes the
    /// shortest decimal that reads back to the same value.
    pub float_precision: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: 2,
            float_precision: None,
        }
    }
}

impl Options {
    /// Creates default options (2-space indent, shortest float form).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation size (number of spaces per nesting level).
    ///
    /// A width of zero would flatten nested blocks into their parent, so it is
    /// clamped to one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mdcodec::Options;
    ///
    /// assert_eq!(Options::new().with_indent(4).indent, 4);
    /// assert_eq!(Options::new().with_indent(0).indent, 1);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    /// Writes floats in fixed-point form with `digits` fractional digits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_mdcodec::Options;
    ///
    /// let options = Options::new().with_float_precision(6);
    /// assert_eq!(options.float_precision, Some(6));
    /// ```
    #[must_use]
    pub fn with_float_precision(mut self, digits: usize) -> Self {
        self.float_precision = Some(digits);
        self
    }
}
