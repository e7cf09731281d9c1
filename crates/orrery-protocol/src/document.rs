//! Incremental JSON text writer.
//!
//! [`DocumentBuilder`] emits JSON in document order without building a tree.
//! The only state kept beyond the output buffer is the stack of open
//! containers and a handful of flags used to place separators:
//!
//! ```
//! use orrery_protocol::DocumentBuilder;
//!
//! let mut builder = DocumentBuilder::new();
//! builder
//!     .start_object()
//!     .key("a")
//!     .value(1)
//!     .key("b")
//!     .start_array()
//!     .value(1)
//!     .value(2)
//!     .value(3)
//!     .end_array()
//!     .end_object();
//! let document = builder.finish().expect("finite numbers only");
//! assert_eq!(document.as_str(), r#"{"a":1,"b":[1,2,3]}"#);
//! ```
//!
//! Unbalanced or out-of-place calls are handler bugs and panic immediately;
//! carrying on would hand the client a corrupt document.

use std::fmt;

use thiserror::Error;

/// Errors surfaced when finishing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A NaN or infinite float was written; JSON has no representation for it.
    #[error("non-finite number {value} cannot be represented in JSON")]
    NonFiniteNumber {
        /// Textual form of the rejected value (`NaN`, `inf`, `-inf`).
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

impl Container {
    const fn closer(self) -> char {
        match self {
            Self::Object => '}',
            Self::Array => ']',
        }
    }
}

/// Streaming writer producing a single JSON value.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    out: String,
    stack: Vec<Container>,
    first: bool,
    awaiting_value: bool,
    root_written: bool,
    fault: Option<DocumentError>,
}

impl DocumentBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with room for `capacity` bytes of output.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Opens an object.
    ///
    /// # Panics
    ///
    /// Panics when an object is not allowed at this position (see
    /// [`DocumentBuilder::value`]).
    pub fn start_object(&mut self) -> &mut Self {
        self.open(Container::Object)
    }

    /// Closes the innermost object.
    ///
    /// # Panics
    ///
    /// Panics when the innermost open container is not an object or a key is
    /// still waiting for its value.
    pub fn end_object(&mut self) -> &mut Self {
        self.close(Container::Object)
    }

    /// Opens an array.
    ///
    /// # Panics
    ///
    /// Panics when an array is not allowed at this position.
    pub fn start_array(&mut self) -> &mut Self {
        self.open(Container::Array)
    }

    /// Closes the innermost array.
    ///
    /// # Panics
    ///
    /// Panics when the innermost open container is not an array.
    pub fn end_array(&mut self) -> &mut Self {
        self.close(Container::Array)
    }

    /// Writes an object member name.
    ///
    /// # Panics
    ///
    /// Panics outside an object or when the previous key has no value yet.
    pub fn key(&mut self, name: &str) -> &mut Self {
        assert!(
            self.stack.last() == Some(&Container::Object),
            "key({name:?}) written outside an object"
        );
        assert!(
            !self.awaiting_value,
            "key({name:?}) written while the previous key has no value"
        );
        self.separate();
        self.out.push('"');
        escape_into(&mut self.out, name);
        self.out.push_str("\":");
        self.awaiting_value = true;
        self
    }

    /// Writes a scalar value.
    ///
    /// Inside an object a value must follow a [`key`](Self::key); inside an
    /// array it is appended directly; with no open container it becomes the
    /// single top-level value.
    ///
    /// # Panics
    ///
    /// Panics when the value is misplaced: in an object without a key, or as a
    /// second top-level value.
    pub fn value<V: Scalar>(&mut self, value: V) -> &mut Self {
        self.begin_item();
        if let Err(fault) = value.write_json(&mut self.out) {
            self.out.push_str("null");
            self.fault.get_or_insert(fault);
        }
        self
    }

    /// Writes `null`.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`value`](Self::value).
    pub fn null(&mut self) -> &mut Self {
        self.begin_item();
        self.out.push_str("null");
        self
    }

    /// Writes `key` followed by `value`.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`key`](Self::key).
    pub fn prop<V: Scalar>(&mut self, key: &str, value: V) -> &mut Self {
        self.key(key).value(value)
    }

    /// Splices a pre-built JSON fragment in value position.
    ///
    /// The fragment is copied verbatim; callers vouch for its validity.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`value`](Self::value).
    pub fn raw(&mut self, fragment: &str) -> &mut Self {
        self.begin_item();
        self.out.push_str(fragment);
        self
    }

    /// Splices a finished [`Document`] in value position.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`value`](Self::value).
    pub fn document(&mut self, document: &Document) -> &mut Self {
        self.raw(document.as_str())
    }

    /// Finishes the document.
    ///
    /// # Errors
    ///
    /// Returns the first [`DocumentError`] recorded while writing, such as a
    /// non-finite float.
    ///
    /// # Panics
    ///
    /// Panics when containers remain open or nothing was written.
    pub fn finish(self) -> Result<Document, DocumentError> {
        assert!(
            self.stack.is_empty(),
            "document finished with {} unclosed container(s)",
            self.stack.len()
        );
        assert!(self.root_written, "document finished without a value");
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(Document(self.out)),
        }
    }

    fn open(&mut self, container: Container) -> &mut Self {
        self.begin_item();
        self.out.push(match container {
            Container::Object => '{',
            Container::Array => '[',
        });
        self.stack.push(container);
        self.first = true;
        self
    }

    fn close(&mut self, container: Container) -> &mut Self {
        assert!(
            !self.awaiting_value,
            "{container:?} closed while a key has no value"
        );
        match self.stack.pop() {
            Some(open) if open == container => {}
            Some(open) => panic!("attempted to close {container:?} while {open:?} is open"),
            None => panic!("attempted to close {container:?} with no open container"),
        }
        self.out.push(container.closer());
        self.first = false;
        self
    }

    /// Validates the position of a value-like item and writes its separator.
    fn begin_item(&mut self) {
        match self.stack.last() {
            None => {
                assert!(!self.root_written, "document already has a top-level value");
                self.root_written = true;
            }
            Some(Container::Object) => {
                assert!(self.awaiting_value, "object value written without a key");
                self.awaiting_value = false;
            }
            Some(Container::Array) => self.separate(),
        }
    }

    fn separate(&mut self) {
        if !self.first {
            self.out.push(',');
        }
        self.first = false;
    }
}

/// Finished JSON value text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document(String);

impl Document {
    /// Builds a document holding a single scalar.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NonFiniteNumber`] for NaN or infinite floats.
    pub fn scalar<V: Scalar>(value: V) -> Result<Self, DocumentError> {
        let mut out = String::new();
        value.write_json(&mut out)?;
        Ok(Self(out))
    }

    /// The JSON text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the document, returning the JSON text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Values the builder can write as JSON scalars.
pub trait Scalar {
    /// Appends the JSON representation of `self` to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the value has no JSON representation.
    fn write_json(&self, out: &mut String) -> Result<(), DocumentError>;
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
                    write_display(out, self);
                    Ok(())
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

macro_rules! float_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
                    if !self.is_finite() {
                        return Err(DocumentError::NonFiniteNumber {
                            value: self.to_string(),
                        });
                    }
                    write_display(out, self);
                    Ok(())
                }
            }
        )*
    };
}

// `Display` for floats is the shortest text that parses back to the same
// value, and never uses exponent notation.
float_scalar!(f32, f64);

impl Scalar for bool {
    fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
        out.push_str(if *self { "true" } else { "false" });
        Ok(())
    }
}

impl Scalar for str {
    fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
        out.push('"');
        escape_into(out, self);
        out.push('"');
        Ok(())
    }
}

impl Scalar for String {
    fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
        self.as_str().write_json(out)
    }
}

impl<T: Scalar + ?Sized> Scalar for &T {
    fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
        (**self).write_json(out)
    }
}

impl<T: Scalar> Scalar for Option<T> {
    fn write_json(&self, out: &mut String) -> Result<(), DocumentError> {
        match self {
            Some(value) => value.write_json(out),
            None => {
                out.push_str("null");
                Ok(())
            }
        }
    }
}

fn write_display(out: &mut String, value: &dyn fmt::Display) {
    out.push_str(&value.to_string());
}

/// Appends `input` to `out` with JSON string escaping applied.
pub fn escape_into(out: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            control if u32::from(control) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", u32::from(control)));
            }
            other => out.push(other),
        }
    }
}
