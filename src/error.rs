//! Error types for deepObject encoding and decoding.

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while encoding or decoding deepObject parameters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The value could not be reduced to the generic tree of records,
    /// sequences and scalars that the encoder walks. Carries the message
    /// reported by the value's `Serialize` impl.
    #[error("failed to normalize value: {0}")]
    Normalization(String),

    /// The value contains a shape with no deepObject representation.
    #[error("unsupported shape: {0}")]
    Unsupported(&'static str),

    /// A parameter key carries an empty, over-deep or otherwise invalid
    /// bracket path.
    #[error("malformed path in `{key}`: {reason}")]
    MalformedPath { key: String, reason: String },

    /// The decoded tree disagrees with the destination's shape, e.g. nested
    /// fields arriving where the destination expects plain values.
    #[error("expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The decoded tree names a field the destination does not declare.
    #[error("field `{0}` is not present in the destination")]
    UnknownField(String),

    /// A raw value failed the scalar grammar of its destination type.
    #[error("cannot parse `{value}` as {kind}")]
    Parse {
        kind: &'static str,
        value: String,
    },

    /// A raw value failed a date or timestamp grammar.
    #[error("cannot parse `{value}` as {expected}")]
    Format {
        expected: &'static str,
        value: String,
    },

    /// A percent-decoded query component was not valid UTF-8.
    #[error("query input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Context wrapper naming the field whose assignment failed.
    #[error("error assigning field `{field}`: {source}")]
    Field {
        field: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps an assignment error with the name of the field it occurred in.
    pub fn in_field(field: &str, source: Error) -> Self {
        Error::Field {
            field: field.to_owned(),
            source: Box::new(source),
        }
    }

    /// Error for a tree field with no counterpart in the destination.
    pub fn unknown_field(name: &str) -> Self {
        Error::UnknownField(name.to_owned())
    }

    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        Error::MalformedPath {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse_failed(kind: &'static str, value: &str) -> Self {
        Error::Parse {
            kind,
            value: value.to_owned(),
        }
    }

    pub(crate) fn format_failed(expected: &'static str, value: &str) -> Self {
        Error::Format {
            expected,
            value: value.to_owned(),
        }
    }
}
