//! Bracket-subscript path codec.
//!
//! A deepObject parameter key is a parameter name followed by one bracket
//! group per path segment, e.g. `p[a][b]` for the path `a`, `b`. This module
//! converts between the textual form and segment lists in both directions,
//! and decides which raw keys belong to a parameter at all.

use crate::error::{Error, Result};

/// Joins path segments into their bracket form: `["a", "b"]` becomes
/// `[a][b]`. An empty path yields an empty string.
pub(crate) fn encode_path(segments: &[String]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.len() + 2).sum());
    for segment in segments {
        out.push('[');
        out.push_str(segment);
        out.push(']');
    }
    out
}

/// Splits a bracket subscript into its segments: `[a][b]` becomes
/// `["a", "b"]`. Leading `[` and trailing `]` are stripped, the remainder
/// splits on the literal `][`. An empty path or an empty segment is
/// malformed.
pub(crate) fn decode_path<'a>(subscript: &'a str, key: &str) -> Result<Vec<&'a str>> {
    let trimmed = subscript
        .trim_start_matches('[')
        .trim_end_matches(']');
    if trimmed.is_empty() {
        return Err(Error::malformed(key, "empty bracket path"));
    }
    let segments: Vec<&str> = trimmed.split("][").collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::malformed(key, "empty path segment"));
    }
    Ok(segments)
}

/// Returns the bracket subscript of `key` when the key belongs to
/// `param_name`, i.e. starts with `param_name[`. Bare keys and keys of
/// other parameters return `None`.
pub(crate) fn strip_param<'a>(key: &'a str, param_name: &str) -> Option<&'a str> {
    let subscript = key.strip_prefix(param_name)?;
    subscript.starts_with('[').then_some(subscript)
}
