//! Shape-directed assignment from the parameter tree.
//!
//! Destination shapes form a closed set: struct-like records, sequences,
//! string-keyed maps, optionals, scalars, dates and timestamps, plus types
//! that parse themselves from text via [`Binder`]. Each shape has exactly
//! one [`Assign`] impl, so the compiler resolves the dispatch that the tree
//! cannot: an `Interior` node meets its record or map, a `Leaf` node meets
//! its scalars, and anything else is a shape mismatch.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::de::Node;
use crate::error::{Error, Result};

/// Types that can be populated from a parameter tree node.
///
/// Impls ship for the scalar types, `String`, `Option`, `Vec`, string-keyed
/// maps and the chrono date and timestamp types. Struct impls are generated
/// with [`assign_struct!`](crate::assign_struct); types with their own
/// textual grammar implement [`Binder`] and opt in with
/// [`bindable!`](crate::bindable).
///
/// Assignment replaces the current value rather than merging into it, with
/// one exception: maps insert entry by entry, keeping unrelated existing
/// entries.
pub trait Assign {
    /// Populates `self` from `node`.
    fn assign(&mut self, node: &Node) -> Result<()>;
}

/// Custom text parsing for types that bypass structural assignment.
///
/// A `Binder` receives the first raw value of its parameter verbatim,
/// before any structural interpretation. Use
/// [`bindable!`](crate::bindable) to derive the [`Assign`] impl from this.
pub trait Binder {
    /// Parses `src` into `self`.
    fn bind(&mut self, src: &str) -> Result<()>;
}

/// Resolves the lookup name of a struct field: the explicit annotation when
/// non-empty, else the field identifier.
#[doc(hidden)]
pub fn __field_name(ident: &'static str, rename: &'static str) -> &'static str {
    if rename.is_empty() { ident } else { rename }
}

macro_rules! assign_from_str {
    ($($ty:ty => $kind:literal,)*) => {
        $(
            impl Assign for $ty {
                fn assign(&mut self, node: &Node) -> Result<()> {
                    let raw = node.value()?;
                    *self = raw.parse().map_err(|_| Error::parse_failed($kind, raw))?;
                    Ok(())
                }
            }
        )*
    };
}

assign_from_str! {
    bool => "a boolean",
    i8   => "an integer",
    i16  => "an integer",
    i32  => "an integer",
    i64  => "an integer",
    i128 => "an integer",
    u8   => "an unsigned integer",
    u16  => "an unsigned integer",
    u32  => "an unsigned integer",
    u64  => "an unsigned integer",
    u128 => "an unsigned integer",
    f32  => "a number",
    f64  => "a number",
}

impl Assign for String {
    fn assign(&mut self, node: &Node) -> Result<()> {
        *self = node.value()?.to_owned();
        Ok(())
    }
}

impl<T: Assign + Default> Assign for Option<T> {
    fn assign(&mut self, node: &Node) -> Result<()> {
        let mut inner = T::default();
        inner.assign(node)?;
        *self = Some(inner);
        Ok(())
    }
}

/// Sequences materialize from the flat repeated form only: one element per
/// raw value. Composite-element sequences arrive as an `Interior` node and
/// must be decoded through a map destination keyed by their index strings.
impl<T: Assign + Default> Assign for Vec<T> {
    fn assign(&mut self, node: &Node) -> Result<()> {
        let values = node.values()?;
        let mut out = Vec::with_capacity(values.len());
        for value in values {
            let mut element = T::default();
            element.assign(&Node::Leaf(vec![value.clone()]))?;
            out.push(element);
        }
        *self = out;
        Ok(())
    }
}

macro_rules! assign_map {
    ($($map:ident),*) => {
        $(
            impl<T: Assign + Default> Assign for $map<String, T> {
                fn assign(&mut self, node: &Node) -> Result<()> {
                    for (name, child) in node.fields()? {
                        let mut value = T::default();
                        value
                            .assign(child)
                            .map_err(|err| Error::in_field(name, err))?;
                        self.insert(name.clone(), value);
                    }
                    Ok(())
                }
            }
        )*
    };
}

assign_map!(BTreeMap, HashMap);

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Dates use the fixed `YYYY-MM-DD` grammar.
impl Assign for NaiveDate {
    fn assign(&mut self, node: &Node) -> Result<()> {
        let raw = node.value()?;
        *self = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|_| Error::format_failed("a date (YYYY-MM-DD)", raw))?;
        Ok(())
    }
}

impl Assign for DateTime<Utc> {
    fn assign(&mut self, node: &Node) -> Result<()> {
        *self = parse_timestamp(node.value()?)?.with_timezone(&Utc);
        Ok(())
    }
}

impl Assign for DateTime<FixedOffset> {
    fn assign(&mut self, node: &Node) -> Result<()> {
        *self = parse_timestamp(node.value()?)?;
        Ok(())
    }
}

/// Timestamps parse as RFC 3339 first; a bare `YYYY-MM-DD` is accepted as
/// midnight UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .map_err(|_| Error::format_failed("an RFC 3339 timestamp or YYYY-MM-DD date", raw))
}

/// Implements [`Assign`] for a struct from a table of its fields.
///
/// Each entry is a field identifier, optionally followed by `=>` and the
/// parameter name the field appears under when that differs from the
/// identifier. An empty name falls back to the identifier. Parameters
/// naming a field not in the table fail with an unknown-field error.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// struct Filter {
///     min_price: f64,
///     tags: Vec<String>,
/// }
///
/// deepobject::assign_struct! {
///     Filter {
///         min_price => "minPrice",
///         tags,
///     }
/// }
///
/// let params = deepobject::parse_query("f[minPrice]=9.5&f[tags]=new").unwrap();
/// let mut filter = Filter::default();
/// deepobject::decode(&mut filter, "f", &params).unwrap();
/// assert_eq!(
///     filter,
///     Filter {
///         min_price: 9.5,
///         tags: vec!["new".to_owned()],
///     }
/// );
/// ```
#[macro_export]
macro_rules! assign_struct {
    ($ty:ty { $($field:ident $(=> $rename:literal)?),* $(,)? }) => {
        impl $crate::Assign for $ty {
            #[allow(unused_variables)]
            fn assign(&mut self, node: &$crate::Node) -> $crate::Result<()> {
                for (name, child) in node.fields()? {
                    match name.as_str() {
                        $(
                            n if n == $crate::__field_name(
                                stringify!($field),
                                $crate::__field_rename!($($rename)?),
                            ) =>
                            {
                                $crate::Assign::assign(&mut self.$field, child)
                                    .map_err(|err| $crate::Error::in_field(n, err))?;
                            }
                        )*
                        other => return Err($crate::Error::unknown_field(other)),
                    }
                }
                Ok(())
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_rename {
    () => {
        ""
    };
    ($rename:literal) => {
        $rename
    };
}

/// Implements [`Assign`] for one or more [`Binder`] types: the node must be
/// a leaf, and its first raw value is handed to [`Binder::bind`].
///
/// ```
/// use deepobject::Binder;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Hex(u32);
///
/// impl Binder for Hex {
///     fn bind(&mut self, src: &str) -> deepobject::Result<()> {
///         self.0 = u32::from_str_radix(src, 16).map_err(|_| deepobject::Error::Parse {
///             kind: "a hex number",
///             value: src.to_owned(),
///         })?;
///         Ok(())
///     }
/// }
///
/// deepobject::bindable!(Hex);
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Conf {
///     mask: Hex,
/// }
///
/// deepobject::assign_struct! { Conf { mask } }
///
/// let params = deepobject::parse_query("c[mask]=ff").unwrap();
/// let mut conf = Conf::default();
/// deepobject::decode(&mut conf, "c", &params).unwrap();
/// assert_eq!(conf.mask, Hex(255));
/// ```
#[macro_export]
macro_rules! bindable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Assign for $ty {
                fn assign(&mut self, node: &$crate::Node) -> $crate::Result<()> {
                    $crate::Binder::bind(self, node.value()?)
                }
            }
        )*
    };
}

#[cfg(test)]
mod test {
    use super::*;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_name_resolution() {
        assert_eq!(__field_name("ident", "renamed"), "renamed");
        assert_eq!(__field_name("ident", ""), "ident");
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        let parsed = parse_timestamp("2020-02-01T22:30:15+05:00").unwrap();
        let expected = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2020, 2, 1, 22, 30, 15)
            .unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.offset(), expected.offset());
    }

    #[test]
    fn timestamp_falls_back_to_bare_date() {
        let parsed = parse_timestamp("2020-02-01").unwrap();
        let expected = Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn timestamp_rejects_other_grammars() {
        let err = parse_timestamp("Feb 1 2020").unwrap_err();
        assert!(err.to_string().contains("RFC 3339"), "{err}");
    }

    #[test]
    fn booleans_are_strict() {
        let mut flag = false;
        flag.assign(&Node::Leaf(vec!["true".to_owned()])).unwrap();
        assert!(flag);

        let err = flag
            .assign(&Node::Leaf(vec!["TRUE".to_owned()]))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err}");
    }

    #[test]
    fn scalars_use_the_first_value() {
        let mut n = 0i32;
        n.assign(&Node::Leaf(vec!["7".to_owned(), "8".to_owned()]))
            .unwrap();
        assert_eq!(n, 7);
    }
}
