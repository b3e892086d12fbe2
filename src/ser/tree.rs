//! Normalization of `Serialize` values into the generic tree.
//!
//! The walker in the parent module wants to treat every input uniformly as
//! records, sequences and scalars. `TreeSerializer` produces exactly that:
//! it runs any `Serialize` impl and collects the result into a [`Value`],
//! with serde-specific shapes folded away (newtypes are transparent, enum
//! variants become a record keyed by the variant name, `None` and unit
//! disappear entirely). Scalars are rendered to their final text here, so
//! the walker never touches a non-string value.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::ser;

use crate::error::{Error, Result};

/// Generic form of a value, the encode-side intermediate tree.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Value {
    /// Ordered sequence elements.
    Seq(Vec<Value>),
    /// Field name to child, sorted for deterministic traversal.
    Record(BTreeMap<String, Value>),
    /// Final scalar text.
    Scalar(String),
}

impl Value {
    pub(crate) fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    fn scalar(text: impl Into<String>) -> Option<Value> {
        Some(Value::Scalar(text.into()))
    }
}

/// Normalizes any `Serialize` value into a tree. `None` means the value has
/// no representation at all (`None`, unit) and produces no pairs.
pub(crate) fn to_tree<T: ser::Serialize + ?Sized>(value: &T) -> Result<Option<Value>> {
    value.serialize(TreeSerializer)
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Normalization(msg.to_string())
    }
}

struct TreeSerializer;

macro_rules! serialize_itoa {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = itoa::Buffer::new();
                Ok(Value::scalar(buffer.format(v)))
            }
        )*
    };
}

macro_rules! serialize_ryu {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = ryu::Buffer::new();
                Ok(Value::scalar(buffer.format(v)))
            }
        )*
    };
}

impl ser::Serializer for TreeSerializer {
    type Ok = Option<Value>;
    type Error = Error;
    type SerializeSeq = SeqCollector;
    type SerializeTuple = SeqCollector;
    type SerializeTupleStruct = SeqCollector;
    type SerializeTupleVariant = VariantSeqCollector;
    type SerializeMap = MapCollector;
    type SerializeStruct = RecordCollector;
    type SerializeStructVariant = VariantRecordCollector;

    serialize_itoa! {
        u8   => serialize_u8,
        u16  => serialize_u16,
        u32  => serialize_u32,
        u64  => serialize_u64,
        u128 => serialize_u128,
        i8   => serialize_i8,
        i16  => serialize_i16,
        i32  => serialize_i32,
        i64  => serialize_i64,
        i128 => serialize_i128,
    }
    serialize_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Value::scalar(if v { "true" } else { "false" }))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut b = [0; 4];
        Ok(Value::scalar(v.encode_utf8(&mut b)))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Value::scalar(v))
    }

    fn serialize_bytes(self, _value: &[u8]) -> Result<Self::Ok> {
        Err(Error::Unsupported("raw byte strings"))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(TreeSerializer)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(Value::scalar(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(TreeSerializer)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        let mut fields = BTreeMap::new();
        if let Some(inner) = value.serialize(TreeSerializer)? {
            fields.insert(variant.to_owned(), inner);
        }
        Ok(Some(Value::Record(fields)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqCollector {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(SeqCollector {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(SeqCollector {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(VariantSeqCollector {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapCollector {
            fields: BTreeMap::new(),
            pending: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(RecordCollector {
            fields: BTreeMap::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(VariantRecordCollector {
            variant,
            fields: BTreeMap::new(),
        })
    }
}

#[doc(hidden)]
pub(crate) struct SeqCollector {
    items: Vec<Value>,
}

impl SeqCollector {
    fn push<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        // skipped `None` elements simply vanish from the sequence
        if let Some(item) = value.serialize(TreeSerializer)? {
            self.items.push(item);
        }
        Ok(())
    }
}

impl ser::SerializeSeq for SeqCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Value::Seq(self.items)))
    }
}

impl ser::SerializeTuple for SeqCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Value::Seq(self.items)))
    }
}

impl ser::SerializeTupleStruct for SeqCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Value::Seq(self.items)))
    }
}

#[doc(hidden)]
pub(crate) struct VariantSeqCollector {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for VariantSeqCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        if let Some(item) = value.serialize(TreeSerializer)? {
            self.items.push(item);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        let mut fields = BTreeMap::new();
        fields.insert(self.variant.to_owned(), Value::Seq(self.items));
        Ok(Some(Value::Record(fields)))
    }
}

#[doc(hidden)]
pub(crate) struct RecordCollector {
    fields: BTreeMap<String, Value>,
}

impl ser::SerializeStruct for RecordCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + ser::Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        // unset optionals produce no field at all
        if let Some(child) = value.serialize(TreeSerializer)? {
            self.fields.insert(key.to_owned(), child);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Value::Record(self.fields)))
    }
}

#[doc(hidden)]
pub(crate) struct VariantRecordCollector {
    variant: &'static str,
    fields: BTreeMap<String, Value>,
}

impl ser::SerializeStructVariant for VariantRecordCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + ser::Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        if let Some(child) = value.serialize(TreeSerializer)? {
            self.fields.insert(key.to_owned(), child);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        let mut fields = BTreeMap::new();
        fields.insert(self.variant.to_owned(), Value::Record(self.fields));
        Ok(Some(Value::Record(fields)))
    }
}

#[doc(hidden)]
pub(crate) struct MapCollector {
    fields: BTreeMap<String, Value>,
    pending: Option<String>,
}

impl ser::SerializeMap for MapCollector {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T: ?Sized + ser::Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        let Some(key) = self.pending.take() else {
            return Err(Error::Normalization(
                "map value serialized before its key".to_owned(),
            ));
        };
        if let Some(child) = value.serialize(TreeSerializer)? {
            self.fields.insert(key, child);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Value::Record(self.fields)))
    }
}

macro_rules! serialize_key_itoa {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = itoa::Buffer::new();
                Ok(buffer.format(v).to_owned())
            }
        )*
    };
}

macro_rules! serialize_key_ryu {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = ryu::Buffer::new();
                Ok(buffer.format(v).to_owned())
            }
        )*
    };
}

/// Map keys become record field names, so only scalars are accepted here.
struct KeySerializer;

const KEY_MUST_BE_SCALAR: Error = Error::Unsupported("map keys must be scalars");

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;
    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    serialize_key_itoa! {
        u8   => serialize_u8,
        u16  => serialize_u16,
        u32  => serialize_u32,
        u64  => serialize_u64,
        u128 => serialize_u128,
        i8   => serialize_i8,
        i16  => serialize_i16,
        i32  => serialize_i32,
        i64  => serialize_i64,
        i128 => serialize_i128,
    }
    serialize_key_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(if v { "true" } else { "false" }.to_owned())
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(v.to_owned())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(variant.to_owned())
    }

    fn serialize_bytes(self, _value: &[u8]) -> Result<Self::Ok> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, _value: &T) -> Result<Self::Ok> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(KeySerializer)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(KEY_MUST_BE_SCALAR)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(KEY_MUST_BE_SCALAR)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde::Serialize;

    fn scalar(text: &str) -> Value {
        Value::Scalar(text.to_owned())
    }

    #[test]
    fn scalars_render_to_text() {
        assert_eq!(to_tree(&true).unwrap(), Some(scalar("true")));
        assert_eq!(to_tree(&false).unwrap(), Some(scalar("false")));
        assert_eq!(to_tree(&42u8).unwrap(), Some(scalar("42")));
        assert_eq!(to_tree(&-7i64).unwrap(), Some(scalar("-7")));
        assert_eq!(to_tree(&4.2f32).unwrap(), Some(scalar("4.2")));
        assert_eq!(to_tree(&'x').unwrap(), Some(scalar("x")));
        assert_eq!(to_tree("hello").unwrap(), Some(scalar("hello")));
    }

    #[test]
    fn none_and_unit_vanish() {
        assert_eq!(to_tree(&Option::<i32>::None).unwrap(), None);
        assert_eq!(to_tree(&()).unwrap(), None);
    }

    #[test]
    fn some_is_transparent() {
        assert_eq!(to_tree(&Some(5)).unwrap(), Some(scalar("5")));
    }

    #[test]
    fn structs_become_sorted_records() {
        #[derive(Serialize)]
        struct Fixture {
            zeta: i32,
            #[serde(rename = "alpha")]
            renamed: bool,
        }

        let tree = to_tree(&Fixture {
            zeta: 1,
            renamed: true,
        })
        .unwrap();
        let expected = Value::Record(BTreeMap::from([
            ("alpha".to_owned(), scalar("true")),
            ("zeta".to_owned(), scalar("1")),
        ]));
        assert_eq!(tree, Some(expected));
    }

    #[test]
    fn unset_optional_fields_are_absent() {
        #[derive(Serialize)]
        struct Fixture {
            a: Option<i32>,
            b: i32,
        }

        let tree = to_tree(&Fixture { a: None, b: 2 }).unwrap();
        let expected = Value::Record(BTreeMap::from([("b".to_owned(), scalar("2"))]));
        assert_eq!(tree, Some(expected));
    }

    #[test]
    fn sequences_preserve_order() {
        let tree = to_tree(&vec![3, 1, 2]).unwrap();
        let expected = Value::Seq(vec![scalar("3"), scalar("1"), scalar("2")]);
        assert_eq!(tree, Some(expected));
    }

    #[test]
    fn integer_map_keys_become_field_names() {
        let map = BTreeMap::from([(2u8, "b"), (1u8, "a")]);
        let tree = to_tree(&map).unwrap();
        let expected = Value::Record(BTreeMap::from([
            ("1".to_owned(), scalar("a")),
            ("2".to_owned(), scalar("b")),
        ]));
        assert_eq!(tree, Some(expected));
    }

    #[test]
    fn unit_variants_are_their_name() {
        #[derive(Serialize)]
        enum Mode {
            Fast,
        }

        assert_eq!(to_tree(&Mode::Fast).unwrap(), Some(scalar("Fast")));
    }

    #[test]
    fn bytes_are_rejected() {
        struct Raw;

        impl Serialize for Raw {
            fn serialize<S: ser::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_bytes(b"opaque")
            }
        }

        let err = to_tree(&Raw).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)), "{err}");
    }

    #[test]
    fn non_scalar_map_keys_are_rejected() {
        let map = BTreeMap::from([(vec![1u8, 2u8], "x")]);
        let err = to_tree(&map).unwrap_err();
        assert!(err.to_string().contains("map keys"), "{err}");
    }
}
