//! Format-agnostic intermediate value representation.
//!
//! [`Value`] is what member accessors read and write, what default-value
//! tags hold, and what the object writer produces. Nested objects travel as
//! [`Value::Object`] so that their own schema can be applied to them.
//!
//! Use [`to_value`] and [`from_value`] to convert between arbitrary serde
//! types and `Value`.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use serde::ser;
use serde::{Deserialize, Serialize, forward_to_deserialize_any};

use crate::error::{DeserializeError, SerializeError};
use crate::introspect::ShapeKind;

/// Format-agnostic value representation for member data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
    /// A live nested object, expanded through its own schema by the writer.
    #[serde(skip)]
    Object(Instance),
}

impl Value {
    /// Wrap `value` as a nested object.
    pub fn object<T: Any + Send + Sync + PartialEq>(value: T) -> Self {
        Value::Object(Instance::new(value))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Look up an entry of a [`Value::Map`] by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convert a numeric value to the representation used for `kind`.
    ///
    /// Returns `None` when `self` is not numeric, `kind` is not numeric, or
    /// the number does not fit (out of range, or a fractional float going to
    /// an integer kind).
    pub fn coerce_to(&self, kind: ShapeKind) -> Option<Value> {
        let number = Number::of(self)?;
        match kind {
            ShapeKind::I8 => number.to_i64().filter(|v| i8::try_from(*v).is_ok()).map(Value::I64),
            ShapeKind::I16 => number.to_i64().filter(|v| i16::try_from(*v).is_ok()).map(Value::I64),
            ShapeKind::I32 => number.to_i64().filter(|v| i32::try_from(*v).is_ok()).map(Value::I64),
            ShapeKind::I64 => number.to_i64().map(Value::I64),
            ShapeKind::U8 => number.to_u64().filter(|v| u8::try_from(*v).is_ok()).map(Value::U64),
            ShapeKind::U16 => number.to_u64().filter(|v| u16::try_from(*v).is_ok()).map(Value::U64),
            ShapeKind::U32 => number.to_u64().filter(|v| u32::try_from(*v).is_ok()).map(Value::U64),
            ShapeKind::U64 => number.to_u64().map(Value::U64),
            ShapeKind::F32 => Some(Value::F32(number.to_f64() as f32)),
            ShapeKind::F64 => Some(Value::F64(number.to_f64())),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match *value {
            Value::I64(v) => Some(Number::Signed(v)),
            Value::U64(v) => Some(Number::Unsigned(v)),
            Value::F32(v) => Some(Number::Float(v as f64)),
            Value::F64(v) => Some(Number::Float(v)),
            _ => None,
        }
    }

    fn to_i64(self) -> Option<i64> {
        match self {
            Number::Signed(v) => Some(v),
            Number::Unsigned(v) => i64::try_from(v).ok(),
            Number::Float(v) => integral(v)
                .filter(|v| *v >= i64::MIN as f64 && *v < i64::MAX as f64)
                .map(|v| v as i64),
        }
    }

    fn to_u64(self) -> Option<u64> {
        match self {
            Number::Signed(v) => u64::try_from(v).ok(),
            Number::Unsigned(v) => Some(v),
            Number::Float(v) => integral(v)
                .filter(|v| *v >= 0.0 && *v < u64::MAX as f64)
                .map(|v| v as u64),
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Number::Signed(v) => v as f64,
            Number::Unsigned(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

fn integral(v: f64) -> Option<f64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v)
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from! {
    i8 => I64 as i64, i16 => I64 as i64, i32 => I64 as i64, i64 => I64 as i64,
    u8 => U64 as u64, u16 => U64 as u64, u32 => U64 as u64, u64 => U64 as u64,
    f32 => F32 as f32, f64 => F64 as f64,
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// A shared, type-erased object carried inside a [`Value`].
///
/// Equality is pointer identity, or `PartialEq` of the concrete type when
/// both sides hold the same type.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl Instance {
    pub fn new<T: Any + Send + Sync + PartialEq>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync + PartialEq>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
            eq: eq_as::<T>,
        }
    }

    pub fn as_any(&self) -> &dyn Any {
        &*self.inner
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// The `TypeId` of the wrapped value (not of `Instance`).
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

fn eq_as<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
            || (self.eq)(self.as_any(), other.as_any())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.type_name)
    }
}

// ---------------------------------------------------------------------------
// to_value / from_value
// ---------------------------------------------------------------------------

/// Convert any `T: Serialize` into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, SerializeError> {
    value
        .serialize(ValueSerializer)
        .map_err(|e| SerializeError::FieldError {
            field: String::new(),
            message: e.0,
        })
}

/// Convert a [`Value`] back into any `T: DeserializeOwned`.
pub fn from_value<T: de::DeserializeOwned>(value: Value) -> Result<T, DeserializeError> {
    T::deserialize(ValueDeserializer(value)).map_err(|e| DeserializeError::FormatError(e.0))
}

#[derive(Debug)]
struct ValueError(String);

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ValueError {}

impl ser::Error for ValueError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ValueError(msg.to_string())
    }
}

impl de::Error for ValueError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ValueError(msg.to_string())
    }
}

// ---------------------------------------------------------------------------
// ValueSerializer: T -> Value
// ---------------------------------------------------------------------------

struct ValueSerializer;

macro_rules! serialize_as {
    ($($method:ident($ty:ty) => $variant:ident as $target:ty;)*) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, ValueError> {
                Ok(Value::$variant(v as $target))
            }
        )*
    };
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ValueError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = MapBuilder;

    serialize_as! {
        serialize_i8(i8) => I64 as i64;
        serialize_i16(i16) => I64 as i64;
        serialize_i32(i32) => I64 as i64;
        serialize_i64(i64) => I64 as i64;
        serialize_u8(u8) => U64 as u64;
        serialize_u16(u16) => U64 as u64;
        serialize_u32(u32) => U64 as u64;
        serialize_u64(u64) => U64 as u64;
        serialize_f32(f32) => F32 as f32;
        serialize_f64(f64) => F64 as f64;
    }

    fn serialize_bool(self, v: bool) -> Result<Value, ValueError> {
        Ok(Value::Bool(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, ValueError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, ValueError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, ValueError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, ValueError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, ValueError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, ValueError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, ValueError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, ValueError> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, ValueError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, ValueError> {
        Ok(Value::Map(vec![(
            variant.to_owned(),
            value.serialize(ValueSerializer)?,
        )]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, ValueError> {
        Ok(SeqBuilder::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, ValueError> {
        Ok(SeqBuilder::new(None, len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, ValueError> {
        Ok(SeqBuilder::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, ValueError> {
        Ok(SeqBuilder::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, ValueError> {
        Ok(MapBuilder::new(None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, ValueError> {
        Ok(MapBuilder::new(None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<MapBuilder, ValueError> {
        Ok(MapBuilder::new(Some(variant), len))
    }
}

/// Collects sequence elements; a variant name wraps the result in a
/// single-entry map.
struct SeqBuilder {
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqBuilder {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Result<Value, ValueError> {
        let list = Value::List(self.items);
        Ok(match self.variant {
            Some(variant) => Value::Map(vec![(variant.to_owned(), list)]),
            None => list,
        })
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

/// Collects key/value entries; a variant name wraps the result in a
/// single-entry map.
struct MapBuilder {
    variant: Option<&'static str>,
    entries: Vec<(String, Value)>,
    pending_key: Option<String>,
}

impl MapBuilder {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            entries: Vec::with_capacity(len),
            pending_key: None,
        }
    }

    fn finish(self) -> Result<Value, ValueError> {
        let map = Value::Map(self.entries);
        Ok(match self.variant {
            Some(variant) => Value::Map(vec![(variant.to_owned(), map)]),
            None => map,
        })
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ValueError> {
        let key = match key.serialize(ValueSerializer)? {
            Value::String(s) => s,
            other => format!("{other:?}"),
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| ValueError("map value written before its key".into()))?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), ValueError> {
        self.entries
            .push((key.to_owned(), value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for MapBuilder {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), ValueError> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Value, ValueError> {
        self.finish()
    }
}

// ---------------------------------------------------------------------------
// ValueDeserializer: Value -> T
// ---------------------------------------------------------------------------

struct ValueDeserializer(Value);

impl<'de> IntoDeserializer<'de, ValueError> for Value {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer(self)
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = ValueError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(v),
            Value::I64(v) => visitor.visit_i64(v),
            Value::U64(v) => visitor.visit_u64(v),
            Value::F32(v) => visitor.visit_f32(v),
            Value::F64(v) => visitor.visit_f64(v),
            Value::String(v) => visitor.visit_string(v),
            Value::Bytes(v) => visitor.visit_byte_buf(v),
            Value::List(items) => {
                visitor.visit_seq(de::value::SeqDeserializer::new(items.into_iter()))
            }
            Value::Map(entries) => {
                visitor.visit_map(de::value::MapDeserializer::new(entries.into_iter()))
            }
            Value::Object(instance) => Err(ValueError(format!(
                "nested object '{}' must be applied through its schema",
                instance.type_name()
            ))),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(ValueDeserializer(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        match self.0 {
            Value::String(variant) => visitor.visit_enum(EnumAccess {
                variant,
                payload: None,
            }),
            Value::Map(entries) if entries.len() == 1 => {
                let Some((variant, payload)) = entries.into_iter().next() else {
                    return Err(ValueError("enum map must have exactly one entry".into()));
                };
                visitor.visit_enum(EnumAccess {
                    variant,
                    payload: Some(payload),
                })
            }
            other => Err(ValueError(format!(
                "expected string or single-entry map for enum, found {}",
                other.kind_name()
            ))),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier
    }
}

struct EnumAccess {
    variant: String,
    payload: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess {
    type Error = ValueError;
    type Variant = VariantAccess;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, VariantAccess), ValueError> {
        let tag = seed.deserialize(ValueDeserializer(Value::String(self.variant)))?;
        Ok((tag, VariantAccess(self.payload)))
    }
}

struct VariantAccess(Option<Value>);

impl VariantAccess {
    fn payload(self, expected: &str) -> Result<ValueDeserializer, ValueError> {
        self.0
            .map(ValueDeserializer)
            .ok_or_else(|| ValueError(format!("expected {expected} variant, found unit")))
    }
}

impl<'de> de::VariantAccess<'de> for VariantAccess {
    type Error = ValueError;

    fn unit_variant(self) -> Result<(), ValueError> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, ValueError> {
        seed.deserialize(self.payload("newtype")?)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, ValueError> {
        de::Deserializer::deserialize_seq(self.payload("tuple")?, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        de::Deserializer::deserialize_map(self.payload("struct")?, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_map_to_widest_variant() {
        assert_eq!(to_value(&7i8).unwrap(), Value::I64(7));
        assert_eq!(to_value(&7u16).unwrap(), Value::U64(7));
        assert_eq!(to_value(&1.5f32).unwrap(), Value::F32(1.5));
        assert_eq!(to_value(&None::<i32>).unwrap(), Value::Null);
        assert_eq!(from_value::<i32>(Value::U64(42)).unwrap(), 42);
        assert_eq!(from_value::<f32>(Value::F64(0.5)).unwrap(), 0.5);
    }

    #[test]
    fn out_of_range_integer_fails() {
        assert!(from_value::<u8>(Value::I64(300)).is_err());
    }

    #[test]
    fn struct_and_enum_through_value() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        enum Shape {
            Ball { radius: f32 },
            Point,
        }
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Body {
            name: String,
            shape: Shape,
            tags: Vec<u32>,
            parent: Option<String>,
        }
        let body = Body {
            name: "crate".into(),
            shape: Shape::Ball { radius: 0.5 },
            tags: vec![1, 2],
            parent: None,
        };
        let value = to_value(&body).unwrap();
        assert_eq!(value.get("name"), Some(&Value::String("crate".into())));
        assert_eq!(from_value::<Body>(value).unwrap(), body);
        assert_eq!(
            from_value::<Shape>(to_value(&Shape::Point).unwrap()).unwrap(),
            Shape::Point
        );
    }

    #[test]
    fn coercion_between_numeric_kinds() {
        assert_eq!(Value::I64(3).coerce_to(ShapeKind::F32), Some(Value::F32(3.0)));
        assert_eq!(Value::F64(0.25).coerce_to(ShapeKind::F32), Some(Value::F32(0.25)));
        assert_eq!(Value::F64(4.0).coerce_to(ShapeKind::U8), Some(Value::U64(4)));
        assert_eq!(Value::I64(7).coerce_to(ShapeKind::U32), Some(Value::U64(7)));
    }

    #[test]
    fn coercion_failures_return_none() {
        assert_eq!(Value::F64(1.5).coerce_to(ShapeKind::I32), None);
        assert_eq!(Value::I64(-1).coerce_to(ShapeKind::U64), None);
        assert_eq!(Value::I64(128).coerce_to(ShapeKind::I8), None);
        assert_eq!(Value::String("1".into()).coerce_to(ShapeKind::I32), None);
        assert_eq!(Value::I64(1).coerce_to(ShapeKind::String), None);
    }

    #[test]
    fn instances_compare_by_value() {
        #[derive(PartialEq)]
        struct Marker(u32);
        assert_eq!(Value::object(Marker(1)), Value::object(Marker(1)));
        assert_ne!(Value::object(Marker(1)), Value::object(Marker(2)));
        assert_ne!(Value::object(Marker(1)), Value::I64(1));
    }

    #[test]
    fn object_is_not_encodable_through_serde() {
        #[derive(PartialEq)]
        struct Marker;
        assert!(to_value(&Value::object(Marker)).is_err());
    }
}
