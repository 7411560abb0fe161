/*
 * Copyright Truffle Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;
use std::sync::Arc;

use crate::catalog::NativeType;
use crate::schema::MessageDescriptor;

/// A number as supplied by a caller, kept in its textual form until
/// it is coerced into a concrete width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    /// Get the string representation of this `Number`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get this `Number` as a 64-bit integer if possible. Otherwise return None.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Get this `Number` as a 64-bit unsigned integer if possible. Otherwise return None.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Get this `Number` as a 64-bit float if possible. Otherwise return None.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Self(n.to_string())
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Number(n.into())
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// An untyped value supplied by application code, decoded JSON or a dynamic map.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(LinkedHashMap<SmolStr, Value>),
    Message(Message),
}

impl Value {
    /// Create a `Value::Map` from `(key, value)` pairs, keeping their order.
    pub fn map<K: Into<SmolStr>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short name of the kind of this value, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Message(_) => "message",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(vals: Vec<Value>) -> Self {
        Self::Array(vals)
    }
}

impl From<LinkedHashMap<SmolStr, Value>> for Value {
    fn from(map: LinkedHashMap<SmolStr, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Message> for Value {
    fn from(msg: Message) -> Self {
        Self::Message(msg)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(val: Option<T>) -> Self {
        val.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        match val {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(Number(n.to_string())),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(vals) => {
                Self::Array(vals.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A value that conforms to the native type of a field descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// The number of a declared enum member
    Enum(i32),
    /// `None` is an unset message
    Message(Option<Message>),
    /// The elements of a repeated field
    List(Vec<TypedValue>),
}

impl TypedValue {
    /// The native type this value is an instance of. Lists report `None`.
    pub fn native_type(&self) -> Option<NativeType> {
        match self {
            Self::Double(_) => Some(NativeType::F64),
            Self::Float(_) => Some(NativeType::F32),
            Self::Int32(_) => Some(NativeType::I32),
            Self::Int64(_) => Some(NativeType::I64),
            Self::Uint32(_) => Some(NativeType::U32),
            Self::Uint64(_) => Some(NativeType::U64),
            Self::Bool(_) => Some(NativeType::Bool),
            Self::String(_) => Some(NativeType::String),
            Self::Bytes(_) => Some(NativeType::Bytes),
            Self::Enum(_) => Some(NativeType::Enum),
            Self::Message(_) => Some(NativeType::Message),
            Self::List(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of any integer variant that fits in an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            Self::Uint32(u) => Some(i64::from(*u)),
            Self::Uint64(u) => i64::try_from(*u).ok(),
            Self::Enum(e) => Some(i64::from(*e)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            Self::Float(f) => Some(f64::from(*f)),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => m.as_ref(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TypedValue]> {
        match self {
            Self::List(vals) => Some(vals),
            _ => None,
        }
    }
}

impl From<TypedValue> for Value {
    fn from(val: TypedValue) -> Self {
        match val {
            TypedValue::Double(f) => f.into(),
            TypedValue::Float(f) => f.into(),
            TypedValue::Int32(i) => i.into(),
            TypedValue::Int64(i) => i.into(),
            TypedValue::Uint32(u) => u.into(),
            TypedValue::Uint64(u) => u.into(),
            TypedValue::Bool(b) => Self::Bool(b),
            TypedValue::String(s) => Self::String(s),
            TypedValue::Bytes(b) => Self::Bytes(b),
            TypedValue::Enum(e) => e.into(),
            TypedValue::Message(m) => m.into(),
            TypedValue::List(vals) => Self::Array(vals.into_iter().map(Value::from).collect()),
        }
    }
}

/// A protocol message whose fields have all been coerced against its descriptor.
///
/// Messages can only be produced by `coerce`, so every field declared by the
/// descriptor is present and conforms to its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    descriptor: Arc<MessageDescriptor>,
    fields: LinkedHashMap<SmolStr, TypedValue>,
}

impl Message {
    pub(crate) fn new(
        descriptor: Arc<MessageDescriptor>,
        fields: LinkedHashMap<SmolStr, TypedValue>,
    ) -> Self {
        Self { descriptor, fields }
    }

    /// Get the schema this message was built from
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Get the name of this message's type
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Get the value of a field if the message declares it
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.fields.get(field)
    }

    /// Iterate over the fields of this message in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cool_asserts::assert_matches;

    #[test]
    fn test_number_views() {
        let n = Number::from(42_u32);
        assert_eq!(n.as_str(), "42");
        assert_matches!(n.as_i64(), Some(42));
        assert_matches!(n.as_u64(), Some(42));
        assert_matches!(n.as_f64(), Some(f) if f == 42.0);

        let n = Number::from(-1.5_f64);
        assert_matches!(n.as_i64(), None);
        assert_matches!(n.as_u64(), None);
        assert_matches!(n.as_f64(), Some(f) if f == -1.5);
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::json!({"b": 1, "a": [true, null, "x"], "c": {"d": 2.5}});
        assert_matches!(Value::from(json), Value::Map(map) => {
            assert_eq!(map.len(), 3);
            assert_matches!(map.get("b"), Some(Value::Number(n)) if n.as_i64() == Some(1));
            assert_matches!(
                map.get("a"),
                Some(Value::Array(vals)) if matches!(vals.as_slice(), [Value::Bool(true), Value::Null, Value::String(_)])
            );
            assert_matches!(map.get("c"), Some(Value::Map(inner)) if inner.get("d") == Some(&Value::from(2.5)));
        });
    }

    #[test]
    fn test_option_into_value() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }

    #[test]
    fn test_typed_value_accessors() {
        assert_matches!(TypedValue::Uint64(u64::MAX).as_i64(), None);
        assert_matches!(TypedValue::Int32(-3).as_i64(), Some(-3));
        assert_matches!(TypedValue::Float(0.5).as_f64(), Some(f) if f == 0.5);
        assert_matches!(TypedValue::String("s".into()).as_str(), Some("s"));
        assert_matches!(TypedValue::List(vec![]).native_type(), None);
        assert_matches!(TypedValue::Enum(1).native_type(), Some(NativeType::Enum));
    }
}
