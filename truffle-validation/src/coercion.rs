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

use crate::catalog::{FieldClass, NativeType};
use crate::data::{Message, TypedValue, Value};
use crate::err::CoercionError;
use crate::schema::{FieldDescriptor, MessageDescriptor};

/// Coerce a dynamic `value` into a value conforming to `field`.
///
/// An absent value (`Value::Null`) takes the catalog default of the field's wire type,
/// unless the field is required. Repeated fields take a list and coerce each element.
pub fn coerce(value: Value, field: &FieldDescriptor) -> Result<TypedValue, CoercionError> {
    if field.is_repeated() {
        return coerce_repeated(value, field);
    }
    match value {
        Value::Null if field.is_required() => {
            Err(CoercionError::missing_required_field(field.name()))
        }
        Value::Null => Ok(field.wire_type().default_value()),
        value => coerce_present(value, field),
    }
}

/// Build a message of type `schema` from a map of its field values.
///
/// Every key must name a field of `schema`, and every field is coerced before the
/// message is assembled, so a failure never yields a partially built message.
pub fn build_message(
    schema: &Arc<MessageDescriptor>,
    mut entries: LinkedHashMap<SmolStr, Value>,
) -> Result<Message, CoercionError> {
    if let Some(unknown) = entries.keys().find(|k| schema.field(k).is_none()) {
        return Err(CoercionError::unknown_field(schema.name(), unknown));
    }

    let mut fields = LinkedHashMap::new();
    for field in schema.fields() {
        let value = entries.remove(field.name()).unwrap_or(Value::Null);
        let typed = coerce(value, field)?;
        fields.insert(field.name.clone(), typed);
    }
    Ok(Message::new(schema.clone(), fields))
}

fn coerce_repeated(value: Value, field: &FieldDescriptor) -> Result<TypedValue, CoercionError> {
    match value {
        Value::Null => Ok(TypedValue::List(Vec::new())),
        Value::Array(vals) => vals
            .into_iter()
            .map(|val| match val {
                Value::Null => Err(CoercionError::type_mismatch(
                    field.name(),
                    field.wire_type().native_type(),
                    "null",
                    "elements of a repeated field cannot be absent",
                )),
                val => coerce_present(val, field),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TypedValue::List),
        Value::Map(entries) if field.message_type().is_some_and(|m| m.is_map_entry()) => entries
            .into_iter()
            .map(|(key, value)| {
                let entry = Value::map([("key", Value::String(key.to_string())), ("value", value)]);
                coerce_present(entry, field)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TypedValue::List),
        other => Err(CoercionError::type_mismatch(
            field.name(),
            field.wire_type().native_type(),
            other.type_name(),
            "repeated fields take a list of values",
        )),
    }
}

fn coerce_present(value: Value, field: &FieldDescriptor) -> Result<TypedValue, CoercionError> {
    match field.wire_type().class() {
        FieldClass::Message => coerce_message(value, field),
        FieldClass::Enum => coerce_enum(value, field),
        FieldClass::Numeric | FieldClass::Float | FieldClass::Scalar => coerce_scalar(value, field),
    }
}

fn coerce_message(value: Value, field: &FieldDescriptor) -> Result<TypedValue, CoercionError> {
    let Some(schema) = field.message_type() else {
        return Err(CoercionError::missing_nested_schema(
            field.name(),
            NativeType::Message,
        ));
    };
    match value {
        Value::Message(msg) if msg.type_name() == schema.name() => {
            Ok(TypedValue::Message(Some(msg)))
        }
        Value::Message(msg) => Err(CoercionError::mismatched_message_type(
            field.name(),
            schema.name(),
            msg.type_name(),
        )),
        Value::Map(entries) => Ok(TypedValue::Message(Some(build_message(schema, entries)?))),
        other => Err(CoercionError::type_mismatch(
            field.name(),
            NativeType::Message,
            other.type_name(),
            "expected a message or a map of its fields",
        )),
    }
}

fn coerce_enum(value: Value, field: &FieldDescriptor) -> Result<TypedValue, CoercionError> {
    let Some(ty) = field.enum_type() else {
        return Err(CoercionError::missing_nested_schema(
            field.name(),
            NativeType::Enum,
        ));
    };
    match value {
        Value::String(name) => match ty.number_of(&name) {
            Some(number) => Ok(TypedValue::Enum(number)),
            None => Err(CoercionError::invalid_enum_value(field.name(), ty.name(), name)),
        },
        Value::Number(num) => {
            let Some(number) = num.as_i64() else {
                return Err(CoercionError::type_mismatch(
                    field.name(),
                    NativeType::Enum,
                    "number",
                    format!("{} is not an integer", num.as_str()),
                ));
            };
            match i32::try_from(number) {
                Ok(number) if ty.name_of(number).is_some() => Ok(TypedValue::Enum(number)),
                _ => Err(CoercionError::invalid_enum_value(field.name(), ty.name(), number)),
            }
        }
        other => Err(CoercionError::type_mismatch(
            field.name(),
            NativeType::Enum,
            other.type_name(),
            "expected an enum member name or number",
        )),
    }
}

fn coerce_scalar(value: Value, field: &FieldDescriptor) -> Result<TypedValue, CoercionError> {
    let native = field.wire_type().native_type();
    let found = value.type_name();
    let typed = match native {
        NativeType::F64 => to_f64(value).map(TypedValue::Double),
        NativeType::F32 => to_f32(value).map(TypedValue::Float),
        NativeType::I32 => to_integer(value).map(TypedValue::Int32),
        NativeType::I64 => to_integer(value).map(TypedValue::Int64),
        NativeType::U32 => to_integer(value).map(TypedValue::Uint32),
        NativeType::U64 => to_integer(value).map(TypedValue::Uint64),
        NativeType::Bool => to_bool(value).map(TypedValue::Bool),
        NativeType::String => to_string(value).map(TypedValue::String),
        NativeType::Bytes => to_bytes(value).map(TypedValue::Bytes),
        NativeType::Enum | NativeType::Message => {
            return Err(CoercionError::missing_nested_schema(field.name(), native))
        }
    };
    typed.map_err(|reason| CoercionError::type_mismatch(field.name(), native, found, reason))
}

fn not_convertible(value: &Value) -> String {
    format!("a {} value has no such representation", value.type_name())
}

fn to_integer<T>(value: Value) -> Result<T, String>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match value {
        Value::Number(num) => parse_integer(num.as_str()),
        Value::String(s) => parse_integer(s.trim()),
        Value::Bool(b) => T::try_from(i64::from(b)).map_err(|_| format!("{b} is out of range")),
        other => Err(not_convertible(&other)),
    }
}

fn parse_integer<T>(text: &str) -> Result<T, String>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match text.parse::<i64>() {
        Ok(i) => T::try_from(i).map_err(|_| format!("{text} is out of range")),
        Err(signed_err) => match text.parse::<u64>() {
            Ok(u) => T::try_from(u).map_err(|_| format!("{text} is out of range")),
            Err(_) if text.parse::<f64>().is_ok() => Err(format!("{text} is not an integer")),
            Err(_) => Err(signed_err.to_string()),
        },
    }
}

fn to_f64(value: Value) -> Result<f64, String> {
    match value {
        Value::Number(num) => num.as_str().parse().map_err(|e| format!("{e}")),
        Value::String(s) => s.trim().parse().map_err(|e| format!("{e}")),
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        other => Err(not_convertible(&other)),
    }
}

fn to_f32(value: Value) -> Result<f32, String> {
    let wide = to_f64(value)?;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Narrowing is the intended conversion; overflow to infinity is rejected below."
    )]
    let narrow = wide as f32;
    if narrow.is_infinite() && wide.is_finite() {
        Err(format!("{wide} overflows a 32-bit float"))
    } else {
        Ok(narrow)
    }
}

fn to_bool(value: Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Number(num) => num
            .as_f64()
            .map(|f| f != 0.0)
            .ok_or_else(|| format!("{} is not a number", num.as_str())),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!("{s:?} is neither `true` nor `false`")),
        },
        other => Err(not_convertible(&other)),
    }
}

fn to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(num) => Ok(num.as_str().to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Bytes(b) => String::from_utf8(b).map_err(|e| format!("{e}")),
        other => Err(not_convertible(&other)),
    }
}

fn to_bytes(value: Value) -> Result<Vec<u8>, String> {
    match value {
        Value::Bytes(b) => Ok(b),
        Value::String(s) => Ok(s.into_bytes()),
        Value::Array(vals) => vals
            .iter()
            .map(|val| match val {
                Value::Number(num) => num.as_u64().and_then(|u| u8::try_from(u).ok()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| "array elements must be integers between 0 and 255".to_string()),
        other => Err(not_convertible(&other)),
    }
}
