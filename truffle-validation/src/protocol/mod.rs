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

//! Typed Truffle SDK protocol messages and their semantic validation.
//!
//! Messages mirror the generated protocol types: plain public fields, with enum
//! fields stored as their raw `i32` number.

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;
use std::sync::Arc;

use crate::coercion::coerce;
use crate::data::{Message, TypedValue, Value};
use crate::err::{CoercionError, ValidationError};
use crate::schema::{FieldDescriptor, Label, MessageDescriptor};
use crate::Validate;

pub mod descriptors;

macro_rules! protocol_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $number:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $number),*
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(number: i32) -> Result<Self, i32> {
                match number {
                    $($number => Ok(Self::$variant),)*
                    other => Err(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value as i32
            }
        }
    };
}

protocol_enum!(
    /// The author of a `Content` fragment
    Role {
        Invalid = 0,
        System = 1,
        User = 2,
        Ai = 3,
    }
);

protocol_enum!(
    /// Why the platform stopped generating tokens
    FinishReason {
        Unspecified = 0,
        Length = 1,
        Stop = 2,
        Error = 3,
        User = 4,
    }
);

protocol_enum!(
    /// The kind of rich value a tool returns
    TruffleType {
        Unspecified = 0,
        File = 1,
        Image = 2,
    }
);

impl Role {
    /// Map a role string (`system`, `user` or `ai`, any case) onto its protocol value
    pub fn from_role_str(role: &str) -> Option<Self> {
        match role.to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }

    /// The role string of this role. `Invalid` has none.
    pub fn as_role_str(self) -> Option<&'static str> {
        match self {
            Self::System => Some("system"),
            Self::User => Some("user"),
            Self::Ai => Some("ai"),
            Self::Invalid => None,
        }
    }
}

/// Check that `role` is one of the content role strings
pub fn validate_content_role(role: &str) -> Result<(), ValidationError> {
    match Role::from_role_str(role) {
        Some(_) => Ok(()),
        None => Err(ValidationError::invalid_content_role(role)),
    }
}

/// Check that `number` is a declared `TruffleType`
pub fn validate_truffle_type(number: i32) -> Result<(), ValidationError> {
    TruffleType::try_from(number)
        .map(|_| ())
        .map_err(ValidationError::invalid_truffle_type)
}

/// Coerce a dynamic value into a message of type `schema`
fn into_message(value: Value, schema: Arc<MessageDescriptor>) -> Result<Message, CoercionError> {
    let name = SmolStr::from(schema.name());
    let field = FieldDescriptor::message(name, schema, Label::Required);
    match coerce(value, &field)? {
        TypedValue::Message(Some(msg)) => Ok(msg),
        _ => Err(CoercionError::missing_required_field(field.name())),
    }
}

fn read_string(msg: &Message, field: &str) -> String {
    msg.get(field)
        .and_then(TypedValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn read_bytes(msg: &Message, field: &str) -> Vec<u8> {
    match msg.get(field) {
        Some(TypedValue::Bytes(b)) => b.clone(),
        _ => Vec::new(),
    }
}

/// Read a map field as its `(key, value)` string pairs, in entry order
fn read_string_map(msg: &Message, field: &str) -> LinkedHashMap<String, String> {
    msg.get(field)
        .and_then(TypedValue::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(TypedValue::as_message)
        .map(|entry| (read_string(entry, "key"), read_string(entry, "value")))
        .collect()
}

fn read_i32(msg: &Message, field: &str) -> i32 {
    match msg.get(field) {
        Some(TypedValue::Int32(i) | TypedValue::Enum(i)) => *i,
        _ => 0,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
}

impl ToolMetadata {
    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::tool_metadata())?;
        Ok(Self {
            name: read_string(&msg, "name"),
            description: read_string(&msg, "description"),
        })
    }
}

impl Validate for ToolMetadata {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::empty("Tool name"));
        }
        if self.description.is_empty() {
            return Err(ValidationError::empty("Tool description"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolRequest {
    pub tool_name: String,
    pub description: String,
    pub icon: String,
    pub args: LinkedHashMap<String, String>,
}

impl ToolRequest {
    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::tool_request())?;
        Ok(Self {
            tool_name: read_string(&msg, "tool_name"),
            description: read_string(&msg, "description"),
            icon: read_string(&msg, "icon"),
            args: read_string_map(&msg, "args"),
        })
    }
}

impl Validate for ToolRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.tool_name.is_empty() {
            return Err(ValidationError::empty("Tool name"));
        }
        if self.description.is_empty() {
            return Err(ValidationError::empty("Tool description"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolResponse {
    pub response: String,
    pub error: String,
    pub data: Vec<u8>,
}

impl ToolResponse {
    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::tool_response())?;
        Ok(Self {
            response: read_string(&msg, "response"),
            error: read_string(&msg, "error"),
            data: read_bytes(&msg, "data"),
        })
    }
}

impl Validate for ToolResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.response.is_empty() && self.error.is_empty() {
            return Err(ValidationError::missing_alternative(
                "ToolResponse",
                "response",
                "error",
            ));
        }
        Ok(())
    }
}

/// Metadata describing a Truffle app.
///
/// `example_prompts` is kept dynamic since it is read from user-authored documents.
#[derive(Debug, Clone, PartialEq)]
pub struct AppMetadata {
    pub fullname: String,
    pub name: String,
    pub description: String,
    pub goal: String,
    pub manifest_version: i32,
    pub example_prompts: Value,
    pub icon_url: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            fullname: String::new(),
            name: String::new(),
            description: String::new(),
            goal: String::new(),
            manifest_version: 0,
            example_prompts: Value::Array(Vec::new()),
            icon_url: String::new(),
        }
    }
}

impl AppMetadata {
    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::app_metadata())?;
        Ok(Self {
            fullname: read_string(&msg, "fullname"),
            name: read_string(&msg, "name"),
            description: read_string(&msg, "description"),
            goal: read_string(&msg, "goal"),
            manifest_version: read_i32(&msg, "manifest_version"),
            example_prompts: msg
                .get("example_prompts")
                .cloned()
                .map_or(Value::Array(Vec::new()), Value::from),
            icon_url: read_string(&msg, "icon_url"),
        })
    }
}

impl Validate for AppMetadata {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.fullname.is_empty() {
            return Err(ValidationError::empty("App fullname"));
        }
        if self.name.is_empty() {
            return Err(ValidationError::empty("App name"));
        }
        if self.description.is_empty() {
            return Err(ValidationError::empty("App description"));
        }
        if self.goal.is_empty() {
            return Err(ValidationError::empty("App goal"));
        }
        if self.manifest_version < 1 {
            return Err(ValidationError::not_positive("Manifest version"));
        }
        match &self.example_prompts {
            Value::Array(_) => Ok(()),
            other => Err(ValidationError::unexpected_type(
                "Example prompts",
                "a list",
                other.type_name(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub role: i32,
    pub content: String,
    pub data: Vec<u8>,
}

impl Content {
    /// Build a text fragment from a role string.
    ///
    /// Unknown roles become `Role::Invalid` rather than failing.
    pub fn from_role_str(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: Role::from_role_str(role).unwrap_or(Role::Invalid).into(),
            content: content.into(),
            data: Vec::new(),
        }
    }

    /// The role of this fragment, if `role` holds a declared value
    pub fn role(&self) -> Option<Role> {
        Role::try_from(self.role).ok()
    }

    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::content())?;
        Ok(Self::from_message(&msg))
    }

    fn from_message(msg: &Message) -> Self {
        Self {
            role: read_i32(msg, "role"),
            content: read_string(msg, "content"),
            data: read_bytes(msg, "data"),
        }
    }
}

impl Validate for Content {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.role().is_none() {
            return Err(ValidationError::invalid_content_role(self.role));
        }
        if self.content.is_empty() {
            return Err(ValidationError::empty("Content message"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub model_id: i32,
    pub messages: Vec<Content>,
    pub max_tokens: i32,
    pub temperature: f32,
}

impl GenerateRequest {
    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::generate_request())?;
        let messages = msg
            .get("messages")
            .and_then(TypedValue::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(TypedValue::as_message)
            .map(Content::from_message)
            .collect();
        Ok(Self {
            model_id: read_i32(&msg, "model_id"),
            messages,
            max_tokens: read_i32(&msg, "max_tokens"),
            temperature: match msg.get("temperature") {
                Some(TypedValue::Float(f)) => *f,
                _ => 0.0,
            },
        })
    }
}

impl Validate for GenerateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.model_id < 0 {
            return Err(ValidationError::negative("Model ID"));
        }
        if self.max_tokens <= 0 {
            return Err(ValidationError::not_positive("Max tokens"));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                "Temperature",
                0.0,
                1.0,
                f64::from(self.temperature),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub token: String,
    pub finish_reason: i32,
    pub error: String,
}

impl GenerateResponse {
    /// The finish reason, if `finish_reason` holds a declared value
    pub fn finish_reason(&self) -> Option<FinishReason> {
        FinishReason::try_from(self.finish_reason).ok()
    }

    /// Build from a dynamic map of its fields
    pub fn from_value(value: Value) -> Result<Self, CoercionError> {
        let msg = into_message(value, descriptors::generate_response())?;
        Ok(Self {
            token: read_string(&msg, "token"),
            finish_reason: read_i32(&msg, "finish_reason"),
            error: read_string(&msg, "error"),
        })
    }
}

impl Validate for GenerateResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.error.is_empty() && !self.token.is_empty() {
            return Err(ValidationError::conflicting("Response", "error", "token"));
        }
        if self.finish_reason() == Some(FinishReason::Error) && self.error.is_empty() {
            return Err(ValidationError::MissingErrorMessage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::err::ErrorKind;
    use cool_asserts::assert_matches;

    fn generate_request(temperature: f32) -> GenerateRequest {
        GenerateRequest {
            model_id: 0,
            messages: vec![Content::from_role_str("user", "hello")],
            max_tokens: 16,
            temperature,
        }
    }

    #[test]
    fn test_tool_metadata() {
        let tool = ToolMetadata {
            name: "search".into(),
            description: "Search the web".into(),
        };
        assert_matches!(tool.validate(), Ok(()));

        let tool = ToolMetadata {
            name: String::new(),
            ..tool
        };
        assert_matches!(tool.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Tool name cannot be empty");
            assert_eq!(e.kind(), ErrorKind::ValueViolation);
        });

        let tool = ToolMetadata {
            name: "search".into(),
            description: String::new(),
        };
        assert_matches!(tool.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Tool description cannot be empty");
        });
    }

    #[test]
    fn test_tool_request() {
        let req = ToolRequest {
            tool_name: "search".into(),
            ..Default::default()
        };
        assert_matches!(req.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Tool description cannot be empty");
        });
        assert_matches!(ToolRequest::default().validate(), Err(e) => {
            assert_eq!(e.to_string(), "Tool name cannot be empty");
        });
    }

    #[test]
    fn test_tool_response_needs_response_or_error() {
        assert_matches!(ToolResponse::default().validate(), Err(e) => {
            assert_eq!(e.to_string(), "ToolResponse must have either response or error");
            assert_eq!(e.kind(), ErrorKind::StructuralViolation);
        });
        let resp = ToolResponse {
            error: "timed out".into(),
            ..Default::default()
        };
        assert_matches!(resp.validate(), Ok(()));
        let resp = ToolResponse {
            response: "42".into(),
            ..Default::default()
        };
        assert_matches!(resp.validate(), Ok(()));
    }

    #[test]
    fn test_app_metadata() {
        let app = AppMetadata {
            fullname: "Weather Helper".into(),
            name: "weather".into(),
            description: "Looks up the weather".into(),
            goal: "Tell users the forecast".into(),
            manifest_version: 1,
            example_prompts: Value::Array(vec!["What's the weather?".into()]),
            icon_url: String::new(),
        };
        assert_matches!(app.validate(), Ok(()));

        let bad = AppMetadata {
            goal: String::new(),
            ..app.clone()
        };
        assert_matches!(bad.validate(), Err(e) => {
            assert_eq!(e.to_string(), "App goal cannot be empty");
        });

        let bad = AppMetadata {
            manifest_version: 0,
            ..app.clone()
        };
        assert_matches!(bad.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Manifest version must be positive");
        });

        let bad = AppMetadata {
            example_prompts: Value::from("What's the weather?"),
            ..app
        };
        assert_matches!(bad.validate(), Err(e) => {
            assert_eq!(e.kind(), ErrorKind::TypeMismatch);
            assert!(e.to_string().starts_with("Example prompts must be a list"), "{e}");
        });
    }

    #[test]
    fn test_generate_request_temperature_bounds() {
        assert_matches!(generate_request(0.0).validate(), Ok(()));
        assert_matches!(generate_request(1.0).validate(), Ok(()));
        assert_matches!(generate_request(-0.01).validate(), Err(ValidationError::OutOfRange(_)));
        assert_matches!(generate_request(1.01).validate(), Err(e) => {
            assert_eq!(e.to_string(), "Temperature must be between 0 and 1");
            assert_eq!(e.kind(), ErrorKind::ValueViolation);
        });
        assert_matches!(generate_request(f32::NAN).validate(), Err(ValidationError::OutOfRange(_)));
    }

    #[test]
    fn test_generate_request_counts() {
        let req = GenerateRequest {
            model_id: -1,
            ..generate_request(0.5)
        };
        assert_matches!(req.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Model ID cannot be negative");
        });
        let req = GenerateRequest {
            max_tokens: 0,
            ..generate_request(0.5)
        };
        assert_matches!(req.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Max tokens must be positive");
        });
    }

    #[test]
    fn test_generate_response() {
        let resp = GenerateResponse {
            token: "hi".into(),
            finish_reason: FinishReason::Unspecified.into(),
            error: "boom".into(),
        };
        assert_matches!(resp.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Response cannot have both error and token");
        });

        let resp = GenerateResponse {
            finish_reason: FinishReason::Error.into(),
            ..Default::default()
        };
        assert_matches!(resp.validate(), Err(ValidationError::MissingErrorMessage));

        let resp = GenerateResponse {
            finish_reason: FinishReason::Error.into(),
            error: "model crashed".into(),
            ..Default::default()
        };
        assert_matches!(resp.validate(), Ok(()));
        assert_eq!(resp.finish_reason(), Some(FinishReason::Error));
    }

    #[test]
    fn test_content() {
        assert_matches!(Content::from_role_str("AI", "hello").validate(), Ok(()));
        assert_eq!(Content::from_role_str("AI", "hello").role(), Some(Role::Ai));

        let shout = Content::from_role_str("shout", "HELLO");
        assert_eq!(shout.role(), Some(Role::Invalid));
        assert_matches!(shout.validate(), Ok(()));

        let unknown = Content {
            role: 7,
            content: "hello".into(),
            data: Vec::new(),
        };
        assert_matches!(unknown.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Invalid content role: 7");
        });

        assert_matches!(Content::from_role_str("user", "").validate(), Err(e) => {
            assert_eq!(e.to_string(), "Content message cannot be empty");
        });
    }

    #[test]
    fn test_content_role_strings() {
        for role in ["system", "user", "ai", "System", "USER"] {
            assert_matches!(validate_content_role(role), Ok(()));
        }
        assert_matches!(validate_content_role("shout"), Err(e) => {
            assert_eq!(e.to_string(), "Invalid content role: shout");
            assert_eq!(e.kind(), ErrorKind::ValueViolation);
        });
        assert_eq!(Role::Ai.as_role_str(), Some("ai"));
        assert_eq!(Role::Invalid.as_role_str(), None);
    }

    #[test]
    fn test_truffle_type() {
        for number in [0, 1, 2] {
            assert_matches!(validate_truffle_type(number), Ok(()));
        }
        assert_matches!(validate_truffle_type(3), Err(e) => {
            assert_eq!(e.to_string(), "Invalid TruffleType enum value: 3");
        });
    }

    #[test]
    fn test_enum_numbers() {
        assert_eq!(FinishReason::try_from(3), Ok(FinishReason::Error));
        assert_eq!(FinishReason::try_from(9), Err(9));
        assert_eq!(i32::from(FinishReason::User), 4);
        assert_eq!(Role::try_from(3), Ok(Role::Ai));
        assert_eq!(TruffleType::try_from(-1), Err(-1));
    }

    #[test]
    fn test_tool_messages_from_sdk_shaped_maps() {
        let value = Value::map([
            ("tool_name", Value::from("GetForecast")),
            ("description", Value::from("Looks up the forecast")),
            ("icon", Value::from("cloud")),
            ("args", Value::map([("city", "Paris"), ("unit", "celsius")])),
        ]);
        assert_matches!(ToolRequest::from_value(value), Ok(req) => {
            assert_eq!(req.icon, "cloud");
            assert_eq!(
                req.args.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>(),
                [("city", "Paris"), ("unit", "celsius")]
            );
            assert_matches!(req.validate(), Ok(()));
        });
        assert_matches!(
            ToolRequest::from_value(Value::map([("tool_name", "GetForecast")])),
            Ok(req) if req.args.is_empty() && req.icon.is_empty()
        );

        let value = Value::map([
            ("response", Value::from("Sunny")),
            ("data", Value::from(b"\x89PNG".to_vec())),
        ]);
        assert_matches!(ToolResponse::from_value(value), Ok(resp) => {
            assert_eq!(resp.data, b"\x89PNG");
            assert_matches!(resp.validate(), Ok(()));
        });

        let value = Value::map([
            ("fullname", Value::from("Weather Helper")),
            ("description", Value::from("Looks up the weather")),
            ("name", Value::from("weather")),
            ("goal", Value::from("Tell users the forecast")),
            ("icon_url", Value::from("https://example.com/icon.png")),
        ]);
        assert_matches!(AppMetadata::from_value(value), Ok(app) => {
            assert_eq!(app.icon_url, "https://example.com/icon.png");
            assert_eq!(app.name, "weather");
        });
    }

    #[test]
    fn test_from_dynamic_map() {
        let value = Value::map([
            ("model_id", Value::from("2")),
            (
                "messages",
                Value::Array(vec![Value::map([
                    ("role", Value::from("ROLE_USER")),
                    ("content", Value::from("hi")),
                ])]),
            ),
            ("max_tokens", Value::from(64)),
            ("temperature", Value::from(0.5)),
        ]);
        assert_matches!(GenerateRequest::from_value(value), Ok(req) => {
            assert_eq!(req.model_id, 2);
            assert_eq!(req.max_tokens, 64);
            assert_eq!(req.temperature, 0.5);
            assert_eq!(req.messages, vec![Content::from_role_str("user", "hi")]);
            assert_matches!(req.validate(), Ok(()));
        });

        assert_matches!(
            ToolMetadata::from_value(Value::map([("title", "x")])),
            Err(CoercionError::UnknownField(_))
        );
        assert_matches!(
            AppMetadata::from_value(Value::map([("example_prompts", Value::from(vec![Value::from("a")]))])),
            Ok(app) => {
                assert_eq!(app.example_prompts, Value::Array(vec![Value::from("a")]));
            }
        );
        assert_matches!(
            GenerateResponse::from_value(Value::map([("finish_reason", "FINISH_REASON_STOP")])),
            Ok(resp) => {
                assert_eq!(resp.finish_reason(), Some(FinishReason::Stop));
            }
        );
    }
}
