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

//! Application-facing request objects submitted to the Truffle platform.

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;
use std::sync::Arc;

use crate::coercion::build_message;
use crate::data::{Message, Value};
use crate::err::ValidationError;
use crate::schema::MessageDescriptor;
use crate::Validate;

/// Free-form data attached to a request or response
pub type Metadata = LinkedHashMap<SmolStr, Value>;

/// The statuses a tool may report through a `ToolUpdateRequest`
pub const TOOL_STATUSES: [&str; 4] = ["started", "completed", "failed", "cancelled"];

/// The embedding model used when none is given
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-ada-002";

/// A request for model text generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: Option<i64>,
    pub temperature: f64,
    pub top_p: f64,
    pub stop: Option<Vec<String>>,
    pub stream: bool,
    pub metadata: Metadata,
}

impl GenerateRequest {
    /// A request with a temperature of 0.7, a top-p of 1.0 and no token limit
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            temperature: 0.7,
            top_p: 1.0,
            stop: None,
            stream: false,
            metadata: Metadata::new(),
        }
    }

    pub fn max_tokens(self, max_tokens: i64) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..self
        }
    }

    pub fn temperature(self, temperature: f64) -> Self {
        Self {
            temperature,
            ..self
        }
    }

    pub fn top_p(self, top_p: f64) -> Self {
        Self { top_p, ..self }
    }
}

impl Validate for GenerateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.is_empty() {
            return Err(ValidationError::empty("Prompt"));
        }
        if self.model.is_empty() {
            return Err(ValidationError::unspecified("Model"));
        }
        if self.max_tokens.is_some_and(|n| n <= 0) {
            return Err(ValidationError::not_positive("max_tokens"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                "temperature",
                0.0,
                2.0,
                self.temperature,
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ValidationError::out_of_range("top_p", 0.0, 1.0, self.top_p));
        }
        Ok(())
    }
}

/// A request for the list of available models
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetModelsRequest {
    pub include_hidden: bool,
}

impl Validate for GetModelsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A request to invoke a system tool with named arguments
#[derive(Debug, Clone, PartialEq)]
pub struct SystemToolRequest {
    pub tool_name: String,
    pub args: LinkedHashMap<SmolStr, Value>,
    pub metadata: Metadata,
}

impl SystemToolRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            args: LinkedHashMap::new(),
            metadata: Metadata::new(),
        }
    }

    /// Add an argument, replacing any earlier value of the same name
    pub fn arg(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Validate the request and coerce its arguments against the tool's parameter schema.
    ///
    /// Missing required arguments, unknown arguments and arguments that cannot be
    /// represented as their parameter type are reported as coercion errors.
    pub fn validate_args(
        &self,
        params: &Arc<MessageDescriptor>,
    ) -> Result<Message, ValidationError> {
        self.validate()?;
        Ok(build_message(params, self.args.clone())?)
    }
}

impl Validate for SystemToolRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.tool_name.is_empty() {
            return Err(ValidationError::empty("Tool name"));
        }
        Ok(())
    }
}

/// A status report about a running tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUpdateRequest {
    pub tool_name: String,
    pub status: String,
    pub metadata: Metadata,
}

impl ToolUpdateRequest {
    pub fn new(tool_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            status: status.into(),
            metadata: Metadata::new(),
        }
    }
}

impl Validate for ToolUpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.tool_name.is_empty() {
            return Err(ValidationError::empty("Tool name"));
        }
        if self.status.is_empty() {
            return Err(ValidationError::empty("Status"));
        }
        if !TOOL_STATUSES.contains(&self.status.as_str()) {
            return Err(ValidationError::invalid_status(&self.status));
        }
        Ok(())
    }
}

/// A prompt shown to the user, optionally with a fixed set of answers
#[derive(Debug, Clone, PartialEq)]
pub struct UserRequest {
    pub prompt: String,
    pub options: Option<Vec<String>>,
    /// Seconds to wait for an answer
    pub timeout: Option<f64>,
    pub metadata: Metadata,
}

impl UserRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: None,
            timeout: None,
            metadata: Metadata::new(),
        }
    }

    pub fn timeout(self, timeout: f64) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    pub fn options(self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            options: Some(options.into_iter().map(Into::into).collect()),
            ..self
        }
    }
}

impl Validate for UserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.is_empty() {
            return Err(ValidationError::empty("Prompt"));
        }
        if self.timeout.is_some_and(|t| t <= 0.0) {
            return Err(ValidationError::not_positive("Timeout"));
        }
        Ok(())
    }
}

/// The text of an `EmbedRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedText {
    Single(String),
    Batch(Vec<String>),
}

impl From<&str> for EmbedText {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for EmbedText {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for EmbedText {
    fn from(texts: Vec<String>) -> Self {
        Self::Batch(texts)
    }
}

impl TryFrom<Value> for EmbedText {
    type Error = ValidationError;

    /// Accepts a string or a list of strings
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        const EXPECTED: &str = "a string or a list of strings";
        match value {
            Value::String(text) => Ok(Self::Single(text)),
            Value::Array(vals) => vals
                .into_iter()
                .map(|val| match val {
                    Value::String(text) => Ok(text),
                    other => Err(ValidationError::unexpected_type(
                        "Text",
                        EXPECTED,
                        other.type_name(),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Batch),
            other => Err(ValidationError::unexpected_type(
                "Text",
                EXPECTED,
                other.type_name(),
            )),
        }
    }
}

/// A request for text embeddings
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedRequest {
    pub text: EmbedText,
    pub model: String,
    pub metadata: Metadata,
}

impl EmbedRequest {
    /// A request using `DEFAULT_EMBED_MODEL`
    pub fn new(text: impl Into<EmbedText>) -> Self {
        Self {
            text: text.into(),
            model: DEFAULT_EMBED_MODEL.to_string(),
            metadata: Metadata::new(),
        }
    }

    pub fn model(self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self
        }
    }
}

impl Validate for EmbedRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.text {
            EmbedText::Single(text) if text.is_empty() => {
                return Err(ValidationError::empty("Text"));
            }
            EmbedText::Batch(texts) if texts.is_empty() => {
                return Err(ValidationError::empty("Text list"));
            }
            EmbedText::Batch(texts) if texts.iter().any(String::is_empty) => {
                return Err(ValidationError::empty("Batch text"));
            }
            EmbedText::Single(_) | EmbedText::Batch(_) => {}
        }
        if self.model.is_empty() {
            return Err(ValidationError::unspecified("Model"));
        }
        Ok(())
    }
}
