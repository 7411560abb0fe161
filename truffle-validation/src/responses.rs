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

//! Application-facing response objects returned by the Truffle platform.

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;

use crate::data::Value;
use crate::err::ValidationError;
use crate::requests::Metadata;
use crate::Validate;

/// The finish reasons a `GenerateResponse` may report
pub const FINISH_REASONS: [&str; 3] = ["stop", "length", "content_filter"];

/// Token accounting reported alongside a response
pub type Usage = LinkedHashMap<SmolStr, u64>;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
    pub metadata: Metadata,
}

impl Validate for GenerateResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::empty("Response text"));
        }
        if self.model.is_empty() {
            return Err(ValidationError::unspecified("Model"));
        }
        match self.finish_reason.as_deref() {
            Some(reason) if !FINISH_REASONS.contains(&reason) => {
                Err(ValidationError::invalid_finish_reason(reason))
            }
            _ => Ok(()),
        }
    }
}

/// The models available to a tool. Each model is a map with at least an `id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetModelsResponse {
    pub models: Vec<Value>,
    pub metadata: Metadata,
}

impl Validate for GetModelsResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        for model in &self.models {
            match model {
                Value::Map(fields) if fields.contains_key("id") => {}
                Value::Map(_) => return Err(ValidationError::missing_key("Each model", "id")),
                other => {
                    return Err(ValidationError::unexpected_type(
                        "Each model",
                        "a map",
                        other.type_name(),
                    ))
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemToolResponse {
    pub tool_name: String,
    pub result: Value,
    pub error: Option<String>,
    pub metadata: Metadata,
}

impl Validate for SystemToolResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.tool_name.is_empty() {
            return Err(ValidationError::empty("Tool name"));
        }
        Ok(())
    }
}

/// The generic acknowledgement returned by SDK calls
#[derive(Debug, Clone, PartialEq)]
pub struct SdkResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub metadata: Metadata,
}

impl Validate for SdkResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.message.is_empty() {
            return Err(ValidationError::empty("Message"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserResponse {
    pub response: String,
    pub cancelled: bool,
    pub timeout: bool,
    pub metadata: Metadata,
}

impl Validate for UserResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.cancelled && !self.timeout && self.response.is_empty() {
            return Err(ValidationError::empty("Response"));
        }
        if self.cancelled && self.timeout {
            return Err(ValidationError::conflicting(
                "Response",
                "cancelled",
                "timed out",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f64>>,
    pub model: String,
    pub usage: Usage,
    pub metadata: Metadata,
}

impl Validate for EmbedResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.embeddings.is_empty() {
            return Err(ValidationError::empty("Embeddings"));
        }
        if self.embeddings.iter().any(Vec::is_empty) {
            return Err(ValidationError::empty("Embedding vector"));
        }
        if self.model.is_empty() {
            return Err(ValidationError::unspecified("Model"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::err::ErrorKind;
    use cool_asserts::assert_matches;

    fn generate_response(finish_reason: Option<&str>) -> GenerateResponse {
        GenerateResponse {
            text: "Hello".into(),
            model: "llama".into(),
            finish_reason: finish_reason.map(str::to_string),
            usage: Usage::new(),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_generate_response() {
        assert_matches!(generate_response(None).validate(), Ok(()));
        for reason in FINISH_REASONS {
            assert_matches!(generate_response(Some(reason)).validate(), Ok(()));
        }
        assert_matches!(generate_response(Some("tired")).validate(), Err(e) => {
            assert_eq!(e.to_string(), "Invalid finish reason: tired");
        });
        let resp = GenerateResponse {
            text: String::new(),
            ..generate_response(None)
        };
        assert_matches!(resp.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Response text cannot be empty");
        });
    }

    #[test]
    fn test_get_models_response() {
        let resp = GetModelsResponse {
            models: vec![Value::map([("id", "llama"), ("name", "Llama")])],
            ..Default::default()
        };
        assert_matches!(resp.validate(), Ok(()));

        let resp = GetModelsResponse {
            models: vec![Value::map([("name", "Llama")])],
            ..Default::default()
        };
        assert_matches!(resp.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Each model must have an id");
        });

        let resp = GetModelsResponse {
            models: vec![Value::from("llama")],
            ..Default::default()
        };
        assert_matches!(resp.validate(), Err(e) => {
            assert_eq!(e.kind(), ErrorKind::TypeMismatch);
        });
    }

    #[test]
    fn test_tool_and_sdk_responses() {
        let resp = SystemToolResponse {
            tool_name: String::new(),
            result: Value::Null,
            error: None,
            metadata: Metadata::new(),
        };
        assert_matches!(resp.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Tool name cannot be empty");
        });

        let resp = SdkResponse {
            success: false,
            message: String::new(),
            data: None,
            error: Some("failed".into()),
            metadata: Metadata::new(),
        };
        assert_matches!(resp.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Message cannot be empty");
        });
    }

    #[test]
    fn test_user_response() {
        assert_matches!(UserResponse::default().validate(), Err(ValidationError::Empty(_)));
        let cancelled = UserResponse {
            cancelled: true,
            ..Default::default()
        };
        assert_matches!(cancelled.validate(), Ok(()));
        let timed_out = UserResponse {
            timeout: true,
            ..Default::default()
        };
        assert_matches!(timed_out.validate(), Ok(()));
        let both = UserResponse {
            cancelled: true,
            timeout: true,
            ..Default::default()
        };
        assert_matches!(both.validate(), Err(ValidationError::Conflicting(_)));
    }

    #[test]
    fn test_embed_response() {
        let resp = EmbedResponse {
            embeddings: vec![vec![0.1, 0.2]],
            model: "text-embedding-ada-002".into(),
            usage: Usage::new(),
            metadata: Metadata::new(),
        };
        assert_matches!(resp.validate(), Ok(()));

        let empty_vector = EmbedResponse {
            embeddings: vec![vec![0.1], vec![]],
            ..resp.clone()
        };
        assert_matches!(empty_vector.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Embedding vector cannot be empty");
        });

        let no_model = EmbedResponse {
            model: String::new(),
            ..resp
        };
        assert_matches!(no_model.validate(), Err(e) => {
            assert_eq!(e.to_string(), "Model must be specified");
        });
    }
}
