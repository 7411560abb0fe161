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

//! Schema of the Truffle SDK protocol messages, expressed as `MessageDescriptor`s so that
//! dynamic maps can be coerced into protocol-shaped messages.

use std::sync::Arc;

use crate::catalog::WireType;
use crate::schema::{EnumDescriptor, FieldDescriptor, Label, MessageDescriptor};

fn string(name: &str) -> FieldDescriptor {
    FieldDescriptor::scalar(name, WireType::String, Label::Optional)
}

pub fn role() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new(
        "Content.Role",
        [
            ("ROLE_INVALID", 0),
            ("ROLE_SYSTEM", 1),
            ("ROLE_USER", 2),
            ("ROLE_AI", 3),
        ],
    ))
}

pub fn finish_reason() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new(
        "GenerateFinishReason",
        [
            ("FINISH_REASON_UNSPECIFIED", 0),
            ("FINISH_REASON_LENGTH", 1),
            ("FINISH_REASON_STOP", 2),
            ("FINISH_REASON_ERROR", 3),
            ("FINISH_REASON_USER", 4),
        ],
    ))
}

pub fn truffle_type() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new(
        "TruffleType",
        [
            ("TRUFFLE_TYPE_UNSPECIFIED", 0),
            ("TRUFFLE_TYPE_FILE", 1),
            ("TRUFFLE_TYPE_IMAGE", 2),
        ],
    ))
}

pub fn tool_metadata() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "ToolMetadata",
        [string("name"), string("description")],
    ))
}

pub fn tool_request() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "ToolRequest",
        [
            string("tool_name"),
            string("description"),
            string("icon"),
            FieldDescriptor::map("args", tool_request_args_entry()),
        ],
    ))
}

/// Entry type of `ToolRequest.args`, a map from argument name to its textual value
pub fn tool_request_args_entry() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::map_entry(
        "ToolRequest.ArgsEntry",
        WireType::String,
    ))
}

pub fn tool_response() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "ToolResponse",
        [
            string("response"),
            string("error"),
            FieldDescriptor::scalar("data", WireType::Bytes, Label::Optional),
        ],
    ))
}

pub fn app_metadata() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "AppMetadata",
        [
            string("fullname"),
            string("name"),
            string("description"),
            string("goal"),
            FieldDescriptor::scalar("manifest_version", WireType::Int32, Label::Optional),
            FieldDescriptor::scalar("example_prompts", WireType::String, Label::Repeated),
            string("icon_url"),
        ],
    ))
}

pub fn content() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "Content",
        [
            FieldDescriptor::enumeration("role", role(), Label::Optional),
            string("content"),
            FieldDescriptor::scalar("data", WireType::Bytes, Label::Optional),
        ],
    ))
}

pub fn generate_request() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "GenerateRequest",
        [
            FieldDescriptor::scalar("model_id", WireType::Int32, Label::Optional),
            FieldDescriptor::message("messages", content(), Label::Repeated),
            FieldDescriptor::scalar("max_tokens", WireType::Int32, Label::Optional),
            FieldDescriptor::scalar("temperature", WireType::Float, Label::Optional),
        ],
    ))
}

pub fn generate_response() -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::new(
        "GenerateResponse",
        [
            string("token"),
            FieldDescriptor::enumeration("finish_reason", finish_reason(), Label::Optional),
            string("error"),
        ],
    ))
}
