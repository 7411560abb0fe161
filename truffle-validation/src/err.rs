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

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

use crate::catalog::NativeType;

/// The classification of a failure, used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value cannot be represented as the target type
    TypeMismatch,
    /// A correctly typed value is semantically illegal (out of range, empty, unknown member, ...)
    ValueViolation,
    /// A required field, file or document is absent or malformed at the container level
    StructuralViolation,
    /// Source text is not syntactically valid
    ParseFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch => write!(f, "type mismatch"),
            Self::ValueViolation => write!(f, "value violation"),
            Self::StructuralViolation => write!(f, "structural violation"),
            Self::ParseFailure => write!(f, "parse failure"),
        }
    }
}

/// The type of errors that may be encountered while coercing a `Value` against a `FieldDescriptor`
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum CoercionError {
    #[error("Field {} is required", .0.field)]
    #[diagnostic(
        code(coercion::missing_required_field),
        help("Provide a value for every required field")
    )]
    MissingRequiredField(MissingFieldError),

    #[error(transparent)]
    #[diagnostic(
        code(coercion::type_mismatch),
        help("Ensure the value can be represented as the field's type")
    )]
    TypeMismatch(TypeMismatchError),

    #[error("Invalid enum value '{}' for field {}", .0.value, .0.field)]
    #[diagnostic(
        code(coercion::invalid_enum_value),
        help("Use the name or number of a declared enum member")
    )]
    InvalidEnumValue(InvalidEnumValueError),

    #[error("Message {} has no field named {}", .0.message, .0.field)]
    #[diagnostic(
        code(coercion::unknown_field),
        help("Only set fields declared by the message schema")
    )]
    UnknownField(UnknownFieldError),

    #[error("Field {} expects a {} message but found a {} message", .0.field, .0.expected, .0.found)]
    #[diagnostic(
        code(coercion::mismatched_message_type),
        help("Provide a message of the declared type or a map of its fields")
    )]
    MismatchedMessageType(MismatchedMessageTypeError),

    #[error("Field {} has no nested {} schema", .0.field, .0.expected)]
    #[diagnostic(
        code(coercion::missing_nested_schema),
        help("Describe enum and message fields with `FieldDescriptor::enumeration` / `FieldDescriptor::message`")
    )]
    MissingNestedSchema(MissingNestedSchemaError),
}

impl CoercionError {
    /// The classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredField(_) | Self::MissingNestedSchema(_) => {
                ErrorKind::StructuralViolation
            }
            Self::TypeMismatch(_) | Self::UnknownField(_) | Self::MismatchedMessageType(_) => {
                ErrorKind::TypeMismatch
            }
            Self::InvalidEnumValue(_) => ErrorKind::ValueViolation,
        }
    }

    /// The name of the field the error was raised for
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequiredField(e) => &e.field,
            Self::TypeMismatch(e) => &e.field,
            Self::InvalidEnumValue(e) => &e.field,
            Self::UnknownField(e) => &e.field,
            Self::MismatchedMessageType(e) => &e.field,
            Self::MissingNestedSchema(e) => &e.field,
        }
    }

    pub(crate) fn missing_required_field(field: &str) -> Self {
        Self::MissingRequiredField(MissingFieldError {
            field: field.into(),
        })
    }

    pub(crate) fn type_mismatch(
        field: &str,
        expected: NativeType,
        found: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch(TypeMismatchError {
            field: field.into(),
            expected,
            found,
            reason: reason.into(),
        })
    }

    pub(crate) fn invalid_enum_value(field: &str, enum_name: &str, value: impl ToString) -> Self {
        Self::InvalidEnumValue(InvalidEnumValueError {
            field: field.into(),
            enum_name: enum_name.into(),
            value: value.to_string(),
        })
    }

    pub(crate) fn unknown_field(message: &str, field: &str) -> Self {
        Self::UnknownField(UnknownFieldError {
            message: message.into(),
            field: field.into(),
        })
    }

    pub(crate) fn mismatched_message_type(field: &str, expected: &str, found: &str) -> Self {
        Self::MismatchedMessageType(MismatchedMessageTypeError {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        })
    }

    pub(crate) fn missing_nested_schema(field: &str, expected: NativeType) -> Self {
        Self::MissingNestedSchema(MissingNestedSchemaError {
            field: field.into(),
            expected,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFieldError {
    field: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot convert {found} value to {expected} for field {field}: {reason}")]
pub struct TypeMismatchError {
    field: SmolStr,
    expected: NativeType,
    found: &'static str,
    reason: String,
}

impl TypeMismatchError {
    /// The native type the value was being converted to
    pub fn expected(&self) -> NativeType {
        self.expected
    }

    /// The kind of value that was supplied
    pub fn found(&self) -> &str {
        self.found
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnumValueError {
    field: SmolStr,
    enum_name: SmolStr,
    value: String,
}

impl InvalidEnumValueError {
    /// The name of the enum type the value was checked against
    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldError {
    message: SmolStr,
    field: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedMessageTypeError {
    field: SmolStr,
    expected: SmolStr,
    found: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNestedSchemaError {
    field: SmolStr,
    expected: NativeType,
}

/// The type of errors raised by semantic validation of protocol messages,
/// request objects and response objects
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{} cannot be empty", .0.subject)]
    #[diagnostic(code(validation::empty), help("Provide a non-empty value"))]
    Empty(SubjectError),

    #[error("{} must be specified", .0.subject)]
    #[diagnostic(code(validation::unspecified), help("Provide a value"))]
    Unspecified(SubjectError),

    #[error("{} must be between {} and {}", .0.subject, .0.min, .0.max)]
    #[diagnostic(
        code(validation::out_of_range),
        help("Bounds are inclusive")
    )]
    OutOfRange(OutOfRangeError),

    #[error("{} must be positive", .0.subject)]
    #[diagnostic(code(validation::not_positive), help("Provide a value greater than zero"))]
    NotPositive(SubjectError),

    #[error("{} cannot be negative", .0.subject)]
    #[diagnostic(code(validation::negative), help("Provide a value of zero or more"))]
    Negative(SubjectError),

    #[error("Invalid content role: {}", .0.literal)]
    #[diagnostic(
        code(validation::invalid_content_role),
        help("Content roles are `system`, `user` and `ai`")
    )]
    InvalidContentRole(InvalidLiteralError),

    #[error("Invalid TruffleType enum value: {}", .0.literal)]
    #[diagnostic(
        code(validation::invalid_truffle_type),
        help("Use TRUFFLE_TYPE_FILE, TRUFFLE_TYPE_IMAGE or TRUFFLE_TYPE_UNSPECIFIED")
    )]
    InvalidTruffleType(InvalidLiteralError),

    #[error("Invalid finish reason: {}", .0.literal)]
    #[diagnostic(code(validation::invalid_finish_reason))]
    InvalidFinishReason(InvalidLiteralError),

    #[error("Invalid status: {}", .0.literal)]
    #[diagnostic(
        code(validation::invalid_status),
        help("Status must be one of `started`, `completed`, `failed` or `cancelled`")
    )]
    InvalidStatus(InvalidLiteralError),

    #[error("{} must have either {} or {}", .0.subject, .0.first, .0.second)]
    #[diagnostic(code(validation::missing_alternative))]
    MissingAlternative(PairError),

    #[error("{} cannot have both {} and {}", .0.subject, .0.first, .0.second)]
    #[diagnostic(code(validation::conflicting_fields))]
    Conflicting(PairError),

    #[error("Error finish reason must have error message")]
    #[diagnostic(
        code(validation::missing_error_message),
        help("Set `error` whenever the finish reason is FINISH_REASON_ERROR")
    )]
    MissingErrorMessage,

    #[error("{} must be {}, found {}", .0.subject, .0.expected, .0.found)]
    #[diagnostic(code(validation::unexpected_type))]
    UnexpectedType(UnexpectedTypeError),

    #[error("{} must have an {}", .0.subject, .0.key)]
    #[diagnostic(code(validation::missing_key))]
    MissingKey(MissingKeyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Coercion(#[from] CoercionError),
}

impl ValidationError {
    /// The classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Empty(_)
            | Self::Unspecified(_)
            | Self::OutOfRange(_)
            | Self::NotPositive(_)
            | Self::Negative(_)
            | Self::InvalidContentRole(_)
            | Self::InvalidTruffleType(_)
            | Self::InvalidFinishReason(_)
            | Self::InvalidStatus(_)
            | Self::Conflicting(_) => ErrorKind::ValueViolation,
            Self::MissingAlternative(_) | Self::MissingErrorMessage | Self::MissingKey(_) => {
                ErrorKind::StructuralViolation
            }
            Self::UnexpectedType(_) => ErrorKind::TypeMismatch,
            Self::Coercion(e) => e.kind(),
        }
    }

    pub(crate) fn empty(subject: &'static str) -> Self {
        Self::Empty(SubjectError { subject })
    }

    pub(crate) fn unspecified(subject: &'static str) -> Self {
        Self::Unspecified(SubjectError { subject })
    }

    pub(crate) fn out_of_range(subject: &'static str, min: f64, max: f64, value: f64) -> Self {
        Self::OutOfRange(OutOfRangeError {
            subject,
            min,
            max,
            value,
        })
    }

    pub(crate) fn not_positive(subject: &'static str) -> Self {
        Self::NotPositive(SubjectError { subject })
    }

    pub(crate) fn negative(subject: &'static str) -> Self {
        Self::Negative(SubjectError { subject })
    }

    pub(crate) fn invalid_content_role(literal: impl ToString) -> Self {
        Self::InvalidContentRole(InvalidLiteralError {
            literal: literal.to_string(),
        })
    }

    pub(crate) fn invalid_truffle_type(literal: impl ToString) -> Self {
        Self::InvalidTruffleType(InvalidLiteralError {
            literal: literal.to_string(),
        })
    }

    pub(crate) fn invalid_finish_reason(literal: impl ToString) -> Self {
        Self::InvalidFinishReason(InvalidLiteralError {
            literal: literal.to_string(),
        })
    }

    pub(crate) fn invalid_status(literal: &str) -> Self {
        Self::InvalidStatus(InvalidLiteralError {
            literal: literal.to_string(),
        })
    }

    pub(crate) fn missing_alternative(
        subject: &'static str,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        Self::MissingAlternative(PairError {
            subject,
            first,
            second,
        })
    }

    pub(crate) fn conflicting(
        subject: &'static str,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        Self::Conflicting(PairError {
            subject,
            first,
            second,
        })
    }

    pub(crate) fn unexpected_type(
        subject: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::UnexpectedType(UnexpectedTypeError {
            subject,
            expected,
            found,
        })
    }

    pub(crate) fn missing_key(subject: &'static str, key: &'static str) -> Self {
        Self::MissingKey(MissingKeyError { subject, key })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectError {
    subject: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutOfRangeError {
    subject: &'static str,
    min: f64,
    max: f64,
    value: f64,
}

impl OutOfRangeError {
    /// The rejected value
    pub fn value(&self) -> f64 {
        self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLiteralError {
    literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairError {
    subject: &'static str,
    first: &'static str,
    second: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedTypeError {
    subject: &'static str,
    expected: &'static str,
    found: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyError {
    subject: &'static str,
    key: &'static str,
}
