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

use smol_str::SmolStr;
use std::sync::Arc;

use crate::catalog::WireType;

/// Repetition label of a protocol field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

/// The legal members of a protocol enum, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub(crate) name: SmolStr,
    pub(crate) values: Vec<(SmolStr, i32)>,
}

impl EnumDescriptor {
    /// Create a new `EnumDescriptor` from its name and `(member name, number)` pairs
    pub fn new<N: Into<SmolStr>>(
        name: impl Into<SmolStr>,
        values: impl IntoIterator<Item = (N, i32)>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Get the name of the enum type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over the `(member name, number)` pairs of this enum
    pub fn values(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Get the number of the member called `name` if it exists
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Get the name of the member numbered `number` if it exists
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, v)| *v == number)
            .map(|(n, _)| n.as_str())
    }
}

/// The schema of a protocol message: its name and its fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub(crate) name: SmolStr,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) map_entry: bool,
}

impl MessageDescriptor {
    /// Create a new `MessageDescriptor`
    pub fn new(name: impl Into<SmolStr>, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
            map_entry: false,
        }
    }

    /// Create the entry type of a map field: a message with a string `key` and a `value`
    /// of type `value_type`.
    ///
    /// A repeated field of an entry type accepts a map, each of its pairs becoming an entry.
    pub fn map_entry(name: impl Into<SmolStr>, value_type: WireType) -> Self {
        Self {
            name: name.into(),
            fields: vec![
                FieldDescriptor::scalar("key", WireType::String, Label::Optional),
                FieldDescriptor::scalar("value", value_type, Label::Optional),
            ],
            map_entry: true,
        }
    }

    /// Returns if this message is the entry type of a map field
    pub fn is_map_entry(&self) -> bool {
        self.map_entry
    }

    /// Get the fully qualified name of the message type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over the fields of this message
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Get the field called `name` if it exists
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

/// The nested schema an enum or message field refers to
#[derive(Debug, Clone, PartialEq)]
pub enum NestedType {
    Enum(Arc<EnumDescriptor>),
    Message(Arc<MessageDescriptor>),
}

/// Schema metadata describing a single field of a protocol message
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub(crate) name: SmolStr,
    pub(crate) wire_type: WireType,
    pub(crate) label: Label,
    pub(crate) nested: Option<NestedType>,
}

impl FieldDescriptor {
    /// Create a descriptor for a field whose wire type needs no nested schema.
    ///
    /// Enum and message fields should be created through `enumeration` and
    /// `message`; coercing into a bare `Enum`/`Message` wire type fails.
    pub fn scalar(name: impl Into<SmolStr>, wire_type: WireType, label: Label) -> Self {
        Self {
            name: name.into(),
            wire_type,
            label,
            nested: None,
        }
    }

    /// Create a descriptor for an enum typed field
    pub fn enumeration(name: impl Into<SmolStr>, ty: Arc<EnumDescriptor>, label: Label) -> Self {
        Self {
            name: name.into(),
            wire_type: WireType::Enum,
            label,
            nested: Some(NestedType::Enum(ty)),
        }
    }

    /// Create a descriptor for a message typed field
    pub fn message(name: impl Into<SmolStr>, ty: Arc<MessageDescriptor>, label: Label) -> Self {
        Self {
            name: name.into(),
            wire_type: WireType::Message,
            label,
            nested: Some(NestedType::Message(ty)),
        }
    }

    /// Create a descriptor for a map field whose entries have type `entry`
    pub fn map(name: impl Into<SmolStr>, entry: Arc<MessageDescriptor>) -> Self {
        Self::message(name, entry, Label::Repeated)
    }

    /// Get the name of the field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the wire type of the field
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Get the repetition label of the field
    pub fn label(&self) -> Label {
        self.label
    }

    /// Returns if this field must be present
    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }

    /// Returns if this field holds a list of values
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Get the enum schema of this field if it is enum typed
    pub fn enum_type(&self) -> Option<&Arc<EnumDescriptor>> {
        match &self.nested {
            Some(NestedType::Enum(ty)) => Some(ty),
            _ => None,
        }
    }

    /// Get the message schema of this field if it is message typed
    pub fn message_type(&self) -> Option<&Arc<MessageDescriptor>> {
        match &self.nested {
            Some(NestedType::Message(ty)) => Some(ty),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cool_asserts::assert_matches;

    #[test]
    fn test_enum_descriptor_lookup() {
        let ty = EnumDescriptor::new("Role", [("ROLE_INVALID", 0), ("ROLE_USER", 2)]);
        assert_eq!(ty.name(), "Role");
        assert_matches!(ty.number_of("ROLE_USER"), Some(2));
        assert_matches!(ty.number_of("ROLE_SHOUT"), None);
        assert_matches!(ty.name_of(0), Some("ROLE_INVALID"));
        assert_matches!(ty.name_of(1), None);
        assert_matches!(
            ty.values().collect::<Vec<_>>().as_slice(),
            [("ROLE_INVALID", 0), ("ROLE_USER", 2)]
        );
    }

    #[test]
    fn test_field_descriptor_accessors() {
        let inner = Arc::new(MessageDescriptor::new(
            "Inner",
            [FieldDescriptor::scalar("x", WireType::Int32, Label::Optional)],
        ));
        let field = FieldDescriptor::message("inner", inner, Label::Required);
        assert_eq!(field.name(), "inner");
        assert_eq!(field.wire_type(), WireType::Message);
        assert!(field.is_required());
        assert!(!field.is_repeated());
        assert!(field.enum_type().is_none());
        assert_matches!(field.message_type(), Some(m) if m.name() == "Inner");
        assert_matches!(
            field.message_type().and_then(|m| m.field("x")).map(FieldDescriptor::wire_type),
            Some(WireType::Int32)
        );
    }

    #[test]
    fn test_map_entry_descriptor() {
        let entry = Arc::new(MessageDescriptor::map_entry("ArgsEntry", WireType::String));
        assert!(entry.is_map_entry());
        assert_eq!(
            entry.fields().map(FieldDescriptor::name).collect::<Vec<_>>(),
            ["key", "value"]
        );
        let field = FieldDescriptor::map("args", entry);
        assert!(field.is_repeated());
        assert_matches!(field.message_type(), Some(m) if m.is_map_entry());
        assert!(!MessageDescriptor::new("Plain", []).is_map_entry());
    }
}
