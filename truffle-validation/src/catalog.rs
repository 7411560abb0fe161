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

//! The Field Descriptor Catalog: a fixed mapping from protocol wire types to their native
//! representation, classification and default value.

use crate::data::TypedValue;

/// The wire type of a protocol field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Enum,
    Message,
}

/// The native Rust type a wire type is represented by once coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    F64,
    F32,
    I32,
    I64,
    U32,
    U64,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
}

/// Coarse classification of a wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldClass {
    /// Integer kinds of every width and signedness
    Numeric,
    /// `double` and `float`
    Float,
    Enum,
    Message,
    /// `bool`, `string` and `bytes`
    Scalar,
}

impl FieldClass {
    /// Returns if values of this class are numbers (integers or floats).
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Float)
    }

    /// Returns if values of this class are floating point numbers.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float)
    }
}

/// A single row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    native: NativeType,
    class: FieldClass,
}

impl CatalogEntry {
    const fn new(native: NativeType, class: FieldClass) -> Self {
        Self { native, class }
    }

    /// The native type of the wire type.
    pub fn native(&self) -> NativeType {
        self.native
    }

    /// The classification of the wire type.
    pub fn class(&self) -> FieldClass {
        self.class
    }
}

impl WireType {
    /// Look up the catalog row of this wire type.
    pub const fn entry(self) -> CatalogEntry {
        use FieldClass as C;
        use NativeType as N;
        match self {
            Self::Double => CatalogEntry::new(N::F64, C::Float),
            Self::Float => CatalogEntry::new(N::F32, C::Float),
            Self::Int64 | Self::Sint64 | Self::Sfixed64 => CatalogEntry::new(N::I64, C::Numeric),
            Self::Uint64 | Self::Fixed64 => CatalogEntry::new(N::U64, C::Numeric),
            Self::Int32 | Self::Sint32 | Self::Sfixed32 => CatalogEntry::new(N::I32, C::Numeric),
            Self::Uint32 | Self::Fixed32 => CatalogEntry::new(N::U32, C::Numeric),
            Self::Bool => CatalogEntry::new(N::Bool, C::Scalar),
            Self::String => CatalogEntry::new(N::String, C::Scalar),
            Self::Bytes => CatalogEntry::new(N::Bytes, C::Scalar),
            Self::Enum => CatalogEntry::new(N::Enum, C::Enum),
            Self::Message => CatalogEntry::new(N::Message, C::Message),
        }
    }

    /// The native type of this wire type.
    pub fn native_type(self) -> NativeType {
        self.entry().native()
    }

    /// The classification of this wire type.
    pub fn class(self) -> FieldClass {
        self.entry().class()
    }

    /// The value an absent, optional field of this wire type takes.
    ///
    /// Enums default to ordinal `0`, which by protocol convention is the
    /// `*_UNSPECIFIED` (or `*_INVALID`) member. Messages default to unset.
    pub fn default_value(self) -> TypedValue {
        self.native_type().default_value()
    }
}

impl NativeType {
    /// The zero value of this native type.
    pub fn default_value(self) -> TypedValue {
        match self {
            Self::F64 => TypedValue::Double(0.0),
            Self::F32 => TypedValue::Float(0.0),
            Self::I32 => TypedValue::Int32(0),
            Self::I64 => TypedValue::Int64(0),
            Self::U32 => TypedValue::Uint32(0),
            Self::U64 => TypedValue::Uint64(0),
            Self::Bool => TypedValue::Bool(false),
            Self::String => TypedValue::String(String::new()),
            Self::Bytes => TypedValue::Bytes(Vec::new()),
            Self::Enum => TypedValue::Enum(0),
            Self::Message => TypedValue::Message(None),
        }
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::F64 => write!(f, "f64"),
            Self::F32 => write!(f, "f32"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Enum => write!(f, "enum"),
            Self::Message => write!(f, "message"),
        }
    }
}
