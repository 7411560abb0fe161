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

//! This library contains the type-coercion and validation layer that sits between loosely-typed
//! data supplied by Truffle tool code (Rust values, JSON, dynamic maps) and the strictly-typed
//! protocol spoken with the Truffle platform.
//!
//! The `catalog` module maps each protocol wire type to its native Rust representation and default.
//! The `coerce` function uses the catalog together with a `FieldDescriptor` to turn a dynamic
//! `Value` into a `TypedValue`, building nested messages field by field.
//!
//! The `protocol`, `requests` and `responses` modules hold typed messages and application-facing
//! request / response objects, each of which implements `Validate` to enforce the cross-field
//! rules the platform expects before anything is submitted.

pub mod catalog;
mod coercion;
pub mod data;
pub mod err;
pub mod protocol;
pub mod requests;
pub mod responses;
pub mod schema;

pub use coercion::{build_message, coerce};
pub use err::{CoercionError, ErrorKind, ValidationError};

/// Semantic validation of a fully-typed message or request object.
///
/// Implementations stop at the first rule that is broken and report it.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}
