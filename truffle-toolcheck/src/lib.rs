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

//! Static checks for Truffle tool projects.
//!
//! `ContractChecker` parses a Python entry point without running it and confirms that it imports
//! the SDK, declares at least one tool with the SDK's `tool` decorator, and launches the app at
//! module level. `ProjectValidator` checks the rest of a scaffolded project: its directory layout,
//! its `manifest.json` and the SDK pin in its `requirements.txt`.

mod config;
mod contract;
pub mod err;
mod project;

#[cfg(feature = "cli")]
mod cli;

pub use config::ToolcheckConfig;
pub use contract::{check_tool_contract, ContractChecker, ContractResult};
pub use project::{
    validate_entry_point, validate_manifest, validate_manifest_str, validate_project,
    validate_requirements, validate_requirements_str, validate_structure, Manifest,
    ProjectReport, ProjectValidator, ENTRY_POINT, ICON, MANIFEST, REQUIREMENTS, REQUIRED_FILES,
};

#[cfg(feature = "cli")]
pub use cli::{CliArgs, CliError, ErrorFormat};
