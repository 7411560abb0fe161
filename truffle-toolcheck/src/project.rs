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

//! Validation of the on-disk artifacts of a scaffolded tool project.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, error, warn};

use crate::config::ToolcheckConfig;
use crate::contract::{ContractChecker, ContractResult};
use crate::err::ProjectError;

pub const ENTRY_POINT: &str = "main.py";
pub const MANIFEST: &str = "manifest.json";
pub const REQUIREMENTS: &str = "requirements.txt";
pub const ICON: &str = "icon.png";

/// The files every project directory holds
pub const REQUIRED_FILES: [&str; 4] = [ENTRY_POINT, MANIFEST, REQUIREMENTS, ICON];

/// A comparator followed by a dotted numeric version, e.g. `>= 1.0.2`
#[expect(
    clippy::expect_used,
    reason = "The pattern is a constant that is known to compile."
)]
static VERSION_CONSTRAINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[><=!~]=|[><])\s*[\d.]+").expect("version constraint regex")
});

/// The fields of a valid `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    name: String,
    description: String,
    example_prompts: Vec<Value>,
    manifest_version: i64,
    app_bundle_id: String,
}

impl Manifest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn example_prompts(&self) -> &[Value] {
        &self.example_prompts
    }

    pub fn manifest_version(&self) -> i64 {
        self.manifest_version
    }

    pub fn app_bundle_id(&self) -> &str {
        &self.app_bundle_id
    }
}

/// The outcome of a successful project check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReport {
    manifest: Manifest,
    tool_methods: BTreeSet<SmolStr>,
}

impl ProjectReport {
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The tools declared by the project's entry point
    pub fn tool_methods(&self) -> &BTreeSet<SmolStr> {
        &self.tool_methods
    }
}

/// Validates the artifacts of a project directory
#[derive(Debug, Clone, Default)]
pub struct ProjectValidator {
    config: ToolcheckConfig,
    checker: ContractChecker,
}

impl ProjectValidator {
    /// Create a `ProjectValidator` using default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `ProjectValidator` using specified configuration
    pub fn new_with_config(config: ToolcheckConfig) -> Self {
        Self {
            checker: ContractChecker::new_with_config(config.clone()),
            config,
        }
    }

    /// Check the project at `dir`: its layout, then its entry point, manifest and
    /// dependency declaration. The first failure is returned.
    pub fn check(&self, dir: impl AsRef<Path>) -> Result<ProjectReport, ProjectError> {
        let dir = dir.as_ref();
        self.validate_structure(dir)?;
        let contract = self.validate_entry_point(dir.join(ENTRY_POINT))?;
        let manifest = validate_manifest(dir.join(MANIFEST))?;
        self.validate_requirements(dir.join(REQUIREMENTS))?;
        Ok(ProjectReport {
            manifest,
            tool_methods: contract.tool_methods().clone(),
        })
    }

    /// Check that `dir` is a directory holding each required file as a regular file
    pub fn validate_structure(&self, dir: impl AsRef<Path>) -> Result<(), ProjectError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ProjectError::project_missing(dir));
        }
        if !dir.is_dir() {
            return Err(ProjectError::not_a_directory(dir));
        }

        for file in REQUIRED_FILES {
            let path = dir.join(file);
            if !path.exists() {
                if file == ICON && !self.config.is_icon_required() {
                    warn!(path = %path.display(), "Project has no icon, a default will be used");
                    continue;
                }
                return Err(ProjectError::missing_file(dir, file));
            }
            if !path.is_file() {
                return Err(ProjectError::not_a_file(dir, file));
            }
            debug!(path = %path.display(), "Found project file");
        }
        Ok(())
    }

    /// Check the tool contract of the entry point at `path`
    pub fn validate_entry_point(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ContractResult, ProjectError> {
        let path = path.as_ref();
        let source = read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let result = self.checker.check_named(&name, &source)?;
        debug!(path = %path.display(), "Entry point satisfies the tool contract");
        Ok(result)
    }

    /// Check the dependency declaration at `path`
    pub fn validate_requirements(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        self.validate_requirements_str(&read(path)?)?;
        debug!(path = %path.display(), "Dependency declaration pins the SDK");
        Ok(())
    }

    /// Check that a dependency declaration names the SDK package with a version constraint.
    ///
    /// Blank lines and `#` comments are ignored.
    pub fn validate_requirements_str(&self, text: &str) -> Result<(), ProjectError> {
        let package = self.config.get_sdk_package();
        let sdk_lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| line.starts_with(package))
            .collect();

        if sdk_lines.is_empty() {
            return Err(ProjectError::package_not_found(package));
        }
        let pinned = sdk_lines.iter().any(|line| {
            line.strip_prefix(package)
                .is_some_and(|constraint| VERSION_CONSTRAINT.is_match(constraint))
        });
        if pinned {
            Ok(())
        } else {
            Err(ProjectError::version_not_specified(package))
        }
    }
}

fn read(path: &Path) -> Result<String, ProjectError> {
    std::fs::read_to_string(path).map_err(|e| ProjectError::file_read(path, e))
}

/// Check the manifest at `path`
pub fn validate_manifest(path: impl AsRef<Path>) -> Result<Manifest, ProjectError> {
    let path = path.as_ref();
    let manifest = validate_manifest_str(&read(path)?)?;
    debug!(path = %path.display(), name = manifest.name(), "Manifest is valid");
    Ok(manifest)
}

/// Check a manifest document: every field is present with its declared type, and
/// `name`, `description` and `example_prompts` are non-empty.
pub fn validate_manifest_str(text: &str) -> Result<Manifest, ProjectError> {
    let doc: Value = serde_json::from_str(text).map_err(ProjectError::ManifestParse)?;
    let Value::Object(fields) = doc else {
        return Err(ProjectError::manifest_not_object(json_type(&doc)));
    };

    let manifest = Manifest {
        name: string_field(&fields, "name")?,
        description: string_field(&fields, "description")?,
        example_prompts: list_field(&fields, "example_prompts")?,
        manifest_version: integer_field(&fields, "manifest_version")?,
        app_bundle_id: string_field(&fields, "app_bundle_id")?,
    };

    if manifest.name.is_empty() {
        return Err(ProjectError::manifest_empty_field("name"));
    }
    if manifest.description.is_empty() {
        return Err(ProjectError::manifest_empty_field("description"));
    }
    if manifest.example_prompts.is_empty() {
        return Err(ProjectError::manifest_empty_field("example_prompts"));
    }
    Ok(manifest)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ProjectError> {
    fields
        .get(name)
        .ok_or_else(|| ProjectError::manifest_missing_field(name))
}

fn string_field(fields: &Map<String, Value>, name: &'static str) -> Result<String, ProjectError> {
    match field(fields, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(ProjectError::manifest_field_type(name, "a string", json_type(other))),
    }
}

fn list_field(fields: &Map<String, Value>, name: &'static str) -> Result<Vec<Value>, ProjectError> {
    match field(fields, name)? {
        Value::Array(items) => Ok(items.clone()),
        other => Err(ProjectError::manifest_field_type(name, "a list", json_type(other))),
    }
}

fn integer_field(fields: &Map<String, Value>, name: &'static str) -> Result<i64, ProjectError> {
    match field(fields, name)? {
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Ok(i),
            (None, Some(_)) => Err(ProjectError::manifest_field_range(name, n.to_string())),
            (None, None) => Err(ProjectError::manifest_field_type(name, "an integer", "a float")),
        },
        other => Err(ProjectError::manifest_field_type(name, "an integer", json_type(other))),
    }
}

/// Check the structure of the project at `path` with the default configuration
pub fn validate_structure(path: impl AsRef<Path>) -> Result<(), ProjectError> {
    ProjectValidator::new().validate_structure(path)
}

/// Check the entry point at `path` with the default configuration
pub fn validate_entry_point(path: impl AsRef<Path>) -> Result<ContractResult, ProjectError> {
    ProjectValidator::new().validate_entry_point(path)
}

/// Check the dependency declaration at `path` with the default configuration
pub fn validate_requirements(path: impl AsRef<Path>) -> Result<(), ProjectError> {
    ProjectValidator::new().validate_requirements(path)
}

/// Check a dependency declaration with the default configuration
pub fn validate_requirements_str(text: &str) -> Result<(), ProjectError> {
    ProjectValidator::new().validate_requirements_str(text)
}

/// Whether the project at `path` passes every artifact check. Failures are logged.
pub fn validate_project(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match ProjectValidator::new().check(path) {
        Ok(report) => {
            debug!(
                path = %path.display(),
                tools = ?report.tool_methods(),
                "Project is valid"
            );
            true
        }
        Err(e) => {
            error!(path = %path.display(), kind = %e.kind(), "{e}");
            false
        }
    }
}
