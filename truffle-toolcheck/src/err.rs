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

use miette::{Diagnostic, NamedSource};
use smol_str::SmolStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use truffle_validation::ErrorKind;

/// The type of errors that may be encountered while checking an entry point's tool contract
#[derive(Error, Debug, Diagnostic)]
pub enum ContractError {
    #[error("Entry point does not contain `{}`", .0.token)]
    #[diagnostic(
        code(contract::missing_sdk_import),
        help("Import the SDK at the top of your entry point with `{}`", .0.token)
    )]
    MissingSdkImport(MissingTokenError),

    #[error("Entry point does not call `.launch()`")]
    #[diagnostic(
        code(contract::missing_launch),
        help("Start your tool by calling `.launch()` on your app")
    )]
    MissingLaunchToken,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(SourceParseError),

    #[error("No tool method found in entry point")]
    #[diagnostic(
        code(contract::no_tool_method),
        help("Add a function decorated with `@{}.tool`", .0.namespace)
    )]
    NoToolMethod(NoToolMethodError),

    #[error("No launch call found in entry point")]
    #[diagnostic(
        code(contract::no_launch_call),
        help("Call `.launch()` on your app as a statement outside of any function, e.g. `app.launch()`")
    )]
    NoLaunchCall,
}

impl ContractError {
    /// The classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::ParseFailure,
            Self::MissingSdkImport(_)
            | Self::MissingLaunchToken
            | Self::NoToolMethod(_)
            | Self::NoLaunchCall => ErrorKind::StructuralViolation,
        }
    }

    pub(crate) fn missing_sdk_import(token: String) -> Self {
        Self::MissingSdkImport(MissingTokenError { token })
    }

    pub(crate) fn parse(name: &str, source: &str, offset: usize, message: String) -> Self {
        Self::Parse(SourceParseError {
            src: NamedSource::new(name, source.to_string()),
            offset: offset.min(source.len()),
            message,
        })
    }

    pub(crate) fn no_tool_method(namespace: &str) -> Self {
        Self::NoToolMethod(NoToolMethodError {
            namespace: namespace.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTokenError {
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoToolMethodError {
    namespace: SmolStr,
}

/// The entry point is not syntactically valid
#[derive(Debug, Error)]
#[error("Failed to parse {}: {}", .src.name(), .message)]
pub struct SourceParseError {
    src: NamedSource<String>,
    offset: usize,
    message: String,
}

impl SourceParseError {
    /// Byte offset of the error in the source text
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The parser's description of the error
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Diagnostic for SourceParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("contract::parse_error"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new(
            Some(self.message.clone()),
            self.offset,
            0,
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("Fix the syntax error in your entry point"))
    }
}

/// The type of errors that may be encountered while validating a project's artifacts
#[derive(Error, Debug, Diagnostic)]
pub enum ProjectError {
    #[error("Project directory `{}` does not exist", .0.path.display())]
    #[diagnostic(
        code(artifact::project_missing),
        help("Check the path and run the command again")
    )]
    ProjectMissing(PathError),

    #[error("`{}` is not a directory", .0.path.display())]
    #[diagnostic(code(artifact::not_a_directory), help("Specify a project folder"))]
    NotADirectory(PathError),

    #[error("{} is missing from `{}`", .0.file, .0.dir.display())]
    #[diagnostic(
        code(artifact::missing_file),
        help("Your project might be corrupted, try initializing it again")
    )]
    MissingFile(ProjectFileError),

    #[error("{} in `{}` is not a regular file", .0.file, .0.dir.display())]
    #[diagnostic(
        code(artifact::not_a_file),
        help("Your project might be corrupted, try initializing it again")
    )]
    NotAFile(ProjectFileError),

    #[error("Could not read `{}`: {}", .0.path.display(), .0.error)]
    #[diagnostic(
        code(artifact::file_read_error),
        help("Make sure {} exists and you have permissions to read it.", .0.path.display())
    )]
    FileRead(FileReadError),

    #[error("manifest.json is not valid JSON: {0}")]
    #[diagnostic(
        code(artifact::manifest_parse_error),
        help("Your manifest.json seems corrupted, try initializing your project again")
    )]
    ManifestParse(#[source] serde_json::Error),

    #[error("manifest.json must contain a JSON object, found {}", .0.found)]
    #[diagnostic(code(artifact::manifest_not_object))]
    ManifestNotObject(ManifestTypeError),

    #[error("manifest.json is missing the {} field", .0.field)]
    #[diagnostic(
        code(artifact::manifest_missing_field),
        help("Add the {} field to manifest.json", .0.field)
    )]
    ManifestMissingField(ManifestFieldError),

    #[error("The {} field in manifest.json must be {}, found {}", .0.field, .0.expected, .0.found)]
    #[diagnostic(code(artifact::manifest_field_type))]
    ManifestFieldType(ManifestTypeError),

    #[error("The {} field in manifest.json is out of range: {}", .0.field, .0.value)]
    #[diagnostic(
        code(artifact::manifest_field_range),
        help("Use a whole number no larger than {}", i64::MAX)
    )]
    ManifestFieldRange(ManifestRangeError),

    #[error("The {} field in manifest.json cannot be empty", .0.field)]
    #[diagnostic(code(artifact::manifest_empty_field))]
    ManifestEmptyField(ManifestFieldError),

    #[error("{} package not found", .0.package)]
    #[diagnostic(
        code(artifact::package_not_found),
        help("Add `{}` with a version constraint to requirements.txt", .0.package)
    )]
    PackageNotFound(PackageError),

    #[error("{} package version not specified", .0.package)]
    #[diagnostic(
        code(artifact::version_not_specified),
        help("Pin a version, e.g. `{}>=1.0.0`", .0.package)
    )]
    VersionNotSpecified(PackageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    EntryPoint(#[from] ContractError),
}

impl ProjectError {
    /// The classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectMissing(_)
            | Self::NotADirectory(_)
            | Self::MissingFile(_)
            | Self::NotAFile(_)
            | Self::FileRead(_)
            | Self::ManifestParse(_)
            | Self::ManifestMissingField(_)
            | Self::PackageNotFound(_) => ErrorKind::StructuralViolation,
            Self::ManifestNotObject(_) | Self::ManifestFieldType(_) => ErrorKind::TypeMismatch,
            Self::ManifestFieldRange(_)
            | Self::ManifestEmptyField(_)
            | Self::VersionNotSpecified(_) => ErrorKind::ValueViolation,
            Self::EntryPoint(e) => e.kind(),
        }
    }

    pub(crate) fn project_missing(path: &Path) -> Self {
        Self::ProjectMissing(PathError {
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn not_a_directory(path: &Path) -> Self {
        Self::NotADirectory(PathError {
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn missing_file(dir: &Path, file: &'static str) -> Self {
        Self::MissingFile(ProjectFileError {
            dir: dir.to_path_buf(),
            file,
        })
    }

    pub(crate) fn not_a_file(dir: &Path, file: &'static str) -> Self {
        Self::NotAFile(ProjectFileError {
            dir: dir.to_path_buf(),
            file,
        })
    }

    pub(crate) fn file_read(path: &Path, error: std::io::Error) -> Self {
        Self::FileRead(FileReadError {
            path: path.to_path_buf(),
            error,
        })
    }

    pub(crate) fn manifest_not_object(found: &'static str) -> Self {
        Self::ManifestNotObject(ManifestTypeError {
            field: "",
            expected: "an object",
            found,
        })
    }

    pub(crate) fn manifest_missing_field(field: &'static str) -> Self {
        Self::ManifestMissingField(ManifestFieldError { field })
    }

    pub(crate) fn manifest_field_type(
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::ManifestFieldType(ManifestTypeError {
            field,
            expected,
            found,
        })
    }

    pub(crate) fn manifest_field_range(field: &'static str, value: String) -> Self {
        Self::ManifestFieldRange(ManifestRangeError { field, value })
    }

    pub(crate) fn manifest_empty_field(field: &'static str) -> Self {
        Self::ManifestEmptyField(ManifestFieldError { field })
    }

    pub(crate) fn package_not_found(package: &str) -> Self {
        Self::PackageNotFound(PackageError {
            package: package.into(),
        })
    }

    pub(crate) fn version_not_specified(package: &str) -> Self {
        Self::VersionNotSpecified(PackageError {
            package: package.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFileError {
    dir: PathBuf,
    file: &'static str,
}

impl ProjectFileError {
    /// The name of the offending file
    pub fn file(&self) -> &str {
        self.file
    }
}

#[derive(Debug)]
pub struct FileReadError {
    path: PathBuf,
    error: std::io::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFieldError {
    field: &'static str,
}

impl ManifestFieldError {
    pub fn field(&self) -> &str {
        self.field
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTypeError {
    field: &'static str,
    expected: &'static str,
    found: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRangeError {
    field: &'static str,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageError {
    package: SmolStr,
}
