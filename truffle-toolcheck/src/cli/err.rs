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
use thiserror::Error;

use crate::err::ProjectError;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Project(#[from] ProjectError),
    #[error("Error while trying to serialize report to JSON: {}", .0)]
    #[diagnostic(
        code(cli_error::serialize_report_to_json),
        help("Could not serialize the validation report to json")
    )]
    JsonSerializeReport(#[from] serde_json::Error),
    #[error("Error trying to write report to stdout: {}", .0)]
    #[diagnostic(code(cli_error::write_error))]
    WritingReport(std::io::Error),
}
