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

use crate::cli::{CliArgs, CliError, Command, CommonArgs, ConfigOptions, ErrorFormat, OutputFormat};
use crate::{validate_manifest, ProjectValidator, ToolcheckConfig};

use serde::Serialize;
use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::io::Write;

fn get_config(config_options: &ConfigOptions) -> ToolcheckConfig {
    let mut config = ToolcheckConfig::default().require_icon(!config_options.allow_missing_icon);
    if let Some(package) = &config_options.sdk_package {
        config = config.sdk_package(package.as_str());
    }
    if let Some(namespace) = &config_options.sdk_namespace {
        config = config.sdk_namespace(namespace.as_str());
    }
    config
}

fn output_report<T: Serialize>(
    report: &T,
    summary: &str,
    output_format: OutputFormat,
) -> Result<(), CliError> {
    let mut writer = std::io::stdout().lock();
    match output_format {
        OutputFormat::Human => writeln!(writer, "{summary}"),
        OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(report)?),
    }
    .map_err(CliError::WritingReport)
}

fn list_tools(tools: &BTreeSet<SmolStr>) -> String {
    tools
        .iter()
        .map(SmolStr::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl CliArgs {
    pub fn exec(&self) -> Result<(), CliError> {
        match &self.command {
            Command::Project { dir, common } => {
                let validator = ProjectValidator::new_with_config(get_config(&common.config));
                let report = validator.check(dir)?;
                let summary = format!(
                    "{} is a valid project with tools: {}",
                    dir.display(),
                    list_tools(report.tool_methods())
                );
                output_report(&report, &summary, common.output_format)
            }
            Command::EntryPoint { file, common } => {
                let validator = ProjectValidator::new_with_config(get_config(&common.config));
                let result = validator.validate_entry_point(file)?;
                let summary = format!(
                    "{} declares tools: {}",
                    file.display(),
                    list_tools(result.tool_methods())
                );
                output_report(&result, &summary, common.output_format)
            }
            Command::Manifest { file, common } => {
                let manifest = validate_manifest(file)?;
                let summary = format!(
                    "{} is a valid manifest for {}",
                    file.display(),
                    manifest.name()
                );
                output_report(&manifest, &summary, common.output_format)
            }
            Command::Requirements { file, common } => {
                let config = get_config(&common.config);
                let package = SmolStr::from(config.get_sdk_package());
                ProjectValidator::new_with_config(config).validate_requirements(file)?;
                let summary = format!("{} pins a version of {package}", file.display());
                output_report(
                    &serde_json::json!({ "sdk_package": package }),
                    &summary,
                    common.output_format,
                )
            }
        }
    }

    pub fn get_error_format(&self) -> ErrorFormat {
        self.common().error_format
    }

    fn common(&self) -> &CommonArgs {
        match &self.command {
            Command::Project { common, .. }
            | Command::EntryPoint { common, .. }
            | Command::Manifest { common, .. }
            | Command::Requirements { common, .. } => common,
        }
    }
}
