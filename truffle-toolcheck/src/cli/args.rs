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

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Clone, Debug, Serialize)]
#[clap(next_help_heading = "Configuration Options")]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ConfigOptions {
    /// Package name the dependency declaration must pin (default: truffle).
    #[arg(long, value_name = "PACKAGE")]
    pub(crate) sdk_package: Option<String>,
    /// Module the entry point must import and decorate tools from (default: truffle).
    #[arg(long, value_name = "MODULE")]
    pub(crate) sdk_namespace: Option<String>,
    /// Accept a project without an icon.png, logging a warning instead (default: false).
    #[arg(long, default_value_t = false)]
    pub(crate) allow_missing_icon: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
pub(crate) enum OutputFormat {
    /// A short human readable summary.
    Human,
    /// The validated artifact as JSON.
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
pub enum ErrorFormat {
    /// Human-readable error messages with terminal graphics and inline code snippets.
    Human,
    /// Plain-text error messages without fancy graphics or colors, suitable for screen readers.
    Plain,
    /// Machine-readable JSON output.
    Json,
}

/// Arguments shared by every subcommand
#[derive(Args, Clone, Debug, Serialize)]
pub(crate) struct CommonArgs {
    #[arg(long, default_value = "human")]
    pub(crate) output_format: OutputFormat,
    #[arg(long, default_value = "human")]
    pub(crate) error_format: ErrorFormat,
    #[clap(flatten)]
    pub(crate) config: ConfigOptions,
}

#[derive(Clone, Debug, Serialize, Subcommand)]
pub(crate) enum Command {
    /// Check every artifact of a project directory: its layout, entry point, manifest
    /// and dependency declaration.
    Project {
        /// The project directory.
        #[clap(required = true)]
        dir: PathBuf,
        #[clap(flatten)]
        common: CommonArgs,
    },
    /// Check that an entry point declares at least one tool and launches the app.
    EntryPoint {
        /// The Python entry point, usually main.py.
        #[clap(required = true)]
        file: PathBuf,
        #[clap(flatten)]
        common: CommonArgs,
    },
    /// Check the fields of a manifest.json.
    Manifest {
        #[clap(required = true)]
        file: PathBuf,
        #[clap(flatten)]
        common: CommonArgs,
    },
    /// Check that a requirements.txt pins a version of the SDK.
    Requirements {
        #[clap(required = true)]
        file: PathBuf,
        #[clap(flatten)]
        common: CommonArgs,
    },
}

/// Command Line Interface for checking Truffle tool projects
#[derive(Parser, Debug)]
#[clap(name = "truffle-toolcheck", version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub(crate) command: Command,
}
