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

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use truffle_toolcheck::{CliArgs, ErrorFormat};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let err_hook: Option<miette::ErrorHook> = match args.get_error_format() {
        // miette's graphical handler is installed lazily
        ErrorFormat::Human => None,
        ErrorFormat::Plain => Some(Box::new(|_| {
            Box::new(miette::NarratableReportHandler::new())
        })),
        ErrorFormat::Json => Some(Box::new(|_| Box::new(miette::JSONReportHandler::new()))),
    };
    if let Some(err_hook) = err_hook {
        #[expect(
            clippy::expect_used,
            reason = "No report handler has been installed this early in `main`."
        )]
        miette::set_hook(err_hook).expect("report handler already installed");
    }

    match args.exec() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = miette::Report::new(err);
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}
