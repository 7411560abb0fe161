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

#![expect(clippy::unwrap_used, clippy::indexing_slicing, reason = "tests")]

use std::path::Path;
use tempfile::TempDir;

const MAIN_PY: &str = r#"import truffle

class Weather:
    def __init__(self):
        self.client = None

    @truffle.tool(description="Looks up the forecast", icon="cloud")
    @truffle.args(city="The city to look up")
    def GetForecast(self, city: str) -> str:
        return f"Sunny in {city}"

    @truffle.tool
    async def GetAlerts(self) -> list:
        return []

if __name__ == "__main__":
    app = truffle.TruffleApp(Weather())
    app.launch()
"#;

const MANIFEST_JSON: &str = r#"{
    "name": "Weather",
    "description": "Looks up the forecast",
    "example_prompts": ["Will it rain in Paris tomorrow?"],
    "manifest_version": 1,
    "app_bundle_id": "com.example.weather"
}"#;

const REQUIREMENTS_TXT: &str = "truffle>=0.6.5\nrequests==2.31.0\n";

fn scaffold() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.py", MAIN_PY);
    write(dir.path(), "manifest.json", MANIFEST_JSON);
    write(dir.path(), "requirements.txt", REQUIREMENTS_TXT);
    write(dir.path(), "icon.png", "\u{89}PNG");
    dir
}

fn write(dir: &Path, file: &str, contents: &str) {
    std::fs::write(dir.join(file), contents).unwrap();
}

mod api {
    use super::*;
    use truffle_toolcheck::err::{ContractError, ProjectError};
    use truffle_toolcheck::{validate_project, ProjectValidator, ToolcheckConfig};
    use truffle_validation::ErrorKind;

    #[test]
    fn test_scaffolded_project() {
        let dir = scaffold();
        let report = ProjectValidator::new().check(dir.path()).unwrap();
        let tools: Vec<&str> = report.tool_methods().iter().map(|t| t.as_str()).collect();
        assert_eq!(tools, ["GetAlerts", "GetForecast"]);
        assert_eq!(report.manifest().name(), "Weather");
        assert!(validate_project(dir.path()));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let dir = scaffold();
        let report = ProjectValidator::new().check(dir.path()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["manifest"]["app_bundle_id"], "com.example.weather");
        assert_eq!(json["tool_methods"], serde_json::json!(["GetAlerts", "GetForecast"]));
    }

    #[test]
    fn test_project_without_tools() {
        let dir = scaffold();
        write(
            dir.path(),
            "main.py",
            "import truffle\n\nclass Weather:\n    def GetForecast(self):\n        pass\n\ntruffle.TruffleApp(Weather()).launch()\n",
        );
        let err = ProjectValidator::new().check(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::EntryPoint(ContractError::NoToolMethod(_))
        ));
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
        assert!(!validate_project(dir.path()));
    }

    #[test]
    fn test_custom_sdk() {
        let dir = scaffold();
        write(
            dir.path(),
            "main.py",
            &MAIN_PY.replace("truffle.", "tf.").replace("import truffle", "import tf"),
        );
        write(dir.path(), "requirements.txt", "truffle-sdk~=1.2\n");
        let config = ToolcheckConfig::default()
            .sdk_namespace("tf")
            .sdk_package("truffle-sdk");
        let report = ProjectValidator::new_with_config(config)
            .check(dir.path())
            .unwrap();
        assert_eq!(report.tool_methods().len(), 2);
        assert!(!validate_project(dir.path()));
    }
}

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use assert_cmd::{assert::OutputAssertExt, cargo_bin_cmd};

    fn stdout(assert: &assert_cmd::assert::Assert) -> String {
        String::from_utf8(assert.get_output().stdout.clone()).unwrap()
    }

    fn stderr(assert: &assert_cmd::assert::Assert) -> String {
        String::from_utf8(assert.get_output().stderr.clone()).unwrap()
    }

    #[test]
    fn test_project_human() {
        let dir = scaffold();
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let cmd = cmd.arg("project").arg(dir.path());
        let assert = cmd.unwrap().assert().success();
        assert!(stdout(&assert).contains("is a valid project with tools: GetAlerts, GetForecast"));
    }

    #[test]
    fn test_project_json() {
        let dir = scaffold();
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let cmd = cmd
            .arg("project")
            .arg(dir.path())
            .arg("--output-format")
            .arg("json");
        let assert = cmd.unwrap().assert().success();
        let json: serde_json::Value = serde_json::from_str(&stdout(&assert)).unwrap();
        assert_eq!(json["manifest"]["name"], "Weather");
    }

    #[test]
    fn test_missing_icon() {
        let dir = scaffold();
        std::fs::remove_file(dir.path().join("icon.png")).unwrap();

        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("project")
            .arg(dir.path())
            .arg("--error-format")
            .arg("plain")
            .assert()
            .failure();
        assert!(stderr(&assert).contains("icon.png is missing from"));

        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        cmd.arg("project")
            .arg(dir.path())
            .arg("--allow-missing-icon")
            .assert()
            .success();
    }

    #[test]
    fn test_entry_point_json_errors() {
        let dir = scaffold();
        write(dir.path(), "main.py", "import truffle\n\n@truffle.tool\ndef Ping():\n    pass\n");
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("entry-point")
            .arg(dir.path().join("main.py"))
            .arg("--error-format")
            .arg("json")
            .assert()
            .failure();
        let json: serde_json::Value = serde_json::from_str(stderr(&assert).trim()).unwrap();
        assert_eq!(json["code"], "contract::missing_launch");
    }

    #[test]
    fn test_entry_point_syntax_error() {
        let dir = scaffold();
        write(dir.path(), "main.py", "import truffle\ndef broken(:\napp.launch()\n");
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("entry-point")
            .arg(dir.path().join("main.py"))
            .arg("--error-format")
            .arg("plain")
            .assert()
            .failure();
        assert!(stderr(&assert).contains("Failed to parse main.py"));
    }

    #[test]
    fn test_manifest() {
        let dir = scaffold();
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("manifest")
            .arg(dir.path().join("manifest.json"))
            .assert()
            .success();
        assert!(stdout(&assert).contains("is a valid manifest for Weather"));

        write(dir.path(), "manifest.json", r#"{"name": "Weather"}"#);
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("manifest")
            .arg(dir.path().join("manifest.json"))
            .arg("--error-format")
            .arg("plain")
            .assert()
            .failure();
        assert!(stderr(&assert).contains("manifest.json is missing the description field"));
    }

    #[test]
    fn test_requirements() {
        let dir = scaffold();
        write(dir.path(), "requirements.txt", "truffle\n");
        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("requirements")
            .arg(dir.path().join("requirements.txt"))
            .arg("--error-format")
            .arg("plain")
            .assert()
            .failure();
        assert!(stderr(&assert).contains("truffle package version not specified"));

        let mut cmd = cargo_bin_cmd!("truffle-toolcheck");
        let assert = cmd
            .arg("requirements")
            .arg(dir.path().join("requirements.txt"))
            .arg("--sdk-package")
            .arg("requests")
            .arg("--error-format")
            .arg("plain")
            .assert()
            .failure();
        assert!(stderr(&assert).contains("requests package not found"));
    }
}
