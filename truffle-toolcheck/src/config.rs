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

use smol_str::SmolStr;

/// A type reserved to configure how tool plugins are checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolcheckConfig {
    sdk_package: SmolStr,
    sdk_namespace: SmolStr,
    require_icon: bool,
}

impl Default for ToolcheckConfig {
    /// Default configuration, checking against the `truffle` SDK
    fn default() -> Self {
        Self {
            sdk_package: SmolStr::new_static("truffle"),
            sdk_namespace: SmolStr::new_static("truffle"),
            require_icon: true,
        }
    }
}

impl ToolcheckConfig {
    /// Updates config to set `sdk_package` to `val` (default: "truffle").
    /// The dependency-declaration document must name this package with a version constraint.
    pub fn sdk_package(self, val: impl Into<SmolStr>) -> Self {
        Self {
            sdk_package: val.into(),
            ..self
        }
    }

    /// Updates config to set `sdk_namespace` to `val` (default: "truffle").
    /// Entry points must `import <sdk_namespace>` and mark tools with `@<sdk_namespace>.tool`.
    pub fn sdk_namespace(self, val: impl Into<SmolStr>) -> Self {
        Self {
            sdk_namespace: val.into(),
            ..self
        }
    }

    /// Updates config to set `require_icon` to `val` (default: true).
    /// If `require_icon` is set to `false`, a project without an icon only logs a warning.
    pub fn require_icon(self, val: bool) -> Self {
        Self {
            require_icon: val,
            ..self
        }
    }

    pub fn get_sdk_package(&self) -> &str {
        &self.sdk_package
    }

    pub fn get_sdk_namespace(&self) -> &str {
        &self.sdk_namespace
    }

    pub fn is_icon_required(&self) -> bool {
        self.require_icon
    }

    /// The import statement an entry point must contain
    pub(crate) fn import_token(&self) -> String {
        format!("import {}", self.sdk_namespace)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolcheckConfig::default();
        assert_eq!(config.get_sdk_package(), "truffle");
        assert_eq!(config.get_sdk_namespace(), "truffle");
        assert!(config.is_icon_required());
        assert_eq!(config.import_token(), "import truffle");
    }

    #[test]
    fn test_builder() {
        let config = ToolcheckConfig::default()
            .sdk_package("truffle-sdk")
            .sdk_namespace("tf")
            .require_icon(false);
        assert_eq!(config.get_sdk_package(), "truffle-sdk");
        assert_eq!(config.import_token(), "import tf");
        assert!(!config.is_icon_required());
    }
}
