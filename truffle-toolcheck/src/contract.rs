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

//! Static checks that an entry point's source declares a conformant tool plugin.

use rustpython_parser::ast::{self, Expr, Stmt};
use rustpython_parser::Parse;
use serde::Serialize;
use smol_str::SmolStr;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::ToolcheckConfig;
use crate::err::ContractError;

/// The name used for sources that were not read from a file
const DEFAULT_SOURCE_NAME: &str = "main.py";

/// The call that starts a tool
const LAUNCH_TOKEN: &str = ".launch()";

/// What the checker found in an entry point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractResult {
    has_tool_method: bool,
    has_launch_call: bool,
    tool_methods: BTreeSet<SmolStr>,
}

impl ContractResult {
    /// Whether at least one function is decorated as a tool
    pub fn has_tool_method(&self) -> bool {
        self.has_tool_method
    }

    /// Whether a `.launch()` call appears as a statement
    pub fn has_launch_call(&self) -> bool {
        self.has_launch_call
    }

    /// The names of the functions decorated as tools
    pub fn tool_methods(&self) -> &BTreeSet<SmolStr> {
        &self.tool_methods
    }
}

/// Checks entry-point sources against the structural contract of a tool plugin
#[derive(Debug, Clone, Default)]
pub struct ContractChecker {
    config: ToolcheckConfig,
}

impl ContractChecker {
    /// Create a `ContractChecker` using default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `ContractChecker` using specified configuration
    pub fn new_with_config(config: ToolcheckConfig) -> Self {
        Self { config }
    }

    /// Check that `source` imports the SDK, declares at least one tool and launches the app
    pub fn check(&self, source: &str) -> Result<ContractResult, ContractError> {
        self.check_named(DEFAULT_SOURCE_NAME, source)
    }

    /// Like `check`, reporting parse errors against the file `name`
    pub fn check_named(&self, name: &str, source: &str) -> Result<ContractResult, ContractError> {
        let import_token = self.config.import_token();
        if !source.contains(&import_token) {
            return Err(ContractError::missing_sdk_import(import_token));
        }
        if !source.contains(LAUNCH_TOKEN) {
            return Err(ContractError::MissingLaunchToken);
        }

        let result = self.inspect_named(name, source)?;
        debug!(
            source = name,
            tool_methods = ?result.tool_methods,
            has_launch_call = result.has_launch_call,
            "Inspected entry point"
        );
        if !result.has_tool_method {
            return Err(ContractError::no_tool_method(self.config.get_sdk_namespace()));
        }
        if !result.has_launch_call {
            return Err(ContractError::NoLaunchCall);
        }
        Ok(result)
    }

    /// Parse `source` and report what it declares without judging it.
    ///
    /// No textual pre-check is made, so only syntax errors fail.
    pub fn inspect(&self, source: &str) -> Result<ContractResult, ContractError> {
        self.inspect_named(DEFAULT_SOURCE_NAME, source)
    }

    fn inspect_named(&self, name: &str, source: &str) -> Result<ContractResult, ContractError> {
        let suite = ast::Suite::parse(source, name).map_err(|err| {
            ContractError::parse(name, source, usize::from(err.offset), err.error.to_string())
        })?;
        let mut visitor = ToolVisitor {
            namespace: self.config.get_sdk_namespace(),
            result: ContractResult::default(),
        };
        visitor.visit_block(&suite);
        Ok(visitor.result)
    }
}

/// Check `source` with the default configuration
pub fn check_tool_contract(source: &str) -> Result<ContractResult, ContractError> {
    ContractChecker::new().check(source)
}

struct ToolVisitor<'a> {
    namespace: &'a str,
    result: ContractResult,
}

impl ToolVisitor<'_> {
    fn visit_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(ast::StmtFunctionDef {
                name,
                decorator_list,
                ..
            })
            | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef {
                name,
                decorator_list,
                ..
            }) => self.visit_function(name.as_str(), decorator_list),
            Stmt::ClassDef(ast::StmtClassDef { body, .. }) => self.visit_class_body(body),
            Stmt::Expr(ast::StmtExpr { value, .. }) => {
                if is_launch_call(value) {
                    self.result.has_launch_call = true;
                }
            }
            Stmt::If(ast::StmtIf { body, orelse, .. })
            | Stmt::While(ast::StmtWhile { body, orelse, .. })
            | Stmt::For(ast::StmtFor { body, orelse, .. })
            | Stmt::AsyncFor(ast::StmtAsyncFor { body, orelse, .. }) => {
                self.visit_block(body);
                self.visit_block(orelse);
            }
            Stmt::With(ast::StmtWith { body, .. })
            | Stmt::AsyncWith(ast::StmtAsyncWith { body, .. }) => self.visit_block(body),
            Stmt::Try(ast::StmtTry {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            })
            | Stmt::TryStar(ast::StmtTryStar {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            }) => {
                self.visit_block(body);
                for ast::ExceptHandler::ExceptHandler(handler) in handlers {
                    self.visit_block(&handler.body);
                }
                self.visit_block(orelse);
                self.visit_block(finalbody);
            }
            Stmt::Match(ast::StmtMatch { cases, .. }) => {
                for case in cases {
                    self.visit_block(&case.body);
                }
            }
            _ => {}
        }
    }

    /// Only methods are considered in a class body
    fn visit_class_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            if let Stmt::FunctionDef(ast::StmtFunctionDef {
                name,
                decorator_list,
                ..
            })
            | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef {
                name,
                decorator_list,
                ..
            }) = stmt
            {
                self.visit_function(name.as_str(), decorator_list);
            }
        }
    }

    fn visit_function(&mut self, name: &str, decorators: &[Expr]) {
        // `args` decorators are optional and do not mark a tool on their own
        if decorators.iter().any(|d| self.is_sdk_decorator(d, "tool")) {
            self.result.has_tool_method = true;
            self.result.tool_methods.insert(name.into());
        }
    }

    /// Whether `decorator` is `@<namespace>.<attr>` or `@<namespace>.<attr>(...)`
    fn is_sdk_decorator(&self, decorator: &Expr, attr: &str) -> bool {
        let callee = match decorator {
            Expr::Call(ast::ExprCall { func, .. }) => func.as_ref(),
            other => other,
        };
        dotted_name(callee).is_some_and(|name| {
            name.strip_prefix(self.namespace)
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|rest| rest == attr)
        })
    }
}

/// Resolve a chain of attribute accesses on a name, e.g. `truffle.tool`
fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(ast::ExprName { id, .. }) => Some(id.as_str().to_string()),
        Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
            dotted_name(value).map(|base| format!("{base}.{}", attr.as_str()))
        }
        _ => None,
    }
}

/// Any call of an attribute named `launch`, whatever its receiver
fn is_launch_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call(ast::ExprCall { func, .. }) => matches!(
            func.as_ref(),
            Expr::Attribute(ast::ExprAttribute { attr, .. }) if attr.as_str() == "launch"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cool_asserts::assert_matches;
    use truffle_validation::ErrorKind;

    const TOOL_APP: &str = r#"import truffle

class WeatherTool:
    def __init__(self):
        self.client = None

    @truffle.tool("Returns the forecast", icon="cloud")
    @truffle.args(city="The city to look up")
    def Forecast(self, city: str) -> str:
        return f"Sunny in {city}"

    @truffle.tool
    def Ping(self) -> str:
        return "pong"

    def helper(self):
        pass

if __name__ == "__main__":
    app = truffle.TruffleApp(WeatherTool())
    app.launch()
"#;

    fn names(result: &ContractResult) -> Vec<&str> {
        result.tool_methods().iter().map(SmolStr::as_str).collect()
    }

    #[test]
    fn test_conformant_entry_point() {
        assert_matches!(check_tool_contract(TOOL_APP), Ok(result) => {
            assert!(result.has_tool_method());
            assert!(result.has_launch_call());
            assert_eq!(names(&result), ["Forecast", "Ping"]);
        });
    }

    #[test]
    fn test_missing_import_is_rejected_before_parsing() {
        let source = "from truffle import tool\n(((\napp.launch()\n";
        assert_matches!(check_tool_contract(source), Err(e @ ContractError::MissingSdkImport(_)) => {
            assert_eq!(e.to_string(), "Entry point does not contain `import truffle`");
            assert_eq!(e.kind(), ErrorKind::StructuralViolation);
        });
    }

    #[test]
    fn test_missing_launch_token() {
        let source = "import truffle\n\n@truffle.tool\ndef f():\n    pass\n";
        assert_matches!(check_tool_contract(source), Err(ContractError::MissingLaunchToken));
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let source = "import truffle\n\ndef broken(:\n    pass\n\napp.launch()\n";
        assert_matches!(check_tool_contract(source), Err(e) => {
            assert_eq!(e.kind(), ErrorKind::ParseFailure);
            assert_matches!(&e, ContractError::Parse(parse) => {
                assert!(parse.offset() <= source.len());
                assert!(!parse.message().is_empty());
            });
        });
    }

    #[test]
    fn test_adding_a_tool_flips_the_result() {
        let without_tool = "import truffle\n\nclass App:\n    def run(self):\n        pass\n\napp = truffle.TruffleApp(App())\napp.launch()\n";
        assert_matches!(check_tool_contract(without_tool), Err(e) => {
            assert_eq!(e.to_string(), "No tool method found in entry point");
            assert_eq!(e.kind(), ErrorKind::StructuralViolation);
        });

        let with_tool = "import truffle\n\nclass App:\n    @truffle.tool()\n    def run(self):\n        pass\n\napp = truffle.TruffleApp(App())\napp.launch()\n";
        assert_matches!(check_tool_contract(with_tool), Ok(result) => {
            assert_eq!(names(&result), ["run"]);
        });

        let checker = ContractChecker::new();
        assert_matches!((checker.inspect(without_tool), checker.inspect(with_tool)), (Ok(before), Ok(after)) => {
            assert!(!before.has_tool_method());
            assert!(after.has_tool_method());
            assert!(before.has_launch_call());
            assert_eq!(before.has_launch_call(), after.has_launch_call());
        });

        let no_launch = without_tool.replace("app.launch()\n", "");
        let no_launch_with_tool = with_tool.replace("app.launch()\n", "");
        assert_matches!((checker.inspect(&no_launch), checker.inspect(&no_launch_with_tool)), (Ok(before), Ok(after)) => {
            assert!(!before.has_launch_call());
            assert!(!after.has_launch_call());
            assert!(after.has_tool_method());
        });
    }

    #[test]
    fn test_launch_statement_does_not_change_tool_discovery() {
        let checker = ContractChecker::new();
        let without_launch = "import truffle\n\n@truffle.tool\ndef search(q):\n    return q\n\napp = truffle.TruffleApp(search)\n";
        let with_launch = format!("{without_launch}app.launch()\n");

        let before = checker.inspect(without_launch);
        let after = checker.inspect(&with_launch);
        assert_matches!((before, after), (Ok(before), Ok(after)) => {
            assert!(!before.has_launch_call());
            assert!(after.has_launch_call());
            assert_eq!(before.tool_methods(), after.tool_methods());
            assert_eq!(before.has_tool_method(), after.has_tool_method());
        });
    }

    #[test]
    fn test_launch_token_without_launch_statement() {
        let source = "import truffle\n\n@truffle.tool\ndef run():\n    app.launch()\n";
        assert_matches!(check_tool_contract(source), Err(ContractError::NoLaunchCall));
    }

    #[test]
    fn test_launch_receiver_is_not_checked() {
        let source = "import truffle\n\n@truffle.tool\ndef run():\n    pass\n\nrocket.launch()\n";
        assert_matches!(check_tool_contract(source), Ok(result) => {
            assert!(result.has_launch_call());
        });
    }

    #[test]
    fn test_args_decorator_alone_is_not_a_tool() {
        let source = "import truffle\n\n@truffle.args(q=\"query\")\ndef run(q):\n    pass\n\napp.launch()\n";
        assert_matches!(check_tool_contract(source), Err(ContractError::NoToolMethod(_)));
    }

    #[test]
    fn test_other_namespaces_are_not_tools() {
        let source = "import truffle\nimport other\n\n@other.tool\ndef a():\n    pass\n\n@tool\ndef b():\n    pass\n\n@x.truffle.tool\ndef c():\n    pass\n\napp.launch()\n";
        assert_matches!(checker_result(source), Ok(result) => {
            assert!(!result.has_tool_method());
            assert!(result.tool_methods().is_empty());
        });
    }

    fn checker_result(source: &str) -> Result<ContractResult, ContractError> {
        ContractChecker::new().inspect(source)
    }

    #[test]
    fn test_nested_functions_are_not_tools() {
        let source = "import truffle\n\ndef outer():\n    @truffle.tool\n    def inner():\n        pass\n\napp.launch()\n";
        assert_matches!(checker_result(source), Ok(result) => {
            assert!(!result.has_tool_method());
            assert!(result.has_launch_call());
        });
    }

    #[test]
    fn test_compound_statements_are_walked() {
        let source = r#"import truffle

try:
    @truffle.tool
    async def fetch():
        pass
except ImportError:
    pass

with open("x") as f:
    if True:
        app.launch()
"#;
        assert_matches!(check_tool_contract(source), Ok(result) => {
            assert_eq!(names(&result), ["fetch"]);
        });
    }

    #[test]
    fn test_custom_namespace() {
        let checker = ContractChecker::new_with_config(ToolcheckConfig::default().sdk_namespace("tf"));
        let source = "import tf\n\n@tf.tool\ndef run():\n    pass\n\napp.launch()\n";
        assert_matches!(checker.check(source), Ok(result) => {
            assert_eq!(names(&result), ["run"]);
        });
        assert_matches!(checker.check(TOOL_APP), Err(ContractError::MissingSdkImport(_)));
    }
}
