//! Model constructor codegen

use linklang_core::ast::FunctionCall;

use crate::error::Result;
use crate::generator::Scope;
use crate::ir::JsExpr;

/// Helper for lowering `Model(...)`
pub(crate) struct ModelCodegen;

impl ModelCodegen {
    /// `Model("name")` keeps its positional argument; named arguments become one config object
    pub(crate) fn generate(scope: &mut Scope, call: &FunctionCall) -> Result<JsExpr> {
        scope.require("Model");

        let args = match call.positional() {
            Some(value) => vec![scope.lower_value(value)?],
            None if call.args.is_empty() => vec![],
            None => vec![JsExpr::Object(scope.lower_named_args(call, &[])?)],
        };
        Ok(JsExpr::construct("Model", args))
    }
}

#[cfg(test)]
mod tests {
    use crate::generator::generate_source;
    use rstest::rstest;

    #[rstest]
    #[case::no_args("def m = Model()", "const m = new Model();")]
    #[case::positional(r#"def m = Model("qwen2.5")"#, r#"const m = new Model("qwen2.5");"#)]
    #[case::named(
        r#"def m = Model(model_name="qwen2.5", temperature=0.7)"#,
        r#"const m = new Model({ model_name: "qwen2.5", temperature: 0.7 });"#
    )]
    fn test_model_lowering(#[case] source: &str, #[case] expected: &str) {
        let code = generate_source(source).unwrap();
        assert!(code.contains(expected), "missing {expected:?} in:\n{code}");
        assert!(code.contains("import { Model } from"));
    }
}
