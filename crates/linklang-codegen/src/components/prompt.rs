//! Prompt template codegen

use once_cell::sync::Lazy;
use regex::Regex;

use linklang_core::ast::{Expr, FunctionCall, Literal};

use crate::error::Result;
use crate::generator::Scope;
use crate::ir::JsExpr;

static DOUBLE_BRACED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("Invalid regex pattern")
});

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid regex pattern"));

/// Helper for lowering `Prompt(...)`
pub(crate) struct PromptCodegen;

impl PromptCodegen {
    /// Lower to `new Prompt(template[, inputValues])`
    pub(crate) fn generate(scope: &mut Scope, call: &FunctionCall) -> Result<JsExpr> {
        scope.require("Prompt");
        scope.reject_unknown(call, &["template"])?;

        let template = call
            .arg("template")
            .or_else(|| call.positional())
            .ok_or_else(|| scope.fail("Prompt requires a template"))?;

        let args = match template {
            Expr::Literal(Literal::String(text)) => {
                let text = Self::normalize(text);
                let variables = Self::extract_variables(&text);
                let mut args = vec![JsExpr::string(text)];
                if !variables.is_empty() {
                    args.push(JsExpr::Array(
                        variables.into_iter().map(JsExpr::Str).collect(),
                    ));
                }
                args
            }
            Expr::Literal(Literal::TemplateVar(name)) => vec![
                JsExpr::string(format!("{{{name}}}")),
                JsExpr::Array(vec![JsExpr::string(name)]),
            ],
            other => vec![scope.lower_value(other)?],
        };

        Ok(JsExpr::construct("Prompt", args))
    }

    /// Rewrite `{{ name }}` to the runtime's `{name}` placeholder
    pub(crate) fn normalize(template: &str) -> String {
        DOUBLE_BRACED.replace_all(template, "{$1}").into_owned()
    }

    /// Placeholder names in order of first appearance
    pub(crate) fn extract_variables(template: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for cap in PLACEHOLDER.captures_iter(template) {
            let name = &cap[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_source;
    use rstest::rstest;

    #[rstest]
    #[case("Hello {{ name }}!", "Hello {name}!")]
    #[case("{{a}} and {{  b  }}", "{a} and {b}")]
    #[case("already {single}", "already {single}")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(PromptCodegen::normalize(input), expected);
    }

    #[test]
    fn test_extract_variables_dedupes_in_order() {
        let vars = PromptCodegen::extract_variables("{b} {a} {b}");
        assert_eq!(vars, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_prompt_with_variables() {
        let code =
            generate_source(r#"def p = Prompt(template="Answer: {{ question }}")"#).unwrap();
        assert!(code.contains(r#"const p = new Prompt("Answer: {question}", ["question"]);"#));
    }

    #[test]
    fn test_positional_prompt_without_variables() {
        let code = generate_source(r#"def p = Prompt("You are helpful.")"#).unwrap();
        assert!(code.contains(r#"const p = new Prompt("You are helpful.");"#));
    }

    #[test]
    fn test_prompt_escapes_quotes() {
        let code = generate_source(r#"def p = Prompt("Say \"hi\" to {name}")"#).unwrap();
        assert!(code.contains(r#"new Prompt("Say \"hi\" to {name}", ["name"])"#), "got:\n{code}");
    }

    #[test]
    fn test_missing_template() {
        let err = generate_source("def p = Prompt()").unwrap_err();
        assert!(err.to_string().contains("Prompt requires a template"));
    }
}
