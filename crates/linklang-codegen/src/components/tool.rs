//! Tool constructor codegen

use linklang_core::ast::FunctionCall;

use crate::error::Result;
use crate::generator::Scope;
use crate::ir::JsExpr;

const ARGUMENTS: &[&str] = &["name", "description", "desc", "handler", "func", "schema"];

/// Helper for lowering `Tool(...)`
pub(crate) struct ToolCodegen;

impl ToolCodegen {
    /// Lower to `new Tool(name, description, handler, schema)`
    pub(crate) fn generate(scope: &mut Scope, call: &FunctionCall) -> Result<JsExpr> {
        scope.require("Tool");
        scope.reject_unknown(call, ARGUMENTS)?;

        let name = call
            .arg("name")
            .ok_or_else(|| scope.fail("Tool requires a 'name' argument"))?;
        let handler = call
            .arg_any(&["handler", "func"])
            .ok_or_else(|| scope.fail("Tool requires a 'handler' (or 'func') argument"))?;

        let name = scope.lower_value(name)?;
        let description = match call.arg_any(&["description", "desc"]) {
            Some(value) => scope.lower_value(value)?,
            None => JsExpr::string(""),
        };
        let handler = scope.lower_value(handler)?;
        let schema = match call.arg("schema") {
            Some(value) => scope.lower_value(value)?,
            None => Self::empty_schema(),
        };

        Ok(JsExpr::construct(
            "Tool",
            vec![name, description, handler, schema],
        ))
    }

    fn empty_schema() -> JsExpr {
        JsExpr::Object(vec![
            ("type".to_string(), JsExpr::string("object")),
            ("properties".to_string(), JsExpr::Object(vec![])),
            ("required".to_string(), JsExpr::Array(vec![])),
        ])
    }
}
