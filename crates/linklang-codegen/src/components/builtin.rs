//! Builtin component codegen

use linklang_core::ast::{Expr, FunctionCall, Literal};

use crate::error::Result;
use crate::generator::Scope;
use crate::ir::JsExpr;

const KIND: &[&str] = &["kind", "type"];

/// Helper for lowering `Builtin(...)`
pub(crate) struct BuiltinCodegen;

impl BuiltinCodegen {
    /// Lower to `new Builtin("Kind"[, config])`
    pub(crate) fn generate(scope: &mut Scope, call: &FunctionCall) -> Result<JsExpr> {
        scope.require("Builtin");

        let kind = call
            .arg_any(KIND)
            .or_else(|| call.positional())
            .ok_or_else(|| scope.fail("Builtin requires a 'kind' (or 'type') argument"))?;
        let kind = match kind {
            Expr::Literal(Literal::String(name)) | Expr::Identifier(name) => name.clone(),
            other => {
                return Err(scope.fail(format!(
                    "Builtin kind must be a name or string, found {}",
                    other.describe()
                )));
            }
        };

        let mut args = vec![JsExpr::string(kind)];
        let config = scope.lower_named_args(call, KIND)?;
        if !config.is_empty() {
            args.push(JsExpr::Object(config));
        }
        Ok(JsExpr::construct("Builtin", args))
    }
}
