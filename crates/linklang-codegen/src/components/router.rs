//! Router codegen
//!
//! A router lowers to one constructor call. Each branch pipeline becomes an
//! inline chain expression, so no extra top-level bindings are introduced:
//!
//! ```text
//! new Router({ key: "intent" }, [
//!     { when: "weather", then: new Chain("r_r1_case_0").addNode(weather_agent) }
//! ], new Chain("r_r1_default").addNode(fallback))
//! ```
//!
//! Branch labels carry a module-wide router counter, so several routers owned
//! by one statement (or nested in one another) never share a label.

use linklang_core::ast::{FunctionCall, Pipeline};

use crate::error::Result;
use crate::generator::Scope;
use crate::ir::JsExpr;

/// Helper for lowering `Router(...) { case ... default ... }`
pub(crate) struct RouterCodegen;

impl RouterCodegen {
    /// Lower to `new Router(config, routes, fallback)`
    pub(crate) fn generate(scope: &mut Scope, call: &FunctionCall) -> Result<JsExpr> {
        scope.require("Router");

        let config = match call.positional() {
            Some(value) => scope.lower_value(value)?,
            None => JsExpr::Object(scope.lower_named_args(call, &[])?),
        };

        let label = scope.next_router_label();
        let mut routes = Vec::new();
        let mut fallback = JsExpr::Null;

        if let Some(block) = &call.router_block {
            for (index, case) in block.cases.iter().enumerate() {
                let when = scope.lower_value(&case.condition)?;
                let then = Self::branch(scope, format!("{label}_case_{index}"), &case.action)?;
                routes.push(JsExpr::Object(vec![
                    ("when".to_string(), when),
                    ("then".to_string(), then),
                ]));
            }
            if let Some(default) = &block.default_action {
                fallback = Self::branch(scope, format!("{label}_default"), default)?;
            }
        }

        Ok(JsExpr::construct(
            "Router",
            vec![config, JsExpr::Array(routes), fallback],
        ))
    }

    fn branch(scope: &mut Scope, label: String, pipeline: &Pipeline) -> Result<JsExpr> {
        scope.require("Chain");
        let mut chain = JsExpr::construct("Chain", vec![JsExpr::string(label)]);
        for step in &pipeline.steps {
            let node = scope.lower_step(step)?;
            chain = chain.method("addNode", vec![node]);
        }
        Ok(chain)
    }
}
