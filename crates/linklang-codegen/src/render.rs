//! Source text rendering for the emission tree
//!
//! One renderer handles every string literal and layout decision: strings
//! are escaped as JSON string literals, which are valid JavaScript; objects
//! and arrays stay on one line unless they nest other collections.

use crate::ir::{JsExpr, JsStmt};

const INDENT: &str = "    ";

/// Render statements as newline-separated source lines, without a trailing newline
pub fn render(statements: &[JsStmt]) -> String {
    let mut lines = Vec::new();
    for statement in statements {
        render_stmt(&mut lines, statement, 0);
    }
    lines.join("\n")
}

/// Render a single expression at indentation level zero
pub fn render_expr(expr: &JsExpr) -> String {
    expr_at(expr, 0)
}

/// Quote a string as a target-language literal
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn render_stmt(lines: &mut Vec<String>, statement: &JsStmt, level: usize) {
    let pad = INDENT.repeat(level);
    match statement {
        JsStmt::Import { names, module } => lines.push(format!(
            "{pad}import {{ {} }} from {};",
            names.join(", "),
            quote(module)
        )),
        JsStmt::Const { name, value } => {
            lines.push(format!("{pad}const {name} = {};", expr_at(value, level)))
        }
        JsStmt::Expr(expr) => lines.push(format!("{pad}{};", expr_at(expr, level))),
        JsStmt::Return(expr) => lines.push(format!("{pad}return {};", expr_at(expr, level))),
        JsStmt::Comment(text) => lines.push(format!("{pad}// {text}")),
        JsStmt::Blank => lines.push(String::new()),
        JsStmt::Function { name, params, body } => {
            lines.push(format!(
                "{pad}export async function {name}({}) {{",
                params.join(", ")
            ));
            for inner in body {
                render_stmt(lines, inner, level + 1);
            }
            lines.push(format!("{pad}}}"));
        }
    }
}

fn expr_at(expr: &JsExpr, level: usize) -> String {
    match expr {
        JsExpr::Ident(name) => name.clone(),
        JsExpr::Str(value) => quote(value),
        JsExpr::Number(value) => format!("{value}"),
        JsExpr::Bool(value) => value.to_string(),
        JsExpr::Null => "null".to_string(),
        JsExpr::Array(items) => render_array(items, level),
        JsExpr::Object(fields) => render_object(fields, level),
        JsExpr::New { class, args } => format!("new {class}({})", args_at(args, level)),
        JsExpr::Call { callee, args } => {
            format!("{}({})", expr_at(callee, level), args_at(args, level))
        }
        JsExpr::Member { object, property } => format!("{}.{property}", expr_at(object, level)),
        JsExpr::Await(inner) => format!("await {}", expr_at(inner, level)),
    }
}

fn args_at(args: &[JsExpr], level: usize) -> String {
    args.iter()
        .map(|arg| expr_at(arg, level))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_array(items: &[JsExpr], level: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }

    let multiline = items.iter().any(|item| {
        item.is_compound() || matches!(item, JsExpr::New { .. } | JsExpr::Call { .. })
    });
    if !multiline {
        return format!("[{}]", args_at(items, level));
    }

    let inner = INDENT.repeat(level + 1);
    let body = items
        .iter()
        .map(|item| format!("{inner}{}", expr_at(item, level + 1)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("[\n{body}\n{}]", INDENT.repeat(level))
}

fn render_object(fields: &[(String, JsExpr)], level: usize) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }

    if !fields.iter().any(|(_, value)| value.is_compound()) {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{}: {}", object_key(key), expr_at(value, level)))
            .collect::<Vec<_>>()
            .join(", ");
        return format!("{{ {body} }}");
    }

    let inner = INDENT.repeat(level + 1);
    let body = fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{inner}{}: {}",
                object_key(key),
                expr_at(value, level + 1)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{body}\n{}}}", INDENT.repeat(level))
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
