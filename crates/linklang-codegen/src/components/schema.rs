//! Schema declaration codegen

use std::collections::HashSet;

use linklang_core::ast::SchemaStatement;

use crate::error::Result;
use crate::generator::Scope;
use crate::ir::JsExpr;

/// Helper for lowering `schema Name { ... }` to a JSON Schema object
pub(crate) struct SchemaCodegen;

impl SchemaCodegen {
    /// Every declared field is required; type names pass through verbatim
    pub(crate) fn generate(scope: &Scope, schema: &SchemaStatement) -> Result<JsExpr> {
        let mut seen = HashSet::new();
        let mut properties = Vec::with_capacity(schema.fields.len());
        let mut required = Vec::with_capacity(schema.fields.len());

        for field in &schema.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(scope.fail(format!("duplicate field '{}'", field.name)));
            }
            properties.push((
                field.name.clone(),
                JsExpr::Object(vec![("type".to_string(), JsExpr::string(&field.type_name))]),
            ));
            required.push(JsExpr::string(&field.name));
        }

        Ok(JsExpr::Object(vec![
            ("type".to_string(), JsExpr::string("object")),
            ("properties".to_string(), JsExpr::Object(properties)),
            ("required".to_string(), JsExpr::Array(required)),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use crate::generator::generate_source;

    #[test]
    fn test_schema_lowering() {
        let code = generate_source("schema Review { rating: number, text: string }").unwrap();
        let expected = r#"const Review = {
    type: "object",
    properties: {
        rating: { type: "number" },
        text: { type: "string" }
    },
    required: ["rating", "text"]
};"#;
        assert!(code.contains(expected), "got:\n{code}");
    }

    #[test]
    fn test_schema_needs_no_imports() {
        let code = generate_source("schema Empty { }").unwrap();
        assert!(!code.contains("import"));
        assert!(code.contains(r#"const Empty = { type: "object", properties: {}, required: [] };"#));
    }

    #[test]
    fn test_duplicate_field_is_error() {
        let err = generate_source("schema S { a: string, a: number }").unwrap_err();
        assert!(err.to_string().contains("duplicate field 'a'"));
    }
}
