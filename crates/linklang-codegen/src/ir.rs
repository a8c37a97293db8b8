//! Emission tree for generated modules
//!
//! Lowering produces these nodes instead of concatenating strings; the
//! [`render`](crate::render) module turns them into source text. Keeping the
//! two apart is what makes string escaping and layout uniform.

/// A target-language expression
#[derive(Debug, Clone, PartialEq)]
pub enum JsExpr {
    /// Bare identifier reference
    Ident(String),
    /// String literal, escaped at render time
    Str(String),
    /// Numeric literal
    Number(f64),
    /// Boolean literal
    Bool(bool),
    /// `null`
    Null,
    /// `[a, b]`
    Array(Vec<JsExpr>),
    /// `{ key: value }`, keys in insertion order
    Object(Vec<(String, JsExpr)>),
    /// `new Class(args)`
    New {
        /// Constructor name
        class: String,
        /// Constructor arguments
        args: Vec<JsExpr>,
    },
    /// `callee(args)`
    Call {
        /// Called expression
        callee: Box<JsExpr>,
        /// Call arguments
        args: Vec<JsExpr>,
    },
    /// `object.property`
    Member {
        /// Receiver
        object: Box<JsExpr>,
        /// Property name
        property: String,
    },
    /// `await expr`
    Await(Box<JsExpr>),
}

impl JsExpr {
    /// Identifier reference
    pub fn ident(name: impl Into<String>) -> Self {
        JsExpr::Ident(name.into())
    }

    /// String literal
    pub fn string(value: impl Into<String>) -> Self {
        JsExpr::Str(value.into())
    }

    /// Constructor invocation
    pub fn construct(class: impl Into<String>, args: Vec<JsExpr>) -> Self {
        JsExpr::New {
            class: class.into(),
            args,
        }
    }

    /// Property access on `self`
    pub fn member(self, property: impl Into<String>) -> Self {
        JsExpr::Member {
            object: Box::new(self),
            property: property.into(),
        }
    }

    /// Method call on `self`
    pub fn method(self, name: impl Into<String>, args: Vec<JsExpr>) -> Self {
        JsExpr::Call {
            callee: Box::new(self.member(name)),
            args,
        }
    }

    /// Await `self`
    pub fn awaited(self) -> Self {
        JsExpr::Await(Box::new(self))
    }

    /// Whether the value is a non-empty array or object
    pub fn is_compound(&self) -> bool {
        match self {
            JsExpr::Array(items) => !items.is_empty(),
            JsExpr::Object(fields) => !fields.is_empty(),
            _ => false,
        }
    }
}

/// A target-language statement
#[derive(Debug, Clone, PartialEq)]
pub enum JsStmt {
    /// `import { names } from "module";`
    Import {
        /// Imported names
        names: Vec<String>,
        /// Module specifier
        module: String,
    },
    /// `const name = value;`
    Const {
        /// Binding name
        name: String,
        /// Initializer
        value: JsExpr,
    },
    /// Expression statement
    Expr(JsExpr),
    /// `return value;`
    Return(JsExpr),
    /// `// text`
    Comment(String),
    /// Empty line
    Blank,
    /// `export async function name(params) { body }`
    Function {
        /// Function name
        name: String,
        /// Parameter names
        params: Vec<String>,
        /// Function body
        body: Vec<JsStmt>,
    },
}

impl JsStmt {
    /// `const name = value;`
    pub fn constant(name: impl Into<String>, value: JsExpr) -> Self {
        JsStmt::Const {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_builds_member_call() {
        let expr = JsExpr::ident("Main").method("addNode", vec![JsExpr::ident("m")]);
        match expr {
            JsExpr::Call { callee, args } => {
                assert_eq!(
                    *callee,
                    JsExpr::Member {
                        object: Box::new(JsExpr::ident("Main")),
                        property: "addNode".to_string(),
                    }
                );
                assert_eq!(args, vec![JsExpr::ident("m")]);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_is_compound() {
        assert!(!JsExpr::Array(vec![]).is_compound());
        assert!(!JsExpr::Object(vec![]).is_compound());
        assert!(JsExpr::Array(vec![JsExpr::Null]).is_compound());
        assert!(!JsExpr::string("x").is_compound());
    }
}
