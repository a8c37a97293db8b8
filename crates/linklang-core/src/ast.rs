//! Abstract syntax tree
//!
//! A closed set of node types for chain programs. The parser builds the tree
//! once; nothing mutates it afterwards.

/// A complete compilation unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Statement>,
}

/// Top-level statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `def name = expr`
    Def(DefStatement),
    /// `chain Name = pipeline`
    Chain(ChainStatement),
    /// `schema Name { field: type }`
    Schema(SchemaStatement),
}

/// Binds a name to a constructed or modified component
#[derive(Debug, Clone, PartialEq)]
pub struct DefStatement {
    /// Bound name
    pub name: String,
    /// Bound value
    pub value: Expr,
    /// Line of the `def` keyword
    pub line: usize,
}

/// Declares an executable pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStatement {
    /// Chain name
    pub name: String,
    /// Steps executed in order
    pub pipeline: Pipeline,
    /// Optional execution context, e.g. `memory(window=10)`
    pub context: Option<FunctionCall>,
    /// Line of the `chain` keyword
    pub line: usize,
}

/// Declares a structured-output schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaStatement {
    /// Schema name
    pub name: String,
    /// Declared fields in source order
    pub fields: Vec<SchemaField>,
    /// Line of the `schema` keyword
    pub line: usize,
}

/// One `name: type` entry of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// Field name
    pub name: String,
    /// Declared type name, recorded verbatim
    pub type_name: String,
}

/// Sequential composition of steps joined by `>>`; never empty
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// Steps in execution order
    pub steps: Vec<Expr>,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `target @ modifier(...)`
    Bind(BindExpression),
    /// `Name(args)`, optionally with a router block
    Call(FunctionCall),
    /// Reference to a defined name or a keyword sentinel such as `Input`
    Identifier(String),
    /// Scalar literal
    Literal(Literal),
    /// `[a, b]`
    List(Vec<Expr>),
    /// `{ key: value }`
    Object(Vec<ObjectField>),
}

/// Attaches a capability to a target expression
#[derive(Debug, Clone, PartialEq)]
pub struct BindExpression {
    /// Expression being modified; itself a bind for chained modifiers
    pub target: Box<Expr>,
    /// Modifier call, e.g. `bind(tools=[...])`
    pub modifier: FunctionCall,
}

/// Component construction or modifier call
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Callee name
    pub name: String,
    /// Arguments in source order; names are unique
    pub args: Vec<Argument>,
    /// Branch table, only ever present on `Router(...)`
    pub router_block: Option<RouterBlock>,
}

/// A call argument; `name` is `None` only for a sole positional argument
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Argument name
    pub name: Option<String>,
    /// Argument value
    pub value: Expr,
}

/// Literal operand
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Unescaped string contents
    String(String),
    /// Numeric literal
    Number(f64),
    /// `true` / `false`
    Boolean(bool),
    /// `{{name}}`, holding only the name
    TemplateVar(String),
}

/// One `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    /// Field key
    pub key: String,
    /// Field value
    pub value: Expr,
}

/// Conditional branch table attached to a `Router(...)` call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouterBlock {
    /// `case` arms in source order
    pub cases: Vec<RouterCase>,
    /// Pipeline taken when no case matches
    pub default_action: Option<Pipeline>,
}

/// `case condition => pipeline`
#[derive(Debug, Clone, PartialEq)]
pub struct RouterCase {
    /// Value compared against the routing key
    pub condition: Expr,
    /// Pipeline executed on match
    pub action: Pipeline,
}

impl Statement {
    /// Declared name
    pub fn name(&self) -> &str {
        match self {
            Statement::Def(def) => &def.name,
            Statement::Chain(chain) => &chain.name,
            Statement::Schema(schema) => &schema.name,
        }
    }

    /// Line of the introducing keyword
    pub fn line(&self) -> usize {
        match self {
            Statement::Def(def) => def.line,
            Statement::Chain(chain) => chain.line,
            Statement::Schema(schema) => schema.line,
        }
    }

    /// Statement keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::Def(_) => "def",
            Statement::Chain(_) => "chain",
            Statement::Schema(_) => "schema",
        }
    }
}

impl Expr {
    /// Name of a bare identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Short description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Expr::Bind(bind) => format!("bind expression '@ {}'", bind.modifier.name),
            Expr::Call(call) => format!("call to '{}'", call.name),
            Expr::Identifier(name) => format!("identifier '{name}'"),
            Expr::Literal(literal) => format!("{} literal", literal.kind()),
            Expr::List(_) => "list literal".to_string(),
            Expr::Object(_) => "object literal".to_string(),
        }
    }
}

impl BindExpression {
    /// Innermost base expression and all modifiers, left to right
    pub fn flatten(&self) -> (&Expr, Vec<&FunctionCall>) {
        let mut modifiers = vec![&self.modifier];
        let mut base = self.target.as_ref();
        while let Expr::Bind(inner) = base {
            modifiers.push(&inner.modifier);
            base = inner.target.as_ref();
        }
        modifiers.reverse();
        (base, modifiers)
    }
}

impl FunctionCall {
    /// Create a call with no router block
    pub fn new(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            args,
            router_block: None,
        }
    }

    /// Value of a named argument
    pub fn arg(&self, name: &str) -> Option<&Expr> {
        self.args
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| &a.value)
    }

    /// First named argument found among `names`
    pub fn arg_any(&self, names: &[&str]) -> Option<&Expr> {
        names.iter().find_map(|n| self.arg(n))
    }

    /// Value of the sole positional argument, if that is the call's form
    pub fn positional(&self) -> Option<&Expr> {
        match self.args.as_slice() {
            [Argument { name: None, value }] => Some(value),
            _ => None,
        }
    }

    /// Named arguments in source order
    pub fn named(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.args
            .iter()
            .filter_map(|a| a.name.as_deref().map(|n| (n, &a.value)))
    }
}

impl Literal {
    /// Literal value-kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Number(_) => "number",
            Literal::Boolean(_) => "boolean",
            Literal::TemplateVar(_) => "template_var",
        }
    }
}
