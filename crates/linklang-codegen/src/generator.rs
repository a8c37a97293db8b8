//! Code generator
//!
//! Walks a [`Program`] in source order and lowers every statement into the
//! emission tree, then lays the module out with a minijinja template:
//!
//! 1. header comment and import line
//! 2. definitions, in source order
//! 3. context setup (tool registry, per-chain memory contexts)
//! 4. invocation helpers, one per chain
//!
//! All lowering state lives in a per-call [`Scope`], so one generator can be
//! reused for any number of programs.

use minijinja::{Environment, context};
use std::collections::{BTreeSet, HashSet};

use linklang_core::ast::{
    BindExpression, ChainStatement, DefStatement, Expr, FunctionCall, Literal, Program,
    SchemaStatement, Statement,
};
use linklang_core::config::{default_invoke_method, default_runtime_module};

use crate::components::{
    BuiltinCodegen, ModelCodegen, PromptCodegen, RouterCodegen, SchemaCodegen, ToolCodegen,
};
use crate::error::{Error, Result};
use crate::ir::{JsExpr, JsStmt};
use crate::render::render;

const MODULE_TEMPLATE: &str = "\
// Generated by linklang from {{ source }}. Do not edit.
{% if imports %}
{{ imports }}
{% endif %}
{% for section in sections %}

{{ section }}
{% endfor %}
";

const REGISTRY: &str = "toolRegistry";
const SHARED_CONTEXT: &str = "ctx";

/// Lowers programs to runtime modules
#[derive(Debug, Clone)]
pub struct Generator {
    debug_comments: bool,
    runtime_module: String,
    invoke_method: String,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a generator targeting the default runtime module
    pub fn new() -> Self {
        Self {
            debug_comments: false,
            runtime_module: default_runtime_module(),
            invoke_method: default_invoke_method(),
        }
    }

    /// Prefix every statement's output with a comment naming its source line
    pub fn with_debug_comments(mut self) -> Self {
        self.debug_comments = true;
        self
    }

    /// Module specifier used by the import line
    pub fn with_runtime_module(mut self, module: impl Into<String>) -> Self {
        self.runtime_module = module.into();
        self
    }

    /// Method the invocation helpers call on each chain
    pub fn with_invoke_method(mut self, method: impl Into<String>) -> Self {
        self.invoke_method = method.into();
        self
    }

    /// Generate module source for `program`
    ///
    /// `source_name` only appears in the header comment. The output is a pure
    /// function of the program and the generator settings.
    pub fn generate(&self, source_name: &str, program: &Program) -> Result<String> {
        let mut scope = Scope::new(program);

        for (index, statement) in program.statements.iter().enumerate() {
            if index > 0 {
                scope.definitions.push(JsStmt::Blank);
            }
            scope.enter(statement);
            if self.debug_comments {
                scope.definitions.push(JsStmt::Comment(format!(
                    "{} {} (line {})",
                    statement.keyword(),
                    statement.name(),
                    statement.line()
                )));
            }

            match statement {
                Statement::Def(def) => scope.lower_def(def)?,
                Statement::Chain(chain) => scope.lower_chain(chain)?,
                Statement::Schema(schema) => scope.lower_schema(schema)?,
            }
        }

        let context = scope.context_section();
        let helpers = self.helper_section(&scope);

        let imports = if scope.imports.is_empty() {
            String::new()
        } else {
            render(&[JsStmt::Import {
                names: scope.imports.iter().cloned().collect(),
                module: self.runtime_module.clone(),
            }])
        };

        let sections: Vec<String> = [scope.definitions, context, helpers]
            .iter()
            .filter(|section| !section.is_empty())
            .map(|section| render(section))
            .collect();

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("module", MODULE_TEMPLATE)?;
        let code = env.get_template("module")?.render(context! {
            source => source_name,
            imports => imports,
            sections => sections,
        })?;

        tracing::debug!(
            source = source_name,
            statements = program.statements.len(),
            lines = code.lines().count(),
            "generated module"
        );
        Ok(code)
    }

    fn helper_section(&self, scope: &Scope) -> Vec<JsStmt> {
        let mut helpers = Vec::new();
        for chain in &scope.chains {
            if helpers.is_empty() {
                helpers.push(JsStmt::Comment("Execution helpers".to_string()));
            } else {
                helpers.push(JsStmt::Blank);
            }

            let mut args = vec![JsExpr::ident("input")];
            if scope.contexts.iter().any(|(name, _)| name == chain) {
                args.push(JsExpr::ident(context_name(chain)));
            } else if !scope.tools.is_empty() {
                args.push(JsExpr::ident(SHARED_CONTEXT));
            }

            helpers.push(JsStmt::Function {
                name: format!("run_{chain}"),
                params: vec!["input".to_string()],
                body: vec![
                    JsStmt::constant(
                        "res",
                        JsExpr::ident(chain)
                            .method(self.invoke_method.clone(), args)
                            .awaited(),
                    ),
                    JsStmt::Expr(
                        JsExpr::ident("console")
                            .method("log", vec![JsExpr::ident("res").member("content")]),
                    ),
                    JsStmt::Return(JsExpr::ident("res")),
                ],
            });
        }
        helpers
    }
}

fn context_name(chain: &str) -> String {
    format!("{chain}_ctx")
}

/// Lowering state for one `generate` call
pub(crate) struct Scope {
    declared: HashSet<String>,
    imports: BTreeSet<String>,
    definitions: Vec<JsStmt>,
    tools: Vec<String>,
    contexts: Vec<(String, JsExpr)>,
    chains: Vec<String>,
    owner: String,
    context: String,
    line: usize,
    routers: usize,
}

impl Scope {
    fn new(program: &Program) -> Self {
        let mut declared = HashSet::new();
        for statement in &program.statements {
            if !declared.insert(statement.name().to_string()) {
                tracing::warn!(
                    name = statement.name(),
                    line = statement.line(),
                    "'{}' is declared more than once",
                    statement.name()
                );
            }
        }

        Self {
            declared,
            imports: BTreeSet::new(),
            definitions: Vec::new(),
            tools: Vec::new(),
            contexts: Vec::new(),
            chains: Vec::new(),
            owner: String::new(),
            context: String::new(),
            line: 0,
            routers: 0,
        }
    }

    fn enter(&mut self, statement: &Statement) {
        self.owner = statement.name().to_string();
        self.context = format!("{} '{}'", statement.keyword(), statement.name());
        self.line = statement.line();
    }

    /// Name of the statement being lowered
    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    /// Fresh branch label prefix for the next router in this module
    pub(crate) fn next_router_label(&mut self) -> String {
        self.routers += 1;
        format!("{}_r{}", self.owner, self.routers)
    }

    /// Record a runtime name for the import line
    pub(crate) fn require(&mut self, name: &str) {
        self.imports.insert(name.to_string());
    }

    /// Lowering error attributed to the current statement
    pub(crate) fn fail(&self, message: impl Into<String>) -> Error {
        Error::Lowering {
            context: self.context.clone(),
            line: self.line,
            message: message.into(),
        }
    }

    /// Reject named arguments outside `allowed`
    pub(crate) fn reject_unknown(&self, call: &FunctionCall, allowed: &[&str]) -> Result<()> {
        match call.named().find(|(name, _)| !allowed.contains(name)) {
            Some((name, _)) => Err(self.fail(format!(
                "unknown argument '{name}' for '{}'",
                call.name
            ))),
            None => Ok(()),
        }
    }

    /// Named arguments, minus `skip`, as object fields
    pub(crate) fn lower_named_args(
        &mut self,
        call: &FunctionCall,
        skip: &[&str],
    ) -> Result<Vec<(String, JsExpr)>> {
        let mut fields = Vec::new();
        for (name, value) in call.named() {
            if skip.contains(&name) {
                continue;
            }
            fields.push((name.to_string(), self.lower_value(value)?));
        }
        Ok(fields)
    }

    /// Lower an expression in value position
    pub(crate) fn lower_value(&mut self, expr: &Expr) -> Result<JsExpr> {
        match expr {
            Expr::Literal(literal) => Ok(lower_literal(literal)),
            Expr::Identifier(name) => Ok(self.reference(name, false)),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.lower_value(item)?);
                }
                Ok(JsExpr::Array(values))
            }
            Expr::Object(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push((field.key.clone(), self.lower_value(&field.value)?));
                }
                Ok(JsExpr::Object(values))
            }
            Expr::Call(call) => self.lower_call(call),
            Expr::Bind(bind) => self.lower_inline_bind(bind),
        }
    }

    /// Lower an expression used as a pipeline step
    pub(crate) fn lower_step(&mut self, expr: &Expr) -> Result<JsExpr> {
        match expr {
            Expr::Literal(_) | Expr::List(_) | Expr::Object(_) => Err(self.fail(format!(
                "{} cannot be used as a pipeline step",
                expr.describe()
            ))),
            Expr::Identifier(name) => Ok(self.reference(name, true)),
            other => self.lower_value(other),
        }
    }

    fn lower_def(&mut self, def: &DefStatement) -> Result<()> {
        let value = match &def.value {
            Expr::Bind(bind) => {
                let (base, modifiers) = bind.flatten();
                let base = self.lower_bind_base(base)?;
                self.definitions.push(JsStmt::constant(&def.name, base));
                for modifier in modifiers {
                    for (method, arg) in self.modifier_calls(modifier)? {
                        self.definitions.push(JsStmt::Expr(
                            JsExpr::ident(&def.name).method(method, vec![arg]),
                        ));
                    }
                }
                return Ok(());
            }
            Expr::Identifier(name) => self.reference(name, true),
            other => self.lower_value(other)?,
        };
        self.definitions.push(JsStmt::constant(&def.name, value));
        Ok(())
    }

    fn lower_chain(&mut self, chain: &ChainStatement) -> Result<()> {
        self.require("Chain");
        self.definitions.push(JsStmt::constant(
            &chain.name,
            JsExpr::construct("Chain", vec![JsExpr::string(&chain.name)]),
        ));

        for step in &chain.pipeline.steps {
            let node = self.lower_step(step)?;
            self.definitions.push(JsStmt::Expr(
                JsExpr::ident(&chain.name).method("addNode", vec![node]),
            ));
        }

        if let Some(context) = &chain.context {
            if context.name != "memory" {
                return Err(self.fail(format!("unknown chain context '{}'", context.name)));
            }
            let config = match context.positional() {
                Some(value) => self.lower_value(value)?,
                None => JsExpr::Object(self.lower_named_args(context, &[])?),
            };
            self.require("ChainContext");
            self.contexts.push((chain.name.clone(), config));
        }

        self.chains.push(chain.name.clone());
        Ok(())
    }

    fn lower_schema(&mut self, schema: &SchemaStatement) -> Result<()> {
        let value = SchemaCodegen::generate(self, schema)?;
        self.definitions.push(JsStmt::constant(&schema.name, value));
        Ok(())
    }

    fn lower_call(&mut self, call: &FunctionCall) -> Result<JsExpr> {
        match call.name.as_str() {
            "Model" => ModelCodegen::generate(self, call),
            "Tool" => ToolCodegen::generate(self, call),
            "Prompt" => PromptCodegen::generate(self, call),
            "Builtin" => BuiltinCodegen::generate(self, call),
            "Router" => RouterCodegen::generate(self, call),
            "Input" | "StringOutput" if call.args.is_empty() => {
                Ok(self.reference(&call.name, false))
            }
            other => Err(self.fail(format!("unknown call target '{other}'"))),
        }
    }

    fn lower_bind_base(&mut self, base: &Expr) -> Result<JsExpr> {
        match base {
            Expr::Identifier(name) => Ok(self.reference(name, true)),
            Expr::Call(call) => self.lower_call(call),
            other => Err(self.fail(format!(
                "cannot attach modifiers to {}",
                other.describe()
            ))),
        }
    }

    fn lower_inline_bind(&mut self, bind: &BindExpression) -> Result<JsExpr> {
        let (base, modifiers) = bind.flatten();
        let mut expr = self.lower_bind_base(base)?;
        for modifier in modifiers {
            for (method, arg) in self.modifier_calls(modifier)? {
                expr = expr.method(method, vec![arg]);
            }
        }
        Ok(expr)
    }

    /// Binding method calls a modifier expands to, in order
    fn modifier_calls(&mut self, modifier: &FunctionCall) -> Result<Vec<(&'static str, JsExpr)>> {
        match modifier.name.as_str() {
            "bind" => {
                self.reject_unknown(modifier, &["tools"])?;
                let tools = modifier
                    .arg("tools")
                    .or_else(|| modifier.positional())
                    .ok_or_else(|| self.fail("bind requires a 'tools' argument"))?;
                let Expr::List(items) = tools else {
                    return Err(self.fail(format!(
                        "bind expects a list of tools, found {}",
                        tools.describe()
                    )));
                };

                let mut calls = Vec::with_capacity(items.len());
                for item in items {
                    let name = item.as_identifier().ok_or_else(|| {
                        self.fail(format!("tool entries must be names, found {}", item.describe()))
                    })?;
                    self.register_tool(name);
                    calls.push(("bind_tool", JsExpr::ident(name)));
                }
                Ok(calls)
            }
            "output" => {
                self.reject_unknown(modifier, &["schema"])?;
                let schema = modifier
                    .arg("schema")
                    .or_else(|| modifier.positional())
                    .ok_or_else(|| self.fail("output requires a 'schema' argument"))?;
                let value = match schema {
                    Expr::Identifier(name) => self.reference(name, true),
                    Expr::Object(_) => self.lower_value(schema)?,
                    other => {
                        return Err(self.fail(format!(
                            "output expects a schema name, found {}",
                            other.describe()
                        )));
                    }
                };
                Ok(vec![("bind_structure", value)])
            }
            other => Err(self.fail(format!("unknown modifier '{other}'"))),
        }
    }

    fn register_tool(&mut self, name: &str) {
        if !self.declared.contains(name) {
            tracing::warn!(tool = name, line = self.line, "tool '{}' is not declared", name);
        }
        if !self.tools.iter().any(|t| t == name) {
            self.tools.push(name.to_string());
        }
    }

    fn reference(&mut self, name: &str, check: bool) -> JsExpr {
        match name {
            "Input" | "StringOutput" => {
                self.require(name);
                JsExpr::construct(name, vec![])
            }
            _ => {
                if check && !self.declared.contains(name) {
                    tracing::warn!(
                        name,
                        line = self.line,
                        "'{}' is referenced but never declared",
                        name
                    );
                }
                JsExpr::ident(name)
            }
        }
    }

    /// Tool registry and memory contexts, empty when neither exists
    fn context_section(&mut self) -> Vec<JsStmt> {
        let mut lines = Vec::new();

        if !self.tools.is_empty() {
            self.require("ChainContext");
            lines.push(JsStmt::constant(
                SHARED_CONTEXT,
                JsExpr::construct("ChainContext", vec![]),
            ));
            lines.push(JsStmt::constant(REGISTRY, JsExpr::construct("Map", vec![])));
            for tool in &self.tools {
                lines.push(JsStmt::Expr(JsExpr::ident(REGISTRY).method(
                    "set",
                    vec![JsExpr::ident(tool).member("name"), JsExpr::ident(tool)],
                )));
            }
            lines.push(JsStmt::Expr(JsExpr::ident(SHARED_CONTEXT).method(
                "set",
                vec![JsExpr::string("tool_registry"), JsExpr::ident(REGISTRY)],
            )));
        }

        for (chain, config) in &self.contexts {
            if !lines.is_empty() {
                lines.push(JsStmt::Blank);
            }
            let name = context_name(chain);
            lines.push(JsStmt::constant(
                &name,
                JsExpr::construct("ChainContext", vec![]),
            ));
            lines.push(JsStmt::Expr(JsExpr::ident(&name).method(
                "set",
                vec![JsExpr::string("memory"), config.clone()],
            )));
            if !self.tools.is_empty() {
                lines.push(JsStmt::Expr(JsExpr::ident(&name).method(
                    "set",
                    vec![JsExpr::string("tool_registry"), JsExpr::ident(REGISTRY)],
                )));
            }
        }

        lines
    }
}

fn lower_literal(literal: &Literal) -> JsExpr {
    match literal {
        Literal::String(value) => JsExpr::string(value),
        Literal::Number(value) => JsExpr::Number(*value),
        Literal::Boolean(value) => JsExpr::Bool(*value),
        Literal::TemplateVar(name) => JsExpr::string(format!("{{{name}}}")),
    }
}

/// Parse and generate with default settings
#[cfg(test)]
pub(crate) fn generate_source(source: &str) -> Result<String> {
    let program = linklang_core::parse_source(source)?;
    Generator::new().generate("test.chain", &program)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "// Generated by linklang from test.chain. Do not edit.\n";

    #[test]
    fn test_empty_program() {
        let code = generate_source("").unwrap();
        assert_eq!(code, HEADER);
    }

    #[test]
    fn test_simple_chain() {
        let code = generate_source("def m = Model()\nchain Main = Input >> m >> StringOutput").unwrap();
        let expected = format!(
            "{HEADER}import {{ Chain, Input, Model, StringOutput }} from \"../dist/tinychain.esm.js\";

const m = new Model();

const Main = new Chain(\"Main\");
Main.addNode(new Input());
Main.addNode(m);
Main.addNode(new StringOutput());

// Execution helpers
export async function run_Main(input) {{
    const res = await Main.async_invoke(input);
    console.log(res.content);
    return res;
}}
"
        );
        assert_eq!(code, expected);
    }

    #[test]
    fn test_def_with_bind_materialises_then_binds() {
        let source = r#"
def W = Tool(name="weather", func=getWeather)
def agent = Model() @ bind(tools=[W]) @ output(Report)
schema Report { city: string }
"#;
        let code = generate_source(source).unwrap();
        let materialise = code.find("const agent = new Model();").unwrap();
        let bind = code.find("agent.bind_tool(W);").unwrap();
        let structure = code.find("agent.bind_structure(Report);").unwrap();
        assert!(materialise < bind && bind < structure);
    }

    #[test]
    fn test_tool_registry_registered_once() {
        let source = r#"
def W = Tool(name="weather", func=getWeather)
def a = Model() @ bind(tools=[W])
def b = Model() @ bind(tools=[W])
chain Main = Input >> a >> StringOutput
"#;
        let code = generate_source(source).unwrap();
        assert_eq!(code.matches("toolRegistry.set(W.name, W);").count(), 1);
        assert!(code.contains("const ctx = new ChainContext();"));
        assert!(code.contains("ctx.set(\"tool_registry\", toolRegistry);"));
        assert!(code.contains("await Main.async_invoke(input, ctx);"));
        assert!(code.contains("ChainContext"));

        let registry = code.find("const toolRegistry").unwrap();
        let last_def = code.find("b.bind_tool(W);").unwrap();
        let helper = code.find("export async function run_Main").unwrap();
        assert!(last_def < registry && registry < helper);
    }

    #[test]
    fn test_inline_bind_in_pipeline_chains_calls() {
        let source = r#"
def W = Tool(name="weather", func=getWeather)
def llm = Model()
chain Main = Input >> llm @ bind(tools=[W]) >> StringOutput
"#;
        let code = generate_source(source).unwrap();
        assert!(code.contains("Main.addNode(llm.bind_tool(W));"));
    }

    #[test]
    fn test_memory_context() {
        let source = "def m = Model()\nchain Chat = with memory(window=10) {\n    Input >> m >> StringOutput\n}";
        let code = generate_source(source).unwrap();
        assert!(code.contains("const Chat_ctx = new ChainContext();"));
        assert!(code.contains("Chat_ctx.set(\"memory\", { window: 10 });"));
        assert!(code.contains("await Chat.async_invoke(input, Chat_ctx);"));
    }

    #[test]
    fn test_literal_def_and_template_var() {
        let code = generate_source("def greeting = \"hi\"\ndef slot = {{name}}").unwrap();
        assert!(code.contains("const greeting = \"hi\";"));
        assert!(code.contains("const slot = \"{name}\";"));
    }

    #[test]
    fn test_literal_pipeline_step_is_error() {
        let err = generate_source("chain Main = Input >> \"oops\"").unwrap_err();
        match err {
            Error::Lowering { context, line, message } => {
                assert_eq!(context, "chain 'Main'");
                assert_eq!(line, 1);
                assert!(message.contains("string literal"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_modifier_is_error() {
        let err = generate_source("def m = Model() @ cache(ttl=3)").unwrap_err();
        assert!(err.to_string().contains("unknown modifier 'cache'"));
    }

    #[test]
    fn test_bind_requires_identifier_tools() {
        let err = generate_source("def m = Model() @ bind(tools=[\"W\"])").unwrap_err();
        assert!(err.to_string().contains("tool entries must be names"));
    }

    #[test]
    fn test_undeclared_reference_is_permissive() {
        let code = generate_source("chain Main = Input >> ghost").unwrap();
        assert!(code.contains("Main.addNode(ghost);"));
    }

    #[test]
    fn test_debug_comments() {
        let program = linklang_core::parse_source("def m = Model()").unwrap();
        let code = Generator::new()
            .with_debug_comments()
            .generate("test.chain", &program)
            .unwrap();
        assert!(code.contains("// def m (line 1)\nconst m = new Model();"));
    }

    #[test]
    fn test_custom_target() {
        let program = linklang_core::parse_source("def m = Model()\nchain Main = m").unwrap();
        let code = Generator::new()
            .with_runtime_module("tinychain")
            .with_invoke_method("invoke")
            .generate("test.chain", &program)
            .unwrap();
        assert!(code.contains("from \"tinychain\";"));
        assert!(code.contains("await Main.invoke(input);"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let source = r#"
def W = Tool(name="weather", func=getWeather)
def B = Tool(name="b", func=b)
def m = Model() @ bind(tools=[W, B])
chain Main = Input >> m >> StringOutput
"#;
        assert_eq!(generate_source(source).unwrap(), generate_source(source).unwrap());
    }
}
