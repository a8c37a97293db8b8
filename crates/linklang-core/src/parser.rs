//! Recursive-descent parser
//!
//! Consumes the token stream produced by the lexer and builds a [`Program`].
//! One token of lookahead, plus a two-token peek to tell a named argument
//! (`key = value`) from a sole positional one. The parser fails on the first
//! mismatch; it never returns a partial tree.
//!
//! # Grammar
//!
//! ```text
//! Program    := (DefStmt | ChainStmt | SchemaStmt | NEWLINE)* EOF
//! DefStmt    := 'def' ID '=' BindExpr NEWLINE?
//! ChainStmt  := 'chain' ID '=' ('with' 'memory' '(' Args ')' '{' Pipeline '}' | Pipeline) NEWLINE?
//! SchemaStmt := 'schema' ID '{' (ID ':' ID (',' | NEWLINE)?)* '}'
//! Pipeline   := BindExpr ('>>' BindExpr)*
//! BindExpr   := ExprBlock ('@' ID '(' Args ')')*
//! ExprBlock  := Expr [RouterBlock]            -- only after a call to Router
//! Expr       := (ID | KEYWORD) ['(' Args ')'] | STRING | NUMBER | TEMPLATE_VAR
//!             | '{' ObjectLiteral '}' | '[' ListLiteral ']'
//! Args       := (ID '=' Expr ','?)* | Expr
//! RouterBlock:= '{' ('case' Expr '=>' Pipeline | 'default' '=>' Pipeline | NEWLINE)* '}'
//! ```
//!
//! Newlines terminate statements. Inside brackets they are insignificant.

use crate::ast::*;
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::token::{Keyword, Token, TokenKind};

/// Lex and parse a complete source unit
pub fn parse_source(source: &str) -> Result<Program> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

/// Parser over one token sequence
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser; a missing terminal token is appended
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.text.chars().count()))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream into a program
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Def) => {
                    statements.push(Statement::Def(self.parse_def()?));
                }
                TokenKind::Keyword(Keyword::Chain) => {
                    statements.push(Statement::Chain(self.parse_chain()?));
                }
                TokenKind::Keyword(Keyword::Schema) => {
                    statements.push(Statement::Schema(self.parse_schema()?));
                }
                _ => return Err(self.error("top-level statement (def, chain, schema)")),
            }
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    fn parse_def(&mut self) -> Result<DefStatement> {
        let line = self.expect_keyword(Keyword::Def)?.line;
        let name = self.expect_identifier("definition name")?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_bind_expr()?;
        self.end_statement();

        Ok(DefStatement { name, value, line })
    }

    fn parse_chain(&mut self) -> Result<ChainStatement> {
        let line = self.expect_keyword(Keyword::Chain)?.line;
        let name = self.expect_identifier("chain name")?;
        self.expect(TokenKind::Assign, "'='")?;

        let (pipeline, context) = if self.check_keyword(Keyword::With) {
            self.advance();
            self.expect_keyword(Keyword::Memory)?;
            let context = self.parse_call(Keyword::Memory.as_str())?;
            self.expect(TokenKind::LBrace, "'{' to open the chain body")?;
            self.skip_newlines();
            let pipeline = self.parse_pipeline(true)?;
            self.skip_newlines();
            self.expect(TokenKind::RBrace, "'}' to close the chain body")?;
            (pipeline, Some(context))
        } else {
            (self.parse_pipeline(false)?, None)
        };
        self.end_statement();

        Ok(ChainStatement {
            name,
            pipeline,
            context,
            line,
        })
    }

    fn parse_schema(&mut self) -> Result<SchemaStatement> {
        let line = self.expect_keyword(Keyword::Schema)?.line;
        let name = self.expect_identifier("schema name")?;
        self.expect(TokenKind::LBrace, "'{' to open the schema body")?;
        self.skip_newlines();

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let field = self.expect_identifier("field name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let type_name = self.expect_identifier("field type")?;
            fields.push(SchemaField {
                name: field,
                type_name,
            });

            match self.current().kind {
                TokenKind::Comma | TokenKind::Newline => {
                    self.advance();
                    self.skip_newlines();
                }
                TokenKind::RBrace | TokenKind::Identifier => {}
                _ => return Err(self.error("',' or '}' in schema definition")),
            }
        }
        self.expect(TokenKind::RBrace, "'}' to close the schema body")?;
        self.end_statement();

        Ok(SchemaStatement { name, fields, line })
    }

    /// `bracketed` pipelines (router arms, `with memory` bodies) may break
    /// lines on either side of `>>`; top-level ones end at the first newline.
    fn parse_pipeline(&mut self, bracketed: bool) -> Result<Pipeline> {
        let mut steps = vec![self.parse_bind_expr()?];
        loop {
            if bracketed && self.pipe_after_newlines() {
                self.skip_newlines();
            }
            if !self.check(TokenKind::Pipe) {
                break;
            }
            self.advance();
            if bracketed {
                self.skip_newlines();
            }
            steps.push(self.parse_bind_expr()?);
        }
        Ok(Pipeline { steps })
    }

    fn parse_bind_expr(&mut self) -> Result<Expr> {
        let mut expr = self.parse_expr_block()?;
        while self.check(TokenKind::Bind) {
            self.advance();
            let name = self.expect_identifier("modifier name")?;
            let modifier = self.parse_call(&name)?;
            expr = Expr::Bind(BindExpression {
                target: Box::new(expr),
                modifier,
            });
        }
        Ok(expr)
    }

    fn parse_expr_block(&mut self) -> Result<Expr> {
        let mut expr = self.parse_expr()?;
        if let Expr::Call(call) = &mut expr {
            if call.name == Keyword::Router.as_str() && self.check(TokenKind::LBrace) {
                call.router_block = Some(self.parse_router_block()?);
            }
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    return Ok(Expr::Call(self.parse_call(&token.text)?));
                }
                let boolean = match token.text.as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                };
                Ok(match boolean {
                    Some(value) => Expr::Literal(Literal::Boolean(value)),
                    None => Expr::Identifier(token.text),
                })
            }
            TokenKind::Keyword(keyword) if keyword.is_component() => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    return Ok(Expr::Call(self.parse_call(&token.text)?));
                }
                Ok(Expr::Identifier(token.text))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal(Literal::String(unquote(&token.text))))
            }
            TokenKind::Number => {
                self.advance();
                let value = token.text.parse::<f64>().map_err(|_| Error::Parse {
                    expected: "number".to_string(),
                    found: token.describe(),
                    line: token.line,
                    column: token.column,
                })?;
                Ok(Expr::Literal(Literal::Number(value)))
            }
            TokenKind::TemplateVar => {
                self.advance();
                let name = token.text.trim_start_matches('{').trim_end_matches('}');
                Ok(Expr::Literal(Literal::TemplateVar(name.to_string())))
            }
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LBracket => self.parse_list(),
            _ => Err(self.error("expression")),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<FunctionCall> {
        self.expect(TokenKind::LParen, "'('")?;
        self.skip_newlines();

        let mut args: Vec<Argument> = Vec::new();
        let named = self.check(TokenKind::RParen)
            || (self.at_name() && self.peek(1).kind == TokenKind::Assign);

        if named {
            while !self.check(TokenKind::RParen) {
                let key_token = self.current().clone();
                let key = self.expect_name("argument name")?;
                self.expect(TokenKind::Assign, "'=' after argument name")?;
                let value = self.parse_expr()?;

                if args.iter().any(|a| a.name.as_deref() == Some(key.as_str())) {
                    return Err(duplicate("argument", &key, &key_token));
                }
                args.push(Argument {
                    name: Some(key),
                    value,
                });

                self.skip_newlines();
                if self.check(TokenKind::Comma) {
                    self.advance();
                    self.skip_newlines();
                } else if !self.check(TokenKind::RParen) {
                    return Err(self.error("',' or ')' in argument list"));
                }
            }
        } else {
            let value = self.parse_expr()?;
            args.push(Argument { name: None, value });
            self.skip_newlines();
            if self.check(TokenKind::Comma) {
                self.advance();
                self.skip_newlines();
            }
        }
        self.expect(TokenKind::RParen, "')' to close the argument list")?;

        Ok(FunctionCall::new(name, args))
    }

    fn parse_list(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LBracket, "'['")?;
        self.skip_newlines();

        let mut items = Vec::new();
        while !self.check(TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            self.skip_newlines();
            if self.check(TokenKind::Comma) {
                self.advance();
                self.skip_newlines();
            } else if !self.check(TokenKind::RBracket) {
                return Err(self.error("',' or ']' in list literal"));
            }
        }
        self.expect(TokenKind::RBracket, "']' to close the list")?;

        Ok(Expr::List(items))
    }

    fn parse_object(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();

        let mut fields: Vec<ObjectField> = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let key_token = self.current().clone();
            let key = match key_token.kind {
                TokenKind::Identifier | TokenKind::Keyword(_) => key_token.text.clone(),
                TokenKind::String => unquote(&key_token.text),
                _ => return Err(self.error("object key")),
            };
            self.advance();

            if self.check(TokenKind::Colon) || self.check(TokenKind::Assign) {
                self.advance();
            } else {
                return Err(self.error("':' after object key"));
            }
            let value = self.parse_expr()?;

            if fields.iter().any(|f| f.key == key) {
                return Err(duplicate("key", &key, &key_token));
            }
            fields.push(ObjectField { key, value });

            self.skip_newlines();
            if self.check(TokenKind::Comma) {
                self.advance();
                self.skip_newlines();
            } else if !self.check(TokenKind::RBrace) {
                return Err(self.error("',' or '}' in object literal"));
            }
        }
        self.expect(TokenKind::RBrace, "'}' to close the object")?;

        Ok(Expr::Object(fields))
    }

    fn parse_router_block(&mut self) -> Result<RouterBlock> {
        self.expect(TokenKind::LBrace, "'{' to open the router block")?;

        let mut block = RouterBlock::default();
        loop {
            self.skip_newlines();
            match self.current().kind {
                TokenKind::RBrace => break,
                TokenKind::Keyword(Keyword::Case) => {
                    self.advance();
                    let condition = self.parse_expr()?;
                    self.expect(TokenKind::Arrow, "'=>' after case condition")?;
                    let action = self.parse_pipeline(true)?;
                    block.cases.push(RouterCase { condition, action });
                }
                TokenKind::Keyword(Keyword::Default) => {
                    let token = self.current().clone();
                    if block.default_action.is_some() {
                        return Err(duplicate("router arm", "default", &token));
                    }
                    self.advance();
                    self.expect(TokenKind::Arrow, "'=>' after default")?;
                    block.default_action = Some(self.parse_pipeline(true)?);
                }
                _ => return Err(self.error("'case', 'default' or '}' in router block")),
            }
            if self.check(TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace, "'}' to close the router block")?;

        Ok(block)
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn pipe_after_newlines(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| t.kind != TokenKind::Newline)
            .is_some_and(|t| t.kind == TokenKind::Pipe)
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.pos += 1;
        }
    }

    /// Statements end at a newline, at EOF, or right before the next keyword
    fn end_statement(&mut self) {
        if self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("keyword '{keyword}'")))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().text)
        } else {
            Err(self.error(what))
        }
    }

    /// Identifier or keyword; keywords such as `schema` are valid argument names
    fn expect_name(&mut self, what: &str) -> Result<String> {
        if self.at_name() {
            Ok(self.advance().text)
        } else {
            Err(self.error(what))
        }
    }

    fn at_name(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Identifier | TokenKind::Keyword(_)
        )
    }

    fn error(&self, expected: &str) -> Error {
        let token = self.current();
        Error::Parse {
            expected: expected.to_string(),
            found: token.describe(),
            line: token.line,
            column: token.column,
        }
    }
}

fn duplicate(what: &str, name: &str, at: &Token) -> Error {
    Error::Parse {
        expected: format!("unique {what}"),
        found: format!("duplicate {what} '{name}'"),
        line: at.line,
        column: at.column,
    }
}

/// Strip quotes from a string token and resolve escapes.
/// Triple-quoted strings are taken verbatim.
fn unquote(text: &str) -> String {
    if let Some(inner) = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
    {
        return inner.to_string();
    }

    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
