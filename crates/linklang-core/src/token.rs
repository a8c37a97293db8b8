//! Token types produced by the lexer

use std::fmt;

/// A single lexical token with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token class
    pub kind: TokenKind,

    /// Exact source text of the token
    pub text: String,

    /// 1-based line of the first character
    pub line: usize,

    /// 1-based column of the first character
    pub column: usize,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Whether this token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Human readable description used in parse errors
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Keyword(_)
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::TemplateVar
            | TokenKind::Identifier => format!("{} '{}'", self.kind, self.text),
            _ => self.kind.to_string(),
        }
    }
}

/// Token class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `\n`, a statement terminator
    Newline,
    /// `>>`
    Pipe,
    /// `=>`
    Arrow,
    /// `=`
    Assign,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `@`
    Bind,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Reserved word
    Keyword(Keyword),
    /// Integer or decimal number
    Number,
    /// Double-quoted or triple-quoted string, quotes included
    String,
    /// `{{name}}`
    TemplateVar,
    /// Name that is not a keyword
    Identifier,
    /// Terminal token, always last
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Newline => "newline",
            TokenKind::Pipe => "'>>'",
            TokenKind::Arrow => "'=>'",
            TokenKind::Assign => "'='",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Bind => "'@'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::TemplateVar => "template variable",
            TokenKind::Identifier => "identifier",
            TokenKind::Eof => "end of input",
        };
        f.write_str(name)
    }
}

/// Reserved words of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `def`
    Def,
    /// `chain`
    Chain,
    /// `schema`
    Schema,
    /// `with`
    With,
    /// `memory`
    Memory,
    /// `case`
    Case,
    /// `default`
    Default,
    /// `Input`
    Input,
    /// `StringOutput`
    StringOutput,
    /// `Builtin`
    Builtin,
    /// `Model`
    Model,
    /// `Prompt`
    Prompt,
    /// `Tool`
    Tool,
    /// `Router`
    Router,
}

impl Keyword {
    /// All keywords, in the order they are listed in the grammar
    pub const ALL: [Keyword; 14] = [
        Keyword::Def,
        Keyword::Chain,
        Keyword::Schema,
        Keyword::With,
        Keyword::Memory,
        Keyword::Case,
        Keyword::Default,
        Keyword::Input,
        Keyword::StringOutput,
        Keyword::Builtin,
        Keyword::Model,
        Keyword::Prompt,
        Keyword::Tool,
        Keyword::Router,
    ];

    /// Source spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Def => "def",
            Keyword::Chain => "chain",
            Keyword::Schema => "schema",
            Keyword::With => "with",
            Keyword::Memory => "memory",
            Keyword::Case => "case",
            Keyword::Default => "default",
            Keyword::Input => "Input",
            Keyword::StringOutput => "StringOutput",
            Keyword::Builtin => "Builtin",
            Keyword::Model => "Model",
            Keyword::Prompt => "Prompt",
            Keyword::Tool => "Tool",
            Keyword::Router => "Router",
        }
    }

    /// Look up a keyword by its exact spelling
    pub fn from_word(word: &str) -> Option<Keyword> {
        Keyword::ALL.into_iter().find(|k| k.as_str() == word)
    }

    /// Keywords that name runtime components and may appear in expressions
    pub fn is_component(self) -> bool {
        matches!(
            self,
            Keyword::Input
                | Keyword::StringOutput
                | Keyword::Builtin
                | Keyword::Model
                | Keyword::Prompt
                | Keyword::Tool
                | Keyword::Router
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
