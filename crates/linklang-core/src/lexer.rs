//! Lexer
//!
//! Converts chain source text into an ordered sequence of [`Token`]s.
//!
//! Tokenization is a single greedy pass over an ordered rule table: at each
//! position the first rule whose anchored pattern matches wins. Multi-character
//! operators come before their single-character prefixes, and `{{name}}`
//! comes before `{`. Whitespace and comments advance the position bookkeeping
//! but emit nothing; newlines are emitted because they terminate statements.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::token::{Keyword, Token, TokenKind};

/// What to do with the text matched by a rule
#[derive(Debug, Clone, Copy)]
enum Action {
    /// Discard (whitespace, comments)
    Skip,
    /// Emit a token of a fixed kind
    Emit(TokenKind),
    /// Emit a keyword token, resolved from the matched word
    Keyword,
}

struct Rule {
    action: Action,
    pattern: Regex,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let keywords = Keyword::ALL
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join("|");

    let table: Vec<(Action, String)> = vec![
        (Action::Skip, r"^[ \t\r]+".into()),
        (Action::Skip, r"^//[^\n]*".into()),
        (Action::Emit(TokenKind::Newline), r"^\n".into()),
        (Action::Emit(TokenKind::String), r#"^"""(?s:.*?)""""#.into()),
        (Action::Emit(TokenKind::Pipe), r"^>>".into()),
        (Action::Emit(TokenKind::Arrow), r"^=>".into()),
        (Action::Emit(TokenKind::Assign), r"^=".into()),
        (Action::Emit(TokenKind::Colon), r"^:".into()),
        (Action::Emit(TokenKind::Comma), r"^,".into()),
        (Action::Emit(TokenKind::Bind), r"^@".into()),
        (
            Action::Emit(TokenKind::TemplateVar),
            r"^\{\{[A-Za-z_][A-Za-z0-9_]*\}\}".into(),
        ),
        (Action::Emit(TokenKind::LBrace), r"^\{".into()),
        (Action::Emit(TokenKind::RBrace), r"^\}".into()),
        (Action::Emit(TokenKind::LParen), r"^\(".into()),
        (Action::Emit(TokenKind::RParen), r"^\)".into()),
        (Action::Emit(TokenKind::LBracket), r"^\[".into()),
        (Action::Emit(TokenKind::RBracket), r"^\]".into()),
        (Action::Keyword, format!(r"^(?:{keywords})\b")),
        (Action::Emit(TokenKind::Number), r"^[0-9]+(?:\.[0-9]+)?".into()),
        (Action::Emit(TokenKind::String), r#"^"(?s:\\.|[^"\\])*""#.into()),
        (
            Action::Emit(TokenKind::Identifier),
            r"^[A-Za-z_][A-Za-z0-9_]*".into(),
        ),
    ];

    table
        .into_iter()
        .map(|(action, pattern)| Rule {
            action,
            pattern: Regex::new(&pattern).expect("lexer rule table is valid"),
        })
        .collect()
});

/// Tokenize a complete source unit
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

/// Single-pass lexer over one source unit
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned at the start of `source`
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Produce the full token sequence, terminated by [`TokenKind::Eof`]
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            let Some((action, text)) = Self::match_rule(rest) else {
                // Only reachable when rest is non-empty
                let character = rest.chars().next().unwrap_or_default();
                return Err(Error::Lex {
                    character,
                    line: self.line,
                    column: self.column,
                });
            };

            let (line, column) = (self.line, self.column);
            match action {
                Action::Skip => {}
                Action::Emit(kind) => tokens.push(Token::new(kind, text, line, column)),
                Action::Keyword => {
                    let kind = Keyword::from_word(text)
                        .map(TokenKind::Keyword)
                        .unwrap_or(TokenKind::Identifier);
                    tokens.push(Token::new(kind, text, line, column));
                }
            }
            self.advance(text);
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.column));
        tracing::debug!(tokens = tokens.len(), lines = self.line, "tokenized source");
        Ok(tokens)
    }

    fn match_rule(rest: &str) -> Option<(Action, &str)> {
        RULES.iter().find_map(|rule| {
            rule.pattern
                .find(rest)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| (rule.action, m.as_str()))
        })
    }

    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += text.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_def_statement_tokens() {
        let tokens = tokenize(r#"def m = Model(model_name="x")"#).unwrap();
        let got: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (TokenKind::Keyword(Keyword::Def), "def"),
                (TokenKind::Identifier, "m"),
                (TokenKind::Assign, "="),
                (TokenKind::Keyword(Keyword::Model), "Model"),
                (TokenKind::LParen, "("),
                (TokenKind::Identifier, "model_name"),
                (TokenKind::Assign, "="),
                (TokenKind::String, "\"x\""),
                (TokenKind::RParen, ")"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[rstest]
    #[case(">>", TokenKind::Pipe)]
    #[case("=>", TokenKind::Arrow)]
    #[case("=", TokenKind::Assign)]
    #[case("@", TokenKind::Bind)]
    #[case("{{question}}", TokenKind::TemplateVar)]
    #[case("{", TokenKind::LBrace)]
    #[case("42", TokenKind::Number)]
    #[case("0.75", TokenKind::Number)]
    #[case(r#""hi \"there\"""#, TokenKind::String)]
    #[case("definitely", TokenKind::Identifier)]
    #[case("Router", TokenKind::Keyword(Keyword::Router))]
    fn test_single_token(#[case] source: &str, #[case] expected: TokenKind) {
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 2, "{source} should lex to one token");
        assert_eq!(tokens[0].kind, expected);
        assert_eq!(tokens[0].text, source);
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        assert_eq!(
            kinds("def_x Inputs chained"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_newlines_are_emitted_and_tracked() {
        let tokens = tokenize("def a = b\n\nchain C = a").unwrap();
        let newlines = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .count();
        assert_eq!(newlines, 2);

        let chain = tokens
            .iter()
            .find(|t| t.is_keyword(Keyword::Chain))
            .unwrap();
        assert_eq!((chain.line, chain.column), (3, 1));
    }

    #[test]
    fn test_comments_are_discarded_but_newline_kept() {
        let tokens = tokenize("// header\ndef a = b // trailing\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Newline);
        assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Def));
        assert_eq!(tokens[1].line, 2);
        assert!(tokens.iter().all(|t| !t.text.contains("//")));
    }

    #[test]
    fn test_columns_advance_over_whitespace() {
        let tokens = tokenize("a  >>\tb").unwrap();
        assert_eq!(tokens[0].column, 1);
        assert_eq!(tokens[1].column, 4);
        assert_eq!(tokens[2].column, 7);
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let source = "def p = Prompt(\"\"\"line one\nline two\"\"\")\ndef q = x";
        let tokens = tokenize(source).unwrap();
        let string = tokens
            .iter()
            .find(|t| t.kind == TokenKind::String)
            .unwrap();
        assert!(string.text.contains("line one\nline two"));

        let q = tokens.iter().find(|t| t.text == "q").unwrap();
        assert_eq!(q.line, 3);
    }

    #[test]
    fn test_template_var_is_single_token() {
        assert_eq!(
            kinds("{{ name }}"),
            vec![
                TokenKind::LBrace,
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::RBrace,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
        assert_eq!(kinds("{{name}}"), vec![TokenKind::TemplateVar, TokenKind::Eof]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("def a = b\ndef c = $x").unwrap_err();
        match err {
            Error::Lex {
                character,
                line,
                column,
            } => {
                assert_eq!(character, '$');
                assert_eq!(line, 2);
                assert_eq!(column, 9);
            }
            other => panic!("Expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_string_fails() {
        let err = tokenize("def a = \"oops").unwrap_err();
        assert!(matches!(err, Error::Lex { character: '"', .. }));
    }

    #[test]
    fn test_eof_is_always_last() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    }

    #[test]
    fn test_token_texts_rejoin_to_equivalent_stream() {
        let source = r#"
// pipeline
def llm = Model(model_name="qwen", temperature=0.2) @ bind(tools=[Weather])
chain Main = Input >> llm >> StringOutput
"#;
        let first = tokenize(source).unwrap();
        let rejoined = first
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = tokenize(&rejoined).unwrap();

        let strip = |tokens: &[Token]| {
            tokens
                .iter()
                .map(|t| (t.kind, t.text.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[test]
    fn test_every_character_is_accounted_for() {
        let source = "def a = Model()  // c\nchain B = a";
        let tokens = tokenize(source).unwrap();
        let emitted: usize = tokens.iter().map(|t| t.text.len()).sum();
        // three spaces per statement plus the trailing comment run
        let discarded = 3 + "  // c".len() + 3;
        assert_eq!(emitted + discarded, source.len());
    }
}
