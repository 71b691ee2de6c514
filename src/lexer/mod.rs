//! Lexer for the Tarn language
//!
//! Tokenizes source code into a stream of tokens using the Logos library.
//! Plain comments are skipped; `///` doc comments are kept as tokens so the
//! parser can attach them to the following declaration.

pub mod tokens;

pub use tokens::{Token, TokenKind};

use crate::common::Span;
use logos::Logos;
use miette::Diagnostic;
use thiserror::Error;

/// Lexer failure
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("unexpected character `{text}`")]
#[diagnostic(code(tarn::lex))]
pub struct LexError {
    #[label("not a valid token")]
    pub at: miette::SourceSpan,
    pub text: String,
}

/// Lex source code into tokens
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => {
                return Err(LexError {
                    at: (span.start, span.end - span.start).into(),
                    text: source[span].to_string(),
                });
            }
        };

        tokens.push(Token {
            kind,
            span: Span::new(span.start, span.end),
            text: source[span].to_string(),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(source.len(), source.len()),
        text: String::new(),
    });

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_simple() {
        let tokens = lex("x := 42").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[1].kind, TokenKind::ColonEq);
        assert_eq!(tokens[2].kind, TokenKind::IntLit);
        assert_eq!(tokens[2].text, "42");
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lex_keywords() {
        let tokens = lex("module import fn type struct var").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Module);
        assert_eq!(tokens[1].kind, TokenKind::Import);
        assert_eq!(tokens[2].kind, TokenKind::Fn);
        assert_eq!(tokens[3].kind, TokenKind::Type);
        assert_eq!(tokens[4].kind, TokenKind::Struct);
        assert_eq!(tokens[5].kind, TokenKind::Var);
    }

    #[test]
    fn test_lex_field_tag() {
        let tokens = lex(r#"id int64 `json:"id" db:"user_id"`"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[2].kind, TokenKind::RawTag);
        assert_eq!(tokens[2].text, r#"`json:"id" db:"user_id"`"#);
    }

    #[test]
    fn test_lex_comments_skipped() {
        let tokens = lex("x := 1 // trailing\n/* block */ y := 2").unwrap();
        let idents: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(idents, vec!["x", "y"]);
    }

    #[test]
    fn test_lex_doc_comment_kept() {
        let tokens = lex("/// a user record\ntype User struct {}").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DocComment);
        assert_eq!(tokens[0].text, "/// a user record");
        assert_eq!(tokens[1].kind, TokenKind::Type);
    }

    #[test]
    fn test_lex_blank_identifier() {
        let tokens = lex("_, err := Read()").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Underscore);
        assert_eq!(tokens[1].kind, TokenKind::Comma);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[2].text, "err");
    }

    #[test]
    fn test_lex_error() {
        let err = lex("x := @").unwrap_err();
        assert_eq!(err.text, "@");
    }
}
