//! Parser error diagnostics

use crate::lexer::LexError;
use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while parsing a source file
#[derive(Debug, Error, Diagnostic)]
pub enum ParserError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    /// Generic expected/found mismatch
    #[error("expected {expected}, found `{found}`")]
    #[diagnostic(code(tarn::parse::unexpected_token))]
    UnexpectedToken {
        #[label("unexpected token")]
        span: miette::SourceSpan,
        expected: String,
        found: String,
    },

    #[error("expected an expression, found `{found}`")]
    #[diagnostic(code(tarn::parse::expected_expression))]
    ExpectedExpression {
        #[label("expected an expression here")]
        span: miette::SourceSpan,
        found: String,
    },

    #[error("expected a type, found `{found}`")]
    #[diagnostic(code(tarn::parse::expected_type))]
    ExpectedType {
        #[label("expected a type here")]
        span: miette::SourceSpan,
        found: String,
    },

    /// Every file must open with `module <name>`
    #[error("missing module clause")]
    #[diagnostic(
        code(tarn::parse::missing_module),
        help("every Tarn file starts with `module <name>`")
    )]
    MissingModuleClause {
        #[label("expected `module` here")]
        span: miette::SourceSpan,
    },
}
