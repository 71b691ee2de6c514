//! Tarn source toolkit
//!
//! Analysis and transformation tooling for the Tarn language:
//! - Lint rules (unused imports, unchecked error-returning calls)
//! - Scope-heuristic rename and signature refactorings
//! - Boilerplate generation from struct shape reflection
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → { Lint | Refactor → Printer | Generate }
//! ```
//!
//! The core engines operate purely on the tree: parsing and re-emission are
//! collaborator seams (`parser`, `printer::SourceFormatter`), and identifier
//! classification sits behind `classify::Classifier` so a rigorous resolver
//! can replace the structural heuristic without touching rule or
//! refactoring logic.

pub mod ast;
pub mod classify;
pub mod common;
pub mod driver;
pub mod generate;
pub mod lexer;
pub mod lint;
pub mod parser;
pub mod printer;
pub mod refactor;
pub mod walk;

// Re-exports for convenience
pub use ast::File;
pub use classify::{Classifier, HeuristicClassifier, IdentRole};
pub use common::{Position, SourceFile, Span};
pub use lint::{Issue, Linter, Severity};

/// Toolkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse source text into an AST
pub fn parse(source: &str) -> Result<File, parser::ParserError> {
    parser::parse_source(source)
}

/// Print a tree as canonical source
pub fn print(file: &File) -> String {
    printer::print(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_print_facade() {
        let file = parse("module m\n").unwrap();
        assert_eq!(print(&file), "module m\n");
    }
}
