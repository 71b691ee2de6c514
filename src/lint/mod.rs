//! Lint framework
//!
//! A registry of independent rules, each walking the tree and emitting
//! issues. The registry is an explicit value built by the driver; there is
//! no process-wide rule state. Findings are data, never control flow — a
//! rule can only ever report, not abort the run.

pub mod rules;

use crate::ast::File;
use crate::common::{Position, SourceFile};
use serde::{Deserialize, Serialize};

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A linting issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub position: Position,
    pub message: String,
    pub severity: Severity,
}

impl Issue {
    pub fn warning(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.severity, self.message)
    }
}

/// A lint rule
pub trait LintRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Check one file, returning issues in discovery order
    fn check(&self, file: &File, src: &SourceFile) -> Vec<Issue>;
}

/// Lint engine: an ordered registry of rules
#[derive(Default)]
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
}

impl Linter {
    /// Create an empty linter
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a linter with the built-in rules registered
    pub fn with_default_rules() -> Self {
        let mut linter = Self::new();
        linter.register(Box::new(rules::UnusedImports));
        linter.register(Box::new(rules::UncheckedErrors::default()));
        linter
    }

    /// Register a rule
    pub fn register(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Registered rules, in registration order
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Run every rule over one file. Issues appear in rule registration
    /// order, then in each rule's discovery order; the result is
    /// deterministic for an unmodified file.
    pub fn run_all(&self, file: &File, src: &SourceFile) -> Vec<Issue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            issues.extend(rule.check(file, src));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    #[test]
    fn test_registry_order_is_run_order() {
        struct Stub(&'static str);
        impl LintRule for Stub {
            fn name(&self) -> &'static str {
                self.0
            }
            fn description(&self) -> &'static str {
                "stub"
            }
            fn check(&self, _file: &File, src: &SourceFile) -> Vec<Issue> {
                vec![Issue::warning(
                    src.position(crate::common::Span::dummy()),
                    self.0,
                )]
            }
        }

        let mut linter = Linter::new();
        linter.register(Box::new(Stub("first")));
        linter.register(Box::new(Stub("second")));

        let src = SourceFile::from_str("module m\n");
        let file = parse_source(&src.content).unwrap();
        let issues = linter.run_all(&file, &src);
        assert_eq!(issues[0].message, "first");
        assert_eq!(issues[1].message, "second");
    }

    #[test]
    fn test_default_rules_registered() {
        let linter = Linter::with_default_rules();
        let names: Vec<&str> = linter.rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["unused-import", "error-check"]);
    }
}
