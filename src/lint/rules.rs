//! Built-in lint rules

use super::{Issue, LintRule};
use crate::ast::{Expr, File, Stmt};
use crate::common::{Position, SourceFile};
use crate::walk::{self, Node, NodeKind};
use rustc_hash::FxHashMap;

/// Detects imports that are never referenced.
///
/// An import used anywhere in the file, even once, is never flagged.
/// `_` (side-effect) and `.` (dot) imports are skipped: the first is a
/// deliberate no-op binding, the second cannot be tracked by name.
pub struct UnusedImports;

impl LintRule for UnusedImports {
    fn name(&self) -> &'static str {
        "unused-import"
    }

    fn description(&self) -> &'static str {
        "Detects unused imports in the code"
    }

    fn check(&self, file: &File, src: &SourceFile) -> Vec<Issue> {
        let mut pending: FxHashMap<&str, Position> = FxHashMap::default();
        for import in &file.imports {
            let name = import.local_name();
            if name == "_" || name == "." {
                continue;
            }
            pending.insert(name, src.position(import.span));
        }

        if pending.is_empty() {
            return Vec::new();
        }

        // Every identifier occurrence counts as a use, including the base of
        // a qualified access like `json.Marshal` (the base is an identifier
        // node of its own)
        walk::walk(file, Some(&[NodeKind::Ident]), |node| {
            if let Node::Expr(Expr::Ident { name, .. }) = node {
                pending.remove(name.as_str());
            }
            true
        });

        // Report leftovers in import declaration order, not map order
        file.imports
            .iter()
            .filter_map(|import| {
                pending
                    .get(import.local_name())
                    .map(|pos| (import.local_name(), pos.clone()))
            })
            .map(|(name, pos)| Issue::warning(pos, format!("unused import: {}", name)))
            .collect()
    }
}

/// Flags fallible calls whose error result is dropped.
///
/// Two patterns: a multi-value assignment whose last target is the `_`
/// discard binding, and a bare expression-statement call whose callee name
/// starts with one of the configured prefixes conventionally associated
/// with fallible operations. Both are warnings — the rule never blocks
/// further analysis.
pub struct UncheckedErrors {
    prefixes: Vec<String>,
}

impl UncheckedErrors {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Matched against the final segment of the callee name, so
    /// `store.OpenBucket()` matches the `Open` prefix.
    fn matches_prefix(&self, callee: &str) -> bool {
        let last = callee.rsplit('.').next().unwrap_or(callee);
        self.prefixes.iter().any(|p| last.starts_with(p.as_str()))
    }
}

impl Default for UncheckedErrors {
    fn default() -> Self {
        Self::new(
            ["Create", "New", "Open", "Read", "Write"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

impl LintRule for UncheckedErrors {
    fn name(&self) -> &'static str {
        "error-check"
    }

    fn description(&self) -> &'static str {
        "Ensures that errors returned from function calls are checked"
    }

    fn check(&self, file: &File, src: &SourceFile) -> Vec<Issue> {
        let mut issues = Vec::new();

        walk::walk(file, Some(&[NodeKind::Assign, NodeKind::ExprStmt]), |node| {
            let Node::Stmt(stmt) = node else {
                return true;
            };
            match stmt {
                Stmt::Assign {
                    targets, values, ..
                } => {
                    if targets.len() < 2 || values.len() != 1 {
                        return true;
                    }
                    if !matches!(values[0], Expr::Call { .. }) {
                        return true;
                    }
                    if let Some(Expr::Ident { name, span }) = targets.last() {
                        if name == "_" {
                            issues.push(Issue::warning(
                                src.position(*span),
                                "error is explicitly ignored with _",
                            ));
                        }
                    }
                }
                Stmt::Expr { expr, .. } => {
                    if let Expr::Call { callee, span, .. } = expr {
                        if let Some(name) = callee.callee_name() {
                            if self.matches_prefix(&name) {
                                issues.push(Issue::warning(
                                    src.position(*span),
                                    format!(
                                        "result of {} is ignored, but it might return an error",
                                        name
                                    ),
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
            true
        });

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::Severity;
    use crate::parser::parse_source;

    fn run_rule(rule: &dyn LintRule, source: &str) -> Vec<Issue> {
        let src = SourceFile::new("test.tn", source);
        let file = parse_source(source).unwrap();
        rule.check(&file, &src)
    }

    #[test]
    fn test_no_imports_no_issues() {
        let issues = run_rule(&UnusedImports, "module m\n\nfn f() {\n    Use(1)\n}\n");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_all_imports_used_no_issues() {
        let issues = run_rule(
            &UnusedImports,
            "module m\n\nimport \"fmt\"\n\nfn f() {\n    fmt.Println(\"hi\")\n}\n",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unused_import_flagged_at_declaration() {
        let source = "module m\n\nimport \"fmt\"\nimport \"strings\"\n\nfn f() {\n    fmt.Println(\"hi\")\n}\n";
        let issues = run_rule(&UnusedImports, source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "unused import: strings");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].position.line, 4);
    }

    #[test]
    fn test_single_qualified_use_suppresses() {
        // One use as a qualified-call base suppresses the finding no matter
        // how many other imports are unused
        let source = "module m\n\nimport \"json\"\n\nfn f(v int) []int {\n    return json.Marshal(v)\n}\n";
        let issues = run_rule(&UnusedImports, source);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_alias_tracked_not_path_segment() {
        let source = "module m\n\nimport js \"encoding/json\"\n\nfn f(v int) {\n    json.Marshal(v)\n}\n";
        let issues = run_rule(&UnusedImports, source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "unused import: js");
    }

    #[test]
    fn test_side_effect_import_skipped() {
        let source = "module m\n\nimport _ \"driver/sqlite\"\n\nfn f() {\n}\n";
        let issues = run_rule(&UnusedImports, source);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unused_issues_in_declaration_order() {
        let source = "module m\n\nimport \"alpha\"\nimport \"beta\"\n\nfn f() {\n}\n";
        let issues = run_rule(&UnusedImports, source);
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unused import: alpha", "unused import: beta"]
        );
    }

    #[test]
    fn test_discarded_error_flagged() {
        let source = "module m\n\nfn f() {\n    data, _ := ReadFile(\"x\")\n    Use(data)\n}\n";
        let issues = run_rule(&UncheckedErrors::default(), source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "error is explicitly ignored with _");
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_discard_in_first_position_not_flagged() {
        // Only the last target is heuristically an error slot
        let source = "module m\n\nfn f() {\n    _, err := ReadFile(\"x\")\n    Use(err)\n}\n";
        let issues = run_rule(&UncheckedErrors::default(), source);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_bare_fallible_call_flagged() {
        let source = "module m\n\nfn f() {\n    OpenConn(\"db\")\n}\n";
        let issues = run_rule(&UncheckedErrors::default(), source);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("OpenConn"));
    }

    #[test]
    fn test_qualified_fallible_call_matches_final_segment() {
        let source = "module m\n\nimport \"store\"\n\nfn f() {\n    store.OpenBucket(\"b\")\n}\n";
        let issues = run_rule(&UncheckedErrors::default(), source);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("store.OpenBucket"));
    }

    #[test]
    fn test_checked_call_not_flagged() {
        let source = "module m\n\nfn f() {\n    data, err := ReadFile(\"x\")\n    Use(data, err)\n}\n";
        let issues = run_rule(&UncheckedErrors::default(), source);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_custom_prefixes() {
        let rule = UncheckedErrors::new(vec!["Fetch".to_string()]);
        let source = "module m\n\nfn f() {\n    FetchAll()\n    OpenConn(\"db\")\n}\n";
        let issues = run_rule(&rule, source);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("FetchAll"));
    }

    #[test]
    fn test_lint_is_deterministic() {
        let source = "module m\n\nimport \"alpha\"\nimport \"beta\"\n\nfn f() {\n    data, _ := ReadFile(\"x\")\n    Use(data)\n}\n";
        let src = SourceFile::new("test.tn", source);
        let file = parse_source(source).unwrap();
        let linter = crate::lint::Linter::with_default_rules();
        let first = linter.run_all(&file, &src);
        let second = linter.run_all(&file, &src);
        assert_eq!(first, second);
    }
}
