//! Rename refactorings
//!
//! Each rename locates every identifier occurrence matching the old name,
//! classifies it, and only rewrites occurrences whose role matches the
//! operation's target role — so `rename-variable x:y` cannot touch a type
//! or function that happens to share the name.

use super::{RefactorError, Refactoring};
use crate::ast::*;
use crate::classify::{Classifier, HeuristicClassifier, IdentRole};
use crate::common::Span;
use rustc_hash::FxHashSet;

/// Rename a function and its call sites
pub struct RenameFunction {
    pub old_name: String,
    pub new_name: String,
}

impl Refactoring for RenameFunction {
    fn describe(&self) -> String {
        format!(
            "Rename function from '{}' to '{}'",
            self.old_name, self.new_name
        )
    }

    fn apply(&self, file: &mut File) -> Result<bool, RefactorError> {
        Ok(rename_role(
            file,
            &self.old_name,
            &self.new_name,
            IdentRole::Function,
        ))
    }
}

/// Rename a type at its declaration and every type-position usage
pub struct RenameType {
    pub old_name: String,
    pub new_name: String,
}

impl Refactoring for RenameType {
    fn describe(&self) -> String {
        format!(
            "Rename type from '{}' to '{}'",
            self.old_name, self.new_name
        )
    }

    fn apply(&self, file: &mut File) -> Result<bool, RefactorError> {
        Ok(rename_role(
            file,
            &self.old_name,
            &self.new_name,
            IdentRole::Type,
        ))
    }
}

/// Rename a variable binding and its uses
pub struct RenameVariable {
    pub old_name: String,
    pub new_name: String,
}

impl Refactoring for RenameVariable {
    fn describe(&self) -> String {
        format!(
            "Rename variable from '{}' to '{}'",
            self.old_name, self.new_name
        )
    }

    fn apply(&self, file: &mut File) -> Result<bool, RefactorError> {
        Ok(rename_role(
            file,
            &self.old_name,
            &self.new_name,
            IdentRole::Variable,
        ))
    }
}

/// Classify the file, collect the spans of matching occurrences in the
/// requested role, then rewrite exactly those spans in place.
fn rename_role(file: &mut File, old_name: &str, new_name: &str, role: IdentRole) -> bool {
    let spans: FxHashSet<Span> = HeuristicClassifier::new()
        .classify_file(file)
        .into_iter()
        .filter(|occ| occ.name == old_name && occ.role == role)
        .map(|occ| occ.span)
        .collect();

    if spans.is_empty() {
        return false;
    }

    let mut renamer = Renamer {
        spans,
        new_name: new_name.to_string(),
        changed: false,
    };
    renamer.file(file);
    renamer.changed
}

/// Rewrites identifier text at pre-approved spans
struct Renamer {
    spans: FxHashSet<Span>,
    new_name: String,
    changed: bool,
}

impl Renamer {
    fn rewrite(&mut self, name: &mut String, span: Span) {
        if self.spans.contains(&span) {
            *name = self.new_name.clone();
            self.changed = true;
        }
    }

    fn file(&mut self, file: &mut File) {
        for decl in &mut file.decls {
            match decl {
                Decl::Func(func) => self.func(func),
                Decl::Type(decl) => self.type_decl(decl),
                Decl::Var(decl) => self.var_decl(decl),
            }
        }
    }

    fn func(&mut self, func: &mut FuncDecl) {
        self.rewrite(&mut func.name, func.name_span);
        if let Some(recv) = &mut func.receiver {
            self.rewrite(&mut recv.name, recv.name_span);
            let ty_span = recv.ty_span;
            self.rewrite(&mut recv.ty, ty_span);
        }
        for param in &mut func.params {
            self.rewrite(&mut param.name, param.name_span);
            self.type_expr(&mut param.ty);
        }
        for result in &mut func.results {
            self.type_expr(result);
        }
        self.block(&mut func.body);
    }

    fn type_decl(&mut self, decl: &mut TypeDecl) {
        self.rewrite(&mut decl.name, decl.name_span);
        match &mut decl.kind {
            TypeKind::Struct(st) => {
                for field in &mut st.fields {
                    let name_span = field.name_span;
                    if let Some(name) = &mut field.name {
                        self.rewrite(name, name_span);
                    }
                    self.type_expr(&mut field.ty);
                }
            }
            TypeKind::Alias(ty) => self.type_expr(ty),
        }
    }

    fn var_decl(&mut self, decl: &mut VarDecl) {
        self.rewrite(&mut decl.name, decl.name_span);
        if let Some(ty) = &mut decl.ty {
            self.type_expr(ty);
        }
        if let Some(value) = &mut decl.value {
            self.expr(value);
        }
    }

    fn block(&mut self, block: &mut Block) {
        for stmt in &mut block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Assign {
                targets, values, ..
            } => {
                for target in targets {
                    self.expr(target);
                }
                for value in values {
                    self.expr(value);
                }
            }
            Stmt::Expr { expr, .. } => self.expr(expr),
            Stmt::Var(decl) => self.var_decl(decl),
            Stmt::Return { values, .. } => {
                for value in values {
                    self.expr(value);
                }
            }
            Stmt::If {
                cond,
                then_block,
                else_branch,
                ..
            } => {
                self.expr(cond);
                self.block(then_block);
                if let Some(branch) = else_branch {
                    self.stmt(branch);
                }
            }
            Stmt::For { cond, body, .. } => {
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                self.block(body);
            }
            Stmt::Block(block) => self.block(block),
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident { name, span } => {
                let span = *span;
                self.rewrite(name, span);
            }
            Expr::Selector {
                base,
                field,
                field_span,
                ..
            } => {
                self.expr(base);
                let field_span = *field_span;
                self.rewrite(field, field_span);
            }
            Expr::Call { callee, args, .. } => {
                self.expr(callee);
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Literal { .. } => {}
            Expr::Unary { operand, .. } => self.expr(operand),
            Expr::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::Paren { inner, .. } => self.expr(inner),
            Expr::Index { base, index, .. } => {
                self.expr(base);
                self.expr(index);
            }
            Expr::StructLit {
                name,
                name_span,
                fields,
                ..
            } => {
                let name_span = *name_span;
                self.rewrite(name, name_span);
                for (_, value) in fields {
                    self.expr(value);
                }
            }
        }
    }

    fn type_expr(&mut self, ty: &mut TypeExpr) {
        match ty {
            TypeExpr::Named { name, span } => {
                let span = *span;
                self.rewrite(name, span);
            }
            TypeExpr::Pointer { inner, .. } => self.type_expr(inner),
            TypeExpr::Slice { elem, .. } => self.type_expr(elem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::printer;

    const SOURCE: &str = r#"module m

type Status struct {
    code int64
}

fn check(code int64) Status {
    result := Status{code: code}
    return result
}

fn run() {
    s := check(1)
    Use(s)
}
"#;

    #[test]
    fn test_rename_function_hits_decl_and_calls() {
        let mut file = parse_source(SOURCE).unwrap();
        let op = RenameFunction {
            old_name: "check".into(),
            new_name: "verify".into(),
        };
        assert!(op.apply(&mut file).unwrap());
        let printed = printer::print(&file);
        assert!(printed.contains("fn verify(code int64) Status"));
        assert!(printed.contains("verify(1)"));
        assert!(!printed.contains("check"));
    }

    #[test]
    fn test_rename_type_hits_usages() {
        let mut file = parse_source(SOURCE).unwrap();
        let op = RenameType {
            old_name: "Status".into(),
            new_name: "Health".into(),
        };
        assert!(op.apply(&mut file).unwrap());
        let printed = printer::print(&file);
        assert!(printed.contains("type Health struct"));
        assert!(printed.contains("Health{code: code}"));
        assert!(printed.contains(") Health {"));
        assert!(!printed.contains("Status"));
    }

    #[test]
    fn test_rename_variable_role_isolation() {
        // `code` is both a field, a parameter, and a struct-literal key;
        // renaming the variable must leave the type untouched
        let mut file = parse_source(SOURCE).unwrap();
        let op = RenameVariable {
            old_name: "Status".into(),
            new_name: "Wrong".into(),
        };
        // Status never occurs as a variable: nothing changes
        assert!(!op.apply(&mut file).unwrap());
        let printed = printer::print(&file);
        assert!(printed.contains("type Status struct"));
    }

    #[test]
    fn test_rename_no_match_returns_false() {
        let mut file = parse_source(SOURCE).unwrap();
        let op = RenameFunction {
            old_name: "missing".into(),
            new_name: "anything".into(),
        };
        assert!(!op.apply(&mut file).unwrap());
    }

    #[test]
    fn test_rename_roundtrip_is_identity() {
        let mut file = parse_source(SOURCE).unwrap();
        let original = printer::print(&file);
        RenameFunction {
            old_name: "check".into(),
            new_name: "verify".into(),
        }
        .apply(&mut file)
        .unwrap();
        RenameFunction {
            old_name: "verify".into(),
            new_name: "check".into(),
        }
        .apply(&mut file)
        .unwrap();
        assert_eq!(printer::print(&file), original);
    }
}
