//! Heuristic identifier-role classification
//!
//! Decides whether an identifier occurrence denotes a function, a type, or a
//! variable binding using structural context only — no symbol table.
//! Declaration-site classification takes priority over usage-site inference:
//! declarations are unambiguous, usages are heuristic. Shadowing across
//! scopes is not disambiguated; anything that cannot be positively placed
//! classifies as `Unknown` and is never rewritten by the refactorings.

use crate::ast::*;
use crate::common::Span;
use rustc_hash::FxHashSet;

/// Role of an identifier occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentRole {
    Function,
    Type,
    Variable,
    Unknown,
}

impl std::fmt::Display for IdentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentRole::Function => write!(f, "function"),
            IdentRole::Type => write!(f, "type"),
            IdentRole::Variable => write!(f, "variable"),
            IdentRole::Unknown => write!(f, "unknown"),
        }
    }
}

/// A classified identifier occurrence
#[derive(Debug, Clone)]
pub struct IdentOccurrence {
    pub name: String,
    pub span: Span,
    pub role: IdentRole,
}

/// Classification seam: rule and refactoring logic depends only on this
/// trait, so a rigorous scope-resolution pass can be substituted without
/// touching either.
pub trait Classifier {
    /// Classify every identifier occurrence in the file, in source order
    fn classify_file(&self, file: &File) -> Vec<IdentOccurrence>;

    /// Classify the occurrence at a given span; `Unknown` if none is there
    fn classify_at(&self, file: &File, span: Span) -> IdentRole {
        self.classify_file(file)
            .into_iter()
            .find(|occ| occ.span == span)
            .map(|occ| occ.role)
            .unwrap_or(IdentRole::Unknown)
    }
}

/// The default structural classifier
#[derive(Debug, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for HeuristicClassifier {
    fn classify_file(&self, file: &File) -> Vec<IdentOccurrence> {
        let bound_vars = collect_bound_variables(file);
        let mut collector = Collector {
            bound_vars,
            out: Vec::new(),
        };
        collector.file(file);
        collector.out
    }
}

/// Names bound as variables anywhere in the file: parameters, receivers,
/// `var` declarations, `:=` targets, and struct field names. Name-driven,
/// not scope-driven: a use of one of these names classifies as a variable
/// wherever it appears in expression position.
fn collect_bound_variables(file: &File) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(recv) = &func.receiver {
                    names.insert(recv.name.clone());
                }
                for param in &func.params {
                    names.insert(param.name.clone());
                }
                collect_block(&func.body, &mut names);
            }
            Decl::Type(decl) => {
                if let TypeKind::Struct(st) = &decl.kind {
                    for field in &st.fields {
                        if let Some(name) = &field.name {
                            names.insert(name.clone());
                        }
                    }
                }
            }
            Decl::Var(decl) => {
                names.insert(decl.name.clone());
            }
        }
    }
    names.remove("_");
    names
}

fn collect_block(block: &Block, names: &mut FxHashSet<String>) {
    for stmt in &block.stmts {
        collect_stmt(stmt, names);
    }
}

fn collect_stmt(stmt: &Stmt, names: &mut FxHashSet<String>) {
    match stmt {
        Stmt::Assign {
            targets, declare, ..
        } => {
            if *declare {
                for target in targets {
                    if let Expr::Ident { name, .. } = target {
                        names.insert(name.clone());
                    }
                }
            }
        }
        Stmt::Var(decl) => {
            names.insert(decl.name.clone());
        }
        Stmt::If {
            then_block,
            else_branch,
            ..
        } => {
            collect_block(then_block, names);
            if let Some(branch) = else_branch {
                collect_stmt(branch, names);
            }
        }
        Stmt::For { body, .. } => collect_block(body, names),
        Stmt::Block(block) => collect_block(block, names),
        Stmt::Expr { .. } | Stmt::Return { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

struct Collector {
    bound_vars: FxHashSet<String>,
    out: Vec<IdentOccurrence>,
}

impl Collector {
    fn emit(&mut self, name: &str, span: Span, role: IdentRole) {
        let role = if name == "_" { IdentRole::Unknown } else { role };
        self.out.push(IdentOccurrence {
            name: name.to_string(),
            span,
            role,
        });
    }

    fn file(&mut self, file: &File) {
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => self.func(func),
                Decl::Type(decl) => self.type_decl(decl),
                Decl::Var(decl) => self.var_decl(decl),
            }
        }
    }

    fn func(&mut self, func: &FuncDecl) {
        self.emit(&func.name, func.name_span, IdentRole::Function);
        if let Some(recv) = &func.receiver {
            self.emit(&recv.name, recv.name_span, IdentRole::Variable);
            self.emit(&recv.ty, recv.ty_span, IdentRole::Type);
        }
        for param in &func.params {
            self.emit(&param.name, param.name_span, IdentRole::Variable);
            self.type_expr(&param.ty);
        }
        for result in &func.results {
            self.type_expr(result);
        }
        self.block(&func.body);
    }

    fn type_decl(&mut self, decl: &TypeDecl) {
        self.emit(&decl.name, decl.name_span, IdentRole::Type);
        match &decl.kind {
            TypeKind::Struct(st) => {
                for field in &st.fields {
                    if let Some(name) = &field.name {
                        self.emit(name, field.name_span, IdentRole::Variable);
                    }
                    self.type_expr(&field.ty);
                }
            }
            TypeKind::Alias(ty) => self.type_expr(ty),
        }
    }

    fn var_decl(&mut self, decl: &VarDecl) {
        self.emit(&decl.name, decl.name_span, IdentRole::Variable);
        if let Some(ty) = &decl.ty {
            self.type_expr(ty);
        }
        if let Some(value) = &decl.value {
            self.expr(value, false);
        }
    }

    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign {
                targets, values, ..
            } => {
                // Assignment left-hand sides are binding forms regardless of
                // whether the statement declares (`:=`) or reassigns (`=`)
                for target in targets {
                    if let Expr::Ident { name, span } = target {
                        self.emit(name, *span, IdentRole::Variable);
                    } else {
                        self.expr(target, false);
                    }
                }
                for value in values {
                    self.expr(value, false);
                }
            }
            Stmt::Expr { expr, .. } => self.expr(expr, false),
            Stmt::Var(decl) => self.var_decl(decl),
            Stmt::Return { values, .. } => {
                for value in values {
                    self.expr(value, false);
                }
            }
            Stmt::If {
                cond,
                then_block,
                else_branch,
                ..
            } => {
                self.expr(cond, false);
                self.block(then_block);
                if let Some(branch) = else_branch {
                    self.stmt(branch);
                }
            }
            Stmt::For { cond, body, .. } => {
                if let Some(cond) = cond {
                    self.expr(cond, false);
                }
                self.block(body);
            }
            Stmt::Block(block) => self.block(block),
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    /// `callee` is true when this expression is the callee slot of a call
    fn expr(&mut self, expr: &Expr, callee: bool) {
        match expr {
            Expr::Ident { name, span } => {
                let role = if callee {
                    IdentRole::Function
                } else if self.bound_vars.contains(name) {
                    IdentRole::Variable
                } else {
                    IdentRole::Unknown
                };
                self.emit(name, *span, role);
            }
            Expr::Selector {
                base,
                field,
                field_span,
                ..
            } => {
                // The base is classified by the usual rules; the selected
                // member is a function only in callee position. Plain field
                // access stays Unknown: without type information the member
                // cannot be placed.
                self.expr(base, false);
                let role = if callee {
                    IdentRole::Function
                } else {
                    IdentRole::Unknown
                };
                self.emit(field, *field_span, role);
            }
            Expr::Call { callee: c, args, .. } => {
                self.expr(c, true);
                for arg in args {
                    self.expr(arg, false);
                }
            }
            Expr::Literal { .. } => {}
            Expr::Unary { operand, .. } => self.expr(operand, false),
            Expr::Binary { left, right, .. } => {
                self.expr(left, false);
                self.expr(right, false);
            }
            Expr::Paren { inner, .. } => self.expr(inner, false),
            Expr::Index { base, index, .. } => {
                self.expr(base, false);
                self.expr(index, false);
            }
            Expr::StructLit {
                name,
                name_span,
                fields,
                ..
            } => {
                self.emit(name, *name_span, IdentRole::Type);
                for (_, value) in fields {
                    self.expr(value, false);
                }
            }
        }
    }

    fn type_expr(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Named { name, span } => self.emit(name, *span, IdentRole::Type),
            TypeExpr::Pointer { inner, .. } => self.type_expr(inner),
            TypeExpr::Slice { elem, .. } => self.type_expr(elem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    const SOURCE: &str = r#"module m

type Point struct {
    x float64
    y float64
}

fn scale(p Point, factor float64) Point {
    result := Point{x: p.x, y: factor}
    return result
}

fn run() {
    p := scale(origin, 2.0)
    Use(p)
}

var origin Point
"#;

    fn roles_of(name: &str) -> Vec<IdentRole> {
        let file = parse_source(SOURCE).unwrap();
        HeuristicClassifier::new()
            .classify_file(&file)
            .into_iter()
            .filter(|occ| occ.name == name)
            .map(|occ| occ.role)
            .collect()
    }

    #[test]
    fn test_function_declaration_and_callee() {
        let roles = roles_of("scale");
        assert!(roles.contains(&IdentRole::Function));
        assert!(roles.iter().all(|r| *r == IdentRole::Function));
    }

    #[test]
    fn test_type_declaration_and_usages() {
        let roles = roles_of("Point");
        // declaration, parameter type, result type, struct literal, var type
        assert!(roles.len() >= 4);
        assert!(roles.iter().all(|r| *r == IdentRole::Type));
    }

    #[test]
    fn test_variable_bindings_and_uses() {
        let roles = roles_of("p");
        assert!(roles.iter().all(|r| *r == IdentRole::Variable));
        let roles = roles_of("origin");
        assert!(roles.contains(&IdentRole::Variable));
    }

    #[test]
    fn test_unbound_callee_is_function_not_variable() {
        let roles = roles_of("Use");
        assert_eq!(roles, vec![IdentRole::Function]);
    }

    #[test]
    fn test_blank_is_never_classified() {
        let file =
            parse_source("module m\n\nfn f() {\n    _, err := Read(\"a\")\n    Use(err)\n}\n")
                .unwrap();
        let occurrences = HeuristicClassifier::new().classify_file(&file);
        let blank = occurrences.iter().find(|o| o.name == "_").unwrap();
        assert_eq!(blank.role, IdentRole::Unknown);
    }

    #[test]
    fn test_selector_member_outside_call_is_unknown() {
        let file = parse_source("module m\n\nfn f(p Point) float64 {\n    return p.x\n}\n")
            .unwrap();
        let occurrences = HeuristicClassifier::new().classify_file(&file);
        // `x` as a selector member is not placeable without type information,
        // even though a field named `x` would classify as a variable at its
        // declaration site
        let member = occurrences
            .iter()
            .find(|o| o.name == "x" && o.role == IdentRole::Unknown);
        assert!(member.is_some());
    }
}
