//! Generic pre-order traversal over the syntax tree
//!
//! `walk` visits nodes depth-first in source declaration order. An optional
//! kind filter restricts which nodes are dispatched to the callback, but
//! traversal descends into every child regardless of the filter. The
//! callback returning `false` skips the current node's children; there is
//! no channel for aborting the whole walk.

use crate::ast::*;

/// A borrowed reference to any node in the tree
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a File),
    Import(&'a ImportDecl),
    Func(&'a FuncDecl),
    Type(&'a TypeDecl),
    Var(&'a VarDecl),
    Field(&'a Field),
    Block(&'a Block),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    TypeExpr(&'a TypeExpr),
}

/// Node kinds, used for filtered dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Import,
    FuncDecl,
    TypeDecl,
    VarDecl,
    Field,
    Block,
    Assign,
    ExprStmt,
    Return,
    If,
    For,
    Break,
    Continue,
    Ident,
    Selector,
    Call,
    Literal,
    Unary,
    Binary,
    Paren,
    Index,
    StructLit,
    TypeName,
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Import(_) => NodeKind::Import,
            Node::Func(_) => NodeKind::FuncDecl,
            Node::Type(_) => NodeKind::TypeDecl,
            Node::Var(_) => NodeKind::VarDecl,
            Node::Field(_) => NodeKind::Field,
            Node::Block(_) => NodeKind::Block,
            Node::Stmt(stmt) => match stmt {
                Stmt::Assign { .. } => NodeKind::Assign,
                Stmt::Expr { .. } => NodeKind::ExprStmt,
                Stmt::Var(_) => NodeKind::VarDecl,
                Stmt::Return { .. } => NodeKind::Return,
                Stmt::If { .. } => NodeKind::If,
                Stmt::For { .. } => NodeKind::For,
                Stmt::Block(_) => NodeKind::Block,
                Stmt::Break { .. } => NodeKind::Break,
                Stmt::Continue { .. } => NodeKind::Continue,
            },
            Node::Expr(expr) => match expr {
                Expr::Ident { .. } => NodeKind::Ident,
                Expr::Selector { .. } => NodeKind::Selector,
                Expr::Call { .. } => NodeKind::Call,
                Expr::Literal { .. } => NodeKind::Literal,
                Expr::Unary { .. } => NodeKind::Unary,
                Expr::Binary { .. } => NodeKind::Binary,
                Expr::Paren { .. } => NodeKind::Paren,
                Expr::Index { .. } => NodeKind::Index,
                Expr::StructLit { .. } => NodeKind::StructLit,
            },
            Node::TypeExpr(_) => NodeKind::TypeName,
        }
    }
}

/// Walk the tree rooted at `file` in pre-order.
///
/// `filter` restricts which node kinds invoke `visit`; `None` dispatches
/// every node. `visit` returning `false` prunes the current node's
/// children (filtered-out nodes are always descended into).
pub fn walk<F>(file: &File, filter: Option<&[NodeKind]>, mut visit: F)
where
    F: FnMut(Node<'_>) -> bool,
{
    let mut walker = Walker {
        filter,
        visit: &mut visit,
    };
    walker.node(Node::File(file));
}

struct Walker<'f, F> {
    filter: Option<&'f [NodeKind]>,
    visit: &'f mut F,
}

impl<F> Walker<'_, F>
where
    F: FnMut(Node<'_>) -> bool,
{
    fn node(&mut self, node: Node<'_>) {
        let dispatched = match self.filter {
            Some(kinds) => kinds.contains(&node.kind()),
            None => true,
        };
        if dispatched && !(self.visit)(node) {
            return;
        }
        self.children(node);
    }

    fn children(&mut self, node: Node<'_>) {
        match node {
            Node::File(file) => {
                for import in &file.imports {
                    self.node(Node::Import(import));
                }
                for decl in &file.decls {
                    match decl {
                        Decl::Func(func) => self.node(Node::Func(func)),
                        Decl::Type(decl) => self.node(Node::Type(decl)),
                        Decl::Var(decl) => self.node(Node::Var(decl)),
                    }
                }
            }
            Node::Import(_) => {}
            Node::Func(func) => {
                for param in &func.params {
                    self.node(Node::TypeExpr(&param.ty));
                }
                for result in &func.results {
                    self.node(Node::TypeExpr(result));
                }
                self.node(Node::Block(&func.body));
            }
            Node::Type(decl) => match &decl.kind {
                TypeKind::Struct(st) => {
                    for field in &st.fields {
                        self.node(Node::Field(field));
                    }
                }
                TypeKind::Alias(ty) => self.node(Node::TypeExpr(ty)),
            },
            Node::Var(decl) => {
                if let Some(ty) = &decl.ty {
                    self.node(Node::TypeExpr(ty));
                }
                if let Some(value) = &decl.value {
                    self.node(Node::Expr(value));
                }
            }
            Node::Field(field) => {
                self.node(Node::TypeExpr(&field.ty));
            }
            Node::Block(block) => {
                for stmt in &block.stmts {
                    self.node(Node::Stmt(stmt));
                }
            }
            Node::Stmt(stmt) => match stmt {
                Stmt::Assign {
                    targets, values, ..
                } => {
                    for target in targets {
                        self.node(Node::Expr(target));
                    }
                    for value in values {
                        self.node(Node::Expr(value));
                    }
                }
                Stmt::Expr { expr, .. } => self.node(Node::Expr(expr)),
                Stmt::Var(decl) => {
                    if let Some(ty) = &decl.ty {
                        self.node(Node::TypeExpr(ty));
                    }
                    if let Some(value) = &decl.value {
                        self.node(Node::Expr(value));
                    }
                }
                Stmt::Return { values, .. } => {
                    for value in values {
                        self.node(Node::Expr(value));
                    }
                }
                Stmt::If {
                    cond,
                    then_block,
                    else_branch,
                    ..
                } => {
                    self.node(Node::Expr(cond));
                    self.node(Node::Block(then_block));
                    if let Some(branch) = else_branch {
                        self.node(Node::Stmt(branch));
                    }
                }
                Stmt::For { cond, body, .. } => {
                    if let Some(cond) = cond {
                        self.node(Node::Expr(cond));
                    }
                    self.node(Node::Block(body));
                }
                Stmt::Block(block) => self.node(Node::Block(block)),
                Stmt::Break { .. } | Stmt::Continue { .. } => {}
            },
            Node::Expr(expr) => match expr {
                Expr::Ident { .. } | Expr::Literal { .. } => {}
                Expr::Selector { base, .. } => self.node(Node::Expr(base)),
                Expr::Call { callee, args, .. } => {
                    self.node(Node::Expr(callee));
                    for arg in args {
                        self.node(Node::Expr(arg));
                    }
                }
                Expr::Unary { operand, .. } => self.node(Node::Expr(operand)),
                Expr::Binary { left, right, .. } => {
                    self.node(Node::Expr(left));
                    self.node(Node::Expr(right));
                }
                Expr::Paren { inner, .. } => self.node(Node::Expr(inner)),
                Expr::Index { base, index, .. } => {
                    self.node(Node::Expr(base));
                    self.node(Node::Expr(index));
                }
                Expr::StructLit { fields, .. } => {
                    for (_, value) in fields {
                        self.node(Node::Expr(value));
                    }
                }
            },
            Node::TypeExpr(ty) => match ty {
                TypeExpr::Named { .. } => {}
                TypeExpr::Pointer { inner, .. } => self.node(Node::TypeExpr(inner)),
                TypeExpr::Slice { elem, .. } => self.node(Node::TypeExpr(elem)),
            },
        }
    }
}
