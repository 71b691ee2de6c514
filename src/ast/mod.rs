//! Abstract syntax tree for the Tarn language
//!
//! All node categories are closed sum types: adding a node kind forces every
//! traversal site to be updated at compile time. Node identity is positional
//! (spans); nodes are never compared by content.

use crate::common::Span;
use serde::{Deserialize, Serialize};

/// A parsed source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    /// Module name from the leading `module` clause
    pub module: String,
    pub module_span: Span,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
}

/// An `import` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Local alias (`import js "encoding/json"`), if any
    pub alias: Option<String>,
    /// Quoted import path, without the quotes
    pub path: String,
    pub span: Span,
}

impl ImportDecl {
    /// The name this import binds in the file: the alias if present,
    /// otherwise the last segment of the import path.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A top-level declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeDecl),
    Var(VarDecl),
}

/// A function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub doc: Vec<String>,
    pub name: String,
    pub name_span: Span,
    /// Present for methods (`fn (u *User) Name() ...`)
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
    pub body: Block,
    pub span: Span,
}

/// A method receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    pub name: String,
    pub name_span: Span,
    /// Receiver type name, without the `*`
    pub ty: String,
    pub ty_span: Span,
    pub pointer: bool,
}

/// A function parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub name_span: Span,
    pub ty: TypeExpr,
}

/// A `type` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub doc: Vec<String>,
    pub name: String,
    pub name_span: Span,
    pub kind: TypeKind,
    pub span: Span,
}

/// Right-hand side of a `type` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    Struct(StructType),
    Alias(TypeExpr),
}

/// A struct type body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructType {
    pub fields: Vec<Field>,
}

/// A struct field; `name` is `None` for embedded fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub doc: Vec<String>,
    pub name: Option<String>,
    pub name_span: Span,
    pub ty: TypeExpr,
    /// Raw back-quoted tag text, without the back-quotes
    pub tag: Option<String>,
    pub span: Span,
}

/// A `var` declaration (top-level or statement)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub doc: Vec<String>,
    pub name: String,
    pub name_span: Span,
    pub ty: Option<TypeExpr>,
    pub value: Option<Expr>,
    pub span: Span,
}

/// A brace-delimited statement list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `a, b := f()` or `a = 1`; `declare` distinguishes `:=` from `=`
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        declare: bool,
        span: Span,
    },
    /// A bare expression statement
    Expr { expr: Expr, span: Span },
    Var(VarDecl),
    Return { values: Vec<Expr>, span: Span },
    If {
        cond: Expr,
        then_block: Block,
        /// `else` branch: either `Stmt::Block` or a chained `Stmt::If`
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    For {
        /// `None` for an infinite loop
        cond: Option<Expr>,
        body: Block,
        span: Span,
    },
    Block(Block),
    Break { span: Span },
    Continue { span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span } => *span,
            Stmt::Var(decl) => decl.span,
            Stmt::Block(block) => block.span,
        }
    }
}

/// An expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Ident {
        name: String,
        span: Span,
    },
    /// `base.field`
    Selector {
        base: Box<Expr>,
        field: String,
        field_span: Span,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Literal {
        kind: LitKind,
        text: String,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Paren {
        inner: Box<Expr>,
        span: Span,
    },
    /// `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// `User{id: 1, name: n}`
    StructLit {
        name: String,
        name_span: Span,
        fields: Vec<(String, Expr)>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident { span, .. }
            | Expr::Selector { span, .. }
            | Expr::Call { span, .. }
            | Expr::Literal { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Index { span, .. }
            | Expr::StructLit { span, .. } => *span,
        }
    }

    /// The dotted name of a call target: `f` for `f()`, `m.f` for `m.f()`.
    /// `None` when the callee is not an identifier or selector chain.
    pub fn callee_name(&self) -> Option<String> {
        match self {
            Expr::Ident { name, .. } => Some(name.clone()),
            Expr::Selector { base, field, .. } => {
                base.callee_name().map(|b| format!("{}.{}", b, field))
            }
            _ => None,
        }
    }
}

/// Literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Str,
    Bool,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    /// Address-of (`&x`)
    Ref,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Ref => "&",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 5,
        }
    }
}

/// A type expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeExpr {
    /// A (possibly qualified) type name: `int`, `User`, `sql.DB`
    Named { name: String, span: Span },
    /// `*T`
    Pointer { inner: Box<TypeExpr>, span: Span },
    /// `[]T`
    Slice { elem: Box<TypeExpr>, span: Span },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Slice { span, .. } => *span,
        }
    }

    /// The declared type as source text, e.g. `*User` or `[]string`
    pub fn text(&self) -> String {
        match self {
            TypeExpr::Named { name, .. } => name.clone(),
            TypeExpr::Pointer { inner, .. } => format!("*{}", inner.text()),
            TypeExpr::Slice { elem, .. } => format!("[]{}", elem.text()),
        }
    }
}
