//! Canonical source emitter
//!
//! Re-serializes a tree as Tarn source. Printing is idempotent in the
//! print→parse→print sense: the first print normalizes layout, and every
//! cycle after that reproduces the same bytes. Plain comments are not part
//! of the tree and do not survive; doc comments do.

use crate::ast::*;
use crate::parser::{self, ParserError};
use thiserror::Error;

/// Formatting failure, carrying the parse error that caused it
#[derive(Debug, Error)]
#[error("formatting failed: {source}")]
pub struct FormatError {
    #[from]
    pub source: ParserError,
}

/// Source-formatter collaborator seam. The code generator pushes its
/// output through this; a failure is non-fatal and the caller keeps the
/// unformatted text.
pub trait SourceFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Formats by parsing and re-printing through the canonical printer
#[derive(Debug, Default)]
pub struct CanonicalFormatter;

impl SourceFormatter for CanonicalFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let file = parser::parse_source(source)?;
        Ok(print(&file))
    }
}

/// Print a tree as canonical Tarn source
pub fn print(file: &File) -> String {
    let mut printer = Printer {
        out: String::new(),
        indent: 0,
    };
    printer.file(file);
    printer.out
}

const INDENT: &str = "    ";

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn line(&mut self, text: &str) {
        self.push_indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn docs(&mut self, docs: &[String]) {
        for doc in docs {
            if doc.is_empty() {
                self.line("///");
            } else {
                self.line(&format!("/// {}", doc));
            }
        }
    }

    fn file(&mut self, file: &File) {
        self.line(&format!("module {}", file.module));
        if !file.imports.is_empty() {
            self.out.push('\n');
            for import in &file.imports {
                match &import.alias {
                    Some(alias) => self.line(&format!("import {} \"{}\"", alias, import.path)),
                    None => self.line(&format!("import \"{}\"", import.path)),
                }
            }
        }
        for decl in &file.decls {
            self.out.push('\n');
            match decl {
                Decl::Func(func) => self.func(func),
                Decl::Type(decl) => self.type_decl(decl),
                Decl::Var(decl) => {
                    self.docs(&decl.doc);
                    let text = self.var_decl_text(decl);
                    self.line(&text);
                }
            }
        }
    }

    fn func(&mut self, func: &FuncDecl) {
        self.docs(&func.doc);
        let mut header = String::from("fn ");
        if let Some(recv) = &func.receiver {
            header.push('(');
            header.push_str(&recv.name);
            header.push(' ');
            if recv.pointer {
                header.push('*');
            }
            header.push_str(&recv.ty);
            header.push_str(") ");
        }
        header.push_str(&func.name);
        header.push('(');
        let params: Vec<String> = func
            .params
            .iter()
            .map(|p| format!("{} {}", p.name, p.ty.text()))
            .collect();
        header.push_str(&params.join(", "));
        header.push(')');
        match func.results.len() {
            0 => {}
            1 => {
                header.push(' ');
                header.push_str(&func.results[0].text());
            }
            _ => {
                let results: Vec<String> = func.results.iter().map(|r| r.text()).collect();
                header.push_str(&format!(" ({})", results.join(", ")));
            }
        }
        header.push_str(" {");
        self.line(&header);
        self.indent += 1;
        for stmt in &func.body.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn type_decl(&mut self, decl: &TypeDecl) {
        self.docs(&decl.doc);
        match &decl.kind {
            TypeKind::Struct(st) => {
                if st.fields.is_empty() {
                    self.line(&format!("type {} struct {{}}", decl.name));
                    return;
                }
                self.line(&format!("type {} struct {{", decl.name));
                self.indent += 1;
                for field in &st.fields {
                    self.docs(&field.doc);
                    let mut text = match &field.name {
                        Some(name) => format!("{} {}", name, field.ty.text()),
                        None => field.ty.text(),
                    };
                    if let Some(tag) = &field.tag {
                        text.push_str(&format!(" `{}`", tag));
                    }
                    self.line(&text);
                }
                self.indent -= 1;
                self.line("}");
            }
            TypeKind::Alias(ty) => {
                self.line(&format!("type {} {}", decl.name, ty.text()));
            }
        }
    }

    fn var_decl_text(&self, decl: &VarDecl) -> String {
        let mut text = format!("var {}", decl.name);
        if let Some(ty) = &decl.ty {
            text.push(' ');
            text.push_str(&ty.text());
        }
        if let Some(value) = &decl.value {
            text.push_str(" = ");
            text.push_str(&expr_text(value));
        }
        text
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign {
                targets,
                values,
                declare,
                ..
            } => {
                let targets: Vec<String> = targets.iter().map(expr_text).collect();
                let values: Vec<String> = values.iter().map(expr_text).collect();
                let op = if *declare { ":=" } else { "=" };
                self.line(&format!(
                    "{} {} {}",
                    targets.join(", "),
                    op,
                    values.join(", ")
                ));
            }
            Stmt::Expr { expr, .. } => {
                let text = expr_text(expr);
                self.line(&text);
            }
            Stmt::Var(decl) => {
                self.docs(&decl.doc);
                let text = self.var_decl_text(decl);
                self.line(&text);
            }
            Stmt::Return { values, .. } => {
                if values.is_empty() {
                    self.line("return");
                } else {
                    let values: Vec<String> = values.iter().map(expr_text).collect();
                    self.line(&format!("return {}", values.join(", ")));
                }
            }
            Stmt::If { .. } => {
                self.if_chain(stmt, true);
            }
            Stmt::For { cond, body, .. } => {
                match cond {
                    Some(cond) => self.line(&format!("for {} {{", expr_text(cond))),
                    None => self.line("for {"),
                }
                self.indent += 1;
                for stmt in &body.stmts {
                    self.stmt(stmt);
                }
                self.indent -= 1;
                self.line("}");
            }
            Stmt::Block(block) => {
                self.line("{");
                self.indent += 1;
                for stmt in &block.stmts {
                    self.stmt(stmt);
                }
                self.indent -= 1;
                self.line("}");
            }
            Stmt::Break { .. } => self.line("break"),
            Stmt::Continue { .. } => self.line("continue"),
        }
    }

    /// Print an if/else-if/else chain; `opening` is false when this `if`
    /// continues an `} else ` line
    fn if_chain(&mut self, stmt: &Stmt, opening: bool) {
        let Stmt::If {
            cond,
            then_block,
            else_branch,
            ..
        } = stmt
        else {
            return;
        };
        let head = format!("if {} {{", expr_text(cond));
        if opening {
            self.line(&head);
        } else {
            self.out.push_str(&head);
            self.out.push('\n');
        }
        self.indent += 1;
        for stmt in &then_block.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        match else_branch.as_deref() {
            None => self.line("}"),
            Some(branch @ Stmt::If { .. }) => {
                self.push_indent();
                self.out.push_str("} else ");
                self.if_chain(branch, false);
            }
            Some(Stmt::Block(block)) => {
                self.line("} else {");
                self.indent += 1;
                for stmt in &block.stmts {
                    self.stmt(stmt);
                }
                self.indent -= 1;
                self.line("}");
            }
            Some(other) => {
                // The parser only builds blocks or chained ifs here; print
                // anything else as a block for safety
                self.line("} else {");
                self.indent += 1;
                self.stmt(other);
                self.indent -= 1;
                self.line("}");
            }
        }
    }
}

fn expr_text(expr: &Expr) -> String {
    match expr {
        Expr::Ident { name, .. } => name.clone(),
        Expr::Selector { base, field, .. } => format!("{}.{}", expr_text(base), field),
        Expr::Call { callee, args, .. } => {
            let args: Vec<String> = args.iter().map(expr_text).collect();
            format!("{}({})", expr_text(callee), args.join(", "))
        }
        Expr::Literal { text, .. } => text.clone(),
        Expr::Unary { op, operand, .. } => format!("{}{}", op.as_str(), expr_text(operand)),
        Expr::Binary {
            op, left, right, ..
        } => format!("{} {} {}", expr_text(left), op.as_str(), expr_text(right)),
        Expr::Paren { inner, .. } => format!("({})", expr_text(inner)),
        Expr::Index { base, index, .. } => format!("{}[{}]", expr_text(base), expr_text(index)),
        Expr::StructLit { name, fields, .. } => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{}: {}", key, expr_text(value)))
                .collect();
            format!("{}{{{}}}", name, fields.join(", "))
        }
    }
}
