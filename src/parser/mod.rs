//! Parser for the Tarn language
//!
//! A recursive descent parser that produces an AST from a token stream.
//! Positions come straight from token spans; doc comments attach to the
//! following declaration or field.

pub mod errors;

pub use errors::ParserError;

use crate::ast::*;
use crate::lexer::{self, Token, TokenKind};

/// Parse source text into an AST
pub fn parse_source(source: &str) -> Result<File, ParserError> {
    let tokens = lexer::lex(source)?;
    parse(&tokens, source)
}

/// Parse a token stream into an AST
pub fn parse(tokens: &[Token], source: &str) -> Result<File, ParserError> {
    let mut parser = Parser::new(tokens, source);
    parser.parse_file()
}

/// Parse a bare type expression, e.g. `*User` or `[]string`.
/// Used by the add-parameter refactoring to build parameter descriptors.
pub fn parse_type_str(text: &str) -> Result<TypeExpr, ParserError> {
    let tokens = lexer::lex(text)?;
    let mut parser = Parser::new(&tokens, text);
    let ty = parser.parse_type()?;
    parser.expect(TokenKind::Eof)?;
    Ok(ty)
}

/// Parser state
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// When false, don't parse `Ident { ... }` as a struct literal.
    /// Needed to resolve ambiguity in contexts like `if x { ... }`.
    allow_struct_literals: bool,
    /// Source text for newline detection
    source: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            allow_struct_literals: true,
            source,
        }
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream has EOF"))
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParserError> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.as_str()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        let token = self.current();
        ParserError::UnexpectedToken {
            span: (token.span.start, token.span.len().max(1)).into(),
            expected: expected.to_string(),
            found: token.text.clone(),
        }
    }

    /// Check if there is a newline between the previous token and the
    /// current one. Used to terminate return value lists and to tell an
    /// embedded struct field from a named one.
    fn newline_before_current(&self) -> bool {
        if self.pos == 0 || self.source.is_empty() {
            return false;
        }
        let prev_end = self
            .tokens
            .get(self.pos - 1)
            .map(|t| t.span.end)
            .unwrap_or(0);
        let curr_start = self.current().span.start;
        if curr_start > prev_end && curr_start <= self.source.len() {
            self.source[prev_end..curr_start].contains('\n')
        } else {
            false
        }
    }

    /// Collect leading `///` doc comments, stripped of the marker
    fn take_docs(&mut self) -> Vec<String> {
        let mut docs = Vec::new();
        while self.peek() == TokenKind::DocComment {
            let token = self.advance();
            let text = token.text.strip_prefix("///").unwrap_or(&token.text);
            let text = text.strip_prefix(' ').unwrap_or(text);
            docs.push(text.to_string());
        }
        docs
    }

    // ---- file and declarations ----

    pub fn parse_file(&mut self) -> Result<File, ParserError> {
        // Doc comments before the module clause belong to the file; drop them
        self.take_docs();

        if self.peek() != TokenKind::Module {
            let token = self.current();
            return Err(ParserError::MissingModuleClause {
                span: (token.span.start, token.span.len().max(1)).into(),
            });
        }
        self.advance();
        let name_token = self.expect(TokenKind::Ident)?;

        let mut imports = Vec::new();
        loop {
            // Imports carry no doc comments; any stray ones belong to the
            // first declaration, so stop collecting on anything but `import`
            if self.peek() != TokenKind::Import {
                break;
            }
            imports.push(self.parse_import()?);
        }

        let mut decls = Vec::new();
        while self.peek() != TokenKind::Eof {
            decls.push(self.parse_decl()?);
        }

        Ok(File {
            module: name_token.text,
            module_span: name_token.span,
            imports,
            decls,
        })
    }

    fn parse_import(&mut self) -> Result<ImportDecl, ParserError> {
        let start = self.expect(TokenKind::Import)?.span;
        let alias = if self.peek() == TokenKind::Ident {
            Some(self.advance().text)
        } else if self.peek() == TokenKind::Underscore {
            self.advance();
            Some("_".to_string())
        } else if self.peek() == TokenKind::Dot {
            self.advance();
            Some(".".to_string())
        } else {
            None
        };
        let path_token = self.expect(TokenKind::StringLit)?;
        let path = path_token.text.trim_matches('"').to_string();
        Ok(ImportDecl {
            alias,
            path,
            span: start.merge(path_token.span),
        })
    }

    fn parse_decl(&mut self) -> Result<Decl, ParserError> {
        let doc = self.take_docs();
        match self.peek() {
            TokenKind::Fn => Ok(Decl::Func(self.parse_func_decl(doc)?)),
            TokenKind::Type => Ok(Decl::Type(self.parse_type_decl(doc)?)),
            TokenKind::Var => Ok(Decl::Var(self.parse_var_decl(doc)?)),
            _ => Err(self.unexpected("a declaration (`fn`, `type`, or `var`)")),
        }
    }

    fn parse_func_decl(&mut self, doc: Vec<String>) -> Result<FuncDecl, ParserError> {
        let start = self.expect(TokenKind::Fn)?.span;

        let receiver = if self.peek() == TokenKind::LParen {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name_token = self.expect(TokenKind::Ident)?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while self.peek() != TokenKind::RParen {
            let param_name = self.expect(TokenKind::Ident)?;
            let ty = self.parse_type()?;
            params.push(Param {
                name: param_name.text,
                name_span: param_name.span,
                ty,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let results = self.parse_results()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);

        Ok(FuncDecl {
            doc,
            name: name_token.text,
            name_span: name_token.span,
            receiver,
            params,
            results,
            body,
            span,
        })
    }

    fn parse_receiver(&mut self) -> Result<Receiver, ParserError> {
        self.expect(TokenKind::LParen)?;
        let name_token = self.expect(TokenKind::Ident)?;
        let pointer = self.eat(TokenKind::Star);
        let ty_token = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::RParen)?;
        Ok(Receiver {
            name: name_token.text,
            name_span: name_token.span,
            ty: ty_token.text,
            ty_span: ty_token.span,
            pointer,
        })
    }

    fn parse_results(&mut self) -> Result<Vec<TypeExpr>, ParserError> {
        match self.peek() {
            TokenKind::LBrace => Ok(Vec::new()),
            TokenKind::LParen => {
                self.advance();
                let mut results = Vec::new();
                while self.peek() != TokenKind::RParen {
                    results.push(self.parse_type()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen)?;
                Ok(results)
            }
            TokenKind::Ident | TokenKind::Star | TokenKind::LBracket => {
                Ok(vec![self.parse_type()?])
            }
            _ => Err(self.unexpected("a result type or `{`")),
        }
    }

    fn parse_type_decl(&mut self, doc: Vec<String>) -> Result<TypeDecl, ParserError> {
        let start = self.expect(TokenKind::Type)?.span;
        let name_token = self.expect(TokenKind::Ident)?;

        if self.peek() == TokenKind::Struct {
            self.advance();
            self.expect(TokenKind::LBrace)?;
            let mut fields = Vec::new();
            while self.peek() != TokenKind::RBrace {
                fields.push(self.parse_field()?);
            }
            let end = self.expect(TokenKind::RBrace)?.span;
            Ok(TypeDecl {
                doc,
                name: name_token.text,
                name_span: name_token.span,
                kind: TypeKind::Struct(StructType { fields }),
                span: start.merge(end),
            })
        } else {
            let alias = self.parse_type()?;
            let span = start.merge(alias.span());
            Ok(TypeDecl {
                doc,
                name: name_token.text,
                name_span: name_token.span,
                kind: TypeKind::Alias(alias),
                span,
            })
        }
    }

    fn parse_field(&mut self) -> Result<Field, ParserError> {
        let doc = self.take_docs();

        // `*User` or `[]T` in field position is always an embedded type
        if self.peek() != TokenKind::Ident {
            let ty = self.parse_type()?;
            let tag = self.eat_tag();
            let span = ty.span();
            return Ok(Field {
                doc,
                name: None,
                name_span: span,
                ty,
                tag,
                span,
            });
        }

        let first = self.advance();

        // A named field has its type on the same line; an embedded field is
        // a bare (possibly qualified) type name
        let named = match self.peek() {
            TokenKind::Ident | TokenKind::Star | TokenKind::LBracket => {
                !self.newline_before_current()
            }
            _ => false,
        };

        if named {
            let ty = self.parse_type()?;
            let tag = self.eat_tag();
            let span = first.span.merge(ty.span());
            Ok(Field {
                doc,
                name: Some(first.text),
                name_span: first.span,
                ty,
                tag,
                span,
            })
        } else {
            let mut name = first.text;
            let mut span = first.span;
            while self.eat(TokenKind::Dot) {
                let seg = self.expect(TokenKind::Ident)?;
                name.push('.');
                name.push_str(&seg.text);
                span = span.merge(seg.span);
            }
            let tag = self.eat_tag();
            Ok(Field {
                doc,
                name: None,
                name_span: span,
                ty: TypeExpr::Named { name, span },
                tag,
                span,
            })
        }
    }

    fn eat_tag(&mut self) -> Option<String> {
        if self.peek() == TokenKind::RawTag {
            let token = self.advance();
            Some(token.text.trim_matches('`').to_string())
        } else {
            None
        }
    }

    fn parse_var_decl(&mut self, doc: Vec<String>) -> Result<VarDecl, ParserError> {
        let start = self.expect(TokenKind::Var)?.span;
        let name_token = self.expect(TokenKind::Ident)?;

        let ty = match self.peek() {
            TokenKind::Ident | TokenKind::Star | TokenKind::LBracket
                if !self.newline_before_current() =>
            {
                Some(self.parse_type()?)
            }
            _ => None,
        };

        let value = if self.eat(TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut span = start.merge(name_token.span);
        if let Some(ty) = &ty {
            span = span.merge(ty.span());
        }
        if let Some(value) = &value {
            span = span.merge(value.span());
        }

        Ok(VarDecl {
            doc,
            name: name_token.text,
            name_span: name_token.span,
            ty,
            value,
            span,
        })
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<Block, ParserError> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();
        while self.peek() != TokenKind::RBrace && self.peek() != TokenKind::Eof {
            stmts.push(self.parse_stmt()?);
            self.eat(TokenKind::Semi);
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParserError> {
        let doc = self.take_docs();
        match self.peek() {
            TokenKind::Var => Ok(Stmt::Var(self.parse_var_decl(doc)?)),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                let span = self.advance().span;
                Ok(Stmt::Break { span })
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                Ok(Stmt::Continue { span })
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_simple_stmt(),
        }
    }

    fn parse_return(&mut self) -> Result<Stmt, ParserError> {
        let start = self.expect(TokenKind::Return)?.span;
        let mut values = Vec::new();
        if self.peek().starts_expr() && !self.newline_before_current() {
            values.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma) {
                values.push(self.parse_expr()?);
            }
        }
        let span = values
            .last()
            .map(|v| start.merge(v.span()))
            .unwrap_or(start);
        Ok(Stmt::Return { values, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParserError> {
        let start = self.expect(TokenKind::If)?.span;
        let cond = self.parse_expr_no_struct_lit()?;
        let then_block = self.parse_block()?;
        let mut span = start.merge(then_block.span);

        let else_branch = if self.eat(TokenKind::Else) {
            let branch = if self.peek() == TokenKind::If {
                self.parse_if()?
            } else {
                Stmt::Block(self.parse_block()?)
            };
            span = span.merge(branch.span());
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_block,
            else_branch,
            span,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParserError> {
        let start = self.expect(TokenKind::For)?.span;
        let cond = if self.peek() == TokenKind::LBrace {
            None
        } else {
            Some(self.parse_expr_no_struct_lit()?)
        };
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Stmt::For { cond, body, span })
    }

    /// Assignment or bare expression statement
    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParserError> {
        let first = self.parse_expr()?;
        let mut targets = vec![first];
        while self.eat(TokenKind::Comma) {
            targets.push(self.parse_expr()?);
        }

        match self.peek() {
            TokenKind::ColonEq | TokenKind::Eq => {
                let declare = self.advance().kind == TokenKind::ColonEq;
                let mut values = vec![self.parse_expr()?];
                while self.eat(TokenKind::Comma) {
                    values.push(self.parse_expr()?);
                }
                let span = targets[0]
                    .span()
                    .merge(values.last().map(|v| v.span()).unwrap_or_default());
                Ok(Stmt::Assign {
                    targets,
                    values,
                    declare,
                    span,
                })
            }
            _ => {
                if targets.len() != 1 {
                    return Err(self.unexpected("`:=` or `=`"));
                }
                let expr = targets.pop().expect("one expression");
                let span = expr.span();
                Ok(Stmt::Expr { expr, span })
            }
        }
    }

    // ---- expressions ----

    fn parse_expr_no_struct_lit(&mut self) -> Result<Expr, ParserError> {
        let saved = self.allow_struct_literals;
        self.allow_struct_literals = false;
        let result = self.parse_expr();
        self.allow_struct_literals = saved;
        result
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParserError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::PipePipe => BinaryOp::Or,
                TokenKind::AmpAmp => BinaryOp::And,
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            if op.precedence() <= min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(op.precedence())?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParserError> {
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Amp => Some(UnaryOp::Ref),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span;
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    // Arguments may be struct literals even in no-literal contexts
                    let saved = self.allow_struct_literals;
                    self.allow_struct_literals = true;
                    while self.peek() != TokenKind::RParen {
                        match self.parse_expr() {
                            Ok(arg) => args.push(arg),
                            Err(err) => {
                                self.allow_struct_literals = saved;
                                return Err(err);
                            }
                        }
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.allow_struct_literals = saved;
                    let end = self.expect(TokenKind::RParen)?.span;
                    let span = expr.span().merge(end);
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect(TokenKind::Ident)?;
                    let span = expr.span().merge(field.span);
                    expr = Expr::Selector {
                        base: Box::new(expr),
                        field: field.text,
                        field_span: field.span,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(TokenKind::RBracket)?.span;
                    let span = expr.span().merge(end);
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParserError> {
        match self.peek() {
            TokenKind::Ident => {
                let token = self.advance();
                if self.peek() == TokenKind::LBrace && self.allow_struct_literals {
                    return self.parse_struct_lit(token);
                }
                Ok(Expr::Ident {
                    name: token.text,
                    span: token.span,
                })
            }
            TokenKind::Underscore => {
                let token = self.advance();
                Ok(Expr::Ident {
                    name: "_".to_string(),
                    span: token.span,
                })
            }
            TokenKind::IntLit => {
                let token = self.advance();
                Ok(Expr::Literal {
                    kind: LitKind::Int,
                    text: token.text,
                    span: token.span,
                })
            }
            TokenKind::FloatLit => {
                let token = self.advance();
                Ok(Expr::Literal {
                    kind: LitKind::Float,
                    text: token.text,
                    span: token.span,
                })
            }
            TokenKind::StringLit => {
                let token = self.advance();
                Ok(Expr::Literal {
                    kind: LitKind::Str,
                    text: token.text,
                    span: token.span,
                })
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Literal {
                    kind: LitKind::Bool,
                    text: token.text,
                    span: token.span,
                })
            }
            TokenKind::LParen => {
                let start = self.advance().span;
                let saved = self.allow_struct_literals;
                self.allow_struct_literals = true;
                let inner = self.parse_expr();
                self.allow_struct_literals = saved;
                let inner = inner?;
                let end = self.expect(TokenKind::RParen)?.span;
                Ok(Expr::Paren {
                    inner: Box::new(inner),
                    span: start.merge(end),
                })
            }
            _ => {
                let token = self.current();
                Err(ParserError::ExpectedExpression {
                    span: (token.span.start, token.span.len().max(1)).into(),
                    found: token.text.clone(),
                })
            }
        }
    }

    fn parse_struct_lit(&mut self, name: Token) -> Result<Expr, ParserError> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while self.peek() != TokenKind::RBrace {
            let key = self.expect(TokenKind::Ident)?;
            self.expect(TokenKind::Colon)?;
            let saved = self.allow_struct_literals;
            self.allow_struct_literals = true;
            let value = self.parse_expr();
            self.allow_struct_literals = saved;
            fields.push((key.text, value?));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Expr::StructLit {
            name: name.text,
            name_span: name.span,
            fields,
            span: name.span.merge(end),
        })
    }

    // ---- types ----

    pub fn parse_type(&mut self) -> Result<TypeExpr, ParserError> {
        match self.peek() {
            TokenKind::Star => {
                let start = self.advance().span;
                let inner = self.parse_type()?;
                let span = start.merge(inner.span());
                Ok(TypeExpr::Pointer {
                    inner: Box::new(inner),
                    span,
                })
            }
            TokenKind::LBracket => {
                let start = self.advance().span;
                self.expect(TokenKind::RBracket)?;
                let elem = self.parse_type()?;
                let span = start.merge(elem.span());
                Ok(TypeExpr::Slice {
                    elem: Box::new(elem),
                    span,
                })
            }
            TokenKind::Ident => {
                let first = self.advance();
                let mut name = first.text;
                let mut span = first.span;
                while self.eat(TokenKind::Dot) {
                    let seg = self.expect(TokenKind::Ident)?;
                    name.push('.');
                    name.push_str(&seg.text);
                    span = span.merge(seg.span);
                }
                Ok(TypeExpr::Named { name, span })
            }
            _ => {
                let token = self.current();
                Err(ParserError::ExpectedType {
                    span: (token.span.start, token.span.len().max(1)).into(),
                    found: token.text.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_and_imports() {
        let file = parse_source(
            r#"module store

import "encoding/json"
import db "database/sql"
"#,
        )
        .unwrap();
        assert_eq!(file.module, "store");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].local_name(), "json");
        assert_eq!(file.imports[1].local_name(), "db");
        assert_eq!(file.imports[1].path, "database/sql");
    }

    #[test]
    fn test_parse_struct_with_tags_and_docs() {
        let file = parse_source(
            r#"module store

/// A stored user record
type User struct {
    /// stable identifier
    id int64 `json:"id" db:"user_id"`
    name string
    Meta
}
"#,
        )
        .unwrap();
        let Decl::Type(decl) = &file.decls[0] else {
            panic!("expected type decl");
        };
        assert_eq!(decl.name, "User");
        assert_eq!(decl.doc, vec!["A stored user record"]);
        let TypeKind::Struct(st) = &decl.kind else {
            panic!("expected struct");
        };
        assert_eq!(st.fields.len(), 3);
        assert_eq!(st.fields[0].name.as_deref(), Some("id"));
        assert_eq!(st.fields[0].doc, vec!["stable identifier"]);
        assert_eq!(st.fields[0].tag.as_deref(), Some(r#"json:"id" db:"user_id""#));
        assert_eq!(st.fields[1].name.as_deref(), Some("name"));
        assert!(st.fields[2].name.is_none(), "embedded field has no name");
        assert_eq!(st.fields[2].ty.text(), "Meta");
    }

    #[test]
    fn test_parse_method_with_pointer_receiver() {
        let file = parse_source(
            "module store\n\nfn (u *User) Rename(name string) {\n    u.name = name\n}\n",
        )
        .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let recv = func.receiver.as_ref().unwrap();
        assert_eq!(recv.name, "u");
        assert_eq!(recv.ty, "User");
        assert!(recv.pointer);
        assert_eq!(func.params.len(), 1);
        assert!(func.results.is_empty());
    }

    #[test]
    fn test_parse_multi_assign_and_return() {
        let file = parse_source(
            "module m\n\nfn run() (string, error) {\n    data, err := Read(\"a\")\n    return data, err\n}\n",
        )
        .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        assert_eq!(func.results.len(), 2);
        let Stmt::Assign {
            targets,
            values,
            declare,
            ..
        } = &func.body.stmts[0]
        else {
            panic!("expected assign");
        };
        assert_eq!(targets.len(), 2);
        assert_eq!(values.len(), 1);
        assert!(declare);
        let Stmt::Return { values, .. } = &func.body.stmts[1] else {
            panic!("expected return");
        };
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_parse_if_cond_is_not_struct_lit() {
        let file = parse_source(
            "module m\n\nfn f(ok bool) int {\n    if ok {\n        return 1\n    }\n    return 0\n}\n",
        )
        .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        assert!(matches!(func.body.stmts[0], Stmt::If { .. }));
    }

    #[test]
    fn test_parse_struct_literal_in_assignment() {
        let file =
            parse_source("module m\n\nfn f() User {\n    u := User{id: 1, name: \"x\"}\n    return u\n}\n")
                .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        let Stmt::Assign { values, .. } = &func.body.stmts[0] else {
            panic!("expected assign");
        };
        let Expr::StructLit { name, fields, .. } = &values[0] else {
            panic!("expected struct literal");
        };
        assert_eq!(name, "User");
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_parse_qualified_call_chain() {
        let file = parse_source(
            "module m\n\nfn f(db *sql.DB, id int64) error {\n    err := db.QueryRow(\"q\", id).Scan(&id)\n    return err\n}\n",
        )
        .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        assert_eq!(func.params[0].ty.text(), "*sql.DB");
        let Stmt::Assign { values, .. } = &func.body.stmts[0] else {
            panic!("expected assign");
        };
        assert!(matches!(values[0], Expr::Call { .. }));
    }

    #[test]
    fn test_parse_type_str() {
        assert_eq!(parse_type_str("[]*User").unwrap().text(), "[]*User");
        assert_eq!(parse_type_str("sql.DB").unwrap().text(), "sql.DB");
        assert!(parse_type_str("[]").is_err());
    }

    #[test]
    fn test_missing_module_clause() {
        let err = parse_source("fn f() {}\n").unwrap_err();
        assert!(matches!(err, ParserError::MissingModuleClause { .. }));
    }

    #[test]
    fn test_blank_target_parses_as_ident() {
        let file = parse_source("module m\n\nfn f() {\n    _, err := Read(\"a\")\n    Use(err)\n}\n")
            .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        let Stmt::Assign { targets, .. } = &func.body.stmts[0] else {
            panic!("expected assign");
        };
        let Expr::Ident { name, .. } = &targets[0] else {
            panic!("expected ident");
        };
        assert_eq!(name, "_");
    }
}
