/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Recursive-descent parser over the token stream.
//!
//! The grammar:
//! - `module = function-name "(" [param {"," param}] ")" block+ "end" "module" ";"`
//! - `param  = atom | "{" member {"," member} "}" [":" vector-type]`
//! - `block  = "method" stmt* "end" "method" ";"`
//! - `stmt   = ("test" "(" expr ")" | "when" "(" expr ")" | call | assign) ";"`
//!
//! Expressions are described in [`expr`](self::expr). The parser is error
//! tolerant: a mismatch records a diagnostic in the [`CompileContext`],
//! yields a dummy node and parsing continues. It never moves past the
//! end-of-input token, so every loop terminates.

mod expr;
mod scope;
mod statements;
mod types;

use crate::ast::{Block, Module, Param, Program, Scope, SourceSpan, StmtKind, Type, VarRef};
use crate::compiler::CompileContext;
use crate::lexer::{Token, TokenKind, is_reserved_word};

use self::scope::ScopeTable;

/// Parses a full token stream into a [`Program`], recording errors in `ctx`.
pub(crate) fn parse(tokens: &[Token], ctx: &mut CompileContext) -> Program {
    let mut parser = Parser::new(tokens, ctx);
    parser.parse_program()
}

/// Parser state for one source.
pub(crate) struct Parser<'t, 'c> {
    tokens: &'t [Token],
    current: usize,
    ctx: &'c mut CompileContext,
    scope: ScopeTable,
    /// Names usable as `call` targets in the current module.
    callables: Vec<String>,
    /// Number of vector parameter groups seen in the current module.
    groups: usize,
    eof: Token,
}

impl<'t, 'c> Parser<'t, 'c> {
    fn new(tokens: &'t [Token], ctx: &'c mut CompileContext) -> Self {
        let eof = tokens
            .last()
            .filter(|tok| tok.is_eof())
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", SourceSpan::default()));
        Self {
            tokens,
            current: 0,
            ctx,
            scope: ScopeTable::default(),
            callables: Vec::new(),
            groups: 0,
            eof,
        }
    }

    fn token_at(&self, index: usize) -> Token {
        self.tokens
            .get(index)
            .cloned()
            .unwrap_or_else(|| self.eof.clone())
    }

    pub(super) fn peek(&self) -> Token {
        self.token_at(self.current)
    }

    pub(super) fn peek_next(&self) -> Token {
        self.token_at(self.current + 1)
    }

    /// Moves to the next token, never past end-of-input. Returns the token left behind.
    pub(super) fn advance(&mut self) -> Token {
        let tok = self.peek();
        if !tok.is_eof() {
            self.current += 1;
        }
        tok
    }

    pub(super) fn at(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    pub(super) fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn at_kind_reserved(&self) -> bool {
        self.at_kind(TokenKind::Reserved)
    }

    pub(super) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub(super) fn error_at(&mut self, message: impl Into<String>, span: &SourceSpan) {
        self.ctx.error_at(message, span);
    }

    /// Records an error unless the current token is `text`.
    pub(super) fn expect(&mut self, text: &str) -> bool {
        if self.at(text) {
            return true;
        }
        let cur = self.peek();
        self.error_at(
            format!("Expected {text}, but got {:?}.", cur.text),
            &cur.span,
        );
        false
    }

    /// Checks for `text` and advances past the current token either way.
    pub(super) fn consume(&mut self, text: &str) -> Token {
        self.expect(text);
        self.advance()
    }

    /// Consumes a `;` terminator.
    ///
    /// A terminator missing at end-of-input is reported one line up, on the
    /// construct left unterminated, rather than on the empty last line.
    pub(super) fn terminator(&mut self) -> bool {
        if self.at(";") {
            self.advance();
            return true;
        }
        let cur = self.peek();
        let message = format!("Expected ;, but got {:?}.", cur.text);
        if cur.is_eof() {
            let previous_line = self
                .current
                .checked_sub(1)
                .map(|idx| self.token_at(idx).span.line)
                .unwrap_or(cur.span.line);
            let span = if cur.span.line > previous_line {
                cur.span.on_line(cur.span.line - 1)
            } else {
                cur.span.clone()
            };
            self.error_at(message, &span);
        } else {
            self.error_at(message, &cur.span);
            self.advance();
        }
        false
    }

    /// Declares a variable, or checks a redeclaration against the first type.
    ///
    /// A conflicting redeclaration is reported at the new annotation and
    /// yields a dummy variable; the scope keeps the first declaration.
    pub(super) fn declare(&mut self, tok: &Token, ty: Type, scope: Scope, input: bool) -> VarRef {
        if let Some(existing) = self.scope.find(&tok.text).cloned() {
            if !existing.ty.compatible(&ty) {
                self.error_at(
                    format!(
                        "Variable {:?} is already defined as {}.",
                        tok.text, existing.ty
                    ),
                    &ty.span,
                );
                return VarRef {
                    name: "dummy".to_string(),
                    ty: Type::dummy(tok.span.clone()),
                    span: tok.span.clone(),
                    ..existing
                };
            }
            return VarRef {
                span: tok.span.clone(),
                ..existing
            };
        }
        let var = VarRef {
            name: tok.text.clone(),
            ty,
            scope,
            input,
            span: tok.span.clone(),
        };
        self.scope.insert(var.clone());
        var
    }

    /// Resolves a bare reference against the visible scopes.
    pub(super) fn lookup(&mut self, tok: &Token) -> Option<VarRef> {
        let found = self.scope.find(&tok.text).cloned().map(|var| VarRef {
            span: tok.span.clone(),
            ..var
        });
        if found.is_none() {
            self.error_at(
                format!("Variable {:?} is not defined.", tok.text),
                &tok.span,
            );
        }
        found
    }

    fn parse_program(&mut self) -> Program {
        let mut modules = Vec::new();
        while !self.at_eof() {
            modules.push(self.parse_module());
        }
        tracing::debug!(modules = modules.len(), "parsed program");
        Program { modules }
    }

    fn parse_module(&mut self) -> Module {
        self.scope.reset();
        self.callables.clear();
        self.groups = 0;

        let tok = self.peek();
        let name = if tok.kind == TokenKind::Function {
            tok.text.clone()
        } else {
            self.error_at(
                format!("Expected module name, but got {:?}.", tok.text),
                &tok.span,
            );
            "dummy".to_string()
        };
        self.advance();
        self.callables.push(name.clone());

        let params = self.parse_params();
        let mut blocks = Vec::new();
        while !self.at("end") && !self.at_eof() {
            blocks.push(self.parse_block());
        }
        if blocks.is_empty() {
            self.error_at(format!("Module {name:?} has no method."), &tok.span);
        }
        self.consume("end");
        if self.expect("module") {
            self.advance();
        }
        self.terminator();

        Module {
            name,
            params,
            blocks,
            span: tok.span,
        }
    }

    /// `params = "(" [param {"," param}] ")"`
    fn parse_params(&mut self) -> Vec<Param> {
        self.consume("(");
        let mut params = Vec::new();
        if !self.at(")") {
            params.push(self.parse_param());
            while self.at(",") {
                self.advance();
                params.push(self.parse_param());
            }
        }
        self.consume(")");
        params
    }

    /// `param = atom | vector`
    fn parse_param(&mut self) -> Param {
        let tok = self.peek();
        let module_name = tok.kind == TokenKind::Atom
            || (tok.kind == TokenKind::Reserved && is_reserved_word(&tok.text));
        if module_name {
            self.advance();
            self.callables.push(tok.text.clone());
            return Param::Module {
                name: tok.text,
                span: tok.span,
            };
        }
        if self.at("{") {
            let input = self.groups == 0;
            self.groups += 1;
            let members = self.parse_param_group(input);
            return Param::Group {
                members,
                span: tok.span,
            };
        }
        self.error_at(
            format!("Expected parameter, but got {:?}.", tok.text),
            &tok.span,
        );
        self.advance();
        Param::Dummy(tok.span)
    }

    /// `block = "method" stmt* "end" "method" ";"`
    fn parse_block(&mut self) -> Block {
        let tok = self.peek();
        self.consume("method");
        self.scope.enter_block();
        let mut body = Vec::new();
        while !self.at("end") && !self.at_eof() {
            body.push(self.parse_stmt());
        }
        self.consume("end");
        self.consume("method");
        self.terminator();
        let locals = self.scope.leave_block();

        // A leading `when` becomes the guard of this alternative.
        let mut guard = None;
        if let Some(first) = body.iter().position(|stmt| !stmt.is_dummy()) {
            if matches!(body[first].kind, StmtKind::When(_)) {
                if let StmtKind::When(cond) = body.remove(first).kind {
                    guard = Some(cond);
                }
            }
        }
        for stmt in &body {
            if matches!(stmt.kind, StmtKind::When(_)) {
                self.ctx.error_at(
                    "\"when\" must be the first statement of a method.",
                    &stmt.span,
                );
            }
        }

        Block {
            guard,
            body,
            locals,
            span: tok.span,
        }
    }
}
