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

//! Statements: `test`, `when`, `call` and assignments with their generators.

use crate::ast::{CaseArm, Expr, ExprKind, Rhs, Scope, Stmt, StmtKind, TypeKind, is_constraint_name};
use crate::lexer::{TokenKind, is_reserved_word};

use super::Parser;
use super::expr::{infer_rhs_type, infer_type};

impl Parser<'_, '_> {
    /// `stmt = stmt-expr ";"`
    pub(super) fn parse_stmt(&mut self) -> Stmt {
        let tok = self.peek();
        let kind = self.parse_stmt_kind();
        let kind = if self.terminator() {
            kind
        } else {
            StmtKind::Dummy
        };
        Stmt {
            kind,
            span: tok.span,
        }
    }

    fn parse_stmt_kind(&mut self) -> StmtKind {
        if self.at("test") || self.at("when") {
            let test = self.at("test");
            self.advance();
            self.consume("(");
            let cond = self.parse_expr();
            self.consume(")");
            return if test {
                StmtKind::Test(cond)
            } else {
                StmtKind::When(cond)
            };
        }
        if self.at("call") {
            return self.parse_call();
        }
        self.parse_assign()
    }

    /// `call = "call" "(" module-name "," vector "," vector ")"`
    ///
    /// The target must be the current module or one of its atom parameters.
    fn parse_call(&mut self) -> StmtKind {
        self.advance();
        self.consume("(");
        let target = self.peek();
        let named = target.kind == TokenKind::Atom
            || (target.kind == TokenKind::Reserved && is_reserved_word(&target.text));
        let module = if named && self.callables.contains(&target.text) {
            target.text.clone()
        } else {
            self.error_at(
                format!("Expected atom, but got {:?}.", target.text),
                &target.span,
            );
            "dummy".to_string()
        };
        self.advance();
        self.consume(",");
        let input = self.parse_struct_arg();
        self.consume(",");
        let output = self.parse_struct_arg();
        self.consume(")");
        StmtKind::Call {
            module,
            input,
            output,
        }
    }

    fn parse_struct_arg(&mut self) -> Expr {
        let arg = self.parse_primary();
        if !matches!(arg.kind, ExprKind::Vector(_) | ExprKind::Dummy) {
            self.error_at(
                format!("Expected vector, but got {}.", infer_type(&arg)),
                &arg.span,
            );
            return Expr::dummy(arg.span);
        }
        arg
    }

    /// `assign = primary "=" rhs`
    ///
    /// A bare, not yet declared variable on the left is declared here with
    /// the type of its right-hand side.
    fn parse_assign(&mut self) -> StmtKind {
        let tok = self.peek();
        let undeclared = tok.kind == TokenKind::Variable
            && !self.peek_next().is(":")
            && self.scope.find(&tok.text).is_none();
        if undeclared {
            self.advance();
            self.consume("=");
            let value = self.parse_rhs();
            self.check_constraint_value(&tok.text, &value);
            let ty = infer_rhs_type(&value, &tok.span);
            let var = self.declare(&tok, ty, Scope::Block, false);
            return StmtKind::Assign {
                target: Expr::new(ExprKind::Var(var), tok.span),
                value,
            };
        }

        let target = self.parse_primary();
        if !matches!(
            target.kind,
            ExprKind::Var(_) | ExprKind::Vector(_) | ExprKind::Dummy
        ) {
            self.error_at(
                format!("Expected variable, but got {:?}.", tok.text),
                &target.span,
            );
        }
        self.consume("=");
        let value = self.parse_rhs();
        if let ExprKind::Var(var) = &target.kind {
            self.check_constraint_value(&var.name, &value);
        }
        StmtKind::Assign { target, value }
    }

    /// A constraint-named target only takes a boolean.
    fn check_constraint_value(&mut self, name: &str, value: &Rhs) {
        if !is_constraint_name(name) {
            return;
        }
        let ty = infer_rhs_type(value, value.span());
        if !ty.is_dummy() && ty.kind != TypeKind::Bool {
            self.error_at(format!("Expected bool, but got {ty}."), value.span());
        }
    }

    /// `rhs = "for" "(" expr "," expr "," expr ")" | "select" "(" expr ")"
    ///      | "case" "(" expr "->" expr {"," expr "->" expr} ")" | expr`
    fn parse_rhs(&mut self) -> Rhs {
        let tok = self.peek();
        if self.at("for") {
            self.advance();
            self.consume("(");
            let from = self.parse_numeric_bound();
            self.consume(",");
            let to = self.parse_numeric_bound();
            self.consume(",");
            let step = self.parse_numeric_bound();
            self.consume(")");
            return Rhs::For {
                from,
                to,
                step,
                span: tok.span,
            };
        }
        if self.at("select") {
            self.advance();
            self.consume("(");
            let list = self.parse_expr();
            self.check_list(&list);
            self.consume(")");
            return Rhs::Select {
                list,
                span: tok.span,
            };
        }
        if self.at("case") {
            self.advance();
            self.consume("(");
            let mut arms = Vec::new();
            loop {
                let cond = self.parse_expr();
                self.consume("->");
                let value = self.parse_expr();
                arms.push(CaseArm { cond, value });
                if !self.at(",") {
                    break;
                }
                self.advance();
            }
            self.consume(")");
            return Rhs::Case {
                arms,
                span: tok.span,
            };
        }
        Rhs::Expr(self.parse_expr())
    }

    fn parse_numeric_bound(&mut self) -> Expr {
        let bound = self.parse_expr();
        let ty = infer_type(&bound);
        if !ty.is_dummy() && !ty.is_numeric() {
            self.error_at(
                format!("Expected integer or real, but got {ty}."),
                &bound.span,
            );
        }
        bound
    }
}
