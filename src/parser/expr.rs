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

//! Expressions, from lowest to highest precedence:
//!
//! `or`, `and`, `not(...)`, equality (`=`, `\=`), relational (`<`, `=<`, `>`,
//! `>=`), additive, multiplicative (`*`, `/`, `mod`), power (`^`, right
//! associative), unary minus, primary.
//!
//! `>` and `>=` are rewritten to `<` and `=<` with swapped operands.

use crate::ast::{
    BinOp, Builtin, Expr, ExprKind, Member, Rhs, Scope, SourceSpan, Type, TypeKind, UnaryOp,
    VarRef,
};
use crate::lexer::{Token, TokenKind};

use super::Parser;

/// Vector member before its variable is declared or resolved.
enum PendingMember {
    Var { tok: Token, ty: Option<Type> },
    Value(Expr),
}

impl Parser<'_, '_> {
    pub(super) fn parse_expr(&mut self) -> Expr {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Expr {
        let mut lhs = self.parse_and();
        while self.at("or") {
            let op = self.advance();
            let rhs = self.parse_and();
            lhs = binary(BinOp::Or, lhs, rhs, op.span);
        }
        lhs
    }

    fn parse_and(&mut self) -> Expr {
        let mut lhs = self.parse_not();
        while self.at("and") {
            let op = self.advance();
            let rhs = self.parse_not();
            lhs = binary(BinOp::And, lhs, rhs, op.span);
        }
        lhs
    }

    fn parse_not(&mut self) -> Expr {
        if self.at("not") {
            let tok = self.advance();
            self.consume("(");
            let operand = self.parse_expr();
            self.consume(")");
            return Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                tok.span,
            );
        }
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Expr {
        let mut lhs = self.parse_relational();
        loop {
            let op = if self.at("=") || self.at("==") {
                BinOp::Eq
            } else if self.at("\\=") {
                BinOp::Ne
            } else {
                return lhs;
            };
            let tok = self.advance();
            let rhs = self.parse_relational();
            lhs = binary(op, lhs, rhs, tok.span);
        }
    }

    fn parse_relational(&mut self) -> Expr {
        let mut lhs = self.parse_additive();
        loop {
            let (op, swap) = if self.at("<") {
                (BinOp::Lt, false)
            } else if self.at("=<") {
                (BinOp::Le, false)
            } else if self.at(">") {
                (BinOp::Lt, true)
            } else if self.at(">=") {
                (BinOp::Le, true)
            } else {
                return lhs;
            };
            let tok = self.advance();
            let rhs = self.parse_additive();
            lhs = if swap {
                binary(op, rhs, lhs, tok.span)
            } else {
                binary(op, lhs, rhs, tok.span)
            };
        }
    }

    fn parse_additive(&mut self) -> Expr {
        let mut lhs = self.parse_multiplicative();
        loop {
            let op = if self.at("+") {
                BinOp::Add
            } else if self.at("-") {
                BinOp::Sub
            } else {
                return lhs;
            };
            let tok = self.advance();
            let rhs = self.parse_multiplicative();
            lhs = self.arithmetic(op, lhs, rhs, tok.span);
        }
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut lhs = self.parse_power();
        loop {
            let op = if self.at("*") {
                BinOp::Mul
            } else if self.at("/") {
                BinOp::Div
            } else if self.at("mod") {
                BinOp::Mod
            } else {
                return lhs;
            };
            let tok = self.advance();
            let rhs = self.parse_power();
            lhs = self.arithmetic(op, lhs, rhs, tok.span);
        }
    }

    fn parse_power(&mut self) -> Expr {
        let base = self.parse_unary();
        if !self.at("^") {
            return base;
        }
        let tok = self.advance();
        let exponent = self.parse_power();
        self.arithmetic(BinOp::Pow, base, exponent, tok.span)
    }

    fn parse_unary(&mut self) -> Expr {
        if self.at("-") {
            let tok = self.advance();
            let operand = self.parse_unary();
            self.check_numeric_operand(&operand);
            return Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                tok.span,
            );
        }
        self.parse_primary()
    }

    /// Builds an arithmetic node after checking both operand types.
    fn arithmetic(&mut self, op: BinOp, lhs: Expr, rhs: Expr, span: SourceSpan) -> Expr {
        self.check_numeric_operand(&lhs);
        self.check_numeric_operand(&rhs);
        binary(op, lhs, rhs, span)
    }

    fn check_numeric_operand(&mut self, operand: &Expr) {
        let ty = infer_type(operand);
        if !ty.is_dummy() && !ty.is_numeric() {
            self.error_at(
                format!("Expected integer or real, but got {ty}."),
                &operand.span,
            );
        }
    }

    pub(super) fn check_list(&mut self, expr: &Expr) {
        let ty = infer_type(expr);
        if !ty.is_dummy() && !matches!(ty.kind, TypeKind::List(_)) {
            self.error_at(format!("Expected list, but got {ty}."), &expr.span);
        }
    }

    /// `primary = builtin "(" ... ")" | "(" expr ")" | list | vector
    ///          | "true" | "false" | number | string | atom | variable [":" type]`
    pub(super) fn parse_primary(&mut self) -> Expr {
        let tok = self.peek();
        if let Some(func) = builtin(&tok) {
            return self.parse_builtin(func);
        }
        if self.at("(") {
            self.advance();
            let expr = self.parse_expr();
            self.consume(")");
            return expr;
        }
        if self.at("[") {
            return self.parse_list();
        }
        if self.at("{") {
            let members = self.parse_vector(None);
            return Expr::new(ExprKind::Vector(members), tok.span);
        }
        if self.at("true") || self.at("false") {
            self.advance();
            return Expr::new(ExprKind::Bool(tok.text == "true"), tok.span);
        }
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                Expr::new(ExprKind::Number(tok.text), tok.span)
            }
            TokenKind::Str => {
                self.advance();
                Expr::new(ExprKind::Str(tok.text), tok.span)
            }
            TokenKind::Atom => {
                self.advance();
                Expr::new(ExprKind::Atom(tok.text), tok.span)
            }
            TokenKind::Variable => {
                self.advance();
                let var = if self.at(":") {
                    self.advance();
                    let ty = self.parse_type();
                    Some(self.declare(&tok, ty, Scope::Block, false))
                } else {
                    self.lookup(&tok)
                };
                match var {
                    Some(var) => Expr::new(ExprKind::Var(var), tok.span),
                    None => Expr::dummy(tok.span),
                }
            }
            _ => {
                self.error_at(format!("Unexpected token {:?}.", tok.text), &tok.span);
                self.advance();
                Expr::dummy(tok.span)
            }
        }
    }

    fn parse_builtin(&mut self, func: Builtin) -> Expr {
        let tok = self.advance();
        self.consume("(");
        let mut args = vec![self.parse_expr()];
        match func {
            Builtin::Sqrt | Builtin::Exp => self.check_numeric_operand(&args[0]),
            Builtin::Length | Builtin::Sum => self.check_list(&args[0]),
            Builtin::Nth => {
                self.check_numeric_operand(&args[0]);
                self.consume(",");
                let list = self.parse_expr();
                self.check_list(&list);
                args.push(list);
            }
        }
        self.consume(")");
        Expr::new(ExprKind::Builtin { func, args }, tok.span)
    }

    /// `list = "[" [expr {"," expr} [","]] "]"`
    fn parse_list(&mut self) -> Expr {
        let tok = self.consume("[");
        let mut items = Vec::new();
        if !self.at("]") {
            items.push(self.parse_expr());
            while self.at(",") && !self.peek_next().is("]") {
                self.advance();
                items.push(self.parse_expr());
            }
            if self.at(",") {
                self.advance();
            }
        }
        self.consume("]");
        Expr::new(ExprKind::List(items), tok.span)
    }

    /// Parses a parameter group; every member declares a module variable.
    pub(super) fn parse_param_group(&mut self, input: bool) -> Vec<VarRef> {
        self.parse_vector(Some(input))
            .into_iter()
            .filter_map(|member| match member.value.kind {
                ExprKind::Var(var) => Some(var),
                _ => None,
            })
            .collect()
    }

    /// `vector = "{" [member {"," member} [","]] "}" [":" "{" type {"," type} "}"]`
    ///
    /// `param` is `Some(input)` for parameter groups. In expressions, members
    /// carrying a type (their own or from the group annotation) declare block
    /// variables; bare members must already be declared.
    fn parse_vector(&mut self, param: Option<bool>) -> Vec<Member> {
        self.consume("{");
        let mut pending = Vec::new();
        if !self.at("}") {
            pending.push(self.parse_member(param.is_some()));
            while self.at(",") && !self.peek_next().is("}") {
                self.advance();
                pending.push(self.parse_member(param.is_some()));
            }
            if self.at(",") {
                self.advance();
            }
        }
        self.consume("}");

        let all_vars = pending
            .iter()
            .all(|member| matches!(member, PendingMember::Var { .. }));
        let mut group_types: Vec<Type> = Vec::new();
        if self.at(":") && all_vars {
            self.advance();
            let annotation = self.parse_type();
            match annotation.kind {
                TypeKind::Vector(types) if types.len() == pending.len() => group_types = types,
                TypeKind::Vector(types) => self.error_at(
                    format!(
                        "Expected {} member types, but got {}.",
                        pending.len(),
                        types.len()
                    ),
                    &annotation.span,
                ),
                TypeKind::Dummy => {}
                _ => self.error_at(
                    format!("Expected vector type, but got {annotation}."),
                    &annotation.span,
                ),
            }
        }

        let mut members = Vec::with_capacity(pending.len());
        for (idx, member) in pending.into_iter().enumerate() {
            match member {
                PendingMember::Value(value) => members.push(Member {
                    span: value.span.clone(),
                    value,
                    declares: false,
                }),
                PendingMember::Var { tok, ty } => {
                    let ty = ty.or_else(|| group_types.get(idx).cloned());
                    let (value, declares) = match (param, ty) {
                        (Some(input), Some(ty)) => {
                            let var = self.declare(&tok, ty, Scope::Module, input);
                            (Expr::new(ExprKind::Var(var), tok.span.clone()), true)
                        }
                        (Some(_), None) => {
                            self.error_at(
                                format!("Parameter {:?} needs a type.", tok.text),
                                &tok.span,
                            );
                            (Expr::dummy(tok.span.clone()), false)
                        }
                        (None, Some(ty)) => {
                            let var = self.declare(&tok, ty, Scope::Block, false);
                            (Expr::new(ExprKind::Var(var), tok.span.clone()), true)
                        }
                        (None, None) => match self.lookup(&tok) {
                            Some(var) => (Expr::new(ExprKind::Var(var), tok.span.clone()), false),
                            None => (Expr::dummy(tok.span.clone()), false),
                        },
                    };
                    members.push(Member {
                        value,
                        declares,
                        span: tok.span,
                    });
                }
            }
        }
        members
    }

    /// `member = variable [":" type] | expr`
    fn parse_member(&mut self, param: bool) -> PendingMember {
        let tok = self.peek();
        let bare_var = tok.kind == TokenKind::Variable && {
            let next = self.peek_next();
            next.is(":") || next.is(",") || next.is("}")
        };
        if bare_var {
            self.advance();
            let ty = if self.at(":") {
                self.advance();
                Some(self.parse_type())
            } else {
                None
            };
            return PendingMember::Var { tok, ty };
        }
        if param {
            self.error_at(
                format!("Expected variable, but got {:?}.", tok.text),
                &tok.span,
            );
            self.advance();
            return PendingMember::Value(Expr::dummy(tok.span));
        }
        PendingMember::Value(self.parse_expr())
    }
}

fn builtin(tok: &Token) -> Option<Builtin> {
    if tok.kind != TokenKind::Reserved {
        return None;
    }
    match tok.text.as_str() {
        "sqrt" => Some(Builtin::Sqrt),
        "exp" => Some(Builtin::Exp),
        "length" => Some(Builtin::Length),
        "nth" => Some(Builtin::Nth),
        "sum" => Some(Builtin::Sum),
        _ => None,
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr, span: SourceSpan) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

/// Static type of an expression; `Dummy` when it cannot be known.
pub(super) fn infer_type(expr: &Expr) -> Type {
    let span = expr.span.clone();
    let kind = match &expr.kind {
        ExprKind::Number(text) => {
            if text.contains(['.', 'e', 'E']) {
                TypeKind::Real
            } else {
                TypeKind::Integer
            }
        }
        ExprKind::Str(_) | ExprKind::Atom(_) => TypeKind::Atom,
        ExprKind::Bool(_) => TypeKind::Bool,
        ExprKind::Var(var) => return var.ty.clone(),
        ExprKind::List(items) => TypeKind::List(items.first().map(infer_type).into_iter().collect()),
        ExprKind::Vector(members) => {
            TypeKind::Vector(members.iter().map(|m| infer_type(&m.value)).collect())
        }
        ExprKind::Unary {
            op: UnaryOp::Not, ..
        } => TypeKind::Bool,
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => return Type::new(infer_type(operand).kind, span),
        ExprKind::Binary { op, lhs, rhs } => {
            if op.is_comparison() || op.is_logical() {
                TypeKind::Bool
            } else {
                numeric_result(*op, &infer_type(lhs), &infer_type(rhs))
            }
        }
        ExprKind::Builtin { func, args } => match func {
            Builtin::Sqrt | Builtin::Exp => TypeKind::Real,
            Builtin::Length => TypeKind::Integer,
            Builtin::Nth => element_kind(args.get(1)),
            Builtin::Sum => match element_kind(args.first()) {
                TypeKind::Integer => TypeKind::Integer,
                _ => TypeKind::Real,
            },
        },
        ExprKind::Dummy => TypeKind::Dummy,
    };
    Type::new(kind, span)
}

fn element_kind(list: Option<&Expr>) -> TypeKind {
    list.map(infer_type)
        .and_then(|ty| ty.element().map(|elem| elem.kind.clone()))
        .unwrap_or(TypeKind::Dummy)
}

fn numeric_result(op: BinOp, lhs: &Type, rhs: &Type) -> TypeKind {
    if lhs.is_dummy() || rhs.is_dummy() {
        return TypeKind::Dummy;
    }
    let integers = lhs.kind == TypeKind::Integer && rhs.kind == TypeKind::Integer;
    match op {
        BinOp::Div => TypeKind::Real,
        _ if integers => TypeKind::Integer,
        _ => TypeKind::Real,
    }
}

/// Type a variable receives when declared by assignment of `rhs`.
pub(super) fn infer_rhs_type(rhs: &Rhs, anchor: &SourceSpan) -> Type {
    let kind = match rhs {
        Rhs::Expr(expr) => infer_type(expr).kind,
        Rhs::For { from, to, step, .. } => {
            let integers = [from, to, step]
                .iter()
                .all(|bound| infer_type(bound).kind == TypeKind::Integer);
            if integers {
                TypeKind::Integer
            } else {
                TypeKind::Real
            }
        }
        Rhs::Select { list, .. } => infer_type(list)
            .element()
            .map(|elem| elem.kind.clone())
            .unwrap_or(TypeKind::Dummy),
        Rhs::Case { arms, .. } => arms
            .first()
            .map(|arm| infer_type(&arm.value).kind)
            .unwrap_or(TypeKind::Dummy),
    };
    Type::new(kind, anchor.clone())
}
