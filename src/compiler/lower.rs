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

//! Syntax tree to lowered form.

use crate::ast::{Block, Expr, ExprKind, Module, Rhs, Scope, Stmt, StmtKind, VarRef};
use std::collections::HashMap;

use super::CompileContext;
use super::ir::{IrCaseArm, IrExpr, IrMethod, IrModule, IrStmt, IrStmtKind, IrTarget, IrVar};

/// Lowers one parsed module. Problems are recorded in `ctx` and the offending
/// statement becomes [`IrStmtKind::Dummy`].
pub(crate) fn lower_module(module: &Module, ctx: &mut CompileContext) -> IrModule {
    let mut lowering = Lowering {
        ctx,
        fields: HashMap::new(),
        locals: HashMap::new(),
    };

    let mut fields = Vec::new();
    let mut groups = Vec::new();
    for (group, members) in module.groups().enumerate() {
        groups.push(members.len());
        for member in members {
            let var = IrVar::field(&member.name, member.ty.clone(), fields.len(), group == 0);
            lowering.fields.insert(member.name.clone(), var.clone());
            fields.push(var);
        }
    }

    let methods = module
        .blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| lowering.lower_block(idx, block))
        .collect();

    tracing::debug!(module = %module.name, fields = fields.len(), "lowered module");
    IrModule {
        name: module.name.clone(),
        fields,
        groups,
        methods,
        span: module.span.clone(),
    }
}

struct Lowering<'c> {
    ctx: &'c mut CompileContext,
    fields: HashMap<String, IrVar>,
    locals: HashMap<String, IrVar>,
}

impl Lowering<'_> {
    fn lower_block(&mut self, idx: usize, block: &Block) -> IrMethod {
        self.locals.clear();
        let mut locals = Vec::with_capacity(block.locals.len());
        for (slot, local) in block.locals.iter().enumerate() {
            let var = IrVar::local(&local.name, local.ty.clone(), slot);
            self.locals.insert(local.name.clone(), var.clone());
            locals.push(var);
        }

        let guard = block.guard.as_ref().and_then(|cond| self.lower_expr(cond));
        let body = block.body.iter().map(|stmt| self.lower_stmt(stmt)).collect();
        IrMethod {
            name: (idx + 1).to_string(),
            guard,
            locals,
            body,
            span: block.span.clone(),
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> IrStmt {
        let kind = self.lower_stmt_kind(&stmt.kind).unwrap_or(IrStmtKind::Dummy);
        IrStmt {
            kind,
            span: stmt.span.clone(),
        }
    }

    fn lower_stmt_kind(&mut self, kind: &StmtKind) -> Option<IrStmtKind> {
        let lowered = match kind {
            StmtKind::Assign { target, value } => {
                let target = self.lower_target(target)?;
                match value {
                    Rhs::Expr(expr) => IrStmtKind::Assign {
                        target,
                        value: self.lower_expr(expr)?,
                    },
                    Rhs::For {
                        from,
                        to,
                        step,
                        span,
                    } => {
                        let IrTarget::Var(target) = target else {
                            self.ctx
                                .error_at("Expected variable, but got vector.", span);
                            return None;
                        };
                        IrStmtKind::Range {
                            target,
                            from: self.lower_expr(from)?,
                            to: self.lower_expr(to)?,
                            step: self.lower_expr(step)?,
                        }
                    }
                    Rhs::Select { list, .. } => IrStmtKind::Select {
                        target,
                        list: self.lower_expr(list)?,
                    },
                    Rhs::Case { arms, .. } => {
                        let mut lowered = Vec::with_capacity(arms.len());
                        for arm in arms {
                            lowered.push(IrCaseArm {
                                cond: self.lower_expr(&arm.cond)?,
                                value: self.lower_expr(&arm.value)?,
                            });
                        }
                        IrStmtKind::Case {
                            target,
                            arms: lowered,
                        }
                    }
                }
            }
            StmtKind::Test(cond) => IrStmtKind::Test(self.lower_expr(cond)?),
            StmtKind::When(cond) => IrStmtKind::When(self.lower_expr(cond)?),
            StmtKind::Call {
                module,
                input,
                output,
            } => {
                let inputs = match &input.kind {
                    ExprKind::Vector(members) => members
                        .iter()
                        .map(|member| self.lower_expr(&member.value))
                        .collect::<Option<Vec<_>>>()?,
                    _ => return None,
                };
                let outputs = match self.lower_target(output)? {
                    IrTarget::Var(var) => vec![var],
                    IrTarget::Destructure(vars) => vars,
                };
                IrStmtKind::Call {
                    module: module.clone(),
                    inputs,
                    outputs,
                }
            }
            StmtKind::Dummy => return None,
        };
        Some(lowered)
    }

    fn lower_target(&mut self, target: &Expr) -> Option<IrTarget> {
        match &target.kind {
            ExprKind::Var(var) => self.resolve(var).map(IrTarget::Var),
            ExprKind::Vector(members) => {
                let mut vars = Vec::with_capacity(members.len());
                for member in members {
                    match &member.value.kind {
                        ExprKind::Var(var) => vars.push(self.resolve(var)?),
                        ExprKind::Dummy => return None,
                        _ => {
                            self.ctx.error_at(
                                "Expected variable, but got expression.",
                                &member.span,
                            );
                            return None;
                        }
                    }
                }
                Some(IrTarget::Destructure(vars))
            }
            _ => None,
        }
    }

    fn lower_expr(&mut self, expr: &Expr) -> Option<IrExpr> {
        let lowered = match &expr.kind {
            ExprKind::Number(text) => IrExpr::Number(text.clone()),
            ExprKind::Str(text) | ExprKind::Atom(text) => IrExpr::Atom(text.clone()),
            ExprKind::Bool(value) => IrExpr::Bool(*value),
            ExprKind::Var(var) => IrExpr::Var(self.resolve(var)?),
            ExprKind::List(items) => IrExpr::List(self.lower_all(items.iter())?),
            ExprKind::Vector(members) => {
                IrExpr::Vector(self.lower_all(members.iter().map(|member| &member.value))?)
            }
            ExprKind::Unary { op, operand } => IrExpr::Unary {
                op: *op,
                operand: Box::new(self.lower_expr(operand)?),
            },
            ExprKind::Binary { op, lhs, rhs } => IrExpr::Binary {
                op: *op,
                lhs: Box::new(self.lower_expr(lhs)?),
                rhs: Box::new(self.lower_expr(rhs)?),
            },
            ExprKind::Builtin { func, args } => IrExpr::Builtin {
                func: *func,
                args: self.lower_all(args.iter())?,
            },
            ExprKind::Dummy => return None,
        };
        Some(lowered)
    }

    fn lower_all<'e>(&mut self, exprs: impl Iterator<Item = &'e Expr>) -> Option<Vec<IrExpr>> {
        exprs.map(|expr| self.lower_expr(expr)).collect()
    }

    fn resolve(&mut self, var: &VarRef) -> Option<IrVar> {
        let table = match var.scope {
            Scope::Module => &self.fields,
            Scope::Block => &self.locals,
        };
        let found = table.get(&var.name).cloned();
        if found.is_none() {
            self.ctx
                .error_at(format!("Variable {:?} is not defined.", var.name), &var.span);
        }
        found
    }
}
