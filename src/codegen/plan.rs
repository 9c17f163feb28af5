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

//! Scheduled modules to an executable [`ProgramPlan`].

use std::collections::HashMap;

use crate::ast::{Builtin, SourceSpan, UnaryOp};
use crate::compiler::ir::{IrExpr, IrMethod, IrStmt, IrStmtKind, IrTarget, IrVar};
use crate::diagnostics::{CompileError, CompileErrors};
use crate::project::SourceDocument;
use crate::runtime::{
    CallPlan, FieldPlan, MethodPlan, ModulePlan, Op, PlanExpr, ProgramPlan, Slot, Target,
    Transfer, UnitPlan, decimal,
};

use super::{ScheduledMethod, ScheduledModule};

/// Builds the program plan; the first module is the entry point.
///
/// Call targets are resolved to module indices here, and each call is
/// checked against the callee's input and output arity.
pub(crate) fn build_plan(modules: &[ScheduledModule]) -> Result<ProgramPlan, CompileErrors> {
    let index: HashMap<&str, usize> = modules
        .iter()
        .enumerate()
        .map(|(idx, module)| (module.ir.name.as_str(), idx))
        .collect();
    let mut builder = PlanBuilder {
        modules,
        index,
        errors: Vec::new(),
    };

    let plans = modules
        .iter()
        .map(|module| builder.module(module))
        .collect();
    if builder.errors.is_empty() {
        Ok(ProgramPlan::new(plans))
    } else {
        Err(CompileErrors(builder.errors))
    }
}

struct PlanBuilder<'m> {
    modules: &'m [ScheduledModule],
    index: HashMap<&'m str, usize>,
    errors: Vec<CompileError>,
}

impl PlanBuilder<'_> {
    fn module(&mut self, module: &ScheduledModule) -> ModulePlan {
        let fields = module
            .ir
            .fields
            .iter()
            .map(|var| FieldPlan {
                name: var.name.clone(),
                ty: var.ty.kind.clone(),
            })
            .collect();
        let methods = module
            .methods
            .iter()
            .map(|method| self.method(&module.doc, method))
            .collect();
        ModulePlan {
            name: module.ir.name.clone(),
            fields,
            inputs: module.ir.inputs().len(),
            methods,
        }
    }

    fn method(&mut self, doc: &SourceDocument, method: &ScheduledMethod) -> MethodPlan {
        let IrMethod {
            name,
            guard,
            locals,
            ..
        } = &method.ir;
        let guard = guard.as_ref().and_then(|cond| self.expr(doc, cond, &method.ir.span));
        let units = method
            .blocks
            .iter()
            .map(|block| self.unit(doc, &block.stmts))
            .collect();
        MethodPlan {
            name: name.clone(),
            guard,
            locals: locals.iter().map(|var| var.name.clone()).collect(),
            units,
        }
    }

    /// Straight-line statements become operations; a generator or call as
    /// the last statement becomes the unit's transfer.
    fn unit(&mut self, doc: &SourceDocument, stmts: &[IrStmt]) -> UnitPlan {
        let mut ops = Vec::new();
        let mut transfer = Transfer::Continue;
        for stmt in stmts {
            match &stmt.kind {
                IrStmtKind::Assign { target, value } => {
                    if let Some(value) = self.expr(doc, value, &stmt.span) {
                        ops.push(Op::Assign {
                            target: target_plan(target),
                            value,
                        });
                    }
                    if stmt.is_constraint() {
                        if let IrTarget::Var(var) = target {
                            ops.push(Op::Check(PlanExpr::Var(slot(var))));
                        }
                    }
                }
                IrStmtKind::Case { target, arms } => {
                    let arms = arms
                        .iter()
                        .filter_map(|arm| {
                            Some((
                                self.expr(doc, &arm.cond, &stmt.span)?,
                                self.expr(doc, &arm.value, &stmt.span)?,
                            ))
                        })
                        .collect();
                    ops.push(Op::Case {
                        target: target_plan(target),
                        arms,
                    });
                }
                IrStmtKind::Test(cond) | IrStmtKind::When(cond) => {
                    if let Some(cond) = self.expr(doc, cond, &stmt.span) {
                        ops.push(Op::Check(cond));
                    }
                }
                IrStmtKind::Range {
                    target,
                    from,
                    to,
                    step,
                } => {
                    let bounds = (
                        self.expr(doc, from, &stmt.span),
                        self.expr(doc, to, &stmt.span),
                        self.expr(doc, step, &stmt.span),
                    );
                    if let (Some(from), Some(to), Some(step)) = bounds {
                        transfer = Transfer::For {
                            target: slot(target),
                            from,
                            to,
                            step,
                        };
                    }
                }
                IrStmtKind::Select { target, list } => {
                    if let Some(list) = self.expr(doc, list, &stmt.span) {
                        transfer = Transfer::Member {
                            target: target_plan(target),
                            list,
                        };
                    }
                }
                IrStmtKind::Call {
                    module,
                    inputs,
                    outputs,
                } => {
                    if let Some(call) = self.call(doc, stmt, module, inputs, outputs) {
                        transfer = Transfer::Call(call);
                    }
                }
                IrStmtKind::Dummy => {}
            }
        }
        UnitPlan { ops, transfer }
    }

    fn call(
        &mut self,
        doc: &SourceDocument,
        stmt: &IrStmt,
        module: &str,
        inputs: &[IrExpr],
        outputs: &[IrVar],
    ) -> Option<CallPlan> {
        let Some(&callee) = self.index.get(module) else {
            self.errors.push(doc.error(
                format!("Module {module:?} is not defined."),
                &stmt.span,
            ));
            return None;
        };
        let target = &self.modules[callee].ir;
        let (want_in, want_out) = (target.inputs().len(), target.outputs().len());
        if inputs.len() != want_in || outputs.len() != want_out {
            self.errors.push(doc.error(
                format!(
                    "Module {module:?} takes {want_in} inputs and {want_out} outputs, but got {} and {}.",
                    inputs.len(),
                    outputs.len()
                ),
                &stmt.span,
            ));
            return None;
        }
        let inputs = inputs
            .iter()
            .map(|input| self.expr(doc, input, &stmt.span))
            .collect::<Option<Vec<_>>>()?;
        Some(CallPlan {
            module: callee,
            inputs,
            outputs: outputs.iter().map(slot).collect(),
        })
    }

    fn expr(
        &mut self,
        doc: &SourceDocument,
        expr: &IrExpr,
        span: &SourceSpan,
    ) -> Option<PlanExpr> {
        let sub = |this: &mut Self, inner: &IrExpr| this.expr(doc, inner, span).map(Box::new);
        Some(match expr {
            IrExpr::Number(text) => match decimal::parse(text) {
                Ok(number) => PlanExpr::Number(number),
                Err(err) => {
                    self.errors.push(doc.error(format!("{err}."), span));
                    return None;
                }
            },
            IrExpr::Atom(atom) => PlanExpr::Atom(atom.clone()),
            IrExpr::Bool(flag) => PlanExpr::Bool(*flag),
            IrExpr::Var(var) => PlanExpr::Var(slot(var)),
            IrExpr::List(items) => PlanExpr::List(self.exprs(doc, items, span)?),
            IrExpr::Vector(items) => PlanExpr::Vector(self.exprs(doc, items, span)?),
            IrExpr::Unary { op, operand } => match op {
                UnaryOp::Neg => PlanExpr::Neg(sub(self, operand)?),
                UnaryOp::Not => PlanExpr::Not(sub(self, operand)?),
            },
            IrExpr::Binary { op, lhs, rhs } => PlanExpr::Binary {
                op: *op,
                lhs: sub(self, lhs)?,
                rhs: sub(self, rhs)?,
            },
            IrExpr::Builtin { func, args } => {
                let mut args = self.exprs(doc, args, span)?.into_iter().map(Box::new);
                let mut arg = || args.next();
                match func {
                    Builtin::Sqrt => PlanExpr::Sqrt(arg()?),
                    Builtin::Exp => PlanExpr::Exp(arg()?),
                    Builtin::Length => PlanExpr::Length(arg()?),
                    Builtin::Sum => PlanExpr::Sum(arg()?),
                    Builtin::Nth => {
                        let index = arg()?;
                        PlanExpr::Nth(index, arg()?)
                    }
                }
            }
        })
    }

    fn exprs(
        &mut self,
        doc: &SourceDocument,
        exprs: &[IrExpr],
        span: &SourceSpan,
    ) -> Option<Vec<PlanExpr>> {
        exprs.iter().map(|expr| self.expr(doc, expr, span)).collect()
    }
}

pub(super) fn slot(var: &IrVar) -> Slot {
    if var.in_param {
        Slot::Outer(var.slot)
    } else {
        Slot::Method(var.slot)
    }
}

fn target_plan(target: &IrTarget) -> Target {
    match target {
        IrTarget::Var(var) => Target::Var(slot(var)),
        IrTarget::Destructure(vars) => Target::Destructure(vars.iter().map(slot).collect()),
    }
}
