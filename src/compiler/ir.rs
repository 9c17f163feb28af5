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

//! Lowered intermediate form.
//!
//! Every variable carries its storage slot and whether it lives in the module
//! fields (`in_param`) or in the locals of one method body. Generator
//! assignments (`for`, `select`, `case`) are their own statement kinds since
//! they decide what runs next rather than just computing a value.

use crate::ast::{BinOp, Builtin, SourceSpan, Type, UnaryOp, is_constraint_name};

/// Variable after slot assignment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IrVar {
    pub(crate) name: String,
    pub(crate) ty: Type,
    /// Index into the module fields or the method locals.
    pub(crate) slot: usize,
    /// Bound in the module parameter scope.
    pub(crate) in_param: bool,
    /// Member of the first parameter group.
    pub(crate) input: bool,
}

impl IrVar {
    /// Method-local variable.
    pub(crate) fn local(name: impl Into<String>, ty: Type, slot: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            slot,
            in_param: false,
            input: false,
        }
    }

    /// Module field; `input` marks members of the first group.
    pub(crate) fn field(name: impl Into<String>, ty: Type, slot: usize, input: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            slot,
            in_param: true,
            input,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IrExpr {
    /// Numeric literal as written.
    Number(String),
    Atom(String),
    Bool(bool),
    Var(IrVar),
    List(Vec<IrExpr>),
    Vector(Vec<IrExpr>),
    Unary {
        op: UnaryOp,
        operand: Box<IrExpr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<IrExpr>,
        rhs: Box<IrExpr>,
    },
    Builtin {
        func: Builtin,
        args: Vec<IrExpr>,
    },
}

impl IrExpr {
    /// Appends every variable read by this expression, in reading order.
    pub(crate) fn collect_vars<'a>(&'a self, out: &mut Vec<&'a IrVar>) {
        match self {
            IrExpr::Number(_) | IrExpr::Atom(_) | IrExpr::Bool(_) => {}
            IrExpr::Var(var) => out.push(var),
            IrExpr::List(items) | IrExpr::Vector(items) => {
                items.iter().for_each(|item| item.collect_vars(out))
            }
            IrExpr::Unary { operand, .. } => operand.collect_vars(out),
            IrExpr::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            IrExpr::Builtin { args, .. } => args.iter().for_each(|arg| arg.collect_vars(out)),
        }
    }
}

/// Left-hand side of a binding statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IrTarget {
    Var(IrVar),
    /// `{A, B} = ...`: the value must be a vector of matching arity.
    Destructure(Vec<IrVar>),
}

impl IrTarget {
    pub(crate) fn vars(&self) -> &[IrVar] {
        match self {
            IrTarget::Var(var) => std::slice::from_ref(var),
            IrTarget::Destructure(vars) => vars,
        }
    }

    /// Name of the binding this target is known by: its first variable.
    pub(crate) fn name(&self) -> Option<&str> {
        self.vars().first().map(|var| var.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IrCaseArm {
    pub(crate) cond: IrExpr,
    pub(crate) value: IrExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IrStmtKind {
    /// Plain computation.
    Assign { target: IrTarget, value: IrExpr },
    /// `for(from, to, step)` enumeration.
    Range {
        target: IrVar,
        from: IrExpr,
        to: IrExpr,
        step: IrExpr,
    },
    /// `select(list)` enumeration.
    Select { target: IrTarget, list: IrExpr },
    /// First-match dispatch; fails when no arm holds.
    Case {
        target: IrTarget,
        arms: Vec<IrCaseArm>,
    },
    Test(IrExpr),
    When(IrExpr),
    Call {
        module: String,
        inputs: Vec<IrExpr>,
        outputs: Vec<IrVar>,
    },
    Dummy,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IrStmt {
    pub(crate) kind: IrStmtKind,
    pub(crate) span: SourceSpan,
}

impl IrStmt {
    pub(crate) fn new(kind: IrStmtKind) -> Self {
        Self {
            kind,
            span: SourceSpan::default(),
        }
    }

    pub(crate) fn is_dummy(&self) -> bool {
        matches!(self.kind, IrStmtKind::Dummy)
    }

    /// Assignment whose target name marks it as a constraint check.
    pub(crate) fn is_constraint(&self) -> bool {
        match &self.kind {
            IrStmtKind::Assign { target, .. } => target
                .name()
                .is_some_and(is_constraint_name),
            _ => false,
        }
    }

    /// Variables this statement binds.
    pub(crate) fn writes(&self) -> Vec<&IrVar> {
        match &self.kind {
            IrStmtKind::Assign { target, .. }
            | IrStmtKind::Select { target, .. }
            | IrStmtKind::Case { target, .. } => target.vars().iter().collect(),
            IrStmtKind::Range { target, .. } => vec![target],
            IrStmtKind::Call { outputs, .. } => outputs.iter().collect(),
            IrStmtKind::Test(_) | IrStmtKind::When(_) | IrStmtKind::Dummy => Vec::new(),
        }
    }

    /// Variables this statement reads, in reading order, duplicates included.
    pub(crate) fn reads(&self) -> Vec<&IrVar> {
        let mut out = Vec::new();
        match &self.kind {
            IrStmtKind::Assign { value, .. } => value.collect_vars(&mut out),
            IrStmtKind::Range { from, to, step, .. } => {
                from.collect_vars(&mut out);
                to.collect_vars(&mut out);
                step.collect_vars(&mut out);
            }
            IrStmtKind::Select { list, .. } => list.collect_vars(&mut out),
            IrStmtKind::Case { arms, .. } => {
                for arm in arms {
                    arm.cond.collect_vars(&mut out);
                    arm.value.collect_vars(&mut out);
                }
            }
            IrStmtKind::Test(cond) | IrStmtKind::When(cond) => cond.collect_vars(&mut out),
            IrStmtKind::Call { inputs, .. } => {
                inputs.iter().for_each(|input| input.collect_vars(&mut out))
            }
            IrStmtKind::Dummy => {}
        }
        out
    }
}

/// One candidate method body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IrMethod {
    /// Stable per-module number: "1", "2", ...
    pub(crate) name: String,
    pub(crate) guard: Option<IrExpr>,
    pub(crate) locals: Vec<IrVar>,
    pub(crate) body: Vec<IrStmt>,
    pub(crate) span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IrModule {
    pub(crate) name: String,
    /// All parameter-group members, group 0 first; index = slot.
    pub(crate) fields: Vec<IrVar>,
    /// Member count of each parameter group.
    pub(crate) groups: Vec<usize>,
    pub(crate) methods: Vec<IrMethod>,
    pub(crate) span: SourceSpan,
}

impl IrModule {
    /// Members of the first parameter group.
    pub(crate) fn inputs(&self) -> &[IrVar] {
        let count = self.groups.first().copied().unwrap_or(0);
        &self.fields[..count.min(self.fields.len())]
    }

    /// Members of every group after the first.
    pub(crate) fn outputs(&self) -> &[IrVar] {
        &self.fields[self.inputs().len()..]
    }
}
