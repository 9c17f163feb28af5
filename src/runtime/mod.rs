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

//! Backtracking execution model.
//!
//! A [`Predicate`] is either a final answer (`Success`, `Failure`) or the next
//! [`Step`] to run. The [`Vm`] keeps running steps; on failure it resumes the
//! most recent choice point. Generators ([`For`], [`Member`]) register
//! themselves as choice points while candidates remain.
//!
//! Compiled programs run as [`ProgramPlan`]s. Hand-written or generated code
//! can plug into the same loop through the [`Goal`] trait.

pub mod decimal;
mod errors;
mod eval;
mod exec;
mod generators;
mod program;
mod value;
mod variable;
mod vm;

use std::fmt;
use std::rc::Rc;

pub use errors::RuntimeError;
pub use eval::{nth, sum};
pub use exec::{Frame, ModuleInstance};
pub use generators::{Case, For, Member};
pub use program::{
    Bindings, CallPlan, FieldPlan, MethodPlan, ModulePlan, Op, PlanExpr, ProgramPlan, Slot,
    Solution, Solutions, Target, Transfer, UnitPlan, default_value,
};
pub use value::Value;
pub use variable::{Binder, Variable};
pub use vm::Vm;

/// Outcome of running one step.
#[derive(Debug, Clone)]
pub enum Predicate {
    Success,
    /// No solution down this path; backtrack.
    Failure,
    Next(Step),
}

/// A resumable unit of work.
#[derive(Clone)]
pub enum Step {
    /// Dispatch over a module's alternatives.
    Enter(Rc<ModuleInstance>),
    /// A later alternative, retried on backtrack.
    Alternative {
        module: Rc<ModuleInstance>,
        index: usize,
    },
    /// One scheduled unit of an entered method.
    Unit { frame: Rc<Frame>, index: usize },
    For(Rc<For>),
    Member(Rc<Member>),
    Native(Rc<dyn Goal>),
}

impl Step {
    pub fn exec(&self, vm: &mut Vm) -> Result<Predicate, RuntimeError> {
        match self {
            Step::Enter(module) => ModuleInstance::enter(module, vm),
            Step::Alternative { module, index } => ModuleInstance::retry(module, *index),
            Step::Unit { frame, index } => Frame::run_unit(frame, *index),
            Step::For(range) => For::exec(range, vm),
            Step::Member(member) => Member::exec(member, vm),
            Step::Native(goal) => goal.exec(vm),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Enter(module) => write!(f, "Enter({})", module.plan().name),
            Step::Alternative { module, index } => {
                write!(f, "Alternative({}, {})", module.plan().name, index + 1)
            }
            Step::Unit { frame, index } => write!(f, "Unit({frame:?}, {index})"),
            Step::For(_) => write!(f, "For"),
            Step::Member(_) => write!(f, "Member"),
            Step::Native(_) => write!(f, "Native"),
        }
    }
}

/// A step implemented outside the plan interpreter.
pub trait Goal {
    fn exec(&self, vm: &mut Vm) -> Result<Predicate, RuntimeError>;
}
