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

//! Module instances, method frames and unit execution.

use std::fmt;
use std::rc::Rc;

use super::eval::{Env, eval_bool, eval_decimal, eval_value};
use super::generators::{Case, For, Member};
use super::program::{
    CallPlan, MethodPlan, ModulePlan, Op, PlanExpr, ProgramPlan, Target, Transfer,
};
use super::variable::{Binder, Variable};
use super::{Predicate, RuntimeError, Step, Value, Vm};

/// A module bound to its fields and to what runs after it succeeds.
///
/// Every `call` creates a fresh instance, so a nested or recursive call never
/// shares a caller's locals.
pub struct ModuleInstance {
    program: Rc<ProgramPlan>,
    module: usize,
    fields: Vec<Variable>,
    cont: Predicate,
}

impl ModuleInstance {
    pub(crate) fn new(
        program: Rc<ProgramPlan>,
        module: usize,
        fields: Vec<Variable>,
        cont: Predicate,
    ) -> Self {
        Self {
            program,
            module,
            fields,
            cont,
        }
    }

    pub(crate) fn plan(&self) -> &ModulePlan {
        self.program.module(self.module)
    }

    /// Picks the first alternative whose guard holds and registers the later
    /// ones as choice points, nearest alternative on top. A module with a
    /// single alternative enters it without looking at its guard.
    pub(crate) fn enter(this: &Rc<Self>, vm: &mut Vm) -> Result<Predicate, RuntimeError> {
        let methods = &this.plan().methods;
        if methods.len() == 1 {
            return Ok(Frame::next(&Frame::open(this, 0), 0));
        }
        for idx in 0..methods.len() {
            let frame = Frame::open(this, idx);
            if !frame.guard_holds()? {
                continue;
            }
            for later in (idx + 1..methods.len()).rev() {
                vm.push(Step::Alternative {
                    module: Rc::clone(this),
                    index: later,
                });
            }
            return Ok(Frame::next(&frame, 0));
        }
        Ok(Predicate::Failure)
    }

    /// Retries alternative `index` after backtracking; its guard is checked again.
    pub(crate) fn retry(this: &Rc<Self>, index: usize) -> Result<Predicate, RuntimeError> {
        let frame = Frame::open(this, index);
        if frame.guard_holds()? {
            Ok(Frame::next(&frame, 0))
        } else {
            Ok(Predicate::Failure)
        }
    }
}

impl fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("module", &self.plan().name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// One entered method body: fresh locals plus the owning instance.
pub struct Frame {
    module: Rc<ModuleInstance>,
    locals: Vec<Variable>,
    method: usize,
}

impl Frame {
    fn open(module: &Rc<ModuleInstance>, method: usize) -> Rc<Self> {
        let locals = module.plan().methods[method]
            .locals
            .iter()
            .map(Variable::new)
            .collect();
        Rc::new(Self {
            module: Rc::clone(module),
            locals,
            method,
        })
    }

    fn method_plan(&self) -> &MethodPlan {
        &self.module.plan().methods[self.method]
    }

    fn env(&self) -> Env<'_> {
        Env {
            fields: &self.module.fields,
            locals: &self.locals,
        }
    }

    fn guard_holds(&self) -> Result<bool, RuntimeError> {
        match &self.method_plan().guard {
            Some(guard) => eval_bool(guard, self.env()),
            None => Ok(true),
        }
    }

    /// Unit `index`, or the module continuation once every unit has run.
    fn next(this: &Rc<Self>, index: usize) -> Predicate {
        if index < this.method_plan().units.len() {
            Predicate::Next(Step::Unit {
                frame: Rc::clone(this),
                index,
            })
        } else {
            this.module.cont.clone()
        }
    }

    pub(crate) fn run_unit(this: &Rc<Self>, index: usize) -> Result<Predicate, RuntimeError> {
        let env = this.env();
        let unit = &this.method_plan().units[index];
        for op in &unit.ops {
            match op {
                Op::Assign { target, value } => {
                    binder(target, env)?.bind(eval_value(value, env)?)?;
                }
                Op::Case { target, arms } => {
                    let dispatch = arms.iter().fold(Case::new(), |case, (cond, value)| {
                        case.arm(move || eval_bool(cond, env), move || eval_value(value, env))
                    });
                    match dispatch.select()? {
                        Some(value) => binder(target, env)?.bind(value)?,
                        None => return Ok(Predicate::Failure),
                    }
                }
                Op::Check(cond) => {
                    if !eval_bool(cond, env)? {
                        return Ok(Predicate::Failure);
                    }
                }
            }
        }

        let cont = Frame::next(this, index + 1);
        match &unit.transfer {
            Transfer::Continue => Ok(cont),
            Transfer::For {
                target,
                from,
                to,
                step,
            } => For::start(
                env.var(*target)?.clone(),
                eval_decimal(from, env)?,
                eval_decimal(to, env)?,
                eval_decimal(step, env)?,
                cont,
            ),
            Transfer::Member { target, list } => match eval_value(list, env)? {
                Value::List(items) => Ok(Member::start(binder(target, env)?, items, cont)),
                other => Err(RuntimeError::TypeMismatch {
                    expected: "list",
                    found: other.type_name().to_string(),
                }),
            },
            Transfer::Call(call) => this.call(call, cont),
        }
    }

    /// Instantiates the callee. Plain variable inputs and every output share
    /// the caller's slots; other inputs are evaluated into fresh variables.
    fn call(&self, call: &CallPlan, cont: Predicate) -> Result<Predicate, RuntimeError> {
        let env = self.env();
        let program = Rc::clone(&self.module.program);
        let callee = program.module(call.module);
        let mut fields = Vec::with_capacity(callee.fields.len());
        for (input, field) in call.inputs.iter().zip(&callee.fields) {
            let var = match input {
                PlanExpr::Var(slot) => env.var(*slot)?.clone(),
                expr => Variable::bound(&field.name, eval_value(expr, env)?),
            };
            fields.push(var);
        }
        for slot in &call.outputs {
            fields.push(env.var(*slot)?.clone());
        }
        tracing::trace!(callee = %callee.name, "call");
        let instance = ModuleInstance::new(Rc::clone(&program), call.module, fields, cont);
        Ok(Predicate::Next(Step::Enter(Rc::new(instance))))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("module", &self.module.plan().name)
            .field("method", &self.method_plan().name)
            .field("locals", &self.locals)
            .finish()
    }
}

fn binder(target: &Target, env: Env<'_>) -> Result<Binder, RuntimeError> {
    Ok(match target {
        Target::Var(slot) => Binder::Var(env.var(*slot)?.clone()),
        Target::Destructure(slots) => Binder::Destructure(
            slots
                .iter()
                .map(|slot| env.var(*slot).cloned())
                .collect::<Result<_, _>>()?,
        ),
    })
}
