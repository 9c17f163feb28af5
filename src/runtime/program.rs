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

//! Executable program plans, input bindings and solutions.

use bigdecimal::BigDecimal;
use serde::Serialize;
use serde::ser::SerializeMap;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::ast::{BinOp, TypeKind};
use crate::config::RunOptions;

use super::exec::ModuleInstance;
use super::variable::Variable;
use super::{Predicate, RuntimeError, Step, Value, Vm};

/// Variable address inside a running method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Module field (parameter scope).
    Outer(usize),
    /// Local of the current method body.
    Method(usize),
}

/// Evaluable expression.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanExpr {
    Number(BigDecimal),
    Atom(String),
    Bool(bool),
    Var(Slot),
    List(Vec<PlanExpr>),
    Vector(Vec<PlanExpr>),
    Neg(Box<PlanExpr>),
    Not(Box<PlanExpr>),
    Binary {
        op: BinOp,
        lhs: Box<PlanExpr>,
        rhs: Box<PlanExpr>,
    },
    Sqrt(Box<PlanExpr>),
    Exp(Box<PlanExpr>),
    Length(Box<PlanExpr>),
    /// `nth(index, list)`.
    Nth(Box<PlanExpr>, Box<PlanExpr>),
    Sum(Box<PlanExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Var(Slot),
    Destructure(Vec<Slot>),
}

/// Straight-line operation inside a unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Assign { target: Target, value: PlanExpr },
    /// First-match dispatch; no match fails the unit.
    Case {
        target: Target,
        arms: Vec<(PlanExpr, PlanExpr)>,
    },
    /// Fails the unit when the condition is false.
    Check(PlanExpr),
}

/// How a unit hands over control once its operations succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum Transfer {
    /// Runs the next unit of the method.
    Continue,
    For {
        target: Slot,
        from: PlanExpr,
        to: PlanExpr,
        step: PlanExpr,
    },
    Member { target: Target, list: PlanExpr },
    Call(CallPlan),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallPlan {
    /// Index of the callee in [`ProgramPlan::modules`].
    pub module: usize,
    pub inputs: Vec<PlanExpr>,
    pub outputs: Vec<Slot>,
}

/// One continuation unit: a scheduled statement block.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPlan {
    pub ops: Vec<Op>,
    pub transfer: Transfer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodPlan {
    pub name: String,
    pub guard: Option<PlanExpr>,
    pub locals: Vec<String>,
    pub units: Vec<UnitPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    pub name: String,
    pub ty: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModulePlan {
    pub name: String,
    /// Parameter-group members, inputs first.
    pub fields: Vec<FieldPlan>,
    /// Number of leading fields that are inputs.
    pub inputs: usize,
    pub methods: Vec<MethodPlan>,
}

impl ModulePlan {
    pub fn input_fields(&self) -> &[FieldPlan] {
        &self.fields[..self.inputs]
    }

    pub fn output_fields(&self) -> &[FieldPlan] {
        &self.fields[self.inputs..]
    }
}

/// A compiled program. Every call target index refers to one of its modules;
/// the entry module is the first.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramPlan {
    modules: Vec<ModulePlan>,
}

impl ProgramPlan {
    pub(crate) fn new(modules: Vec<ModulePlan>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[ModulePlan] {
        &self.modules
    }

    pub fn entry(&self) -> Option<&ModulePlan> {
        self.modules.first()
    }

    pub(crate) fn module(&self, index: usize) -> &ModulePlan {
        &self.modules[index]
    }
}

/// Input values keyed by binding name.
///
/// Generated entry points take their inputs with a leading `_`; both `_R`
/// and `R` are accepted, the prefixed key winning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .get(&format!("_{name}"))
            .or_else(|| self.values.get(name))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}

/// One accepted solution: output names and values in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<(String, Value)>,
}

impl Solution {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Solution {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Solution {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Value reported for an output the search never bound.
pub fn default_value(ty: &TypeKind) -> Value {
    match ty {
        TypeKind::Integer | TypeKind::Real | TypeKind::Dummy => Value::Number(0.0),
        TypeKind::Atom => Value::Atom(String::new()),
        TypeKind::Bool => Value::Bool(false),
        TypeKind::List(_) => Value::List(Vec::new()),
        TypeKind::Vector(members) => {
            Value::Vector(members.iter().map(|member| default_value(&member.kind)).collect())
        }
    }
}

/// Lazy solution stream; each `next` resumes the search with `redo`.
pub struct Solutions {
    vm: Vm,
    start: Option<Predicate>,
    outputs: Vec<(String, TypeKind, Variable)>,
    remaining: Option<usize>,
    exhausted: bool,
}

impl Solutions {
    pub(crate) fn new(
        program: &Rc<ProgramPlan>,
        bindings: &Bindings,
        options: &RunOptions,
    ) -> Result<Self, RuntimeError> {
        let entry = program
            .entry()
            .ok_or(RuntimeError::NoEntry)?;
        let mut fields = Vec::with_capacity(entry.fields.len());
        for field in entry.input_fields() {
            let value = bindings
                .get(&field.name)
                .cloned()
                .ok_or_else(|| RuntimeError::MissingInput {
                    name: field.name.clone(),
                })?;
            fields.push(Variable::bound(&field.name, value));
        }
        let mut outputs = Vec::new();
        for field in entry.output_fields() {
            let var = Variable::new(&field.name);
            outputs.push((field.name.clone(), field.ty.clone(), var.clone()));
            fields.push(var);
        }

        let instance = ModuleInstance::new(Rc::clone(program), 0, fields, Predicate::Success);
        Ok(Self {
            vm: Vm::with_capacity(options.initial_choice_points),
            start: Some(Predicate::Next(Step::Enter(Rc::new(instance)))),
            outputs,
            remaining: options.max_solutions,
            exhausted: false,
        })
    }

    fn snapshot(&self) -> Solution {
        let values = self
            .outputs
            .iter()
            .map(|(name, ty, var)| {
                let value = var.value().unwrap_or_else(|| default_value(ty));
                (name.clone(), value)
            })
            .collect();
        Solution { values }
    }
}

impl Iterator for Solutions {
    type Item = Result<Solution, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.remaining == Some(0) {
            return None;
        }
        let found = match self.start.take() {
            Some(start) => self.vm.call(start),
            None => self.vm.redo(),
        };
        match found {
            Ok(true) => {
                if let Some(remaining) = &mut self.remaining {
                    *remaining -= 1;
                }
                let solution = self.snapshot();
                tracing::debug!(pending = self.vm.depth(), "solution found");
                Some(Ok(solution))
            }
            Ok(false) => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}
