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

//! Expression evaluation against a method's two environments.

use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;

use crate::ast::BinOp;

use super::program::{PlanExpr, Slot};
use super::variable::Variable;
use super::{RuntimeError, Value, decimal};

/// The module fields ("outer") and the method locals visible to a unit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Env<'a> {
    pub(crate) fields: &'a [Variable],
    pub(crate) locals: &'a [Variable],
}

impl<'a> Env<'a> {
    pub(crate) fn var(&self, slot: Slot) -> Result<&'a Variable, RuntimeError> {
        let (vars, idx, scope) = match slot {
            Slot::Outer(idx) => (self.fields, idx, "field"),
            Slot::Method(idx) => (self.locals, idx, "local"),
        };
        vars.get(idx).ok_or_else(|| RuntimeError::Unbound {
            name: format!("{scope} #{idx}"),
        })
    }
}

/// Intermediate value: numbers stay decimal until stored.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Decimal(BigDecimal),
    Atom(String),
    Bool(bool),
    List(Vec<Value>),
    Vector(Vec<Value>),
}

impl Operand {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        Ok(match value {
            Value::Number(number) => Operand::Decimal(decimal::from_f64(number)?),
            Value::Atom(atom) => Operand::Atom(atom),
            Value::Bool(flag) => Operand::Bool(flag),
            Value::List(items) => Operand::List(items),
            Value::Vector(items) => Operand::Vector(items),
        })
    }

    fn into_value(self) -> Result<Value, RuntimeError> {
        Ok(match self {
            Operand::Decimal(number) => Value::Number(decimal::to_f64(&number)?),
            Operand::Atom(atom) => Value::Atom(atom),
            Operand::Bool(flag) => Value::Bool(flag),
            Operand::List(items) => Value::List(items),
            Operand::Vector(items) => Value::Vector(items),
        })
    }

    fn type_name(&self) -> &'static str {
        match self {
            Operand::Decimal(_) => "number",
            Operand::Atom(_) => "atom",
            Operand::Bool(_) => "bool",
            Operand::List(_) => "list",
            Operand::Vector(_) => "vector",
        }
    }

    fn mismatch(&self, expected: &'static str) -> RuntimeError {
        RuntimeError::TypeMismatch {
            expected,
            found: self.type_name().to_string(),
        }
    }

    pub(crate) fn into_decimal(self) -> Result<BigDecimal, RuntimeError> {
        match self {
            Operand::Decimal(number) => Ok(number),
            other => Err(other.mismatch("number")),
        }
    }

    fn into_bool(self) -> Result<bool, RuntimeError> {
        match self {
            Operand::Bool(flag) => Ok(flag),
            other => Err(other.mismatch("bool")),
        }
    }

    fn into_list(self) -> Result<Vec<Value>, RuntimeError> {
        match self {
            Operand::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }
}

pub(crate) fn eval(expr: &PlanExpr, env: Env<'_>) -> Result<Operand, RuntimeError> {
    Ok(match expr {
        PlanExpr::Number(number) => Operand::Decimal(number.clone()),
        PlanExpr::Atom(atom) => Operand::Atom(atom.clone()),
        PlanExpr::Bool(flag) => Operand::Bool(*flag),
        PlanExpr::Var(slot) => Operand::from_value(env.var(*slot)?.get()?)?,
        PlanExpr::List(items) => Operand::List(eval_values(items, env)?),
        PlanExpr::Vector(items) => Operand::Vector(eval_values(items, env)?),
        PlanExpr::Neg(operand) => Operand::Decimal(-eval(operand, env)?.into_decimal()?),
        PlanExpr::Not(operand) => Operand::Bool(!eval(operand, env)?.into_bool()?),
        PlanExpr::Binary { op, lhs, rhs } => binary(*op, lhs, rhs, env)?,
        PlanExpr::Sqrt(operand) => {
            Operand::Decimal(decimal::sqrt(&eval(operand, env)?.into_decimal()?)?)
        }
        PlanExpr::Exp(operand) => {
            Operand::Decimal(decimal::exp(&eval(operand, env)?.into_decimal()?))
        }
        PlanExpr::Length(list) => {
            Operand::Decimal(BigDecimal::from(eval(list, env)?.into_list()?.len() as u64))
        }
        PlanExpr::Nth(index, list) => {
            let index = eval(index, env)?.into_decimal()?;
            Operand::from_value(nth(&eval(list, env)?.into_list()?, &index)?)?
        }
        PlanExpr::Sum(list) => Operand::Decimal(sum(&eval(list, env)?.into_list()?)?),
    })
}

pub(crate) fn eval_value(expr: &PlanExpr, env: Env<'_>) -> Result<Value, RuntimeError> {
    eval(expr, env)?.into_value()
}

pub(crate) fn eval_bool(expr: &PlanExpr, env: Env<'_>) -> Result<bool, RuntimeError> {
    eval(expr, env)?.into_bool()
}

pub(crate) fn eval_decimal(expr: &PlanExpr, env: Env<'_>) -> Result<BigDecimal, RuntimeError> {
    eval(expr, env)?.into_decimal()
}

/// `nth(index, list)`: 0-based element access.
pub fn nth(items: &[Value], index: &BigDecimal) -> Result<Value, RuntimeError> {
    decimal::is_integer(index)
        .then(|| index.to_usize())
        .flatten()
        .and_then(|idx| items.get(idx).cloned())
        .ok_or_else(|| RuntimeError::IndexOutOfRange {
            index: index.to_string(),
            len: items.len(),
        })
}

/// `sum(list)` over numeric items.
pub fn sum(items: &[Value]) -> Result<BigDecimal, RuntimeError> {
    let mut total = BigDecimal::zero();
    for item in items {
        total = decimal::add(&total, &item.decimal()?);
    }
    Ok(total)
}

fn eval_values(items: &[PlanExpr], env: Env<'_>) -> Result<Vec<Value>, RuntimeError> {
    items.iter().map(|item| eval_value(item, env)).collect()
}

fn binary(op: BinOp, lhs: &PlanExpr, rhs: &PlanExpr, env: Env<'_>) -> Result<Operand, RuntimeError> {
    let numbers = || -> Result<(BigDecimal, BigDecimal), RuntimeError> {
        Ok((eval_decimal(lhs, env)?, eval_decimal(rhs, env)?))
    };
    Ok(match op {
        BinOp::And => Operand::Bool(eval_bool(lhs, env)? && eval_bool(rhs, env)?),
        BinOp::Or => Operand::Bool(eval_bool(lhs, env)? || eval_bool(rhs, env)?),
        BinOp::Eq => Operand::Bool(eval(lhs, env)? == eval(rhs, env)?),
        BinOp::Ne => Operand::Bool(eval(lhs, env)? != eval(rhs, env)?),
        BinOp::Lt => Operand::Bool(compare(eval(lhs, env)?, eval(rhs, env)?)? == Ordering::Less),
        BinOp::Le => {
            Operand::Bool(compare(eval(lhs, env)?, eval(rhs, env)?)? != Ordering::Greater)
        }
        BinOp::Add => match (eval(lhs, env)?, eval(rhs, env)?) {
            (Operand::Atom(a), Operand::Atom(b)) => Operand::Atom(a + &b),
            (a, b) => Operand::Decimal(decimal::add(&a.into_decimal()?, &b.into_decimal()?)),
        },
        BinOp::Sub => {
            let (a, b) = numbers()?;
            Operand::Decimal(decimal::sub(&a, &b))
        }
        BinOp::Mul => {
            let (a, b) = numbers()?;
            Operand::Decimal(decimal::mul(&a, &b))
        }
        BinOp::Div => {
            let (a, b) = numbers()?;
            Operand::Decimal(decimal::div(&a, &b)?)
        }
        BinOp::Mod => {
            let (a, b) = numbers()?;
            Operand::Decimal(decimal::rem(&a, &b)?)
        }
        BinOp::Pow => {
            let (a, b) = numbers()?;
            Operand::Decimal(decimal::pow(&a, &b)?)
        }
    })
}

/// Orders two numbers or two atoms.
fn compare(lhs: Operand, rhs: Operand) -> Result<Ordering, RuntimeError> {
    match (lhs, rhs) {
        (Operand::Decimal(a), Operand::Decimal(b)) => Ok(a.cmp(&b)),
        (Operand::Atom(a), Operand::Atom(b)) => Ok(a.cmp(&b)),
        (Operand::Decimal(_), other) => Err(other.mismatch("number")),
        (Operand::Atom(_), other) => Err(other.mismatch("atom")),
        (other, _) => Err(other.mismatch("number")),
    }
}
