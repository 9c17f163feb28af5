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

//! Generator primitives: `For` ranges, `Member` list selection and `Case`
//! first-match dispatch.

use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::variable::{Binder, Variable};
use super::{Predicate, RuntimeError, Step, Value, Vm, decimal};

/// Enumerates `from, from + step, ...` up to and including `to`.
///
/// Each binding registers the generator itself as a choice point while a
/// further value remains, so backtracking resumes with the next value.
#[derive(Debug)]
pub struct For {
    target: Variable,
    counter: RefCell<BigDecimal>,
    to: BigDecimal,
    step: BigDecimal,
    cont: Predicate,
}

impl For {
    /// Returns the predicate that binds the first value, or failure for an
    /// empty range.
    pub fn start(
        target: Variable,
        from: BigDecimal,
        to: BigDecimal,
        step: BigDecimal,
        cont: Predicate,
    ) -> Result<Predicate, RuntimeError> {
        if step <= BigDecimal::zero() {
            return Err(RuntimeError::InvalidStep {
                step: step.to_string(),
            });
        }
        if from > to {
            return Ok(Predicate::Failure);
        }
        Ok(Predicate::Next(Step::For(Rc::new(Self {
            target,
            counter: RefCell::new(from),
            to,
            step,
            cont,
        }))))
    }

    pub fn exec(this: &Rc<Self>, vm: &mut Vm) -> Result<Predicate, RuntimeError> {
        let current = this.counter.borrow().clone();
        this.target.set(Value::Number(decimal::to_f64(&current)?));
        let next = decimal::add(&current, &this.step);
        if next <= this.to {
            *this.counter.borrow_mut() = next;
            vm.push(Step::For(Rc::clone(this)));
        }
        Ok(this.cont.clone())
    }
}

/// Enumerates the items of a list in order.
#[derive(Debug)]
pub struct Member {
    target: Binder,
    items: Vec<Value>,
    next: Cell<usize>,
    cont: Predicate,
}

impl Member {
    /// Returns the predicate that binds the first item, or failure for an
    /// empty list.
    pub fn start(target: Binder, items: Vec<Value>, cont: Predicate) -> Predicate {
        if items.is_empty() {
            return Predicate::Failure;
        }
        Predicate::Next(Step::Member(Rc::new(Self {
            target,
            items,
            next: Cell::new(0),
            cont,
        })))
    }

    pub fn exec(this: &Rc<Self>, vm: &mut Vm) -> Result<Predicate, RuntimeError> {
        let idx = this.next.get();
        let Some(item) = this.items.get(idx) else {
            return Ok(Predicate::Failure);
        };
        this.target.bind(item.clone())?;
        if idx + 1 < this.items.len() {
            this.next.set(idx + 1);
            vm.push(Step::Member(Rc::clone(this)));
        }
        Ok(this.cont.clone())
    }
}

type Condition<'a> = Box<dyn Fn() -> Result<bool, RuntimeError> + 'a>;
type Branch<'a, T> = Box<dyn Fn() -> Result<T, RuntimeError> + 'a>;

/// Ordered `(condition, value)` arms; the first arm whose condition holds
/// wins and nothing after it is evaluated.
pub struct Case<'a, T> {
    arms: Vec<(Condition<'a>, Branch<'a, T>)>,
}

impl<T> Default for Case<'_, T> {
    fn default() -> Self {
        Self { arms: Vec::new() }
    }
}

impl<'a, T> Case<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(
        mut self,
        cond: impl Fn() -> Result<bool, RuntimeError> + 'a,
        value: impl Fn() -> Result<T, RuntimeError> + 'a,
    ) -> Self {
        self.arms.push((Box::new(cond), Box::new(value)));
        self
    }

    /// Value of the first matching arm, `None` when no condition holds.
    pub fn select(&self) -> Result<Option<T>, RuntimeError> {
        for (cond, value) in &self.arms {
            if cond()? {
                return value().map(Some);
            }
        }
        Ok(None)
    }
}
