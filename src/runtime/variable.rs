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

//! Shared, rebindable variable slots.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{RuntimeError, Value};

#[derive(Debug)]
struct Binding {
    name: String,
    value: RefCell<Option<Value>>,
}

/// A named slot that is unbound until a statement or generator sets it.
///
/// Clones share the slot: a `call` hands the caller's variables to the
/// callee this way, so the callee's bindings are visible to the caller.
#[derive(Clone)]
pub struct Variable(Rc<Binding>);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(Binding {
            name: name.into(),
            value: RefCell::new(None),
        }))
    }

    pub fn bound(name: impl Into<String>, value: Value) -> Self {
        let var = Self::new(name);
        var.set(value);
        var
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Current value; reading an unbound variable is a program defect.
    pub fn get(&self) -> Result<Value, RuntimeError> {
        self.value().ok_or_else(|| RuntimeError::Unbound {
            name: self.0.name.clone(),
        })
    }

    pub fn value(&self) -> Option<Value> {
        self.0.value.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.0.value.borrow_mut() = Some(value);
    }

    pub fn is_bound(&self) -> bool {
        self.0.value.borrow().is_some()
    }

    /// Whether both handles refer to the same slot.
    pub fn same_slot(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{} = {value}", self.0.name),
            None => write!(f, "{} = _", self.0.name),
        }
    }
}

/// Where a generated value goes: one variable, or one per vector member.
#[derive(Debug, Clone)]
pub enum Binder {
    Var(Variable),
    Destructure(Vec<Variable>),
}

impl Binder {
    pub fn bind(&self, value: Value) -> Result<(), RuntimeError> {
        match self {
            Binder::Var(var) => {
                var.set(value);
                Ok(())
            }
            Binder::Destructure(vars) => {
                let Value::Vector(items) = value else {
                    return Err(RuntimeError::TypeMismatch {
                        expected: "vector",
                        found: value.type_name().to_string(),
                    });
                };
                if items.len() != vars.len() {
                    return Err(RuntimeError::Arity {
                        expected: vars.len(),
                        found: items.len(),
                    });
                }
                for (var, item) in vars.iter().zip(items) {
                    var.set(item);
                }
                Ok(())
            }
        }
    }
}
