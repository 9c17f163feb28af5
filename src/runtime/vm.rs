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

//! The backtracking driver.

use super::{Predicate, RuntimeError, Step};
use crate::config::DEFAULT_CHOICE_POINTS;

/// Runs predicates and keeps the choice-point stack.
///
/// The stack is last in, first out: the alternative registered most recently
/// is retried first.
pub struct Vm {
    choice_points: Vec<Step>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHOICE_POINTS)
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a VM whose stack starts with room for `capacity` choice points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            choice_points: Vec::with_capacity(capacity),
        }
    }

    /// Registers an alternative to resume on backtrack.
    pub fn push(&mut self, step: Step) {
        tracing::trace!(depth = self.choice_points.len() + 1, step = ?step, "push choice point");
        self.choice_points.push(step);
    }

    fn pop(&mut self) -> Option<Step> {
        let step = self.choice_points.pop();
        if let Some(step) = &step {
            tracing::trace!(depth = self.choice_points.len(), step = ?step, "pop choice point");
        }
        step
    }

    /// Number of pending choice points.
    pub fn depth(&self) -> usize {
        self.choice_points.len()
    }

    /// Drives `pred` until it succeeds (`true`) or every choice point is
    /// exhausted (`false`).
    pub fn call(&mut self, pred: Predicate) -> Result<bool, RuntimeError> {
        let mut current = pred;
        loop {
            current = match current {
                Predicate::Success => return Ok(true),
                Predicate::Failure => match self.pop() {
                    Some(step) => Predicate::Next(step),
                    None => return Ok(false),
                },
                Predicate::Next(step) => step.exec(self)?,
            };
        }
    }

    /// Resumes at the most recent choice point to look for the next solution.
    pub fn redo(&mut self) -> Result<bool, RuntimeError> {
        match self.pop() {
            Some(step) => self.call(Predicate::Next(step)),
            None => Ok(false),
        }
    }
}
