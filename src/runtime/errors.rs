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

//! Runtime error type.

use thiserror::Error;

/// A defect detected while running a compiled program.
///
/// These are distinct from search failure: [`Predicate::Failure`] means "no
/// solution down this path", a `RuntimeError` means the program is broken
/// and aborts the whole run.
///
/// [`Predicate::Failure`]: super::Predicate::Failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("variable '{name}' is read before it is bound")]
    Unbound { name: String },
    #[error("expected {expected}, but got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("{func} is undefined for {value}")]
    Domain { func: &'static str, value: String },
    #[error("index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: String, len: usize },
    #[error("for step must be positive, got {step}")]
    InvalidStep { step: String },
    #[error("program has no entry module")]
    NoEntry,
    #[error("input '{name}' was not provided")]
    MissingInput { name: String },
    #[error("{value} cannot be represented as a decimal")]
    NonFinite { value: String },
    #[error("invalid numeric literal '{text}'")]
    InvalidNumber { text: String },
    #[error("cannot destructure {found} values into {expected} variables")]
    Arity { expected: usize, found: usize },
}
