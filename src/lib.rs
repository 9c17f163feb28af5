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

//! Compiler and backtracking runtime for a small generate-and-test module
//! language.
//!
//! A source defines modules. Each module has an input parameter group, any
//! number of output groups, and one or more `method` bodies. A body binds
//! variables by calculation or by enumeration (`for`, `select`), filters
//! candidates with `test`, and may `call` other modules. Every combination
//! that passes all tests is a solution.
//!
//! # Pipeline
//!
//! 1. Lex into tokens ([`lexer`]).
//! 2. Parse into a spanned, typed syntax tree ([`ast`]).
//! 3. Lower into a flat statement form with resolved variables.
//! 4. Schedule each method body so every variable is written before it is
//!    read, grouping each `test` with the calculations that feed it.
//! 5. Generate an executable [`ProgramPlan`](runtime::ProgramPlan), the
//!    equivalent Rust source text, and an input/output [`Manifest`].
//!
//! Every stage is error tolerant and records all of its problems; a stage
//! that recorded any aborts the compile with [`CompileErrors`].
//!
//! # Example
//!
//! ```
//! use backtrack_dsl::{Bindings, Value, compile};
//!
//! let source = "\
//! pointInQuarterCircle({R: real}, {X: real, Y: real})
//! method
//!     X = for(0.0, R, 1.0);
//!     Y = for(0.0, R, 1.0);
//!     D = sqrt(X^2 + Y^2);
//!     test(D =< R);
//! end method;
//! end module;
//! ";
//! let compiled = compile("quarter.bt", source).expect("compiles");
//! let solutions = compiled.run(&Bindings::new().with("R", 2.0)).expect("runs");
//! assert_eq!(solutions.len(), 6);
//! assert_eq!(solutions[5].get("X"), Some(&Value::Number(2.0)));
//! ```

pub mod ast;
mod codegen;
mod compiler;
pub mod config;
pub mod diagnostics;
pub mod lexer;
mod parser;
pub mod project;
pub mod runtime;
mod scheduler;

pub use codegen::{Manifest, ManifestEntry};
pub use compiler::Compiled;
pub use config::{CompileOptions, RunOptions};
pub use diagnostics::{CompileError, CompileErrors, Reporter, reporter_fn};
pub use lexer::{LexOutput, tokenize};
pub use project::ModuleSources;
pub use runtime::{Bindings, RuntimeError, Solution, Solutions, Value};
pub use scheduler::{Phase, ScheduleError};

use ast::Program;
use compiler::CompileContext;

/// Lexes and parses `source` without lowering it.
///
/// # Errors
///
/// Returns every lexical error, or else every syntax and declaration error.
pub fn parse_source(name: &str, source: &str) -> Result<Program, CompileErrors> {
    let mut ctx = CompileContext::new(name, source);
    compiler::parse_in_context(&mut ctx)
}

/// Compiles `source`; `name` labels diagnostics.
///
/// # Errors
///
/// Returns every error recorded by the first stage that failed, each with its
/// line, column and a caret under the offending source line.
pub fn compile(name: &str, source: &str) -> Result<Compiled, CompileErrors> {
    compile_with_options(source, &CompileOptions::new().source_name(name))
}

/// Compiles `source` with explicit options.
pub fn compile_with_options(
    source: &str,
    options: &CompileOptions,
) -> Result<Compiled, CompileErrors> {
    compiler::compile_source(source, options)
}

/// Compiles `source`, forwarding every error to `reporter` on failure.
///
/// Returns `None` when any error was reported; there is no partial output.
pub fn compile_with_reporter(
    name: &str,
    source: &str,
    reporter: &mut impl Reporter,
) -> Option<Compiled> {
    match compile(name, source) {
        Ok(compiled) => Some(compiled),
        Err(errors) => {
            errors.report_to(reporter);
            None
        }
    }
}

/// Compiles the module source registered as `entry` in `sources`; the other
/// sources are available as `call` targets.
///
/// # Errors
///
/// Fails with `Module "entry" is not defined.` when `sources` lacks `entry`,
/// otherwise as [`compile`].
pub fn compile_project(
    entry: &str,
    sources: &ModuleSources,
    options: &CompileOptions,
) -> Result<Compiled, CompileErrors> {
    let source = sources.get(entry).ok_or_else(|| {
        CompileErrors::single(CompileError::message_only(format!(
            "Module {entry:?} is not defined."
        )))
    })?;
    let options = options
        .clone()
        .source_name(entry)
        .module_sources(sources.clone());
    compiler::compile_source(source, &options)
}

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod tests;
