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

//! Compile and run options.

use crate::project::ModuleSources;

/// Default label used in diagnostics when no source name is supplied.
pub const INLINE_SOURCE_NAME: &str = "<inline>";

/// Initial choice-point stack capacity; the stack grows past it on demand.
pub const DEFAULT_CHOICE_POINTS: usize = 100;

/// Compile-time options.
///
/// ```
/// use backtrack_dsl::{CompileOptions, ModuleSources};
///
/// let options = CompileOptions::new()
///     .source_name("main.bt")
///     .module_sources(ModuleSources::new().with("helper", "helper({X: integer}, {Y: integer})\nmethod Y = X; end method;\nend module;"));
/// assert_eq!(options.name(), "main.bt");
/// ```
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub(crate) source_name: String,
    pub(crate) emit_source: bool,
    pub(crate) sources: ModuleSources,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_name: INLINE_SOURCE_NAME.to_string(),
            emit_source: true,
            sources: ModuleSources::default(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label used in diagnostics.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Enables or disables rendering of the generated source text.
    pub fn emit_source(mut self, emit: bool) -> Self {
        self.emit_source = emit;
        self
    }

    /// Supplies auxiliary modules that `call` targets may resolve to.
    pub fn module_sources(mut self, sources: ModuleSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn name(&self) -> &str {
        &self.source_name
    }
}

/// Options for running a compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub(crate) initial_choice_points: usize,
    pub(crate) max_solutions: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            initial_choice_points: DEFAULT_CHOICE_POINTS,
            max_solutions: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial choice-point stack capacity.
    pub fn initial_choice_points(mut self, capacity: usize) -> Self {
        self.initial_choice_points = capacity;
        self
    }

    /// Stops collecting after `limit` solutions.
    pub fn max_solutions(mut self, limit: usize) -> Self {
        self.max_solutions = Some(limit);
        self
    }
}
