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

//! Compilation context threaded through every pipeline stage.

use crate::ast::SourceSpan;
use crate::diagnostics::{CompileError, CompileErrors};

/// Per-source compilation state.
///
/// Holds the source label, the normalised source text and the errors the
/// current stage has recorded so far.
#[derive(Debug)]
pub(crate) struct CompileContext {
    file: String,
    source: String,
    errors: Vec<CompileError>,
}

impl CompileContext {
    /// Creates a context for one source, normalising line endings and tabs.
    pub(crate) fn new(file: impl Into<String>, source: &str) -> Self {
        Self {
            file: file.into(),
            source: normalize_source(source),
            errors: Vec::new(),
        }
    }

    pub(crate) fn file(&self) -> &str {
        &self.file
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Builds a source-mapped compile error without recording it.
    pub(crate) fn diagnostic(&self, message: impl Into<String>, span: &SourceSpan) -> CompileError {
        CompileError::from_span_in_source(message, &self.file, &self.source, span)
    }

    /// Records a source-mapped compile error.
    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: &SourceSpan) {
        let error = self.diagnostic(message, span);
        self.errors.push(error);
    }

    /// Ends a pipeline stage: any recorded error aborts the compile.
    pub(crate) fn finish_stage(&mut self, stage: &str) -> Result<(), CompileErrors> {
        if self.errors.is_empty() {
            tracing::info!(stage, file = %self.file, "stage complete");
            return Ok(());
        }
        tracing::warn!(
            stage,
            file = %self.file,
            errors = self.errors.len(),
            "compile aborted"
        );
        Err(CompileErrors(std::mem::take(&mut self.errors)))
    }
}

/// Unifies line endings to `\n` and replaces tabs with single spaces.
pub(crate) fn normalize_source(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\t', " ")
}
