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

//! Loads the modules a program needs, following `call` targets.

use crate::ast::{Module, SourceSpan, StmtKind};
use crate::compiler::{CompileContext, parse_in_context};
use crate::diagnostics::{CompileError, CompileErrors};
use std::collections::HashSet;
use std::rc::Rc;

use super::ModuleSources;

/// Normalised source text with its diagnostic label.
#[derive(Debug, Clone)]
pub(crate) struct SourceDocument {
    pub(crate) name: String,
    pub(crate) source: String,
}

impl SourceDocument {
    pub(crate) fn error(&self, message: impl Into<String>, span: &SourceSpan) -> CompileError {
        CompileError::from_span_in_source(message, &self.name, &self.source, span)
    }
}

/// One parsed module with the document it came from.
#[derive(Debug, Clone)]
pub(crate) struct ModuleUnit {
    pub(crate) doc: Rc<SourceDocument>,
    pub(crate) module: Module,
}

/// Parses the entry source, then every auxiliary source reached by a `call`
/// whose target is not yet defined. The entry modules come first.
pub(crate) fn load_modules(
    name: &str,
    source: &str,
    sources: &ModuleSources,
) -> Result<Vec<ModuleUnit>, CompileErrors> {
    let mut loader = Loader {
        sources,
        units: Vec::new(),
        defined: HashSet::new(),
        requested: HashSet::new(),
        errors: Vec::new(),
    };
    loader.load(name, source)?;
    if loader.units.is_empty() {
        return Err(CompileErrors::single(CompileError::message_in_file(
            "Source defines no module.",
            name,
        )));
    }

    let mut next = 0;
    while next < loader.units.len() {
        let calls = calls_of(&loader.units[next].module);
        let doc = Rc::clone(&loader.units[next].doc);
        for (target, span) in calls {
            loader.resolve(&target, &doc, &span)?;
        }
        next += 1;
    }

    if loader.errors.is_empty() {
        tracing::debug!(modules = loader.units.len(), "loaded modules");
        Ok(loader.units)
    } else {
        Err(CompileErrors(loader.errors))
    }
}

struct Loader<'s> {
    sources: &'s ModuleSources,
    units: Vec<ModuleUnit>,
    defined: HashSet<String>,
    /// Auxiliary sources already parsed or known to be missing.
    requested: HashSet<String>,
    errors: Vec<CompileError>,
}

impl Loader<'_> {
    fn load(&mut self, name: &str, source: &str) -> Result<(), CompileErrors> {
        let mut ctx = CompileContext::new(name, source);
        let program = parse_in_context(&mut ctx)?;
        let doc = Rc::new(SourceDocument {
            name: ctx.file().to_string(),
            source: ctx.source().to_string(),
        });
        for module in program.modules {
            if !self.defined.insert(module.name.clone()) {
                self.errors.push(doc.error(
                    format!("Module {:?} is already defined.", module.name),
                    &module.span,
                ));
                continue;
            }
            self.units.push(ModuleUnit {
                doc: Rc::clone(&doc),
                module,
            });
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        target: &str,
        caller: &SourceDocument,
        span: &SourceSpan,
    ) -> Result<(), CompileErrors> {
        if self.defined.contains(target) {
            return Ok(());
        }
        if self.requested.insert(target.to_string()) {
            if let Some(source) = self.sources.get(target) {
                tracing::debug!(module = target, "loading auxiliary source");
                self.load(target, source)?;
            }
        }
        if !self.defined.contains(target) {
            let message = format!("Module {target:?} is not defined.");
            if !self.errors.iter().any(|err| err.message == message) {
                self.errors.push(caller.error(message, span));
            }
        }
        Ok(())
    }
}

/// Call targets of a module with the span of each call statement.
fn calls_of(module: &Module) -> Vec<(String, SourceSpan)> {
    module
        .blocks
        .iter()
        .flat_map(|block| &block.body)
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Call { module, .. } => Some((module.clone(), stmt.span.clone())),
            _ => None,
        })
        .collect()
}
