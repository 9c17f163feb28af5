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

//! Compile pipeline: lex, parse, lower, schedule, generate.
//!
//! Every stage records its problems in a [`CompileContext`]; a stage that
//! recorded anything aborts the compile with all of them, so later stages
//! never see a tree known to contain placeholders.

mod context;
pub(crate) mod ir;
mod lower;

use std::rc::Rc;

use crate::ast::Program;
use crate::codegen::{Manifest, ScheduledMethod, ScheduledModule, build_plan, emit_source};
use crate::config::{CompileOptions, RunOptions};
use crate::diagnostics::{CompileError, CompileErrors};
use crate::lexer;
use crate::parser;
use crate::project::{SourceDocument, load_modules};
use crate::runtime::{Bindings, ProgramPlan, RuntimeError, Solution, Solutions};
use crate::scheduler;

pub(crate) use self::context::CompileContext;
use self::ir::IrModule;

/// Output of a successful compile.
#[derive(Debug, Clone)]
pub struct Compiled {
    source: String,
    manifest: Manifest,
    program: Rc<ProgramPlan>,
}

impl Compiled {
    /// Generated Rust source text; empty when emission was disabled.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn program(&self) -> &ProgramPlan {
        &self.program
    }

    /// Runs the entry module to exhaustion and collects every solution.
    ///
    /// `bindings` holds the entry module inputs, optionally `_`-prefixed.
    pub fn run(&self, bindings: &Bindings) -> Result<Vec<Solution>, RuntimeError> {
        self.run_with(bindings, &RunOptions::default())
    }

    pub fn run_with(
        &self,
        bindings: &Bindings,
        options: &RunOptions,
    ) -> Result<Vec<Solution>, RuntimeError> {
        Solutions::new(&self.program, bindings, options)?.collect()
    }

    /// Lazy solution stream; each item after the first drives one `redo`.
    pub fn solutions(&self, bindings: &Bindings) -> Result<Solutions, RuntimeError> {
        Solutions::new(&self.program, bindings, &RunOptions::default())
    }
}

/// Lexes and parses the context's source.
pub(crate) fn parse_in_context(ctx: &mut CompileContext) -> Result<Program, CompileErrors> {
    let tokens = {
        let _span = tracing::info_span!("compile.lex", file = %ctx.file()).entered();
        let tokens = lexer::lex(ctx);
        ctx.finish_stage("lex")?;
        tokens
    };
    let _span = tracing::info_span!("compile.parse", file = %ctx.file()).entered();
    let program = parser::parse(&tokens, ctx);
    ctx.finish_stage("parse")?;
    Ok(program)
}

/// Runs the whole pipeline for the entry source `source`.
pub(crate) fn compile_source(
    source: &str,
    options: &CompileOptions,
) -> Result<Compiled, CompileErrors> {
    let name = options.name();
    let units = load_modules(name, source, &options.sources)?;

    let lowered = {
        let _span = tracing::info_span!("compile.lower", modules = units.len()).entered();
        let mut lowered = Vec::with_capacity(units.len());
        let mut errors = Vec::new();
        for unit in &units {
            let mut ctx = CompileContext::new(&unit.doc.name, &unit.doc.source);
            let module = lower::lower_module(&unit.module, &mut ctx);
            match ctx.finish_stage("lower") {
                Ok(()) => lowered.push((Rc::clone(&unit.doc), module)),
                Err(stage) => errors.extend(stage),
            }
        }
        if !errors.is_empty() {
            return Err(CompileErrors(errors));
        }
        lowered
    };

    let scheduled = {
        let _span = tracing::info_span!("compile.schedule").entered();
        lowered
            .into_iter()
            .map(|(doc, module)| schedule_module(doc, module))
            .collect::<Result<Vec<_>, _>>()?
    };

    let _span = tracing::info_span!("compile.codegen").entered();
    let program = build_plan(&scheduled)?;
    let text = if options.emit_source {
        emit_source(name, &scheduled)
    } else {
        String::new()
    };
    let manifest = scheduled
        .first()
        .map(|entry| Manifest::for_module(&entry.ir))
        .unwrap_or_default();
    tracing::info!(
        file = name,
        modules = scheduled.len(),
        "compile complete"
    );
    Ok(Compiled {
        source: text,
        manifest,
        program: Rc::new(program),
    })
}

fn schedule_module(
    doc: Rc<SourceDocument>,
    module: IrModule,
) -> Result<ScheduledModule, CompileError> {
    let methods = module
        .methods
        .iter()
        .map(|method| {
            let blocks = scheduler::schedule(&method.body)
                .map_err(|err| doc.error(err.to_string(), &method.span))?;
            tracing::debug!(
                module = %module.name,
                method = %method.name,
                blocks = blocks.len(),
                "scheduled method"
            );
            Ok(ScheduledMethod {
                ir: method.clone(),
                blocks,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;
    Ok(ScheduledModule {
        doc,
        ir: module,
        methods,
    })
}
