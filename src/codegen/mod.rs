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

//! Code generation: executable plans, emitted source text and the manifest.
//!
//! Every module becomes one [`ModulePlan`]; every candidate method body one
//! [`MethodPlan`] whose units are the scheduled statement blocks in order.
//!
//! [`ModulePlan`]: crate::runtime::ModulePlan
//! [`MethodPlan`]: crate::runtime::MethodPlan

mod emit;
mod manifest;
mod plan;

pub use manifest::{Manifest, ManifestEntry};

pub(crate) use emit::emit_source;
pub(crate) use plan::build_plan;

use std::rc::Rc;

use crate::compiler::ir::{IrMethod, IrModule};
use crate::project::SourceDocument;
use crate::scheduler::StmtBlock;

/// A method body with its schedule.
#[derive(Debug, Clone)]
pub(crate) struct ScheduledMethod {
    pub(crate) ir: IrMethod,
    pub(crate) blocks: Vec<StmtBlock>,
}

/// A lowered, scheduled module ready for code generation.
#[derive(Debug, Clone)]
pub(crate) struct ScheduledModule {
    pub(crate) doc: Rc<SourceDocument>,
    pub(crate) ir: IrModule,
    pub(crate) methods: Vec<ScheduledMethod>,
}
