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

//! Phase classification.

use crate::compiler::ir::{IrStmt, IrStmtKind, IrVar};

use super::Phase;

/// A classified statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entry {
    /// Position in the original statement list.
    pub(crate) index: usize,
    pub(crate) phase: Phase,
    pub(crate) target: Option<String>,
    /// Reads other than the target.
    pub(crate) operands: Vec<String>,
    /// Every non-input variable read.
    pub(crate) reads: Vec<String>,
    pub(crate) writes: Vec<String>,
    /// Guard entries go before everything else.
    pub(crate) guard: bool,
}

pub(crate) fn classify(index: usize, stmt: &IrStmt) -> Entry {
    let all_reads = stmt.reads();
    let reads = names(all_reads.iter().copied().filter(|var| !var.input));
    let writes = names(stmt.writes().into_iter());

    let (phase, target) = match &stmt.kind {
        IrStmtKind::Range { target, .. } => (Phase::Assume, Some(target.name.clone())),
        IrStmtKind::Select { target, .. } => (Phase::Assume, target.name().map(str::to_owned)),
        IrStmtKind::Assign { target, .. } if stmt.is_constraint() => {
            (Phase::Test, target.name().map(str::to_owned))
        }
        IrStmtKind::Assign { target, .. } | IrStmtKind::Case { target, .. } => {
            (Phase::Calc, target.name().map(str::to_owned))
        }
        IrStmtKind::Test(_) => {
            let target = reads
                .first()
                .cloned()
                .or_else(|| all_reads.first().map(|var| var.name.clone()));
            (Phase::Test, target)
        }
        IrStmtKind::When(_) | IrStmtKind::Call { .. } | IrStmtKind::Dummy => (Phase::Other, None),
    };

    let operands = reads
        .iter()
        .filter(|read| Some(*read) != target.as_ref())
        .cloned()
        .collect();
    Entry {
        index,
        phase,
        target,
        operands,
        reads,
        writes,
        guard: matches!(stmt.kind, IrStmtKind::When(_)),
    }
}

/// Distinct names in first-seen order.
fn names<'a>(vars: impl Iterator<Item = &'a IrVar>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for var in vars {
        if !out.contains(&var.name) {
            out.push(var.name.clone());
        }
    }
    out
}
