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

//! Statement scheduling for one method body.
//!
//! Statements are classified into phases, put into an order where every
//! variable is written before it is read, then coalesced into
//! [`StmtBlock`]s. Each block becomes one continuation unit in the generated
//! code, so a test runs together with the calculations that feed it.

mod classify;
mod merge;
mod resolve;

use crate::compiler::ir::IrStmt;
use std::fmt;
use thiserror::Error;

pub(crate) use self::classify::Entry;

/// Scheduling class of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Binds through enumeration (`for`, `select`).
    Assume,
    /// Pure computation.
    Calc,
    /// Boolean assertion, with the calculations merged into it.
    Test,
    /// `when` guard or module `call`.
    Other,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Assume => "assume",
            Phase::Calc => "calc",
            Phase::Test => "test",
            Phase::Other => "other",
        };
        f.write_str(label)
    }
}

/// Scheduler failures. These are defects of the input, not of the user
/// program: a body containing a recovery placeholder is never scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("statement {index} is malformed and cannot be scheduled")]
    Malformed { index: usize },
}

/// One or more statements executed as a single unit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StmtBlock {
    pub(crate) phase: Phase,
    /// Binding the block produces or validates.
    pub(crate) target: Option<String>,
    /// Variables read by the block and not written inside it.
    pub(crate) operands: Vec<String>,
    pub(crate) writes: Vec<String>,
    pub(crate) stmts: Vec<IrStmt>,
}

impl StmtBlock {
    /// Builds a block from classified entries in execution order.
    fn from_entries(phase: Phase, target: Option<String>, parts: &[(&Entry, &IrStmt)]) -> Self {
        let mut writes: Vec<String> = Vec::new();
        let mut operands: Vec<String> = Vec::new();
        for (entry, _) in parts {
            for read in &entry.reads {
                if !writes.contains(read) && !operands.contains(read) {
                    operands.push(read.clone());
                }
            }
            for write in &entry.writes {
                if !writes.contains(write) {
                    writes.push(write.clone());
                }
            }
        }
        operands.retain(|read| !writes.contains(read));
        Self {
            phase,
            target,
            operands,
            writes,
            stmts: parts.iter().map(|(_, stmt)| (*stmt).clone()).collect(),
        }
    }
}

/// Schedules the statements of one method body (guard already removed).
pub(crate) fn schedule(stmts: &[IrStmt]) -> Result<Vec<StmtBlock>, ScheduleError> {
    if let Some(index) = stmts.iter().position(IrStmt::is_dummy) {
        return Err(ScheduleError::Malformed { index });
    }
    let entries: Vec<Entry> = stmts
        .iter()
        .enumerate()
        .map(|(index, stmt)| classify::classify(index, stmt))
        .collect();
    let order = resolve::order(&entries);
    let blocks = merge::merge(&entries, &order, stmts);
    tracing::trace!(
        stmts = stmts.len(),
        blocks = blocks.len(),
        "scheduled method body"
    );
    Ok(blocks)
}

/// Statements of a schedule in execution order.
#[cfg(test)]
pub(crate) fn flatten(blocks: &[StmtBlock]) -> Vec<IrStmt> {
    blocks
        .iter()
        .flat_map(|block| block.stmts.iter().cloned())
        .collect()
}
