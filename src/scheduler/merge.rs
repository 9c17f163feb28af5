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

//! Coalescing ordered entries into blocks.

use crate::compiler::ir::IrStmt;

use super::{Entry, Phase, StmtBlock};

/// A run of entries that will form one block.
struct Group {
    phase: Phase,
    target: Option<String>,
    members: Vec<usize>,
}

pub(crate) fn merge(entries: &[Entry], order: &[usize], stmts: &[IrStmt]) -> Vec<StmtBlock> {
    // Pass 1: a test takes the calcs right before it.
    let mut groups: Vec<Group> = Vec::with_capacity(order.len());
    for &idx in order {
        let entry = &entries[idx];
        let mut members = Vec::new();
        if entry.phase == Phase::Test {
            let mut start = groups.len();
            while start > 0 && groups[start - 1].phase == Phase::Calc {
                start -= 1;
            }
            for calc in groups.drain(start..) {
                members.extend(calc.members);
            }
        }
        members.push(idx);
        groups.push(Group {
            phase: entry.phase,
            target: entry.target.clone(),
            members,
        });
    }

    // Pass 2: adjacent calcs become one.
    let mut merged: Vec<Group> = Vec::with_capacity(groups.len());
    for group in groups {
        match merged.last_mut() {
            Some(last) if last.phase == Phase::Calc && group.phase == Phase::Calc => {
                last.members.extend(group.members);
            }
            _ => merged.push(group),
        }
    }

    merged
        .into_iter()
        .map(|group| {
            let parts: Vec<(&Entry, &IrStmt)> = group
                .members
                .iter()
                .map(|&idx| (&entries[idx], &stmts[entries[idx].index]))
                .collect();
            StmtBlock::from_entries(group.phase, group.target, &parts)
        })
        .collect()
}
