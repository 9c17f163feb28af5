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

//! Dependency-driven ordering.
//!
//! Each entry is placed after the entries that write what it reads. Missing
//! writers are pulled in depth first; among several candidates `assume`
//! beats `calc`, and the earliest in source order wins. A `call` is only a
//! candidate when nothing else writes the variable. A `call` whose outputs
//! are read is ordered with the calculations; any other goes last.
//!
//! Applied to its own output the ordering is unchanged as long as every
//! enumeration reads only inputs and constants.

use std::collections::HashSet;

use super::{Entry, Phase};

/// Returns entry indices in execution order.
pub(crate) fn order(entries: &[Entry]) -> Vec<usize> {
    let mut resolver = Resolver {
        entries,
        done: vec![false; entries.len()],
        written: HashSet::new(),
        order: Vec::with_capacity(entries.len()),
    };

    for (idx, entry) in entries.iter().enumerate() {
        if entry.guard {
            resolver.place(idx);
        }
    }
    for (idx, entry) in entries.iter().enumerate() {
        if entry.phase != Phase::Test {
            continue;
        }
        let feeding = entry.target.as_deref().and_then(|target| {
            resolver.find_writer(target, |candidate| candidate.phase == Phase::Calc)
        });
        if let Some(calc) = feeding {
            resolver.resolve(calc);
        }
        resolver.resolve(idx);
    }
    let read: HashSet<&str> = entries
        .iter()
        .flat_map(|entry| entry.reads.iter().map(String::as_str))
        .collect();
    let computes = |entry: &Entry| {
        entry.phase == Phase::Calc
            || (entry.phase == Phase::Other
                && !entry.guard
                && entry.writes.iter().any(|w| read.contains(w.as_str())))
    };
    for (idx, entry) in entries.iter().enumerate() {
        if computes(entry) {
            resolver.resolve(idx);
        }
    }
    for phase in [Phase::Assume, Phase::Other] {
        for (idx, entry) in entries.iter().enumerate() {
            if entry.phase == phase {
                resolver.resolve(idx);
            }
        }
    }
    resolver.order
}

struct Resolver<'e> {
    entries: &'e [Entry],
    done: Vec<bool>,
    written: HashSet<String>,
    order: Vec<usize>,
}

impl Resolver<'_> {
    fn resolve(&mut self, idx: usize) {
        if self.done[idx] {
            return;
        }
        // Marked before recursing so a cycle cannot loop.
        self.done[idx] = true;
        let entries = self.entries;
        // Calculated operands first, then enumerated ones. Each enumeration
        // then lands right before its first reader, so rescheduling an
        // already scheduled body keeps its order.
        for enumerated in [false, true] {
            for read in &entries[idx].reads {
                if self.written.contains(read) {
                    continue;
                }
                let Some(writer) = self.provider(read) else {
                    continue;
                };
                if (entries[writer].phase == Phase::Assume) == enumerated {
                    self.resolve(writer);
                }
            }
        }
        self.emit(idx);
    }

    /// Emits without resolving dependencies.
    fn place(&mut self, idx: usize) {
        self.done[idx] = true;
        self.emit(idx);
    }

    fn emit(&mut self, idx: usize) {
        self.written
            .extend(self.entries[idx].writes.iter().cloned());
        self.order.push(idx);
    }

    fn provider(&self, name: &str) -> Option<usize> {
        self.find_writer(name, |entry| entry.phase == Phase::Assume)
            .or_else(|| self.find_writer(name, |entry| entry.phase == Phase::Calc))
            .or_else(|| {
                self.find_writer(name, |entry| entry.phase == Phase::Other && !entry.guard)
            })
    }

    /// First unscheduled entry accepted by `accept` that writes `name`.
    fn find_writer(&self, name: &str, accept: impl Fn(&Entry) -> bool) -> Option<usize> {
        self.entries.iter().position(|entry| {
            !self.done[entry.index] && accept(entry) && entry.writes.iter().any(|w| w == name)
        })
    }
}
