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

//! Module and block scopes used while parsing one module.

use crate::ast::{Scope, VarRef};

/// Variables visible while parsing a module.
///
/// Parameters live in the module scope for the whole module; each method
/// body gets a fresh block scope.
#[derive(Debug, Default)]
pub(super) struct ScopeTable {
    module: Vec<VarRef>,
    block: Vec<VarRef>,
}

impl ScopeTable {
    /// Clears both scopes before a new module.
    pub(super) fn reset(&mut self) {
        self.module.clear();
        self.block.clear();
    }

    pub(super) fn enter_block(&mut self) {
        self.block.clear();
    }

    /// Leaves the current block, returning the variables it declared.
    pub(super) fn leave_block(&mut self) -> Vec<VarRef> {
        std::mem::take(&mut self.block)
    }

    /// Looks a name up in the module scope, then the block scope.
    pub(super) fn find(&self, name: &str) -> Option<&VarRef> {
        self.module
            .iter()
            .chain(self.block.iter())
            .find(|var| var.name == name)
    }

    pub(super) fn insert(&mut self, var: VarRef) {
        match var.scope {
            Scope::Module => self.module.push(var),
            Scope::Block => self.block.push(var),
        }
    }
}
