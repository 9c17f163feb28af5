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

//! Input/output description of a compiled entry module.

use serde::Serialize;

use crate::compiler::ir::{IrModule, IrVar};

/// One binding of the manifest; `type` is rendered in source syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Bindings of the entry module: `input` lists the first parameter group,
/// `output` every other group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub input: Vec<ManifestEntry>,
    pub output: Vec<ManifestEntry>,
}

impl Manifest {
    pub(crate) fn for_module(module: &IrModule) -> Self {
        Self {
            input: entries(module.inputs()),
            output: entries(module.outputs()),
        }
    }

    /// Pretty-printed JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn entries(vars: &[IrVar]) -> Vec<ManifestEntry> {
    vars.iter()
        .filter(|var| !var.ty.is_dummy())
        .map(|var| ManifestEntry {
            name: var.name.clone(),
            ty: var.ty.to_string(),
        })
        .collect()
}
