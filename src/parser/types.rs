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

//! Type annotations.

use crate::ast::{Type, TypeKind};

use super::Parser;

impl Parser<'_, '_> {
    /// Parses `integer | real | bool | atom | i | r | b | a | [T, ...] | {T, ...}`.
    pub(super) fn parse_type(&mut self) -> Type {
        let tok = self.peek();
        if let Some(kind) = simple_type(&tok.text).filter(|_| self.at_kind_reserved()) {
            self.advance();
            return Type::new(kind, tok.span.clone());
        }
        if self.at("[") || self.at("{") {
            let list = self.at("[");
            self.advance();
            let close = if list { "]" } else { "}" };
            let mut members = Vec::new();
            if self.starts_type() {
                members.push(self.parse_type());
                while self.at(",") {
                    self.advance();
                    members.push(self.parse_type());
                }
            }
            self.consume(close);
            let kind = if list {
                TypeKind::List(members)
            } else {
                TypeKind::Vector(members)
            };
            return Type::new(kind, tok.span.clone());
        }
        self.error_at(
            format!("Expected type, but got {:?}.", tok.text),
            &tok.span,
        );
        self.advance();
        Type::dummy(tok.span.clone())
    }

    fn starts_type(&self) -> bool {
        let tok = self.peek();
        (self.at_kind_reserved() && simple_type(&tok.text).is_some()) || self.at("[") || self.at("{")
    }
}

fn simple_type(text: &str) -> Option<TypeKind> {
    match text {
        "integer" | "i" => Some(TypeKind::Integer),
        "real" | "r" => Some(TypeKind::Real),
        "bool" | "b" => Some(TypeKind::Bool),
        "atom" | "a" => Some(TypeKind::Atom),
        _ => None,
    }
}
