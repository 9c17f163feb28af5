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

//! Source text to token stream.
//!
//! The lexer never aborts: an unrecognised character is recorded as a
//! lexical error and skipped, and scanning resumes at the next character.

mod rules;

use crate::ast::{SourceSpan, Span};
use crate::compiler::CompileContext;
use crate::config::INLINE_SOURCE_NAME;
use crate::diagnostics::CompileError;
use nom::character::complete::anychar;
use nom::error::VerboseError;
use std::fmt;

use self::rules::{Lexeme, next_lexeme};

pub(crate) use self::rules::is_reserved_word;

/// Token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Keyword, operator or punctuation.
    Reserved,
    /// Uppercase or `_`-leading identifier.
    Variable,
    /// Lowercase identifier followed by `(`.
    Function,
    /// Lowercase identifier used as a value.
    Atom,
    Str,
    Number,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenKind::Reserved => "reserved",
            TokenKind::Variable => "variable",
            TokenKind::Function => "function",
            TokenKind::Atom => "atom",
            TokenKind::Str => "string",
            TokenKind::Number => "number",
            TokenKind::Eof => "end of file",
        };
        f.write_str(label)
    }
}

/// One token with its raw text and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text; string tokens hold the text between the quotes.
    pub text: String,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns whether this is the reserved word or symbol `text`.
    pub fn is(&self, text: &str) -> bool {
        self.kind == TokenKind::Reserved && self.text == text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Tokens of a source with the lexical errors found while scanning it.
#[derive(Debug, Clone, PartialEq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<CompileError>,
}

impl LexOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Tokenizes `source` on its own, outside of a compile.
///
/// ```
/// use backtrack_dsl::lexer::{TokenKind, tokenize};
///
/// let out = tokenize("X = 1; % comment");
/// assert!(out.is_ok());
/// assert_eq!(out.tokens.last().map(|tok| tok.kind), Some(TokenKind::Eof));
/// ```
pub fn tokenize(source: &str) -> LexOutput {
    let mut ctx = CompileContext::new(INLINE_SOURCE_NAME, source);
    let tokens = lex(&mut ctx);
    let errors = match ctx.finish_stage("lex") {
        Ok(()) => Vec::new(),
        Err(errors) => errors.0,
    };
    LexOutput { tokens, errors }
}

/// Tokenizes the context's source, recording lexical errors in it.
///
/// The returned stream always ends with exactly one [`TokenKind::Eof`] token.
pub(crate) fn lex(ctx: &mut CompileContext) -> Vec<Token> {
    let source = ctx.source().to_owned();
    let mut input = Span::new(&source);
    let mut tokens: Vec<Token> = Vec::new();

    while !input.fragment().is_empty() {
        match next_lexeme(input) {
            Ok((rest, lexeme)) => {
                match lexeme {
                    Lexeme::Trivia => {}
                    Lexeme::Token(kind, text) => {
                        tokens.push(Token::new(kind, text, SourceSpan::from_bounds(input, rest)));
                    }
                    Lexeme::UnterminatedString => {
                        ctx.error_at(
                            "Unterminated string.",
                            &SourceSpan::from_bounds(input, rest),
                        );
                    }
                }
                input = rest;
            }
            Err(_) => {
                // No rule matched: report and skip a single character.
                let Ok((rest, _)) = anychar::<_, VerboseError<Span<'_>>>(input) else {
                    break;
                };
                ctx.error_at("Unexpected character.", &SourceSpan::from_bounds(input, rest));
                input = rest;
            }
        }
    }

    tokens.push(eof_token(&source, input, tokens.last()));
    tracing::debug!(tokens = tokens.len(), "lexed source");
    tokens
}

/// Builds the end-of-input token.
///
/// When the source ends with a newline the natural EOF position is column 1
/// of an empty line, so the column is moved to one past the start of the
/// previous token.
fn eof_token(source: &str, end: Span<'_>, last: Option<&Token>) -> Token {
    let mut span = SourceSpan::from_bounds(end, end);
    if source.ends_with('\n') {
        if let Some(last) = last {
            span.column = last.span.column + 1;
        }
    }
    Token::new(TokenKind::Eof, "", span)
}
