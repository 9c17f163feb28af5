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

//! Lexical rules, written as `nom` combinators over located spans.

use crate::ast::Span;
use nom::Parser;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, one_of, satisfy},
    combinator::{map, opt, recognize, value},
    error::{VerboseError, context},
    sequence::{delimited, pair, tuple},
};

use super::TokenKind;

pub(super) type LResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Alphabetic reserved words.
pub(crate) const KEYWORDS: &[&str] = &[
    "true", "false", "method", "module", "end", "select", "for", "case", "sqrt", "exp", "call",
    "when", "test", "integer", "real", "atom", "bool", "length", "nth", "sum",
];

/// Operators spelled as words.
const WORD_OPERATORS: &[&str] = &["or", "and", "not", "mod"];

/// Single-letter type abbreviations (`i`, `r`, `a`, `b`).
const TYPE_ABBREVIATIONS: &[&str] = &["i", "r", "a", "b"];

/// One step of the scanner.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Lexeme {
    /// Whitespace, newline or comment.
    Trivia,
    Token(TokenKind, String),
    /// `"` with no closing quote on the same line.
    UnterminatedString,
}

/// Scans the next lexeme. Fails only on a character no rule accepts.
pub(super) fn next_lexeme(input: Span<'_>) -> LResult<'_, Lexeme> {
    alt((
        map(trivia, |_| Lexeme::Trivia),
        map(string_literal, |text| Lexeme::Token(TokenKind::Str, text)),
        map(unterminated_string, |_| Lexeme::UnterminatedString),
        map(operator, |op: Span<'_>| {
            Lexeme::Token(TokenKind::Reserved, op.fragment().to_string())
        }),
        map(number, |n: Span<'_>| {
            Lexeme::Token(TokenKind::Number, n.fragment().to_string())
        }),
        map(variable_name, |v: Span<'_>| {
            Lexeme::Token(TokenKind::Variable, v.fragment().to_string())
        }),
        lower_word,
        map(punctuation, |c| Lexeme::Token(TokenKind::Reserved, c.to_string())),
    ))
    .parse(input)
}

/// Skips one run of whitespace or one `%` comment.
fn trivia(input: Span<'_>) -> LResult<'_, ()> {
    alt((value((), multispace1), comment)).parse(input)
}

/// Parses a `%` line comment up to (not including) the newline.
fn comment(input: Span<'_>) -> LResult<'_, ()> {
    value((), pair(char('%'), opt(not_line_ending))).parse(input)
}

/// Parses a double-quoted single-line string literal.
///
/// No escape processing: the text between quotes is taken as written.
fn string_literal(input: Span<'_>) -> LResult<'_, String> {
    map(
        delimited(
            char('"'),
            take_while(|c| c != '"' && c != '\n'),
            context("closing quote", char('"')),
        ),
        |s: Span<'_>| s.fragment().to_string(),
    )
    .parse(input)
}

fn unterminated_string(input: Span<'_>) -> LResult<'_, Span<'_>> {
    recognize(pair(char('"'), not_line_ending)).parse(input)
}

/// Multi-character symbolic operators, longest first.
fn operator(input: Span<'_>) -> LResult<'_, Span<'_>> {
    alt((tag("=="), tag("\\="), tag("=<"), tag(">="), tag("->"))).parse(input)
}

fn punctuation(input: Span<'_>) -> LResult<'_, char> {
    one_of("+-*/^()<>;:={}[],.").parse(input)
}

/// Parses `digits [. digits] [(e|E) [+|-] digits]`.
fn number(input: Span<'_>) -> LResult<'_, Span<'_>> {
    recognize(tuple((
        digit1,
        opt(pair(char('.'), digit0)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))
    .parse(input)
}

/// Parses variable identifiers (`[A-Z_]` followed by name characters).
fn variable_name(input: Span<'_>) -> LResult<'_, Span<'_>> {
    recognize(pair(
        satisfy(|c| c == '_' || c.is_ascii_uppercase()),
        take_while(is_variable_continue),
    ))
    .parse(input)
}

/// Parses a lowercase word and classifies it as reserved, function or atom.
fn lower_word(input: Span<'_>) -> LResult<'_, Lexeme> {
    let (rest, word) = recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        take_while(|c: char| c == '_' || c.is_ascii_alphanumeric()),
    ))
    .parse(input)?;
    let text = *word.fragment();
    let kind = if is_reserved_word(text) {
        TokenKind::Reserved
    } else if rest.fragment().trim_start_matches(' ').starts_with('(') {
        TokenKind::Function
    } else {
        TokenKind::Atom
    };
    Ok((rest, Lexeme::Token(kind, text.to_string())))
}

pub(crate) fn is_reserved_word(text: &str) -> bool {
    KEYWORDS.contains(&text) || WORD_OPERATORS.contains(&text) || TYPE_ABBREVIATIONS.contains(&text)
}

/// Returns whether a char can continue a variable name.
///
/// Besides ASCII letters, digits and `_`, Hiragana, Katakana, Han and Greek
/// letters are accepted.
fn is_variable_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric() || is_extra_script(c)
}

fn is_extra_script(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F // Katakana
        | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x3005 | 0x3007 // Han
        | 0x0370..=0x03FF | 0x1F00..=0x1FFF // Greek
    )
}
