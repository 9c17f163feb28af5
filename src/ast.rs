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

//! Syntax tree definitions with precise source spans.
//!
//! The parser produces this tree after scope and type checking. Every node
//! except the `Dummy` placeholders keeps the span of its origin token so later
//! stages can anchor diagnostics.

use nom_locate::LocatedSpan;
use std::fmt;

/// Lexer input span type carrying byte offsets and line/column info.
pub type Span<'a> = LocatedSpan<&'a str>;

/// 1-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based character column.
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source range and anchor position for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
}

impl SourceSpan {
    /// Creates a source span from lexer start/end positions.
    pub fn from_bounds(start: Span<'_>, end: Span<'_>) -> Self {
        Self {
            start: start.location_offset(),
            end: end.location_offset(),
            line: start.location_line() as usize,
            column: start.get_utf8_column(),
        }
    }

    /// Returns span length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns a span that starts at `self` and ends at `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }

    /// Returns a copy anchored at another line, keeping column and length.
    pub fn on_line(&self, line: usize) -> Self {
        Self {
            line,
            ..self.clone()
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Declared type shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Integer number.
    Integer,
    /// Real number.
    Real,
    /// Boolean.
    Bool,
    /// Atom / string.
    Atom,
    /// Homogeneous list; the member list holds the declared element type(s).
    List(Vec<Type>),
    /// Fixed-arity heterogeneous struct.
    Vector(Vec<Type>),
    /// Placeholder substituted after a type error.
    Dummy,
}

/// A type annotation together with the token it came from.
#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub span: SourceSpan,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Type {
    pub fn new(kind: TypeKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    pub fn dummy(span: SourceSpan) -> Self {
        Self::new(TypeKind::Dummy, span)
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, TypeKind::Dummy)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Integer | TypeKind::Real)
    }

    /// Element type of a list type, when known.
    pub fn element(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::List(members) => members.first(),
            _ => None,
        }
    }

    /// Returns whether two declarations may refer to the same variable.
    ///
    /// A dummy on either side is accepted so one type error does not cascade.
    pub fn compatible(&self, other: &Type) -> bool {
        self.is_dummy() || other.is_dummy() || self.kind == other.kind
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, members: &[Type]) -> fmt::Result {
            for (idx, member) in members.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{member}")?;
            }
            Ok(())
        }
        match &self.kind {
            TypeKind::Integer => write!(f, "integer"),
            TypeKind::Real => write!(f, "real"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Atom => write!(f, "atom"),
            TypeKind::Dummy => write!(f, "dummy"),
            TypeKind::List(members) => {
                write!(f, "[")?;
                join(f, members)?;
                write!(f, "]")
            }
            TypeKind::Vector(members) => {
                write!(f, "{{")?;
                join(f, members)?;
                write!(f, "}}")
            }
        }
    }
}

/// Scope a variable was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Module parameter.
    Module,
    /// Method-body local.
    Block,
}

/// Resolved variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub ty: Type,
    pub scope: Scope,
    /// Member of the first parameter vector.
    pub input: bool,
    pub span: SourceSpan,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-x`).
    Neg,
    /// Logical negation (`not(x)`).
    Not,
}

/// Binary operators. `>` and `>=` never appear: the parser swaps operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    /// `=` / `==`.
    Eq,
    /// `\=`.
    Ne,
    Lt,
    /// `=<`.
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "=",
            BinOp::Ne => "\\=",
            BinOp::Lt => "<",
            BinOp::Le => "=<",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "mod",
            BinOp::Pow => "^",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::Or | BinOp::And)
    }
}

/// Built-in functions usable in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sqrt,
    Exp,
    Length,
    /// `nth(Index, List)`, 0-based.
    Nth,
    Sum,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Length => "length",
            Builtin::Nth => "nth",
            Builtin::Sum => "sum",
        }
    }
}

/// Expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal, kept as written so it can be read exactly.
    Number(String),
    Str(String),
    Atom(String),
    Bool(bool),
    Var(VarRef),
    /// List literal (`[a, b, c]`).
    List(Vec<Expr>),
    /// Vector literal (`{a, B: integer}`), possibly destructuring.
    Vector(Vec<Member>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Builtin {
        func: Builtin,
        args: Vec<Expr>,
    },
    /// Error-recovery placeholder.
    Dummy,
}

/// Expression node with source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
}

impl Expr {
    pub fn new(kind: ExprKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    pub fn dummy(span: SourceSpan) -> Self {
        Self::new(ExprKind::Dummy, span)
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, ExprKind::Dummy)
    }

    pub fn as_var(&self) -> Option<&VarRef> {
        match &self.kind {
            ExprKind::Var(var) => Some(var),
            _ => None,
        }
    }

    /// Returns whether this node or any child is a dummy.
    pub fn contains_dummy(&self) -> bool {
        match &self.kind {
            ExprKind::Dummy => true,
            ExprKind::List(items) => items.iter().any(Expr::contains_dummy),
            ExprKind::Vector(members) => members.iter().any(|m| m.value.contains_dummy()),
            ExprKind::Unary { operand, .. } => operand.contains_dummy(),
            ExprKind::Binary { lhs, rhs, .. } => lhs.contains_dummy() || rhs.contains_dummy(),
            ExprKind::Builtin { args, .. } => args.iter().any(Expr::contains_dummy),
            _ => false,
        }
    }
}

/// One member of a vector literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub value: Expr,
    /// The member introduced its variable inline (`{X: integer}` or a group annotation).
    pub declares: bool,
    pub span: SourceSpan,
}

/// One `cond -> expr` arm of a `case`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub cond: Expr,
    pub value: Expr,
}

/// Right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    Expr(Expr),
    /// `for(from, to, step)`.
    For {
        from: Expr,
        to: Expr,
        step: Expr,
        span: SourceSpan,
    },
    /// `select(list)`.
    Select { list: Expr, span: SourceSpan },
    /// `case(cond -> expr, ...)`.
    Case { arms: Vec<CaseArm>, span: SourceSpan },
}

impl Rhs {
    pub fn is_generator(&self) -> bool {
        matches!(self, Rhs::For { .. } | Rhs::Select { .. })
    }

    pub fn span(&self) -> &SourceSpan {
        match self {
            Rhs::Expr(expr) => &expr.span,
            Rhs::For { span, .. } | Rhs::Select { span, .. } | Rhs::Case { span, .. } => span,
        }
    }
}

/// A variable whose name contains `constraint` (case-sensitive) is a
/// boolean check: assigning `false` to it fails the branch.
pub fn is_constraint_name(name: &str) -> bool {
    name.contains("constraint")
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `lhs = rhs`.
    Assign { target: Expr, value: Rhs },
    /// `test(cond)`.
    Test(Expr),
    /// `when(cond)`; only legal as the first statement of a method.
    When(Expr),
    /// `call(module, {inputs}, {outputs})`.
    Call {
        module: String,
        input: Expr,
        output: Expr,
    },
    Dummy,
}

/// Statement with source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

impl Stmt {
    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, StmtKind::Dummy)
    }
}

/// `method ... end method;` alternative body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Leading `when` condition, stripped out of `body`.
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
    /// Variables declared inside this body.
    pub locals: Vec<VarRef>,
    pub span: SourceSpan,
}

/// Module parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Atom parameter naming another module usable as a call target.
    Module { name: String, span: SourceSpan },
    /// Vector parameter group.
    Group { members: Vec<VarRef>, span: SourceSpan },
    Dummy(SourceSpan),
}

/// `name(params) method... end module;`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub params: Vec<Param>,
    pub blocks: Vec<Block>,
    pub span: SourceSpan,
}

impl Module {
    /// Vector parameter groups in declaration order; group 0 holds inputs.
    pub fn groups(&self) -> impl Iterator<Item = &[VarRef]> {
        self.params.iter().filter_map(|param| match param {
            Param::Group { members, .. } => Some(members.as_slice()),
            _ => None,
        })
    }

    /// Module names listed as atom parameters.
    pub fn module_params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(|param| match param {
            Param::Module { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Parsed source file: an ordered list of modules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub modules: Vec<Module>,
}
