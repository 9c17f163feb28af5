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

//! Renders scheduled modules as Rust source written against the
//! [`runtime`](crate::runtime) API.
//!
//! Each module becomes a `Goal` struct holding its fields and continuation,
//! each candidate method body a struct of its locals, and each scheduled
//! block a unit struct closing over both. A `main` function drives the entry
//! module and collects every solution.

use crate::ast::{BinOp, Builtin, TypeKind, UnaryOp};
use crate::compiler::ir::{IrExpr, IrModule, IrStmt, IrStmtKind, IrTarget, IrVar};

use super::{ScheduledMethod, ScheduledModule};

const PRELUDE: &str = "\
#![allow(non_snake_case, non_camel_case_types, unused_variables)]

use backtrack_dsl::runtime::{
    Binder, Bindings, Case, For, Goal, Member, Predicate, RuntimeError, Solution, Step, Value,
    Variable, Vm, decimal, nth, sum,
};
use bigdecimal::BigDecimal;
use std::rc::Rc;
";

/// Renders the source text for `modules`; the first one gets a `main`.
pub(crate) fn emit_source(label: &str, modules: &[ScheduledModule]) -> String {
    let mut out = Writer::default();
    out.line(format!("// Generated by backtrack-dsl from {label:?}."));
    out.raw(PRELUDE);
    for module in modules {
        out.blank();
        ModuleEmitter {
            out: &mut out,
            module,
            program: modules,
        }
        .emit();
    }
    if let Some(entry) = modules.first() {
        out.blank();
        emit_main(&mut out, &entry.ir);
    }
    out.text
}

#[derive(Default)]
struct Writer {
    text: String,
    indent: usize,
}

impl Writer {
    fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.text.push_str("    ");
            }
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn raw(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }

    fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.indent += 1;
    }

    fn close(&mut self, line: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(line);
    }
}

struct ModuleEmitter<'a> {
    out: &'a mut Writer,
    module: &'a ScheduledModule,
    program: &'a [ScheduledModule],
}

impl ModuleEmitter<'_> {
    fn emit(&mut self) {
        let name = type_name(&self.module.ir.name);
        self.out.line("#[derive(Clone)]");
        self.out.open(format!("pub struct {name} {{"));
        for field in &self.module.ir.fields {
            self.out.line(format!("pub {}: Variable,", ident(&field.name)));
        }
        self.out.line("pub cont: Predicate,");
        self.out.close("}");
        self.out.blank();

        self.emit_dispatch(&name);
        for (idx, method) in self.module.methods.iter().enumerate() {
            self.out.blank();
            self.emit_method(&name, idx, method);
        }
    }

    fn emit_dispatch(&mut self, name: &str) {
        let methods = &self.module.methods;
        let count = methods.len();
        self.out.open(format!("impl Goal for {name} {{"));
        if count == 1 {
            self.out
                .open("fn exec(&self, _vm: &mut Vm) -> Result<Predicate, RuntimeError> {");
            self.out.line(format!(
                "Ok({}::try_enter(self.clone())?.unwrap_or(Predicate::Failure))",
                method_name(name, 0)
            ));
        } else {
            self.out
                .open("fn exec(&self, vm: &mut Vm) -> Result<Predicate, RuntimeError> {");
            for idx in 0..count {
                self.out.open(format!(
                    "if let Some(entered) = {}::try_enter(self.clone())? {{",
                    method_name(name, idx)
                ));
                for later in (idx + 1..count).rev() {
                    self.out.line(format!(
                        "vm.push(Step::Native(Rc::new({}(self.clone()))));",
                        alternative_name(name, later)
                    ));
                }
                self.out.line("return Ok(entered);");
                self.out.close("}");
            }
            self.out.line("Ok(Predicate::Failure)");
        }
        self.out.close("}");
        self.out.close("}");

        for idx in 1..count {
            let alternative = alternative_name(name, idx);
            self.out.blank();
            self.out.line(format!("struct {alternative}({name});"));
            self.out.blank();
            self.out.open(format!("impl Goal for {alternative} {{"));
            self.out
                .open("fn exec(&self, _vm: &mut Vm) -> Result<Predicate, RuntimeError> {");
            self.out.line(format!(
                "Ok({}::try_enter(self.0.clone())?.unwrap_or(Predicate::Failure))",
                method_name(name, idx)
            ));
            self.out.close("}");
            self.out.close("}");
        }
    }

    fn emit_method(&mut self, module: &str, idx: usize, method: &ScheduledMethod) {
        let name = method_name(module, idx);
        self.out.line("#[derive(Clone)]");
        self.out.open(format!("struct {name} {{"));
        for local in &method.ir.locals {
            self.out.line(format!("{}: Variable,", ident(&local.name)));
        }
        self.out.close("}");
        self.out.blank();

        self.out.open(format!("impl {name} {{"));
        self.out.open(format!(
            "fn try_enter(outer: {module}) -> Result<Option<Predicate>, RuntimeError> {{"
        ));
        self.out.open(format!("let method = {name} {{"));
        for local in &method.ir.locals {
            self.out.line(format!(
                "{}: Variable::new({:?}),",
                ident(&local.name),
                local.name
            ));
        }
        self.out.close("};");
        let guard = method.ir.guard.as_ref().filter(|_| self.module.methods.len() > 1);
        if let Some(guard) = guard {
            self.out.open(format!("if !{} {{", nested(expr(guard), boolean)));
            self.out.line("return Ok(None);");
            self.out.close("}");
        }
        let first = next_unit(&name, 0, method.blocks.len());
        self.out.line(format!("Ok(Some({first}))"));
        self.out.close("}");
        self.out.close("}");

        for (unit, block) in method.blocks.iter().enumerate() {
            self.out.blank();
            self.emit_unit(module, &name, unit, &block.stmts, method.blocks.len());
        }
    }

    fn emit_unit(&mut self, module: &str, method: &str, unit: usize, stmts: &[IrStmt], units: usize) {
        let name = unit_name(method, unit);
        self.out.open(format!("struct {name} {{"));
        self.out.line(format!("outer: {module},"));
        self.out.line(format!("method: {method},"));
        self.out.close("}");
        self.out.blank();
        self.out.open(format!("impl Goal for {name} {{"));
        self.out
            .open("fn exec(&self, _vm: &mut Vm) -> Result<Predicate, RuntimeError> {");
        self.out
            .line("let (outer, method) = (&self.outer, &self.method);");

        let next = next_unit(method, unit + 1, units);
        let mut transferred = false;
        for stmt in stmts {
            transferred |= self.emit_stmt(stmt, &next);
        }
        if !transferred {
            self.out.line(format!("Ok({next})"));
        }
        self.out.close("}");
        self.out.close("}");
    }

    /// Emits one statement; returns whether it ended the unit with a transfer.
    fn emit_stmt(&mut self, stmt: &IrStmt, next: &str) -> bool {
        match &stmt.kind {
            IrStmtKind::Assign { target, value } => {
                let value = value_of(expr(value));
                self.emit_bind(target, &value);
                if stmt.is_constraint() {
                    if let IrTarget::Var(var) = target {
                        self.fail_unless(&format!("{}.get()?.boolean()?", access(var)));
                    }
                }
                false
            }
            IrStmtKind::Case { target, arms } => {
                self.out.open("let selected = Case::new()");
                for arm in arms {
                    self.out.line(format!(
                        ".arm(|| Ok({}), || Ok({}))",
                        boolean(expr(&arm.cond)),
                        value_of(expr(&arm.value))
                    ));
                }
                self.out.line(".select()?;");
                self.out.close("");
                self.out.open("match selected {");
                match target {
                    IrTarget::Var(var) => {
                        self.out
                            .line(format!("Some(value) => {}.set(value),", access(var)));
                    }
                    IrTarget::Destructure(_) => {
                        self.out.line(format!(
                            "Some(value) => {}.bind(value)?,",
                            binder(target)
                        ));
                    }
                }
                self.out.line("None => return Ok(Predicate::Failure),");
                self.out.close("}");
                false
            }
            IrStmtKind::Test(cond) | IrStmtKind::When(cond) => {
                self.fail_unless(&nested(expr(cond), boolean));
                false
            }
            IrStmtKind::Range {
                target,
                from,
                to,
                step,
            } => {
                self.out.open("For::start(");
                self.out.line(format!("{}.clone(),", access(target)));
                self.out.line(format!("{},", decimal_of(expr(from))));
                self.out.line(format!("{},", decimal_of(expr(to))));
                self.out.line(format!("{},", decimal_of(expr(step))));
                self.out.line(format!("{next},"));
                self.out.close(")");
                true
            }
            IrStmtKind::Select { target, list } => {
                self.out.line(format!(
                    "Ok(Member::start({}, {}, {next}))",
                    binder(target),
                    list_of(expr(list))
                ));
                true
            }
            IrStmtKind::Call {
                module,
                inputs,
                outputs,
            } => {
                self.emit_call(module, inputs, outputs, next);
                true
            }
            IrStmtKind::Dummy => false,
        }
    }

    fn emit_bind(&mut self, target: &IrTarget, value: &str) {
        match target {
            IrTarget::Var(var) => self.out.line(format!("{}.set({value});", access(var))),
            IrTarget::Destructure(_) => {
                self.out
                    .line(format!("{}.bind({value})?;", binder(target)))
            }
        }
    }

    fn fail_unless(&mut self, cond: &str) {
        self.out.open(format!("if !{cond} {{"));
        self.out.line("return Ok(Predicate::Failure);");
        self.out.close("}");
    }

    fn emit_call(&mut self, module: &str, inputs: &[IrExpr], outputs: &[IrVar], next: &str) {
        let Some(callee) = self.program.iter().find(|m| m.ir.name == module) else {
            self.out.line("Ok(Predicate::Failure)");
            return;
        };
        let fields = &callee.ir.fields;
        self.out.open(format!(
            "Ok(Predicate::Next(Step::Native(Rc::new({} {{",
            type_name(module)
        ));
        for (field, input) in fields.iter().zip(inputs) {
            let value = match input {
                IrExpr::Var(var) => format!("{}.clone()", access(var)),
                other => format!(
                    "Variable::bound({:?}, {})",
                    field.name,
                    value_of(expr(other))
                ),
            };
            self.out.line(format!("{}: {value},", ident(&field.name)));
        }
        for (field, output) in fields[inputs.len().min(fields.len())..].iter().zip(outputs) {
            self.out.line(format!(
                "{}: {}.clone(),",
                ident(&field.name),
                access(output)
            ));
        }
        self.out.line(format!("cont: {next},"));
        self.out.close("}))))");
    }
}

fn emit_main(out: &mut Writer, entry: &IrModule) {
    let name = type_name(&entry.name);
    out.line(format!("/// Runs `{}` and collects every solution.", entry.name));
    out.open("pub fn main(bindings: &Bindings) -> Result<Vec<Solution>, RuntimeError> {");
    out.open("let input = |name: &str| {");
    out.line("bindings");
    out.line("    .get(name)");
    out.line("    .cloned()");
    out.line("    .ok_or_else(|| RuntimeError::MissingInput { name: name.to_string() })");
    out.close("};");
    out.open(format!("let entry = {name} {{"));
    for field in entry.inputs() {
        out.line(format!(
            "{}: Variable::bound({:?}, input({:?})?),",
            ident(&field.name),
            field.name,
            field.name
        ));
    }
    for field in entry.outputs() {
        out.line(format!(
            "{}: Variable::new({:?}),",
            ident(&field.name),
            field.name
        ));
    }
    out.line("cont: Predicate::Success,");
    out.close("};");
    out.line("let mut vm = Vm::new();");
    out.line("let mut solutions = Vec::new();");
    out.line("let mut found = vm.call(Predicate::Next(Step::Native(Rc::new(entry.clone()))))?;");
    out.open("while found {");
    out.open("solutions.push(Solution::from_iter([");
    for field in entry.outputs() {
        out.line(format!(
            "({:?}.to_string(), entry.{}.value().unwrap_or({})),",
            field.name,
            ident(&field.name),
            default_literal(&field.ty.kind)
        ));
    }
    out.close("]));");
    out.line("found = vm.redo()?;");
    out.close("}");
    out.line("Ok(solutions)");
    out.close("}");
}

/// Static shape of a rendered expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Decimal,
    Bool,
    List,
    Value,
}

struct Rendered {
    code: String,
    kind: Kind,
    /// Bare infix comparison or logical expression.
    infix: bool,
}

fn rendered(code: String, kind: Kind) -> Rendered {
    Rendered {
        code,
        kind,
        infix: false,
    }
}

fn expr(expr: &IrExpr) -> Rendered {
    match expr {
        IrExpr::Number(text) => rendered(format!("decimal::parse({text:?})?"), Kind::Decimal),
        IrExpr::Atom(atom) => rendered(format!("Value::Atom({atom:?}.to_string())"), Kind::Value),
        IrExpr::Bool(flag) => rendered(flag.to_string(), Kind::Bool),
        IrExpr::Var(var) => rendered(format!("{}.get()?", access(var)), Kind::Value),
        IrExpr::List(items) => rendered(format!("vec![{}]", values(items)), Kind::List),
        IrExpr::Vector(items) => {
            rendered(format!("Value::Vector(vec![{}])", values(items)), Kind::Value)
        }
        IrExpr::Unary { op, operand } => match op {
            UnaryOp::Neg => rendered(format!("-{}", decimal_of(self::expr(operand))), Kind::Decimal),
            UnaryOp::Not => rendered(
                format!("!{}", nested(self::expr(operand), boolean)),
                Kind::Bool,
            ),
        },
        IrExpr::Binary { op, lhs, rhs } => binary(*op, self::expr(lhs), self::expr(rhs)),
        IrExpr::Builtin { func, args } => {
            let mut args = args.iter().map(self::expr);
            let mut arg = || args.next().unwrap_or_else(|| rendered(String::new(), Kind::Value));
            match func {
                Builtin::Sqrt => {
                    rendered(format!("decimal::sqrt(&{})?", decimal_of(arg())), Kind::Decimal)
                }
                Builtin::Exp => rendered(format!("decimal::exp(&{})", decimal_of(arg())), Kind::Decimal),
                Builtin::Length => rendered(
                    format!("BigDecimal::from({}.len() as u64)", list_of(arg())),
                    Kind::Decimal,
                ),
                Builtin::Sum => rendered(format!("sum(&{})?", list_of(arg())), Kind::Decimal),
                Builtin::Nth => {
                    let index = decimal_of(arg());
                    rendered(format!("nth(&{}, &{index})?", list_of(arg())), Kind::Value)
                }
            }
        }
    }
}

fn binary(op: BinOp, lhs: Rendered, rhs: Rendered) -> Rendered {
    let code = match op {
        BinOp::And => format!("{} && {}", nested(lhs, boolean), nested(rhs, boolean)),
        BinOp::Or => format!("{} || {}", nested(lhs, boolean), nested(rhs, boolean)),
        BinOp::Eq | BinOp::Ne => {
            let symbol = if op == BinOp::Eq { "==" } else { "!=" };
            if lhs.kind == Kind::Decimal || rhs.kind == Kind::Decimal {
                format!("{} {symbol} {}", nested(lhs, decimal_of), nested(rhs, decimal_of))
            } else {
                format!("{} {symbol} {}", nested(lhs, value_of), nested(rhs, value_of))
            }
        }
        BinOp::Lt => format!("{} < {}", nested(lhs, decimal_of), nested(rhs, decimal_of)),
        BinOp::Le => format!("{} <= {}", nested(lhs, decimal_of), nested(rhs, decimal_of)),
        BinOp::Add => format!("decimal::add(&{}, &{})", decimal_of(lhs), decimal_of(rhs)),
        BinOp::Sub => format!("decimal::sub(&{}, &{})", decimal_of(lhs), decimal_of(rhs)),
        BinOp::Mul => format!("decimal::mul(&{}, &{})", decimal_of(lhs), decimal_of(rhs)),
        BinOp::Div => format!("decimal::div(&{}, &{})?", decimal_of(lhs), decimal_of(rhs)),
        BinOp::Mod => format!("decimal::rem(&{}, &{})?", decimal_of(lhs), decimal_of(rhs)),
        BinOp::Pow => format!("decimal::pow(&{}, &{})?", decimal_of(lhs), decimal_of(rhs)),
    };
    let infix = op.is_comparison() || op.is_logical();
    let kind = if infix { Kind::Bool } else { Kind::Decimal };
    Rendered { code, kind, infix }
}

/// Converts an operand, parenthesising it when it is itself infix.
fn nested(value: Rendered, convert: fn(Rendered) -> String) -> String {
    let infix = value.infix;
    let code = convert(value);
    if infix { format!("({code})") } else { code }
}

fn values(items: &[IrExpr]) -> String {
    items
        .iter()
        .map(|item| value_of(expr(item)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn decimal_of(value: Rendered) -> String {
    match value.kind {
        Kind::Value => format!("{}.decimal()?", value.code),
        _ => value.code,
    }
}

fn boolean(value: Rendered) -> String {
    match value.kind {
        Kind::Value => format!("{}.boolean()?", value.code),
        _ => value.code,
    }
}

fn list_of(value: Rendered) -> String {
    match value.kind {
        Kind::Value => format!("{}.list()?", value.code),
        _ => value.code,
    }
}

fn value_of(value: Rendered) -> String {
    match value.kind {
        Kind::Decimal => format!("Value::from_decimal(&{})?", value.code),
        Kind::Bool => format!("Value::Bool({})", value.code),
        Kind::List => format!("Value::List({})", value.code),
        Kind::Value => value.code,
    }
}

fn access(var: &IrVar) -> String {
    let scope = if var.in_param { "outer" } else { "method" };
    format!("{scope}.{}", ident(&var.name))
}

fn binder(target: &IrTarget) -> String {
    match target {
        IrTarget::Var(var) => format!("Binder::Var({}.clone())", access(var)),
        IrTarget::Destructure(vars) => {
            let vars = vars
                .iter()
                .map(|var| format!("{}.clone()", access(var)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Binder::Destructure(vec![{vars}])")
        }
    }
}

fn default_literal(ty: &TypeKind) -> String {
    match ty {
        TypeKind::Integer | TypeKind::Real | TypeKind::Dummy => "Value::Number(0.0)".to_string(),
        TypeKind::Atom => "Value::Atom(String::new())".to_string(),
        TypeKind::Bool => "Value::Bool(false)".to_string(),
        TypeKind::List(_) => "Value::List(Vec::new())".to_string(),
        TypeKind::Vector(members) => {
            let members = members
                .iter()
                .map(|member| default_literal(&member.kind))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Value::Vector(vec![{members}])")
        }
    }
}

fn next_unit(method: &str, unit: usize, units: usize) -> String {
    if unit < units {
        format!(
            "Predicate::Next(Step::Native(Rc::new({} {{ outer: outer.clone(), method: method.clone() }})))",
            unit_name(method, unit)
        )
    } else {
        "outer.cont.clone()".to_string()
    }
}

/// `pointInQuarterCircle` -> `PointInQuarterCircle`, `heat_loss` -> `HeatLoss`.
fn type_name(module: &str) -> String {
    module
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect()
}

fn method_name(module: &str, idx: usize) -> String {
    format!("{module}Method{}", idx + 1)
}

fn alternative_name(module: &str, idx: usize) -> String {
    format!("{module}Alternative{}", idx + 1)
}

fn unit_name(method: &str, unit: usize) -> String {
    format!("{method}Unit{}", unit + 1)
}

fn ident(name: &str) -> String {
    if name == "Self" {
        "Self_".to_string()
    } else {
        name.to_string()
    }
}
