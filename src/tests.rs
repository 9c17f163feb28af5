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

//! Crate unit tests.

use super::*;
use crate::ast::{BinOp, SourceSpan, Type, TypeKind};
use crate::compiler::ir::{IrExpr, IrStmt, IrStmtKind, IrTarget, IrVar};
use crate::lexer::TokenKind;
use crate::runtime::{Binder, Case, Goal, Member, Predicate, Step, Variable, Vm};
use crate::scheduler::{flatten, schedule};
use std::cell::Cell;
use std::rc::Rc;

const QUARTER_CIRCLE: &str = "\
pointInQuarterCircle({R: real}, {X: real, Y: real})
method
    X = for(0.0, R, 1.0);
    Y = for(0.0, R, 1.0);
    D = sqrt(X^2 + Y^2);
    test(D =< R);
end method;
end module;
";

const COUNT: &str = "\
count({B: integer, E: integer}, {N: integer})
method
    when(B =< E);
    N = B;
end method;
method
    when(B < E);
    call(count, {B + 1, E}, {N});
end method;
end module;
";

const TWICE: &str = "\
twice({A: integer}, {B: integer})
method
    B = A * 2;
end method;
end module;
";

const USES_TWICE: &str = "\
main(twice, {X: integer}, {Y: integer})
method
    call(twice, {X}, {Y});
end method;
end module;
";

const SQUARE: &str = "\
square({A: integer}, {B: integer})
method
    B = A * A;
end method;
end module;
";

const SQUARES_ABOVE_TWO: &str = "\
squaresAboveTwo(square, {N: integer}, {X: integer, Y: integer})
method
    call(square, {X}, {S: integer});
    test(S > 2);
    Y = S + 1;
    X = for(0, N, 1);
end method;
end module;
";

fn first_caret_column(pointer: &str) -> Option<usize> {
    pointer.chars().position(|ch| ch == '^').map(|idx| idx + 1)
}

fn compile_ok(source: &str) -> Compiled {
    compile("test.bt", source).expect("source should compile")
}

fn run_ok(source: &str, bindings: Bindings) -> Vec<Solution> {
    compile_ok(source)
        .run(&bindings)
        .expect("program should run")
}

fn numbers(solutions: &[Solution], name: &str) -> Vec<f64> {
    solutions
        .iter()
        .map(|solution| match solution.get(name) {
            Some(Value::Number(value)) => *value,
            other => panic!("expected number for {name}, got {other:?}"),
        })
        .collect()
}

fn assert_parse_error_case(case_name: &str, source: &str, expected_line: usize) {
    let errors = parse_source("case.bt", source).expect_err("parse should fail");
    let err = errors.first().expect("at least one error");
    assert_eq!(
        err.line, expected_line,
        "{case_name}: unexpected error line ({})",
        err.message
    );
    assert!(err.column > 0, "{case_name}: expected non-zero column");

    let expected_snippet = source
        .lines()
        .nth(err.line.saturating_sub(1))
        .unwrap_or_default();
    assert_eq!(
        err.snippet, expected_snippet,
        "{case_name}: snippet should match source line"
    );
    assert_eq!(
        first_caret_column(&err.pointer),
        Some(err.column),
        "{case_name}: caret column mismatch"
    );
}

fn int_type() -> Type {
    Type::new(TypeKind::Integer, SourceSpan::default())
}

fn local(name: &str, slot: usize) -> IrVar {
    IrVar::local(name, int_type(), slot)
}

fn var(v: &IrVar) -> IrExpr {
    IrExpr::Var(v.clone())
}

fn num(text: &str) -> IrExpr {
    IrExpr::Number(text.to_string())
}

fn bin(op: BinOp, lhs: IrExpr, rhs: IrExpr) -> IrExpr {
    IrExpr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[test]
fn quarter_circle_enumerates_points_in_row_major_order() {
    let solutions = run_ok(QUARTER_CIRCLE, Bindings::new().with("R", 2.0));
    let points: Vec<(f64, f64)> = numbers(&solutions, "X")
        .into_iter()
        .zip(numbers(&solutions, "Y"))
        .collect();
    assert_eq!(
        points,
        vec![
            (0.0, 0.0),
            (0.0, 1.0),
            (0.0, 2.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (2.0, 0.0),
        ]
    );
}

#[test]
fn for_range_includes_upper_bound_in_increasing_order() {
    let source = "\
upto({R: integer}, {X: integer})
method
    X = for(0, R, 1);
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("R", 3));
    assert_eq!(numbers(&solutions, "X"), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn for_range_with_start_past_end_yields_nothing() {
    let source = "\
downto({R: integer}, {X: integer})
method
    X = for(R, 0, 1);
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("R", 3));
    assert!(solutions.is_empty());
}

#[test]
fn non_positive_for_step_is_a_runtime_error() {
    let source = "\
stuck({S: integer}, {X: integer})
method
    X = for(0, 3, S);
end method;
end module;
";
    let err = compile_ok(source)
        .run(&Bindings::new().with("S", 0))
        .expect_err("zero step should be rejected");
    assert_eq!(
        err,
        RuntimeError::InvalidStep {
            step: "0".to_string()
        }
    );
}

#[test]
fn test_statement_filters_candidates() {
    let source = "\
multiples({N: integer}, {X: integer})
method
    X = for(1, N, 1);
    test(X mod 3 = 0);
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("N", 10));
    assert_eq!(numbers(&solutions, "X"), vec![3.0, 6.0, 9.0]);
}

#[test]
fn select_enumerates_list_items_in_order() {
    let source = "\
pick({L: [integer]}, {X: integer})
method
    X = select(L);
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("L", vec![4, 5, 6]));
    assert_eq!(numbers(&solutions, "X"), vec![4.0, 5.0, 6.0]);
}

#[test]
fn select_destructures_vector_items() {
    let source = "\
pairs({L: [{integer, integer}]}, {S: integer})
method
    {A: integer, B: integer} = select(L);
    S = A + B;
end method;
end module;
";
    let list = Value::List(vec![
        Value::Vector(vec![Value::from(1), Value::from(2)]),
        Value::Vector(vec![Value::from(3), Value::from(4)]),
    ]);
    let solutions = run_ok(source, Bindings::new().with("L", list));
    assert_eq!(numbers(&solutions, "S"), vec![3.0, 7.0]);
}

#[test]
fn case_expression_takes_first_matching_arm() {
    let source = "\
magnitude({A: integer}, {M: integer})
method
    M = case(A < 0 -> -A, true -> A);
end method;
end module;
";
    let compiled = compile_ok(source);
    for (input, expected) in [(-3, 3.0), (5, 5.0), (0, 0.0)] {
        let solutions = compiled
            .run(&Bindings::new().with("A", input))
            .expect("program should run");
        assert_eq!(numbers(&solutions, "M"), vec![expected], "input {input}");
    }
}

#[test]
fn case_dispatch_stops_at_first_true_condition() {
    let evaluated = Cell::new(0);
    let case = Case::new()
        .arm(
            || {
                evaluated.set(evaluated.get() + 1);
                Ok(false)
            },
            || Ok("A"),
        )
        .arm(
            || {
                evaluated.set(evaluated.get() + 1);
                Ok(true)
            },
            || Ok("B"),
        )
        .arm(
            || {
                evaluated.set(evaluated.get() + 1);
                Ok(true)
            },
            || panic!("arm after the first match must not run"),
        );
    assert_eq!(case.select().expect("no error"), Some("B"));
    assert_eq!(evaluated.get(), 2);
}

#[test]
fn case_without_matching_arm_selects_nothing() {
    let case: Case<'_, i32> = Case::new().arm(|| Ok(false), || Ok(1));
    assert_eq!(case.select().expect("no error"), None);
}

#[test]
fn guarded_recursion_enumerates_range() {
    let solutions = run_ok(COUNT, Bindings::new().with("B", 0).with("E", 3));
    assert_eq!(numbers(&solutions, "N"), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn unguarded_alternatives_are_all_tried_in_source_order() {
    let source = "\
either({A: integer}, {X: integer})
method
    X = A;
end method;
method
    X = A + 10;
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("A", 1));
    assert_eq!(numbers(&solutions, "X"), vec![1.0, 11.0]);
}

#[test]
fn single_method_is_entered_without_guard_check() {
    let source = "\
positive({A: integer}, {X: integer})
method
    when(A > 0);
    X = A;
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("A", -1));
    assert_eq!(numbers(&solutions, "X"), vec![-1.0]);
}

#[test]
fn guarded_alternatives_skip_failing_guards() {
    let source = "\
sign({A: integer}, {S: atom})
method
    when(A < 0);
    S = negative;
end method;
method
    when(A >= 0);
    S = positive;
end method;
end module;
";
    let compiled = compile_ok(source);
    for (input, expected) in [(-4, "negative"), (0, "positive"), (7, "positive")] {
        let solutions = compiled
            .run(&Bindings::new().with("A", input))
            .expect("program should run");
        let signs: Vec<&Value> = solutions.iter().filter_map(|s| s.get("S")).collect();
        assert_eq!(signs, vec![&Value::from(expected)], "input {input}");
    }
}

#[test]
fn call_resolves_auxiliary_module_sources() {
    let options = CompileOptions::new()
        .source_name("main.bt")
        .module_sources(ModuleSources::new().with("twice", TWICE));
    let compiled = compile_with_options(USES_TWICE, &options).expect("project should compile");
    let solutions = compiled
        .run(&Bindings::new().with("X", 21))
        .expect("program should run");
    assert_eq!(numbers(&solutions, "Y"), vec![42.0]);
    assert_eq!(compiled.program().modules().len(), 2);
}

#[test]
fn call_output_feeds_later_test_and_calculation() {
    let options = CompileOptions::new().module_sources(ModuleSources::new().with("square", SQUARE));
    let compiled =
        compile_with_options(SQUARES_ABOVE_TWO, &options).expect("project should compile");
    let solutions = compiled
        .run(&Bindings::new().with("N", 3))
        .expect("program should run");
    assert_eq!(numbers(&solutions, "X"), vec![2.0, 3.0]);
    assert_eq!(numbers(&solutions, "Y"), vec![5.0, 10.0]);
}

#[test]
fn compile_project_uses_named_entry() {
    let sources = ModuleSources::new()
        .with("main", USES_TWICE)
        .with("twice", TWICE);
    let compiled =
        compile_project("main", &sources, &CompileOptions::new()).expect("project should compile");
    let solutions = compiled
        .run(&Bindings::new().with("X", 5))
        .expect("program should run");
    assert_eq!(numbers(&solutions, "Y"), vec![10.0]);

    let err = compile_project("missing", &sources, &CompileOptions::new())
        .expect_err("unknown entry should fail");
    assert_eq!(
        err.first().map(|e| e.message.as_str()),
        Some("Module \"missing\" is not defined.")
    );
}

#[test]
fn unknown_call_target_is_reported_at_the_call() {
    let err = compile("main.bt", USES_TWICE).expect_err("call target is missing");
    assert_eq!(err.len(), 1);
    let first = err.first().expect("one error");
    assert_eq!(first.message, "Module \"twice\" is not defined.");
    assert_eq!(first.line, 3);
    assert_eq!(first.snippet, "    call(twice, {X}, {Y});");
}

#[test]
fn call_arity_mismatch_is_reported() {
    let source = "\
main(twice, {X: integer}, {Y: integer})
method
    call(twice, {X, X}, {Y});
end method;
end module;
";
    let options = CompileOptions::new().module_sources(ModuleSources::new().with("twice", TWICE));
    let err = compile_with_options(source, &options).expect_err("arity should not match");
    let first = err.first().expect("one error");
    assert_eq!(
        first.message,
        "Module \"twice\" takes 1 inputs and 1 outputs, but got 2 and 1."
    );
    assert_eq!(first.line, 3);
}

#[test]
fn conflicting_redeclaration_reports_once_at_second_annotation() {
    let source = "\
m({A: integer}, {B: integer})
method
    X: integer = A;
    X: atom = A;
    B = A;
end method;
end module;
";
    let errors = parse_source("redeclare.bt", source).expect_err("redeclaration should fail");
    assert_eq!(errors.len(), 1);
    let err = errors.first().expect("one error");
    assert_eq!(err.message, "Variable \"X\" is already defined as integer.");
    assert_eq!((err.line, err.column), (4, 8));
    assert_eq!(first_caret_column(&err.pointer), Some(8));
}

#[test]
fn conflicting_redeclaration_becomes_a_dummy_variable() {
    use crate::ast::{ExprKind, Rhs, StmtKind};

    let source = "\
m({A: integer}, {B: integer})
method
    X: integer = A;
    X: atom = A;
    B = X;
end method;
end module;
";
    let mut ctx = crate::compiler::CompileContext::new("redeclare.bt", source);
    let tokens = crate::lexer::lex(&mut ctx);
    let program = crate::parser::parse(&tokens, &mut ctx);
    let errors = ctx.finish_stage("parse").expect_err("redeclaration should fail");
    assert_eq!(errors.len(), 1);

    let body = &program.modules[0].blocks[0].body;
    match &body[1].kind {
        StmtKind::Assign { target, .. } => match &target.kind {
            ExprKind::Var(var) => {
                assert_eq!(var.name, "dummy");
                assert!(var.ty.is_dummy());
            }
            other => panic!("expected a variable target, got {other:?}"),
        },
        other => panic!("expected an assignment, got {other:?}"),
    }
    match &body[2].kind {
        StmtKind::Assign {
            value: Rhs::Expr(value),
            ..
        } => match &value.kind {
            ExprKind::Var(var) => assert_eq!(var.ty.kind, TypeKind::Integer),
            other => panic!("expected a variable, got {other:?}"),
        },
        other => panic!("expected an assignment, got {other:?}"),
    }
}

#[test]
fn missing_terminator_at_end_of_input_is_reported_on_last_line() {
    let source = "\
m({A: integer}, {B: integer})
method
    B = A;
end method;
end module
";
    let errors = parse_source("eof.bt", source).expect_err("missing ; should fail");
    assert_eq!(errors.len(), 1);
    let err = errors.first().expect("one error");
    assert_eq!(err.message, "Expected ;, but got \"\".");
    assert_eq!((err.line, err.column), (5, 6));
    assert_eq!(err.snippet, "end module");
}

#[test]
fn when_after_first_statement_is_rejected() {
    let source = "\
m({A: integer}, {B: integer})
method
    B = A;
    when(A > 0);
end method;
end module;
";
    let errors = parse_source("when.bt", source).expect_err("late when should fail");
    let err = errors.first().expect("one error");
    assert_eq!(err.message, "\"when\" must be the first statement of a method.");
    assert_eq!(err.line, 4);
}

#[test]
fn reports_parse_errors_with_line_snippet_and_caret() {
    let cases = [
        (
            "unclosed builtin",
            "m({A: real}, {B: real})\nmethod\n    B = sqrt(A;\nend method;\nend module;\n",
            3,
        ),
        (
            "untyped parameter group",
            "m(A: integer)\nmethod\nend method;\nend module;\n",
            1,
        ),
        (
            "undefined variable",
            "m({A: integer}, {B: integer})\nmethod\n    B = C;\nend method;\nend module;\n",
            3,
        ),
        (
            "non numeric bound",
            "m({A: atom}, {B: integer})\nmethod\n    B = for(A, 3, 1);\nend method;\nend module;\n",
            3,
        ),
    ];
    for (name, source, line) in cases {
        assert_parse_error_case(name, source, line);
    }
}

#[test]
fn unexpected_character_is_reported_and_skipped() {
    let out = tokenize("X = 1 # 2;");
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].message, "Unexpected character.");
    assert_eq!((out.errors[0].line, out.errors[0].column), (1, 7));
    let texts: Vec<&str> = out.tokens.iter().map(|tok| tok.text.as_str()).collect();
    assert_eq!(texts, vec!["X", "=", "1", "2", ";", ""]);
}

#[test]
fn eof_after_trailing_newline_follows_start_of_last_token() {
    let out = tokenize("X = 1;\n");
    assert!(out.is_ok());
    let eof = out.tokens.last().expect("eof token");
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!((eof.span.line, eof.span.column), (2, 7));

    let out = tokenize("abc(X)\nend module\n");
    let eof = out.tokens.last().expect("eof token");
    assert_eq!((eof.span.line, eof.span.column), (3, 6));
}

#[test]
fn reporter_receives_every_error_and_no_output() {
    let mut reported: Vec<CompileError> = Vec::new();
    let compiled = compile_with_reporter("bad.bt", "m # ( $", &mut reported);
    assert!(compiled.is_none());
    assert_eq!(reported.len(), 2);
    assert!(reported.iter().all(|err| err.message == "Unexpected character."));

    let mut count = 0;
    let mut counter = reporter_fn(|_| count += 1);
    assert!(compile_with_reporter("ok.bt", QUARTER_CIRCLE, &mut counter).is_some());
    drop(counter);
    assert_eq!(count, 0);
}

#[test]
fn division_by_zero_is_an_error_not_a_failure() {
    let source = "\
ratio({A: integer}, {X: real})
method
    X = A / 0;
end method;
end module;
";
    let err = compile_ok(source)
        .run(&Bindings::new().with("A", 1))
        .expect_err("division by zero should abort");
    assert_eq!(err, RuntimeError::DivisionByZero);
}

#[test]
fn reading_an_unbound_output_is_an_error() {
    let source = "\
m({A: integer}, {X: integer, Y: integer})
method
    Y = X + A;
end method;
end module;
";
    let err = compile_ok(source)
        .run(&Bindings::new().with("A", 1))
        .expect_err("X is never bound");
    assert_eq!(
        err,
        RuntimeError::Unbound {
            name: "X".to_string()
        }
    );
}

#[test]
fn missing_input_is_reported_before_running() {
    let err = compile_ok(QUARTER_CIRCLE)
        .run(&Bindings::new())
        .expect_err("R is required");
    assert_eq!(
        err,
        RuntimeError::MissingInput {
            name: "R".to_string()
        }
    );
}

#[test]
fn underscore_prefixed_binding_wins() {
    let bindings = Bindings::new().with("_R", 1.0).with("R", 100.0);
    let solutions = run_ok(QUARTER_CIRCLE, bindings);
    assert_eq!(solutions.len(), 3);
}

#[test]
fn max_solutions_caps_collection() {
    let compiled = compile_ok(QUARTER_CIRCLE);
    let solutions = compiled
        .run_with(
            &Bindings::new().with("R", 2.0),
            &RunOptions::new().max_solutions(2).initial_choice_points(4),
        )
        .expect("program should run");
    assert_eq!(solutions.len(), 2);
}

#[test]
fn solutions_iterator_is_lazy() {
    let compiled = compile_ok(COUNT);
    let mut solutions = compiled
        .solutions(&Bindings::new().with("B", 0).with("E", 100))
        .expect("inputs are present");
    let first = solutions.next().expect("one solution").expect("no error");
    assert_eq!(first.get("N"), Some(&Value::Number(0.0)));
    let second = solutions.next().expect("two solutions").expect("no error");
    assert_eq!(second.get("N"), Some(&Value::Number(1.0)));
}

#[test]
fn manifest_lists_entry_inputs_and_outputs() {
    let compiled = compile_ok(QUARTER_CIRCLE);
    let manifest = compiled.manifest();
    let entry = |name: &str, ty: &str| ManifestEntry {
        name: name.to_string(),
        ty: ty.to_string(),
    };
    assert_eq!(manifest.input, vec![entry("R", "real")]);
    assert_eq!(manifest.output, vec![entry("X", "real"), entry("Y", "real")]);

    let json: serde_json::Value =
        serde_json::from_str(&manifest.to_json().expect("serializable")).expect("valid json");
    assert_eq!(json["input"][0]["name"], "R");
    assert_eq!(json["output"][1]["type"], "real");
}

#[test]
fn solutions_serialize_as_maps() {
    let solutions = run_ok(QUARTER_CIRCLE, Bindings::new().with("R", 0.0));
    let json = serde_json::to_string(&solutions).expect("serializable");
    assert_eq!(json, r#"[{"X":0.0,"Y":0.0}]"#);
}

#[test]
fn emitted_source_defines_goals_and_entry_point() {
    let compiled = compile_ok(COUNT);
    let source = compiled.source();
    assert!(source.contains("pub struct Count {"));
    assert!(source.contains("impl Goal for Count {"));
    assert!(source.contains("struct CountAlternative2(Count);"));
    assert!(source.contains("struct CountMethod2Unit1 {"));
    assert!(source.contains("pub fn main(bindings: &Bindings) -> Result<Vec<Solution>, RuntimeError> {"));

    let quarter = compile_ok(QUARTER_CIRCLE);
    assert!(
        quarter
            .source()
            .contains("if !(method.D.get()?.decimal()? <= outer.R.get()?.decimal()?) {")
    );
    assert!(!quarter.source().contains("Ok(("));
    assert!(!quarter.source().contains("Bool(("));

    let quiet = compile_with_options(COUNT, &CompileOptions::new().emit_source(false))
        .expect("source should compile");
    assert!(quiet.source().is_empty());
}

#[test]
fn scheduler_runs_test_right_after_its_inputs() {
    let x = local("X", 0);
    let d = local("D", 1);
    let stmts = vec![
        IrStmt::new(IrStmtKind::Test(bin(BinOp::Le, var(&d), num("4")))),
        IrStmt::new(IrStmtKind::Assign {
            target: IrTarget::Var(d.clone()),
            value: bin(BinOp::Mul, var(&x), var(&x)),
        }),
        IrStmt::new(IrStmtKind::Range {
            target: x.clone(),
            from: num("0"),
            to: num("3"),
            step: num("1"),
        }),
    ];
    let blocks = schedule(&stmts).expect("well formed");
    let phases: Vec<Phase> = blocks.iter().map(|block| block.phase).collect();
    assert_eq!(phases, vec![Phase::Assume, Phase::Test]);
    assert_eq!(blocks[1].stmts.len(), 2);
    assert_eq!(blocks[1].operands, vec!["X".to_string()]);
    assert_eq!(blocks[1].target.as_deref(), Some("D"));

    let again = schedule(&flatten(&blocks)).expect("well formed");
    assert_eq!(flatten(&again), flatten(&blocks));
}

#[test]
fn scheduler_places_call_before_readers_of_its_outputs() {
    let x = local("X", 0);
    let s = local("S", 1);
    let y = local("Y", 2);
    let stmts = vec![
        IrStmt::new(IrStmtKind::Assign {
            target: IrTarget::Var(y.clone()),
            value: bin(BinOp::Add, var(&s), num("1")),
        }),
        IrStmt::new(IrStmtKind::Test(bin(BinOp::Lt, num("2"), var(&s)))),
        IrStmt::new(IrStmtKind::Call {
            module: "square".to_string(),
            inputs: vec![var(&x)],
            outputs: vec![s.clone()],
        }),
        IrStmt::new(IrStmtKind::Range {
            target: x.clone(),
            from: num("0"),
            to: num("3"),
            step: num("1"),
        }),
    ];
    let blocks = schedule(&stmts).expect("well formed");
    let phases: Vec<Phase> = blocks.iter().map(|block| block.phase).collect();
    assert_eq!(
        phases,
        vec![Phase::Assume, Phase::Other, Phase::Test, Phase::Calc]
    );
    assert_eq!(blocks[1].writes, vec!["S".to_string()]);

    let again = schedule(&flatten(&blocks)).expect("well formed");
    assert_eq!(flatten(&again), flatten(&blocks));
}

#[test]
fn scheduler_rejects_placeholder_statements() {
    let stmts = vec![
        IrStmt::new(IrStmtKind::Assign {
            target: IrTarget::Var(local("X", 0)),
            value: num("1"),
        }),
        IrStmt::new(IrStmtKind::Dummy),
    ];
    assert_eq!(schedule(&stmts), Err(ScheduleError::Malformed { index: 1 }));
}

#[test]
fn constraint_named_assignment_is_checked() {
    let source = "\
m({N: integer}, {X: integer})
method
    X = for(0, N, 1);
    _constraint = X > 1;
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("N", 3));
    assert_eq!(numbers(&solutions, "X"), vec![2.0, 3.0]);
}

#[test]
fn constraint_marker_is_case_sensitive() {
    let source = "\
m({N: integer}, {Constraints: integer})
method
    Constraints = N + 1;
end method;
end module;
";
    let solutions = run_ok(source, Bindings::new().with("N", 2));
    assert_eq!(numbers(&solutions, "Constraints"), vec![3.0]);
}

#[test]
fn constraint_named_variable_requires_a_boolean() {
    let source = "\
m({N: integer}, {X: integer})
method
    X = N;
    _constraint = N + 1;
end method;
end module;
";
    let errors = parse_source("constraint.bt", source).expect_err("integer constraint should fail");
    assert_eq!(errors.len(), 1);
    let err = errors.first().expect("one error");
    assert_eq!(err.message, "Expected bool, but got integer.");
    assert_eq!(err.line, 4);
    assert_eq!(err.snippet, "    _constraint = N + 1;");
}

struct RejectTwo(Variable);

impl Goal for RejectTwo {
    fn exec(&self, _vm: &mut Vm) -> Result<Predicate, RuntimeError> {
        if self.0.get()? == Value::from(2) {
            Ok(Predicate::Failure)
        } else {
            Ok(Predicate::Success)
        }
    }
}

#[test]
fn vm_backtracks_through_native_goals() {
    let x = Variable::new("X");
    let check = Predicate::Next(Step::Native(Rc::new(RejectTwo(x.clone()))));
    let start = Member::start(
        Binder::Var(x.clone()),
        vec![Value::from(1), Value::from(2), Value::from(3)],
        check,
    );
    let mut vm = Vm::with_capacity(1);
    let mut seen = Vec::new();
    let mut found = vm.call(start).expect("no error");
    while found {
        seen.push(x.value().expect("bound"));
        found = vm.redo().expect("no error");
    }
    assert_eq!(seen, vec![Value::from(1), Value::from(3)]);
    assert_eq!(vm.depth(), 0);
}

#[test]
fn destructuring_checks_arity() {
    let binder = Binder::Destructure(vec![Variable::new("A"), Variable::new("B")]);
    let err = binder
        .bind(Value::Vector(vec![Value::from(1)]))
        .expect_err("arity differs");
    assert_eq!(
        err,
        RuntimeError::Arity {
            expected: 2,
            found: 1
        }
    );
}
