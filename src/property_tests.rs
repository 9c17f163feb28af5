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

//! Property-based tests.
//!
//! Uses proptest to check scheduler and generator invariants across randomly
//! generated inputs.

use crate::ast::{BinOp, SourceSpan, Type, TypeKind};
use crate::compiler::ir::{IrCaseArm, IrExpr, IrStmt, IrStmtKind, IrTarget, IrVar};
use crate::runtime::{For, Predicate, RuntimeError, Value, Variable, Vm, decimal};
use crate::scheduler::{StmtBlock, flatten, schedule};
use bigdecimal::BigDecimal;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;

/// Statement shape: 0 = `for`, 1 = calculation, 2 = test, 3 = `select`,
/// 4 = `case`, 5 = `call` with two outputs; the indices pick operands among
/// the variables written so far.
type Shape = (u8, Index, Index);

fn var_expr(var: &IrVar) -> IrExpr {
    IrExpr::Var(var.clone())
}

fn number(text: &str) -> IrExpr {
    IrExpr::Number(text.to_string())
}

fn binary(op: BinOp, lhs: &IrVar, rhs: &IrVar) -> IrExpr {
    IrExpr::Binary {
        op,
        lhs: Box::new(var_expr(lhs)),
        rhs: Box::new(var_expr(rhs)),
    }
}

/// Builds a body where every read has exactly one writer, then lists the
/// statements in the order given by `keys`. With `dependent_selects` a
/// `select` reads an earlier variable; otherwise it draws from constants.
fn build_body(shapes: &[Shape], keys: &[u32], dependent_selects: bool) -> Vec<IrStmt> {
    let mut vars: Vec<IrVar> = Vec::new();
    let mut stmts = Vec::new();
    for (kind, lhs, rhs) in shapes {
        let kind = if vars.is_empty() { 0 } else { kind % 6 };
        let next = vars.len();
        let fresh = |offset: usize| {
            IrVar::local(
                format!("V{}", next + offset),
                Type::new(TypeKind::Integer, SourceSpan::default()),
                next + offset,
            )
        };
        let stmt = match kind {
            0 => {
                let target = fresh(0);
                vars.push(target.clone());
                IrStmtKind::Range {
                    target,
                    from: number("0"),
                    to: number("2"),
                    step: number("1"),
                }
            }
            1 => {
                let value = binary(BinOp::Add, lhs.get(&vars), rhs.get(&vars));
                let target = fresh(0);
                vars.push(target.clone());
                IrStmtKind::Assign {
                    target: IrTarget::Var(target),
                    value,
                }
            }
            2 => IrStmtKind::Test(binary(BinOp::Le, lhs.get(&vars), rhs.get(&vars))),
            3 => {
                let first = if dependent_selects {
                    var_expr(lhs.get(&vars))
                } else {
                    number("0")
                };
                let target = fresh(0);
                vars.push(target.clone());
                IrStmtKind::Select {
                    target: IrTarget::Var(target),
                    list: IrExpr::List(vec![first, number("1")]),
                }
            }
            4 => {
                let arms = vec![
                    IrCaseArm {
                        cond: binary(BinOp::Le, lhs.get(&vars), rhs.get(&vars)),
                        value: var_expr(lhs.get(&vars)),
                    },
                    IrCaseArm {
                        cond: IrExpr::Bool(true),
                        value: var_expr(rhs.get(&vars)),
                    },
                ];
                let target = fresh(0);
                vars.push(target.clone());
                IrStmtKind::Case {
                    target: IrTarget::Var(target),
                    arms,
                }
            }
            _ => {
                let inputs = vec![var_expr(lhs.get(&vars)), var_expr(rhs.get(&vars))];
                let outputs = vec![fresh(0), fresh(1)];
                vars.extend(outputs.iter().cloned());
                IrStmtKind::Call {
                    module: "helper".to_string(),
                    inputs,
                    outputs,
                }
            }
        };
        stmts.push(IrStmt::new(stmt));
    }

    let mut order: Vec<usize> = (0..stmts.len()).collect();
    order.sort_by_key(|&idx| keys.get(idx).copied().unwrap_or(0));
    order.into_iter().map(|idx| stmts[idx].clone()).collect()
}

fn assert_written_before_read(blocks: &[StmtBlock]) -> Result<(), TestCaseError> {
    let mut written: HashSet<&str> = HashSet::new();
    for block in blocks {
        for operand in &block.operands {
            prop_assert!(
                written.contains(operand.as_str()),
                "{} read by a {} block before it is written",
                operand,
                block.phase
            );
        }
        written.extend(block.writes.iter().map(String::as_str));
    }
    Ok(())
}

fn enumerate(from: i32, to: i32, step: i32) -> Result<Vec<Value>, RuntimeError> {
    let target = Variable::new("X");
    let mut vm = Vm::with_capacity(1);
    let start = For::start(
        target.clone(),
        BigDecimal::from(from),
        BigDecimal::from(to),
        BigDecimal::from(step),
        Predicate::Success,
    )?;
    let mut values = Vec::new();
    let mut found = vm.call(start)?;
    while found {
        values.extend(target.value());
        found = vm.redo()?;
    }
    Ok(values)
}

// ========================================================================
// Scheduler Property Tests
// ========================================================================

proptest! {
    /// Every block reads only variables written by an earlier block.
    #[test]
    fn prop_schedule_writes_before_reads(
        shapes in prop::collection::vec((0u8..6, any::<Index>(), any::<Index>()), 1..14),
        keys in prop::collection::vec(any::<u32>(), 14),
    ) {
        let body = build_body(&shapes, &keys, true);
        let blocks = schedule(&body).expect("generated bodies are well formed");
        assert_written_before_read(&blocks)?;
        prop_assert_eq!(flatten(&blocks).len(), body.len());
    }

    /// Scheduling an already scheduled body keeps its order.
    #[test]
    fn prop_schedule_is_idempotent(
        shapes in prop::collection::vec((0u8..6, any::<Index>(), any::<Index>()), 1..14),
        keys in prop::collection::vec(any::<u32>(), 14),
    ) {
        let body = build_body(&shapes, &keys, false);
        let once = flatten(&schedule(&body).expect("well formed"));
        let twice = flatten(&schedule(&once).expect("well formed"));
        prop_assert_eq!(once, twice);
    }
}

// ========================================================================
// Runtime Property Tests
// ========================================================================

proptest! {
    /// `for` yields every step from the start up to the end, increasing.
    #[test]
    fn prop_for_enumerates_range_in_order(
        from in -20i32..20,
        span in -5i32..30,
        step in 1i32..5,
    ) {
        let to = from + span;
        let expected: Vec<Value> = if from > to {
            Vec::new()
        } else {
            (from..=to).step_by(step as usize).map(Value::from).collect()
        };
        prop_assert_eq!(enumerate(from, to, step).expect("positive step"), expected);
    }

    /// `mod` truncates toward zero like integer `%`.
    #[test]
    fn prop_rem_matches_truncating_remainder(
        lhs in -1000i64..1000,
        rhs in prop_oneof![-50i64..-1, 1i64..50],
    ) {
        let got = decimal::rem(&BigDecimal::from(lhs), &BigDecimal::from(rhs))
            .expect("non-zero divisor");
        prop_assert_eq!(got, BigDecimal::from(lhs % rhs));
    }
}
