//! Property-based tests for the machine.
//!
//! These use proptest to check:
//! 1. Underflow: every opcode that needs stack operands fails with
//!    `StackUnderflow` when given too few, never with a default value
//! 2. Dump discipline: `JOIN`/`RTN` without their partner entry always
//!    fail with `EmptyDump`
//! 3. Budget: a non-terminating program stops exactly at its budget
//! 4. Round-trip: disassembled programs assemble back to equal values

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use secd_eval::{assemble, disassemble, eval, EvalErrorKind, Evaluator, Opcode, Value};

// -- Underflow --

proptest! {
    #[test]
    fn short_stack_underflows(
        op in proptest::sample::select(Opcode::ALL.to_vec()),
        seed in 0usize..2,
    ) {
        let needed = op.stack_operands();
        prop_assume!(needed > 0);
        let found = seed % needed;

        let mut program = Vec::new();
        for n in 0..found {
            program.push(Value::Op(Opcode::Ldc));
            program.push(Value::int(i64::try_from(n).unwrap()));
        }
        program.push(Value::Op(op));
        if op == Opcode::Sel {
            program.push(Value::code(vec![]));
            program.push(Value::code(vec![]));
        }

        let error = eval(&program).unwrap_err();
        prop_assert_eq!(
            error.kind,
            EvalErrorKind::StackUnderflow { opcode: op, needed, found }
        );
        prop_assert_eq!(error.step, found + 1);
        prop_assert_eq!(error.opcode, Some(op));
    }
}

// -- Dump discipline --

/// Top-level program fragments. Balanced fragments leave the Dump as they
/// found it; the others run `JOIN`/`RTN` against the wrong entry.
#[derive(Clone, Copy, Debug)]
enum Fragment {
    Push,
    Branch,
    Call,
    CallInsideBranch,
    StrayJoin,
    StrayRtn,
    JoinInsideCall,
}

impl Fragment {
    fn source(self) -> &'static str {
        match self {
            Fragment::Push => "LDC 1",
            Fragment::Branch => "LDC true SEL (LDC 2 JOIN) (JOIN)",
            Fragment::Call => "LDC 1 LDF (LDC 0 RTN) SWAP AP",
            Fragment::CallInsideBranch => {
                "LDC 1 SEL (LDC 1 LDF (LDC 0 RTN) SWAP AP POP JOIN) (JOIN)"
            }
            Fragment::StrayJoin => "JOIN",
            Fragment::StrayRtn => "LDC 1 RTN",
            Fragment::JoinInsideCall => "LDC 1 LDF (JOIN) SWAP AP",
        }
    }

    /// `(opcode, dump entry found)` when this fragment fails.
    fn failure(self) -> Option<(Opcode, &'static str)> {
        match self {
            Fragment::StrayJoin => Some((Opcode::Join, "nothing")),
            Fragment::StrayRtn => Some((Opcode::Rtn, "nothing")),
            Fragment::JoinInsideCall => Some((Opcode::Join, "call frame")),
            Fragment::Push | Fragment::Branch | Fragment::Call | Fragment::CallInsideBranch => {
                None
            }
        }
    }
}

fn fragment_strategy() -> impl Strategy<Value = Fragment> {
    prop_oneof![
        4 => Just(Fragment::Push),
        3 => Just(Fragment::Branch),
        3 => Just(Fragment::Call),
        2 => Just(Fragment::CallInsideBranch),
        1 => Just(Fragment::StrayJoin),
        1 => Just(Fragment::StrayRtn),
        1 => Just(Fragment::JoinInsideCall),
    ]
}

proptest! {
    #[test]
    fn unmatched_dump_pops_are_caught(fragments in prop::collection::vec(fragment_strategy(), 0..20)) {
        let source = fragments
            .iter()
            .map(|f| f.source())
            .collect::<Vec<_>>()
            .join("\n");
        let program = assemble(&source).unwrap();
        let result = eval(&program);

        match fragments.iter().find_map(|f| f.failure()) {
            None => prop_assert!(result.is_ok()),
            Some((opcode, found)) => {
                let error = result.unwrap_err();
                let expected = if opcode == Opcode::Join {
                    "branch continuation"
                } else {
                    "call frame"
                };
                prop_assert_eq!(
                    error.kind,
                    EvalErrorKind::EmptyDump { opcode, expected, found }
                );
            }
        }
    }
}

// -- Budget --

proptest! {
    #[test]
    fn self_application_stops_at_budget(budget in 1usize..300) {
        let program = assemble("LDF (LD 0 0 LD 0 0 AP RTN) DUP AP").unwrap();
        let error = Evaluator::builder()
            .step_budget(budget)
            .build()
            .eval(&program)
            .unwrap_err();
        prop_assert_eq!(error.kind, EvalErrorKind::StepBudgetExceeded { budget });
        prop_assert_eq!(error.step, budget + 1);
    }

    #[test]
    fn straight_line_programs_finish_within_exact_budget(values in prop::collection::vec(any::<i64>(), 1..40)) {
        let program: Vec<Value> = values.iter().map(|&n| Value::int(n)).collect();
        let result = Evaluator::builder()
            .step_budget(values.len())
            .build()
            .eval(&program)
            .unwrap();
        prop_assert_eq!(result, values.last().map(|&n| Value::int(n)));
    }
}

// -- Assembler round-trip --

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::int),
        (-1.0e12f64..1.0e12).prop_map(Value::float),
        Just(Value::float(f64::INFINITY)),
        Just(Value::float(f64::NEG_INFINITY)),
        any::<bool>().prop_map(Value::Bool),
        "[a-zA-Z0-9 \"\\\\\n\t]{0,8}".prop_map(|s| Value::string(s.as_str())),
    ]
}

fn literal_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::list)
    })
}

fn item_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        proptest::sample::select(Opcode::ALL.to_vec()).prop_map(Value::Op),
        literal_strategy(),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop::collection::vec(inner, 0..5).prop_map(Value::code)
    })
}

proptest! {
    #[test]
    fn disassembly_assembles_back(program in prop::collection::vec(item_strategy(), 0..12)) {
        let text = disassemble(&program);
        let reassembled = assemble(&text).unwrap();
        prop_assert_eq!(reassembled, program);
    }
}
