//! End-to-end programs run through the public driver.
//!
//! Covers the reference programs for each instruction group, recursion
//! through `DUM`/`RAP`, register isolation across calls, and the trace
//! side channel.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use secd_eval::{
    assemble, buffer_sink, disassemble, eval, eval_source, init_tracing, log_sink, DumpEntry,
    EvalErrorKind, Evaluator, Machine, Opcode, Value,
};

fn run(source: &str) -> Option<Value> {
    eval_source(source).unwrap()
}

fn int_list(values: &[i64]) -> Value {
    values
        .iter()
        .rev()
        .fold(Value::nil(), |tail, &n| Value::cons(Value::int(n), tail))
}

// -- Reference programs --

#[test]
fn arithmetic() {
    assert_eq!(run("LDC 5 LDC 3 ADD"), Some(Value::int(8)));
    assert_eq!(run("LDC 5 LDC 3 SUB"), Some(Value::int(2)));
    assert_eq!(run("LDC 1 LDC 4 DIV"), Some(Value::float(0.25)));
}

#[test]
fn overflowing_float_result_reads_back() {
    let result = run("LDC 1e308 LDC 10.0 MUL").unwrap();
    assert_eq!(result, Value::float(f64::INFINITY));

    let text = disassemble(&[Value::Op(Opcode::Ldc), result.clone()]);
    assert_eq!(text, "LDC inf");
    assert_eq!(run(&text), Some(result));
}

#[test]
fn division_by_zero_aborts() {
    let error = eval(&assemble("LDC 5 LDC 0 DIV").unwrap()).unwrap_err();
    assert_eq!(error.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(error.opcode, Some(Opcode::Div));
    assert_eq!(error.step, 3);
}

#[test]
fn conditional_selection() {
    assert_eq!(
        run("LDC true SEL (LDC 10) (LDC 20) JOIN"),
        Some(Value::int(10))
    );
    assert_eq!(
        run("LDC false SEL (LDC 10 JOIN) (LDC 20 JOIN)"),
        Some(Value::int(20))
    );
}

#[test]
fn function_application() {
    let source = "
        ; (fn x y => x + y) 5 3
        LDC 3 LDC 5 CONS
        LDF (LD 0 0 LD 0 1 ADD RTN)
        SWAP AP
    ";
    assert_eq!(run(source), Some(Value::int(8)));
}

#[test]
fn identity_closure() {
    assert_eq!(
        run("LDC 42 LDF (LD 0 0 RTN) SWAP AP"),
        Some(Value::int(42))
    );
}

#[test]
fn list_construction_prepends() {
    assert_eq!(
        run("NIL LDC 1 CONS LDC 2 CONS LDC 3 CONS"),
        Some(int_list(&[3, 2, 1]))
    );
    assert_eq!(
        run("NIL LDC 1 CONS LDC 2 CONS LDC 3 CONS CDR CAR"),
        Some(Value::int(2))
    );
}

// -- Recursion --

const FACTORIAL: &str = "
    DUM
    LDF (LDC 5 LD 0 0 SWAP AP RTN)
    NIL
    LDF (
        LD 0 0 LDC 0 EQ
        SEL (LDC 1 JOIN)
            (LD 0 0  LD 0 0 LDC 1 SUB  LD 1 0 SWAP AP  MUL JOIN)
        RTN
    )
    CONS
    RAP
";

#[test]
fn letrec_factorial() {
    assert_eq!(run(FACTORIAL), Some(Value::int(120)));
}

#[test]
fn letrec_mutual_recursion() {
    // letrec even n = n == 0 || odd (n - 1)
    //        odd n  = n != 0 && even (n - 1)
    // in odd 7
    let source = "
        DUM
        LDF (LDC 7 LD 0 1 SWAP AP RTN)
        LDF (LD 0 0 LDC 0 EQ SEL (LDC false JOIN) (LD 1 0 LD 0 0 LDC 1 SUB AP JOIN) RTN)
        LDF (LD 0 0 LDC 0 EQ SEL (LDC true JOIN) (LD 1 1 LD 0 0 LDC 1 SUB AP JOIN) RTN)
        CONS
        RAP
    ";
    assert_eq!(run(source), Some(Value::Bool(true)));
}

#[test]
fn runaway_self_application_hits_budget() {
    let program = assemble("LDF (LD 0 0 LD 0 0 AP RTN) DUP AP").unwrap();

    let error = eval(&program).unwrap_err();
    assert_eq!(error.kind, EvalErrorKind::StepBudgetExceeded { budget: 1000 });
    assert!(error.kind.is_fatal());
    assert_eq!(error.step, 1001);

    let error = Evaluator::builder()
        .step_budget(25)
        .build()
        .eval(&program)
        .unwrap_err();
    assert_eq!(error.kind, EvalErrorKind::StepBudgetExceeded { budget: 25 });
    assert_eq!(error.step, 26);
}

#[test]
fn recursion_fits_a_larger_budget() {
    let program = assemble(&FACTORIAL.replace("LDC 5", "LDC 20")).unwrap();
    assert!(eval(&program).is_ok_and(|v| v == Some(Value::int(2_432_902_008_176_640_000))));
}

// -- Register isolation --

#[test]
fn saved_caller_stack_is_not_touched_by_callee() {
    let program = assemble("LDC 1 LDC 2 LDF (LDC 9 LDC 9 RTN) SWAP AP").unwrap();
    let mut machine = Machine::new(&program);
    for _ in 0..7 {
        machine.step().unwrap();
    }
    assert_eq!(machine.stack(), &[Value::int(9), Value::int(9)]);
    let [DumpEntry::Call { stack, .. }] = machine.dump() else {
        panic!("expected one saved call frame");
    };
    assert_eq!(stack, &vec![Value::int(1)]);

    machine.step().unwrap();
    assert_eq!(machine.stack(), &[Value::int(1), Value::int(9)]);
    assert!(machine.dump().is_empty());
}

#[test]
fn closure_environment_is_a_copy() {
    let program = assemble("LDC 1 LDF (LD 0 0 RTN) SWAP AP").unwrap();
    let mut machine = Machine::new(&program);
    machine.step().unwrap();
    machine.step().unwrap();
    let Some(Value::Closure(closure)) = machine.result() else {
        panic!("expected a closure on top of the stack");
    };
    machine.step().unwrap();
    machine.step().unwrap();

    assert_eq!(machine.environment().len(), 1);
    assert_eq!(closure.environment().len(), 0);
}

#[test]
fn error_snapshot_is_detached_from_later_runs() {
    let program = assemble("LDC 1 LDC 2 CONS CAR CAR").unwrap();
    let evaluator = Evaluator::default();
    let mut machine = Machine::new(&program);
    let error = evaluator.run(&mut machine).unwrap_err();

    machine.step().unwrap_err();
    assert_eq!(error.state.stack, vec![Value::int(2)]);
    assert_eq!(error.state.control, vec![Value::Op(Opcode::Car)]);
    assert_eq!(
        error.state.to_string(),
        "Step 5:\nStack: [2]\nEnvironment: []\nControl: CAR\nDump: []"
    );
}

// -- Trace side channel --

#[test]
fn buffered_trace_matches_steps() {
    let sink = buffer_sink();
    let evaluator = Evaluator::builder().trace_sink(sink.clone()).build();
    let result = evaluator
        .eval(&assemble("LDC true SEL (LDC 10 JOIN) (LDC 20 JOIN)").unwrap())
        .unwrap();
    assert_eq!(result, Some(Value::int(10)));

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 4);
    assert_eq!(snapshots[2].dump.len(), 1);
    assert_eq!(snapshots[3].to_string().lines().last(), Some("Dump: [join ()]"));
}

#[test]
fn logged_trace_does_not_change_results() {
    init_tracing();
    init_tracing();
    let evaluator = Evaluator::builder().trace_sink(log_sink()).build();
    let program = assemble(FACTORIAL).unwrap();
    assert_eq!(evaluator.eval(&program).unwrap(), eval(&program).unwrap());
}
