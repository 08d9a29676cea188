use super::*;
use crate::frame::Frame;
use pretty_assertions::assert_eq;

#[test]
fn truthiness() {
    assert!(Value::Bool(true).is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!Value::int(0).is_truthy());
    assert!(Value::int(-3).is_truthy());
    assert!(!Value::float(0.0).is_truthy());
    assert!(!Value::string("").is_truthy());
    assert!(Value::string("x").is_truthy());
    assert!(!Value::nil().is_truthy());
    assert!(Value::cons(Value::int(1), Value::nil()).is_truthy());
}

#[test]
fn atoms_and_literals() {
    assert!(Value::int(1).is_atom());
    assert!(!Value::nil().is_atom());
    let closure = Value::closure(vec![Value::Op(Opcode::Rtn)].into(), Environment::new());
    assert!(closure.is_atom());

    assert!(Value::nil().is_literal());
    assert!(Value::string("s").is_literal());
    assert!(!closure.is_literal());
    assert!(!Value::Op(Opcode::Add).is_literal());
    assert!(!Value::code(vec![]).is_literal());
}

#[test]
fn numeric_equality_crosses_int_and_float() {
    assert_eq!(Value::int(1), Value::float(1.0));
    assert_ne!(Value::int(1), Value::float(1.5));
    assert_ne!(Value::int(1), Value::Bool(true));
}

#[test]
fn list_equality_is_structural() {
    let a = Value::cons(Value::int(3), Value::cons(Value::int(2), Value::nil()));
    let b = Value::list(vec![
        Value::int(3),
        Value::list(vec![Value::int(2), Value::list(vec![])]),
    ]);
    assert_eq!(a, b);
}

#[test]
fn closure_equality_uses_frame_identity() {
    let code: Code = vec![Value::Op(Opcode::Ld), Value::int(0), Value::int(0)].into();
    let env = Environment::from_frames(vec![Frame::new(vec![Value::int(1)])]);
    let other_env = Environment::from_frames(vec![Frame::new(vec![Value::int(1)])]);

    let a = Value::closure(code.clone(), env.clone());
    assert_eq!(a, Value::closure(code.clone(), env));
    assert_ne!(a, Value::closure(code, other_env));
}

#[test]
fn display_forms() {
    assert_eq!(Value::int(-4).to_string(), "-4");
    assert_eq!(Value::float(2.0).to_string(), "2.0");
    assert_eq!(Value::string("a\"b\n").to_string(), r#""a\"b\n""#);
    assert_eq!(
        Value::cons(Value::int(1), Value::nil()).to_string(),
        "[1, []]"
    );
    assert_eq!(
        Value::code(vec![Value::Op(Opcode::Ldc), Value::int(10)]).to_string(),
        "(LDC 10)"
    );
    let closure = Value::closure(
        vec![Value::Op(Opcode::Rtn)].into(),
        Environment::from_frames(vec![Frame::placeholder()]),
    );
    assert_eq!(closure.to_string(), "<closure (RTN) env=1>");
}

#[test]
fn recursive_closure_prints_without_looping() {
    let mut env = Environment::new();
    env.push_placeholder();
    let closure = Value::closure(vec![Value::Op(Opcode::Rtn)].into(), env.clone());
    assert!(env.frames()[0].fill(vec![closure.clone()]).is_ok());

    assert_eq!(closure.to_string(), "<closure (RTN) env=1>");
    assert!(format!("{closure:?}").contains("frames: 1"));
    assert_eq!(closure, closure.clone());
}
