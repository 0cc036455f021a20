use formulet::{EvalError, Expression, Value};

fn eval(src: &str) -> Value {
    Expression::new(src)
        .evaluate(None)
        .unwrap_or_else(|e| panic!("evaluation failed for {src:?}: {e}"))
}

#[test]
fn evaluate_operator_table() {
    let cases: &[(&str, Value)] = &[
        ("2 * 3", Value::Int(6)),
        ("6 / 2", Value::Float(3.0)),
        ("7 % 2", Value::Int(1)),
        ("2 + 3", Value::Int(5)),
        ("2 - 1", Value::Int(1)),
        ("1 < 2", Value::Bool(true)),
        ("1 > 2", Value::Bool(false)),
        ("1 <= 2", Value::Bool(true)),
        ("1 <= 1", Value::Bool(true)),
        ("1 >= 2", Value::Bool(false)),
        ("1 >= 1", Value::Bool(true)),
        ("1 = 1", Value::Bool(true)),
        ("1 == 1", Value::Bool(true)),
        ("1 != 1", Value::Bool(false)),
        ("1 <> 1", Value::Bool(false)),
        ("1 & 1", Value::Int(1)),
        ("1 | 1", Value::Int(1)),
        ("1 ^ 1", Value::Int(0)),
        ("~1", Value::Int(!1)),
        ("2 >> 1", Value::Int(1)),
        ("2 << 1", Value::Int(4)),
    ];
    for (src, expected) in cases {
        assert_eq!(&eval(src), expected, "failed for {src}");
    }
}

#[test]
fn operator_priority() {
    assert_eq!(eval("2+2+2+2"), Value::Int(8));
    assert_eq!(eval("2*2*2*2"), Value::Int(16));
    assert_eq!(eval("2*2+2"), Value::Int(6));
    assert_eq!(eval("2+2*2"), Value::Int(6));

    assert_eq!(eval("1 + 2 + 3 * 4 / 2"), Value::Float(9.0));
    assert_eq!(eval("18/2/2*3"), Value::Float(13.5));
}

#[test]
fn division_always_floats_integers() {
    assert_eq!(eval("6 / 2"), Value::Float(3.0));
    assert_eq!(eval("1 / 0"), Value::Float(f64::INFINITY));
}

#[test]
fn modulo_by_zero_raises_operator_error() {
    let err = Expression::new("7 % 0").evaluate(None).unwrap_err();
    assert!(matches!(err, EvalError::Operator { .. }), "got {err:?}");
}

#[test]
fn and_short_circuits_past_faulting_right_side() {
    // The right side would raise if evaluated; the falsy left prevents that.
    assert_eq!(eval("1 > 2 && 7 % 0 = 1"), Value::Bool(false));
    assert_eq!(eval("1 > 2 and 7 % 0 = 1"), Value::Bool(false));
}

#[test]
fn or_short_circuits_past_faulting_right_side() {
    assert_eq!(eval("1 < 2 || 7 % 0 = 1"), Value::Bool(true));
    assert_eq!(eval("1 < 2 or 7 % 0 = 1"), Value::Bool(true));
}

#[test]
fn non_short_circuited_fault_still_surfaces() {
    let err = Expression::new("1 < 2 && 7 % 0 = 1").evaluate(None).unwrap_err();
    assert!(matches!(err, EvalError::Operator { .. }));
}

#[test]
fn ternary_takes_else_branch() {
    assert_eq!(eval("1+2<3 ? 3+4 : 1"), Value::Int(1));
}

#[test]
fn ternary_never_visits_untaken_branch() {
    // Condition is false, so the faulting consequent is never evaluated.
    assert_eq!(eval("1+2<3 ? 7%0 : 1"), Value::Int(1));
    // Condition is true, so the faulting alternative is never evaluated.
    assert_eq!(eval("1+2<4 ? 3+4 : 7%0"), Value::Int(7));
}

#[test]
fn string_concatenation_and_comparison() {
    assert_eq!(eval("'foo' + 'bar'"), Value::String("foobar".to_owned()));
    assert_eq!(eval("'a' + 1"), Value::String("a1".to_owned()));
    assert_eq!(eval("'1' = 1"), Value::Bool(true));
    assert_eq!(eval("'apple' < 'banana'"), Value::Bool(true));
}

#[test]
fn mixed_numeric_comparison() {
    assert_eq!(eval("1 = 1.0"), Value::Bool(true));
    assert_eq!(eval("1 < 1.5"), Value::Bool(true));
    assert_eq!(eval("2.5 >= 2"), Value::Bool(true));
}

#[test]
fn unary_negation() {
    assert_eq!(eval("-1"), Value::Int(-1));
    assert_eq!(eval("-(1 + 2)"), Value::Int(-3));
    assert_eq!(eval("-1.5"), Value::Float(-1.5));
    assert_eq!(eval("!(1 = 1)"), Value::Bool(false));
}

#[test]
fn adding_incompatible_kinds_fails() {
    let err = Expression::new("(1 = 1) + 2").evaluate(None).unwrap_err();
    assert!(matches!(err, EvalError::Operator { .. }));
}
