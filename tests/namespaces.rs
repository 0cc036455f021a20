use formulet::{EvalError, Expression, TypeRef, Value};

#[test]
fn namespace_qualified_function_dispatch() {
    // Neither "System" nor "System.Math" resolves to an object, so the path
    // accumulates and the call dispatches under its qualified name.
    let mut expr = Expression::new("System.Math.Abs(-1)")
        .with_objects(|_| None)
        .with_functions(|name, args, ctx| {
            if name == "System.Math.Abs" {
                let value = args.parameters()[0].evaluate(ctx)?;
                match value {
                    Value::Int(v) => args.set_result(v.abs()),
                    other => return Err(EvalError::host(format!("Abs on {}", other.kind()))),
                }
            }
            Ok(())
        });
    assert_eq!(expr.evaluate(None).unwrap(), Value::Int(1));
}

fn math_type() -> TypeRef {
    TypeRef::builder("System.Math")
        .field("PI", std::f64::consts::PI)
        .method("Abs", 1, |args| match args {
            [Value::Int(v)] => Ok(Value::Int(v.abs())),
            [Value::Float(v)] => Ok(Value::Float(v.abs())),
            _ => Err(EvalError::host("Abs expects one number")),
        })
        .build()
}

#[test]
fn static_field_through_type_resolution() {
    let math = math_type();
    let mut expr = Expression::new("System.Math.PI")
        .with_objects(move |name| (name == "System.Math").then(|| Value::TypeRef(math.clone())));
    assert_eq!(
        expr.evaluate(None).unwrap(),
        Value::Float(std::f64::consts::PI)
    );
}

#[test]
fn static_method_through_type_resolution() {
    let math = math_type();
    let mut expr = Expression::new("System.Math.Abs(-1)")
        .with_objects(move |name| (name == "System.Math").then(|| Value::TypeRef(math.clone())));
    assert_eq!(expr.evaluate(None).unwrap(), Value::Int(1));
}

#[test]
fn missing_static_member_names_the_type() {
    let math = math_type();
    let mut expr = Expression::new("System.Math.Tau")
        .with_objects(move |name| (name == "System.Math").then(|| Value::TypeRef(math.clone())));
    match expr.evaluate(None).unwrap_err() {
        EvalError::MemberNotFound { name, target } => {
            assert_eq!(name, "Tau");
            assert_eq!(target, "type System.Math");
        }
        other => panic!("expected MemberNotFound, got {other:?}"),
    }
}

#[test]
fn unresolved_dotted_path_evaluates_to_itself() {
    let mut expr = Expression::new("Config.Network.Timeout").with_objects(|_| None);
    assert_eq!(
        expr.evaluate(None).unwrap(),
        Value::String("Config.Network.Timeout".to_owned())
    );
}

#[test]
fn indexer_segment_on_open_path_is_a_namespace_error() {
    // `a.b[0]` with `a` unresolved: an indexer can never terminate a
    // namespace path.
    let mut expr = Expression::new("a.b[0]").with_objects(|_| None);
    assert!(matches!(
        expr.evaluate(None).unwrap_err(),
        EvalError::UnresolvedNamespace { .. }
    ));
}

#[test]
fn resolved_identifier_still_reports_its_name() {
    // A resolver hit clears the namespace flag, but the observed value of a
    // bare identifier remains the name string.
    let mut expr = Expression::new("conn")
        .with_objects(|name| (name == "conn").then(|| Value::Int(99)));
    assert_eq!(expr.evaluate(None).unwrap(), Value::String("conn".to_owned()));
}

#[test]
fn member_on_resolved_identifier_fails_structurally() {
    // The flag is cleared on a hit, so the member lookup proceeds against
    // the bare name string and fails: the resolved value is not substituted.
    let mut expr = Expression::new("conn.Host")
        .with_objects(|name| (name == "conn").then(|| Value::Int(99)));
    match expr.evaluate(None).unwrap_err() {
        EvalError::MemberNotFound { name, target } => {
            assert_eq!(name, "Host");
            assert_eq!(target, "string");
        }
        other => panic!("expected MemberNotFound, got {other:?}"),
    }
}

#[test]
fn bound_parameter_wins_over_namespace_probing() {
    let obj = formulet::HostObject::builder().field("Host", "db.local").build();
    let mut expr = Expression::new("conn.Host")
        .with_parameter("conn", Value::Object(obj))
        .with_objects(|_| None);
    assert_eq!(
        expr.evaluate(None).unwrap(),
        Value::String("db.local".to_owned())
    );
}

#[test]
fn two_level_probe_resolves_at_the_second_segment() {
    // "Sys" misses, "Sys.Env" hits an object; the trailing identifier then
    // resolves as a member of that object.
    let env = formulet::HostObject::builder().field("User", "alice").build();
    let mut expr = Expression::new("Sys.Env.User")
        .with_objects(move |name| (name == "Sys.Env").then(|| Value::Object(env.clone())));
    assert_eq!(
        expr.evaluate(None).unwrap(),
        Value::String("alice".to_owned())
    );
}
