use formulet::{DynamicAccess, EvalError, Expression, HostObject, TypeRef, Value};

/// A late-bound object that answers any member with its own name.
struct Echo;

impl DynamicAccess for Echo {
    fn try_get_member(&self, name: &str) -> Option<Value> {
        Some(Value::String(name.to_owned()))
    }

    fn try_get_index(&self, index: &Value) -> Option<Value> {
        Some(index.clone())
    }
}

fn main() {
    // Host functions with lazily evaluated arguments
    let mut abs = Expression::new("Abs(-1)").with_functions(|name, args, ctx| {
        if name == "Abs" {
            let value = args.parameters()[0].evaluate(ctx)?;
            if let Value::Int(v) = value {
                args.set_result(v.abs());
            }
        }
        Ok(())
    });
    println!("Abs(-1) = {}", abs.evaluate(None).unwrap());

    // Structural members registered up front
    let point = HostObject::builder()
        .field("x", 3_i64)
        .field("y", 4_i64)
        .method("Norm", 0, |_| Ok(Value::Float(5.0)))
        .build();
    let mut members = Expression::new("P().x + P().y").with_functions(move |name, args, _| {
        if name == "P" {
            args.set_result(Value::Object(point.clone()));
        }
        Ok(())
    });
    println!("P().x + P().y = {}", members.evaluate(None).unwrap());

    // Late-bound members through the dynamic capability
    let mut dynamic = Expression::new("D().Anything").with_functions(|name, args, _| {
        if name == "D" {
            args.set_result(Value::Object(HostObject::from_dynamic(Echo)));
        }
        Ok(())
    });
    println!("D().Anything = {}", dynamic.evaluate(None).unwrap());

    // Namespace-qualified statics through the object resolver
    let math = TypeRef::builder("System.Math")
        .field("PI", std::f64::consts::PI)
        .method("Abs", 1, |args| match args {
            [Value::Int(v)] => Ok(Value::Int(v.abs())),
            _ => Err(EvalError::host("Abs expects one integer")),
        })
        .build();
    let mut pi = Expression::new("System.Math.PI")
        .with_objects(move |name| (name == "System.Math").then(|| Value::TypeRef(math.clone())));
    println!("System.Math.PI = {}", pi.evaluate(None).unwrap());
}
