use formulet::{Expression, Options, Value};

fn main() {
    // Plain arithmetic
    let mut expr = Expression::new("2 + 2 * 2");
    println!("2 + 2 * 2 = {}", expr.evaluate(None).unwrap());

    // Parameters rebind between evaluations
    let mut priced = Expression::new("price * qty * (1 - discount)")
        .with_parameter("price", 9.5)
        .with_parameter("qty", 3_i64)
        .with_parameter("discount", 0.1);
    println!("order total = {}", priced.evaluate(None).unwrap());

    priced.set_parameter("qty", 10_i64);
    println!("bigger order = {}", priced.evaluate(None).unwrap());

    // Broadcast mode: one pass per element of the list parameters
    let mut sums = Expression::new("a + b")
        .with_options(Options::new().iterate_parameters())
        .with_parameter("a", vec![1_i64, 2, 3])
        .with_parameter("b", vec![10_i64, 20, 30]);
    match sums.evaluate(None).unwrap() {
        Value::List(items) => println!("broadcast sums = {items:?}"),
        other => println!("unexpected result: {other:?}"),
    }

    // Syntax checking without propagation
    let mut broken = Expression::new("1 +");
    if broken.has_errors() {
        println!("as expected, '1 +' fails: {}", broken.error().unwrap());
    }
}
