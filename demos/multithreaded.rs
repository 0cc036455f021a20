use std::sync::Arc;
use std::thread;

use formulet::{CompileCache, Expression};

fn main() {
    let cache = Arc::new(CompileCache::new());

    // Pin one compiled copy so every thread reuses the same tree.
    let mut pinned = Expression::new("rate * hours + bonus").with_cache(Arc::clone(&cache));
    let pinned_ast = pinned.ast().unwrap();

    let mut handles = vec![];
    for worker in 0..4_i64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            let mut expr = Expression::new("rate * hours + bonus")
                .with_cache(cache)
                .with_parameter("rate", 25_i64)
                .with_parameter("hours", 8_i64)
                .with_parameter("bonus", worker * 10);
            expr.evaluate(None).unwrap()
        }));
    }

    for (worker, handle) in handles.into_iter().enumerate() {
        println!("worker {worker} pay: {}", handle.join().unwrap());
    }

    println!(
        "cache entries: {} (all threads shared {:p})",
        cache.len(),
        Arc::as_ptr(&pinned_ast)
    );
}
