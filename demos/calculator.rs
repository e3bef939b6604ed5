//! Calculator Handle
//!
//! This example builds a fluent calculator over a JSON object state.
//!
//! Key concepts:
//! - Mutators returning shallow-merge patches
//! - Chained calls with bounded undo/redo
//! - Accessors, getters and symbol-keyed constants
//!
//! Run with: cargo run --example calculator

use retrace::core::{HistoryLimit, Steps};
use retrace::descriptor::{arg, Symbol};
use retrace::{FluentError, HandleBuilder, OperationError, Outcome};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn current(state: &Value) -> f64 {
    state["value"].as_f64().unwrap_or_default()
}

fn binary(
    apply: fn(f64, f64) -> Result<f64, OperationError>,
) -> impl Fn(&mut Value, &[Value]) -> Result<Outcome<Value>, OperationError> + Send + Sync {
    move |state: &mut Value, args: &[Value]| {
        let operand: f64 = arg(args, 0)?;
        let value = apply(current(state), operand)?;
        Ok(Outcome::json(json!({ "value": value })))
    }
}

fn main() -> Result<(), FluentError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Calculator Handle ===\n");

    let unit = Symbol::new("unit");
    let calculator = HandleBuilder::new(json!({ "value": 0.0 }))
        .history(HistoryLimit::Limited(8))
        .mutator("add", binary(|a, b| Ok(a + b)))
        .mutator("subtract", binary(|a, b| Ok(a - b)))
        .mutator("multiply", binary(|a, b| Ok(a * b)))
        .mutator(
            "divide",
            binary(|a, b| {
                if b == 0.0 {
                    Err("division by zero".into())
                } else {
                    Ok(a / b)
                }
            }),
        )
        .accessor("unwrap", |state: &Value, _: &[Value]| Ok(json!(current(state))))
        .getter("negated", |state: &Value| json!(-current(state)))
        .constant("name", "calculator")
        .constant(&unit, "scalar")
        .build()
        .expect("calculator members are valid");

    println!("Members:");
    for (name, kind) in calculator.members() {
        println!("  {name:<10} {kind}");
    }
    println!(
        "Constants: name = {}, {unit} = {}\n",
        calculator.get("name")?,
        calculator.constant(&unit).unwrap_or_default()
    );

    let computed = calculator
        .mutate("add", &[json!(2)])?
        .mutate("subtract", &[json!(8)])?
        .mutate("multiply", &[json!(-1)])?
        .mutate("divide", &[json!(2)])?;
    println!("((0 + 2 - 8) * -1) / 2 = {}", computed.access("unwrap", &[])?);
    println!("Negated getter: {}", computed.get("negated")?);
    println!("Undo depth: {}\n", computed.undo_depth());

    let rewound = computed.undo(Steps::Count(2))?;
    println!("After undo(2): {}", rewound.access("unwrap", &[])?);
    let replayed = rewound.redo(Steps::Count(1))?;
    println!("After redo(1): {}", replayed.access("unwrap", &[])?);

    match replayed.mutate("divide", &[json!(0)]) {
        Err(err) => println!("\nDivide by zero rejected [{}]: {err}", err.code()),
        Ok(_) => println!("\nDivide by zero unexpectedly succeeded"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
