//! Draft Calculator
//!
//! This example swaps the default producer for [`Draft`], so mutators edit
//! the state in place and return `Outcome::Unchanged`.
//!
//! Key concepts:
//! - Typed state via `fluent_state!`
//! - Draft-style mutators
//! - In-place handles (`MutateInPlace`) keeping one identity
//!
//! Run with: cargo run --example draft_calculator

use retrace::core::{HistoryLimit, Steps};
use retrace::descriptor::arg;
use retrace::{fluent_state, Draft, FluentError, Handle, HandleBuilder, Mutability, Outcome};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fluent_state! {
    pub struct Calculator {
        pub value: f64,
        pub operations: u32,
    }
    patch: CalculatorPatch
}

fn calculator(mode: Mutability) -> Handle<Calculator> {
    HandleBuilder::new(Calculator {
        value: 0.0,
        operations: 0,
    })
    .history(HistoryLimit::Limited(8))
    .mode(mode)
    .producer(Draft)
    .mutator("add", |draft: &mut Calculator, args: &[Value]| {
        draft.value += arg::<f64>(args, 0)?;
        draft.operations += 1;
        Ok(Outcome::Unchanged)
    })
    .mutator("subtract", |draft: &mut Calculator, args: &[Value]| {
        draft.value -= arg::<f64>(args, 0)?;
        draft.operations += 1;
        Ok(Outcome::Unchanged)
    })
    .mutator("multiply", |draft: &mut Calculator, args: &[Value]| {
        draft.value *= arg::<f64>(args, 0)?;
        draft.operations += 1;
        Ok(Outcome::Unchanged)
    })
    .mutator("divide", |draft: &mut Calculator, args: &[Value]| {
        let by: f64 = arg(args, 0)?;
        if by == 0.0 {
            return Err("division by zero".into());
        }
        // Merge on top of the draft edits.
        Ok(Outcome::Merge(CalculatorPatch {
            value: Some(draft.value / by),
            operations: Some(draft.operations + 1),
        }))
    })
    .getter("value", |state: &Calculator| json!(state.value))
    .getter("operations", |state: &Calculator| json!(state.operations))
    .build()
    .expect("calculator members are valid")
}

fn main() -> Result<(), FluentError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Draft Calculator ===\n");

    let immutable = calculator(Mutability::Immutable);
    let result = immutable
        .mutate("add", &[json!(2)])?
        .mutate("subtract", &[json!(8)])?
        .mutate("multiply", &[json!(-1)])?
        .mutate("divide", &[json!(2)])?
        .undo(Steps::Count(2))?
        .redo(Steps::Count(1))?;
    println!(
        "Immutable chain: value = {}, operations = {}",
        result.get("value")?,
        result.get("operations")?
    );
    println!("Root is untouched: {:?}\n", immutable.state()?);

    let in_place = calculator(Mutability::MutateInPlace);
    for (name, operand) in [("add", 2), ("subtract", 8), ("multiply", -1), ("divide", 2)] {
        in_place.mutate(name, &[json!(operand)])?;
    }
    println!("In-place handle: {:?}", in_place.state()?);
    in_place.undo(Steps::All)?;
    println!(
        "After undo(all): {:?} (redo depth {})",
        in_place.state()?,
        in_place.redo_depth()
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
