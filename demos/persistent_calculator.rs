//! Persistent Calculator
//!
//! This example plugs a custom producer into the handle. The state is a
//! persistent register file shared through `Arc`, and every mutator hands
//! back the next state instead of editing a draft.
//!
//! Key concepts:
//! - Implementing `State` for a custom type
//! - A `Producer` implemented on a unit struct
//! - Structural sharing between history entries
//! - Lock-after-use handles
//!
//! Run with: cargo run --example persistent_calculator

use retrace::core::{HistoryLimit, Locking, State, Steps};
use retrace::descriptor::arg;
use retrace::producer::Recipe;
use retrace::{FluentError, HandleBuilder, OperationError, Outcome, Producer};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Named registers behind a shared pointer.
#[derive(Clone, Debug, Default)]
struct Registers(Arc<BTreeMap<String, f64>>);

impl Registers {
    fn read(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or_default()
    }

    fn with(&self, name: &str, value: f64) -> Self {
        let mut next = (*self.0).clone();
        next.insert(name.to_string(), value);
        Registers(Arc::new(next))
    }
}

impl State for Registers {
    type Patch = BTreeMap<String, f64>;

    fn merge(&mut self, patch: Self::Patch) {
        Arc::make_mut(&mut self.0).extend(patch);
    }
}

/// Ignores edits made to the scratch view. An unchanged outcome keeps
/// sharing the current map.
struct Persistent;

impl Producer<Registers> for Persistent {
    fn produce(
        &self,
        state: &Registers,
        recipe: Recipe<'_, Registers>,
    ) -> Result<Registers, OperationError> {
        let mut view = state.clone();
        match recipe(&mut view)? {
            Outcome::Unchanged => Ok(state.clone()),
            Outcome::Replace(next) => Ok(next),
            Outcome::Merge(patch) => {
                let mut next = state.clone();
                next.merge(patch);
                Ok(next)
            }
        }
    }
}

fn register(args: &[Value]) -> Result<String, OperationError> {
    arg::<Option<String>>(args, 1).map(|name| name.unwrap_or_else(|| "acc".to_string()))
}

fn main() -> Result<(), FluentError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Persistent Calculator ===\n");

    let calculator = HandleBuilder::new(Registers::default())
        .history(HistoryLimit::from_f64(8.0)?)
        .locking(Locking::LockAfterUse)
        .producer(Persistent)
        .mutator("add", |state: &mut Registers, args: &[Value]| {
            let name = register(args)?;
            let amount: f64 = arg(args, 0)?;
            Ok(Outcome::Replace(state.with(&name, state.read(&name) + amount)))
        })
        .mutator("multiply", |state: &mut Registers, args: &[Value]| {
            let name = register(args)?;
            let factor: f64 = arg(args, 0)?;
            Ok(Outcome::Merge(BTreeMap::from([(
                name.clone(),
                state.read(&name) * factor,
            )])))
        })
        .accessor("read", |state: &Registers, args: &[Value]| {
            let name: Option<String> = arg(args, 0)?;
            Ok(json!(state.read(name.as_deref().unwrap_or("acc"))))
        })
        .getter("acc", |state: &Registers| json!(state.read("acc")))
        .build()
        .expect("calculator members are valid");

    let first = calculator.mutate("add", &[json!(2)])?;
    let second = first.mutate("add", &[json!(-8)])?;
    let third = second.mutate("multiply", &[json!(-1)])?;
    let scratch = third.mutate("add", &[json!(5), json!("scratch")])?;

    match first.mutate("add", &[json!(1)]) {
        Err(err) => println!("Reusing a spent handle fails [{}]: {err}", err.code()),
        Ok(_) => println!("Reusing a spent handle unexpectedly succeeded"),
    }

    let rewound = scratch.undo(Steps::Count(2))?;
    // Getters read without spending the handle.
    println!("After undo(2): acc = {}", rewound.get("acc")?);
    let replayed = rewound.redo(Steps::All)?;
    println!("After redo(all): {:?}", replayed.state()?);
    println!(
        "Scratch register: {}",
        replayed.access("read", &[json!("scratch")])?
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
