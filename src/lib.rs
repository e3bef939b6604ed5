//! Retrace: fluent, history-aware handles over plain state values
//!
//! Retrace wraps a state value in a [`Handle`] exposing chainable mutators,
//! read-only accessors, computed getters and constants. Every handle keeps a
//! bounded undo/redo log and enforces the configured usage rules.
//!
//! # Core Concepts
//!
//! - **State**: any value implementing the [`State`] merge contract
//! - **Producer**: the pluggable strategy applying a mutation
//! - **History**: bounded `past`/`future` around the present state
//! - **Guard**: single-use locking of superseded handles
//!
//! # Example
//!
//! ```rust
//! use retrace::builder::HandleBuilder;
//! use retrace::core::{HistoryLimit, Steps};
//! use retrace::descriptor::arg;
//! use retrace::fluent_state;
//! use retrace::producer::Outcome;
//! use serde_json::{json, Value};
//!
//! fluent_state! {
//!     pub struct Counter {
//!         pub value: i64,
//!     }
//!     patch: CounterPatch
//! }
//!
//! let counter = HandleBuilder::new(Counter { value: 0 })
//!     .history(HistoryLimit::Limited(3))
//!     .mutator("add", |state: &mut Counter, args: &[Value]| {
//!         let amount: i64 = arg(args, 0)?;
//!         Ok(Outcome::Merge(CounterPatch { value: Some(state.value + amount) }))
//!     })
//!     .getter("value", |state: &Counter| json!(state.value))
//!     .build()
//!     .unwrap();
//!
//! let mut five = counter;
//! for _ in 0..5 {
//!     five = five.mutate("add", &[json!(1)])?;
//! }
//!
//! // Only three past states are retained.
//! let rewound = five.undo(Steps::All)?;
//! assert_eq!(rewound.get("value")?, json!(2));
//! assert_eq!(rewound.redo(Steps::Count(2))?.get("value")?, json!(4));
//! # Ok::<(), retrace::FluentError>(())
//! ```

pub mod builder;
pub mod core;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod producer;

// Re-export commonly used types
pub use builder::{BuildError, HandleBuilder, Mutability, Options};
pub use core::{Binding, HistoryLimit, Locking, State, Steps};
pub use error::{ErrorCode, FluentError, OperationError};
pub use handle::{Handle, Operation, Output};
pub use producer::{Draft, Outcome, Producer, ShallowMerge};
