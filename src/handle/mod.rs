//! Fluent handles: the public surface built from an operation table.
//!
//! # Key Concepts
//!
//! - **Handle**: exposes mutators, accessors, getters, constants and
//!   `undo`/`redo` through one dispatcher
//! - **Mutability**: immutable handles hand back a new instance per
//!   transition; mutable ones update in place or alias a shared record
//! - **Locking**: under `LockAfterUse`, an immutable handle refuses every
//!   operation once it has served one
//! - **Operation**: a member detached from its handle, subject to the
//!   binding rules
//!
//! # Aliasing
//!
//! In `MutateInPlace` mode every mutator returns the very instance it was
//! called on. In `SharedMutableRecord` mode each call returns a new
//! instance, but all instances of the family read and write one history
//! record, so an update through any of them is visible through all.

mod instance;
mod operation;

pub use instance::Handle;
pub use operation::Operation;

use crate::core::State;
use serde_json::Value;

/// Result of a dispatched call.
#[derive(Debug)]
pub enum Output<S: State> {
    /// Successor handle from a mutator, `undo` or `redo`.
    Handle(Handle<S>),
    /// State produced by a detached mutator call.
    State(S),
    /// Value of an accessor, getter or constant.
    Value(Value),
}

impl<S: State> Output<S> {
    pub fn into_handle(self) -> Option<Handle<S>> {
        match self {
            Output::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn into_state(self) -> Option<S> {
        match self {
            Output::State(state) => Some(state),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Output::Value(value) => Some(value),
            _ => None,
        }
    }
}
