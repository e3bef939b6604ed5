//! Core history and access-control types.
//!
//! This module contains the pure pieces every handle is built from:
//! - The `State` trait describing wrapped values
//! - Bounded undo/redo `History`
//! - The single-use `AccessGuard`
//!
//! History operations return new values instead of mutating in place,
//! following the "pure core, imperative shell" split.

mod guard;
mod history;
mod state;

pub use guard::{AccessGuard, Binding, Claim, Locking};
pub use history::{History, HistoryError, HistoryLimit, Steps};
pub use state::State;
