//! Builder API for constructing fluent handles.
//!
//! This module provides the fluent [`HandleBuilder`], the serde-friendly
//! [`Options`] record and the [`fluent_state!`](crate::fluent_state) macro
//! for defining mergeable state structs with minimal boilerplate.

pub mod error;
pub mod handle;
pub mod macros;
pub mod options;

pub use error::BuildError;
pub use handle::HandleBuilder;
pub use options::{Mutability, Options};
