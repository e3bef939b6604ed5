//! Core State trait for values wrapped by a fluent handle.
//!
//! A state is a plain value that can be cloned into history and shallowly
//! merged with a partial patch. The merge is what the default producer uses
//! to apply a mutator's returned patch.

use serde_json::{Map, Value};
use std::fmt::Debug;

/// Trait for values held inside a handle.
///
/// # Required Traits
///
/// - `Clone`: every recorded version is an owned copy
/// - `Debug`: states must be debuggable for diagnostics
/// - `Send` + `Sync`: handles can move between threads
///
/// # Example
///
/// ```rust
/// use retrace::core::State;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Counter {
///     value: i64,
///     label: String,
/// }
///
/// #[derive(Default)]
/// struct CounterPatch {
///     value: Option<i64>,
///     label: Option<String>,
/// }
///
/// impl State for Counter {
///     type Patch = CounterPatch;
///
///     fn merge(&mut self, patch: CounterPatch) {
///         if let Some(value) = patch.value {
///             self.value = value;
///         }
///         if let Some(label) = patch.label {
///             self.label = label;
///         }
///     }
/// }
///
/// let mut counter = Counter { value: 1, label: "a".into() };
/// counter.merge(CounterPatch { value: Some(2), ..Default::default() });
/// assert_eq!(counter, Counter { value: 2, label: "a".into() });
/// ```
pub trait State: Clone + Debug + Send + Sync + 'static {
    /// Partial update accepted by [`State::merge`].
    type Patch;

    /// Shallow-merge a patch onto this state.
    ///
    /// Fields present in the patch overwrite the current ones, everything
    /// else is left as is.
    fn merge(&mut self, patch: Self::Patch);
}

/// JSON objects merge key by key. A non-object state is replaced by the
/// patch object.
impl State for Value {
    type Patch = Map<String, Value>;

    fn merge(&mut self, patch: Self::Patch) {
        match self {
            Value::Object(fields) => fields.extend(patch),
            other => *other = Value::Object(patch),
        }
    }
}
