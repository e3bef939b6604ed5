//! Pluggable strategies for applying a mutation to the present state.
//!
//! A mutator never builds the next state on its own. It describes the change
//! as an [`Outcome`] and the handle's [`Producer`] decides how that outcome
//! turns into the next state. Two producers ship with the crate:
//!
//! - [`ShallowMerge`] (default): only the returned outcome counts, and
//!   patches are merged onto a copy of the current state.
//! - [`Draft`]: the mutator edits a cloned draft in place, and returned
//!   outcomes are applied on top of the draft.
//!
//! Any `Fn(&S, Recipe<'_, S>) -> Result<S, OperationError>` closure is also a
//! producer, which is how persistent-structure updates plug in.

use crate::core::State;
use crate::error::OperationError;
use serde_json::Value;

/// What a mutator hands back to its producer.
#[derive(Debug)]
pub enum Outcome<S: State> {
    /// Nothing returned. Draft edits, if any, are all there is.
    Unchanged,
    /// Full replacement of the state.
    Replace(S),
    /// Partial patch to shallow-merge.
    Merge(S::Patch),
}

impl Outcome<Value> {
    /// Outcome for JSON states: objects merge, `null` leaves the state as
    /// is, anything else replaces it.
    pub fn json(value: Value) -> Self {
        match value {
            Value::Object(patch) => Outcome::Merge(patch),
            Value::Null => Outcome::Unchanged,
            other => Outcome::Replace(other),
        }
    }
}

/// Mutation closure passed to a producer.
pub type Recipe<'a, S> = &'a mut dyn FnMut(&mut S) -> Result<Outcome<S>, OperationError>;

/// Strategy defining how a mutation is applied.
///
/// For any recipe, `produce` must reflect exactly the changes the recipe
/// describes and no others. It must not mutate `state`.
pub trait Producer<S: State>: Send + Sync {
    fn produce(&self, state: &S, recipe: Recipe<'_, S>) -> Result<S, OperationError>;
}

impl<S, F> Producer<S> for F
where
    S: State,
    F: for<'a> Fn(&S, Recipe<'a, S>) -> Result<S, OperationError> + Send + Sync,
{
    fn produce(&self, state: &S, recipe: Recipe<'_, S>) -> Result<S, OperationError> {
        self(state, recipe)
    }
}

/// Default producer: shallow-merge the returned patch onto the current
/// state.
///
/// The recipe runs against a scratch copy whose edits are discarded.
///
/// ```rust
/// use retrace::producer::{Outcome, Producer, ShallowMerge};
/// use serde_json::{json, Value};
///
/// let state = json!({ "value": 1, "label": "one" });
/// let next = ShallowMerge
///     .produce(&state, &mut |draft: &mut Value| {
///         draft["label"] = json!("ignored");
///         Ok(Outcome::json(json!({ "value": 2 })))
///     })
///     .unwrap();
///
/// assert_eq!(next, json!({ "value": 2, "label": "one" }));
/// assert_eq!(state, json!({ "value": 1, "label": "one" }));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ShallowMerge;

impl<S: State> Producer<S> for ShallowMerge {
    fn produce(&self, state: &S, recipe: Recipe<'_, S>) -> Result<S, OperationError> {
        let mut scratch = state.clone();
        let next = match recipe(&mut scratch)? {
            Outcome::Unchanged => state.clone(),
            Outcome::Replace(next) => next,
            Outcome::Merge(patch) => {
                let mut next = state.clone();
                next.merge(patch);
                next
            }
        };
        Ok(next)
    }
}

/// Draft producer: the recipe edits a clone of the state in place.
///
/// A returned `Replace` wins over draft edits. A returned `Merge` is applied
/// on top of them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Draft;

impl<S: State> Producer<S> for Draft {
    fn produce(&self, state: &S, recipe: Recipe<'_, S>) -> Result<S, OperationError> {
        let mut draft = state.clone();
        match recipe(&mut draft)? {
            Outcome::Unchanged => Ok(draft),
            Outcome::Replace(next) => Ok(next),
            Outcome::Merge(patch) => {
                draft.merge(patch);
                Ok(draft)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn shallow_merge_applies_patch() {
        let state = json!({ "a": 1, "b": 2 });
        let next = ShallowMerge
            .produce(&state, &mut |_: &mut Value| {
                Ok(Outcome::Merge(patch(json!({ "b": 3 }))))
            })
            .unwrap();

        assert_eq!(next, json!({ "a": 1, "b": 3 }));
        assert_eq!(state, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn shallow_merge_ignores_draft_edits() {
        let state = json!({ "a": 1 });
        let next = ShallowMerge
            .produce(&state, &mut |draft: &mut Value| {
                draft["a"] = json!(99);
                Ok(Outcome::Unchanged)
            })
            .unwrap();

        assert_eq!(next, json!({ "a": 1 }));
    }

    #[test]
    fn shallow_merge_replace_wins() {
        let state = json!({ "a": 1 });
        let next = ShallowMerge
            .produce(&state, &mut |_: &mut Value| Ok(Outcome::Replace(json!({ "z": 0 }))))
            .unwrap();

        assert_eq!(next, json!({ "z": 0 }));
    }

    #[test]
    fn draft_keeps_in_place_edits() {
        let state = json!({ "value": 0 });
        let next = Draft
            .produce(&state, &mut |draft: &mut Value| {
                draft["value"] = json!(5);
                Ok(Outcome::Unchanged)
            })
            .unwrap();

        assert_eq!(next, json!({ "value": 5 }));
        assert_eq!(state, json!({ "value": 0 }));
    }

    #[test]
    fn draft_merges_on_top_of_edits() {
        let state = json!({ "a": 0, "b": 0 });
        let next = Draft
            .produce(&state, &mut |draft: &mut Value| {
                draft["a"] = json!(1);
                Ok(Outcome::Merge(patch(json!({ "b": 2 }))))
            })
            .unwrap();

        assert_eq!(next, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn json_outcome_shapes() {
        assert!(matches!(Outcome::json(json!({ "a": 1 })), Outcome::Merge(_)));
        assert!(matches!(Outcome::json(Value::Null), Outcome::Unchanged));
        assert!(matches!(Outcome::json(json!(3)), Outcome::Replace(v) if v == json!(3)));
    }

    #[test]
    fn recipe_errors_propagate() {
        let state = json!({});
        let result = Draft.produce(&state, &mut |_: &mut Value| Err("boom".into()));
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn closures_are_producers() {
        let replace_only =
            |state: &Value, recipe: Recipe<'_, Value>| -> Result<Value, OperationError> {
                let mut scratch = state.clone();
                match recipe(&mut scratch)? {
                    Outcome::Replace(next) => Ok(next),
                    _ => Ok(state.clone()),
                }
            };

        let state = json!(1);
        let next = replace_only
            .produce(&state, &mut |_: &mut Value| Ok(Outcome::Replace(json!(2))))
            .unwrap();
        assert_eq!(next, json!(2));
    }
}
