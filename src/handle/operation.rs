//! Detached member references.

use super::instance::{Handle, Slot};
use super::Output;
use crate::core::State;
use crate::descriptor::{Descriptor, MemberKind, OperationTable};
use crate::error::FluentError;
use serde_json::Value;
use std::sync::{Arc, Weak};

/// A member taken off its handle.
///
/// The operation remembers its owning instance through a weak reference.
/// Under [`Binding::HardBound`](crate::core::Binding::HardBound) it only
/// runs on that owner; under `DetachAllowed` it can be rebound to any
/// handle or called as a free function over an explicit state.
pub struct Operation<S: State> {
    name: String,
    kind: MemberKind,
    owner: Weak<Slot<S>>,
    table: Arc<OperationTable<S>>,
}

impl<S: State> Operation<S> {
    pub(crate) fn new(name: &str, kind: MemberKind, owner: &Handle<S>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            owner: Arc::downgrade(owner.slot()),
            table: Arc::clone(&owner.slot().table),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Whether `handle` is the instance this operation was taken from.
    pub fn is_owned_by(&self, handle: &Handle<S>) -> bool {
        std::ptr::eq(self.owner.as_ptr(), Arc::as_ptr(handle.slot()))
    }

    /// Run on the owning handle. Fails with `Unbound` once it is dropped.
    pub fn call(&self, args: &[Value]) -> Result<Output<S>, FluentError> {
        let slot = self
            .owner
            .upgrade()
            .ok_or_else(|| FluentError::unbound(&self.name))?;
        Handle::from_slot(slot).call(&self.name, args)
    }

    /// Run on another handle.
    pub fn call_on(&self, handle: &Handle<S>, args: &[Value]) -> Result<Output<S>, FluentError> {
        if self.is_owned_by(handle) || self.table.options().binding.allows_detach() {
            handle.call(&self.name, args)
        } else {
            Err(FluentError::unbound(&self.name))
        }
    }

    /// Run as a free function over an explicit state.
    ///
    /// Mutators return [`Output::State`] with the produced state. `undo`
    /// and `redo` need a history and always fail with `Unbound`.
    pub fn call_detached(&self, state: &S, args: &[Value]) -> Result<Output<S>, FluentError> {
        if !self.table.options().binding.allows_detach() {
            return Err(FluentError::unbound(&self.name));
        }

        match self.table.lookup(&self.name)? {
            Descriptor::Mutator(mutator) => self
                .table
                .producer()
                .produce(state, &mut |draft: &mut S| mutator(draft, args))
                .map(Output::State)
                .map_err(|source| FluentError::MutatorFailure {
                    member: self.name.clone(),
                    source,
                }),
            Descriptor::Accessor(accessor) => accessor(state, args)
                .map(Output::Value)
                .map_err(|source| FluentError::AccessorFailure {
                    member: self.name.clone(),
                    source,
                }),
            Descriptor::Getter(getter) => Ok(Output::Value(getter(state))),
            Descriptor::Constant(value) => Ok(Output::Value(value.clone())),
            Descriptor::Undo | Descriptor::Redo => Err(FluentError::unbound(&self.name)),
        }
    }
}

impl<S: State> Clone for Operation<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            owner: Weak::clone(&self.owner),
            table: Arc::clone(&self.table),
        }
    }
}

impl<S: State> std::fmt::Debug for Operation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bound", &(self.owner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HandleBuilder;
    use crate::core::{Binding, HistoryLimit};
    use crate::error::{ErrorCode, OperationError};
    use crate::producer::Outcome;
    use serde_json::json;

    fn increment(state: &mut Value, _: &[Value]) -> Result<Outcome<Value>, OperationError> {
        let value = state["value"].as_i64().unwrap_or_default() + 1;
        Ok(Outcome::json(json!({ "value": value })))
    }

    fn builder(binding: Binding) -> HandleBuilder<Value> {
        HandleBuilder::new(json!({ "value": 0 }))
            .history(HistoryLimit::Limited(2))
            .binding(binding)
            .mutator("increment", increment)
            .accessor("unwrap", |state: &Value, _: &[Value]| Ok(state["value"].clone()))
            .getter("value", |state: &Value| state["value"].clone())
            .constant("answer", 42)
    }

    #[test]
    fn operation_reports_name_and_kind() {
        let handle = builder(Binding::HardBound).build().unwrap();
        let op = handle.operation("increment").unwrap();
        assert_eq!(op.name(), "increment");
        assert_eq!(op.kind(), MemberKind::Mutator);
        assert_eq!(handle.operation("undo").unwrap().name(), "undo");
        assert!(handle.operation("missing").is_err());
    }

    #[test]
    fn bound_call_runs_on_owner() {
        let handle = builder(Binding::HardBound).build().unwrap();
        let op = handle.operation("increment").unwrap();

        let next = op.call(&[]).unwrap().into_handle().unwrap();
        assert_eq!(next.get("value").unwrap(), json!(1));
    }

    #[test]
    fn dropped_owner_makes_call_unbound() {
        let op = {
            let handle = builder(Binding::DetachAllowed).build().unwrap();
            handle.operation("unwrap").unwrap()
        };

        let err = op.call(&[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unbound);
    }

    #[test]
    fn hard_bound_rejects_foreign_handles() {
        let first = builder(Binding::HardBound).build().unwrap();
        let second = first.mutate("increment", &[]).unwrap();
        let op = first.operation("unwrap").unwrap();

        assert!(op.is_owned_by(&first));
        assert!(!op.is_owned_by(&second));
        assert_eq!(op.call_on(&first, &[]).unwrap().into_value(), Some(json!(0)));
        let err = op.call_on(&second, &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unbound);
    }

    #[test]
    fn detach_allowed_rebinds() {
        let first = builder(Binding::DetachAllowed).build().unwrap();
        let second = first.mutate("increment", &[]).unwrap();
        let op = first.operation("unwrap").unwrap();

        assert_eq!(op.call_on(&second, &[]).unwrap().into_value(), Some(json!(1)));
    }

    #[test]
    fn hard_bound_rejects_detached_calls() {
        let handle = builder(Binding::HardBound).build().unwrap();
        let op = handle.operation("increment").unwrap();
        let err = op.call_detached(&json!({ "value": 10 }), &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unbound);
    }

    #[test]
    fn detached_calls_take_explicit_state() {
        let handle = builder(Binding::DetachAllowed).build().unwrap();
        let state = json!({ "value": 10 });

        let produced = handle
            .operation("increment")
            .unwrap()
            .call_detached(&state, &[])
            .unwrap()
            .into_state();
        assert_eq!(produced, Some(json!({ "value": 11 })));

        let read = handle.operation("unwrap").unwrap().call_detached(&state, &[]);
        assert_eq!(read.unwrap().into_value(), Some(json!(10)));
        let read = handle.operation("value").unwrap().call_detached(&state, &[]);
        assert_eq!(read.unwrap().into_value(), Some(json!(10)));
        let read = handle.operation("answer").unwrap().call_detached(&state, &[]);
        assert_eq!(read.unwrap().into_value(), Some(json!(42)));

        // Detached calls never touch the handle.
        assert_eq!(handle.get("value").unwrap(), json!(0));
        assert_eq!(handle.undo_depth(), 0);
    }

    #[test]
    fn detached_undo_is_unbound() {
        let handle = builder(Binding::DetachAllowed).build().unwrap();
        let state = json!({ "value": 1 });
        for name in ["undo", "redo"] {
            let err = handle
                .operation(name)
                .unwrap()
                .call_detached(&state, &[])
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::Unbound);
        }
    }
}
