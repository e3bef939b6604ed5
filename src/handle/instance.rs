//! Handle instances and the uniform dispatcher.

use super::operation::Operation;
use super::Output;
use crate::builder::{Mutability, Options};
use crate::core::{AccessGuard, History, State, Steps};
use crate::descriptor::{
    AccessorFn, ConstantKey, Descriptor, GetterFn, MemberKind, MutatorFn, OperationTable,
};
use crate::error::FluentError;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// History record, shared between handles in the mutable modes.
pub(crate) type Record<S> = Arc<Mutex<Arc<History<S>>>>;

/// Per-instance state behind a handle.
pub(crate) struct Slot<S: State> {
    pub(crate) table: Arc<OperationTable<S>>,
    record: Record<S>,
    guard: AccessGuard,
}

/// Fluent, history-aware handle over a state value.
///
/// Cloning a handle aliases the same instance: clones share the lock bit
/// and, in the mutable modes, the history record.
pub struct Handle<S: State> {
    slot: Arc<Slot<S>>,
}

impl<S: State> Clone for Handle<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: State> Handle<S> {
    pub(crate) fn root(table: Arc<OperationTable<S>>, history: History<S>) -> Self {
        let record = Arc::new(Mutex::new(Arc::new(history)));
        Self::with_record(table, record)
    }

    fn with_record(table: Arc<OperationTable<S>>, record: Record<S>) -> Self {
        let guard = if table.options().mode.is_mutable() {
            AccessGuard::unlocked()
        } else {
            AccessGuard::new(table.options().locking)
        };
        Self {
            slot: Arc::new(Slot {
                table,
                record,
                guard,
            }),
        }
    }

    pub(crate) fn from_slot(slot: Arc<Slot<S>>) -> Self {
        Self { slot }
    }

    pub(crate) fn slot(&self) -> &Arc<Slot<S>> {
        &self.slot
    }

    /// Whether two handles are the same instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.slot, &b.slot)
    }

    /// Invoke any member by name.
    ///
    /// Mutators, `undo` and `redo` return [`Output::Handle`]; accessors,
    /// getters and constants return [`Output::Value`]. `undo`/`redo` read
    /// their step count from the first argument, defaulting to one.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Output<S>, FluentError> {
        match self.slot.table.lookup(name)? {
            Descriptor::Mutator(mutator) => self.apply(name, mutator, args).map(Output::Handle),
            Descriptor::Accessor(accessor) => self.read(name, accessor, args).map(Output::Value),
            Descriptor::Getter(getter) => self.compute(name, getter).map(Output::Value),
            Descriptor::Constant(value) => Ok(Output::Value(value.clone())),
            Descriptor::Undo => self.undo(self.steps(args)?).map(Output::Handle),
            Descriptor::Redo => self.redo(self.steps(args)?).map(Output::Handle),
        }
    }

    /// Invoke a mutator, `undo` or `redo` by name.
    pub fn mutate(&self, name: &str, args: &[Value]) -> Result<Handle<S>, FluentError> {
        match self.slot.table.lookup(name)? {
            Descriptor::Mutator(mutator) => self.apply(name, mutator, args),
            Descriptor::Undo => self.undo(self.steps(args)?),
            Descriptor::Redo => self.redo(self.steps(args)?),
            other => Err(wrong_kind(name, MemberKind::Mutator, other.kind())),
        }
    }

    /// Invoke an accessor by name.
    pub fn access(&self, name: &str, args: &[Value]) -> Result<Value, FluentError> {
        match self.slot.table.lookup(name)? {
            Descriptor::Accessor(accessor) => self.read(name, accessor, args),
            other => Err(wrong_kind(name, MemberKind::Accessor, other.kind())),
        }
    }

    /// Read a getter or a named constant.
    pub fn get(&self, name: &str) -> Result<Value, FluentError> {
        match self.slot.table.lookup(name)? {
            Descriptor::Getter(getter) => self.compute(name, getter),
            Descriptor::Constant(value) => Ok(value.clone()),
            other => Err(wrong_kind(name, MemberKind::Getter, other.kind())),
        }
    }

    /// Constant under a name or symbol. Constants stay readable on locked
    /// handles.
    pub fn constant(&self, key: impl Into<ConstantKey>) -> Option<Value> {
        self.slot.table.constant(&key.into()).cloned()
    }

    /// Step back through history.
    pub fn undo(&self, steps: Steps) -> Result<Handle<S>, FluentError> {
        self.transition("undo", |history| Ok(history.undo(steps)?))
    }

    /// Step forward through undone history.
    pub fn redo(&self, steps: Steps) -> Result<Handle<S>, FluentError> {
        self.transition("redo", |history| Ok(history.redo(steps)?))
    }

    /// Copy of the present state.
    pub fn state(&self) -> Result<S, FluentError> {
        self.slot.guard.check()?;
        Ok(self.history().present().clone())
    }

    pub fn undo_depth(&self) -> usize {
        self.history().undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history().redo_depth()
    }

    pub fn is_locked(&self) -> bool {
        self.slot.guard.is_locked()
    }

    pub fn options(&self) -> &Options {
        self.slot.table.options()
    }

    pub fn has(&self, name: &str) -> bool {
        self.slot.table.kind(name).is_some()
    }

    pub fn kind(&self, name: &str) -> Option<MemberKind> {
        self.slot.table.kind(name)
    }

    /// Named members in name order, including `undo` and `redo`.
    pub fn members(&self) -> impl Iterator<Item = (&str, MemberKind)> + '_ {
        self.slot.table.members()
    }

    /// Detach a member from this handle.
    ///
    /// The returned [`Operation`] keeps a weak reference to this instance.
    pub fn operation(&self, name: &str) -> Result<Operation<S>, FluentError> {
        let kind = self.slot.table.lookup(name)?.kind();
        Ok(Operation::new(name, kind, self))
    }

    fn history(&self) -> Arc<History<S>> {
        Arc::clone(&self.lock_record())
    }

    fn lock_record(&self) -> MutexGuard<'_, Arc<History<S>>> {
        self.slot
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Step count argument of `undo`/`redo`. A locked handle reports
    /// `Locked` before the argument is parsed.
    fn steps(&self, args: &[Value]) -> Result<Steps, FluentError> {
        self.slot.guard.check()?;
        Ok(Steps::from_value(args.first())?)
    }

    fn apply(
        &self,
        name: &str,
        mutator: &MutatorFn<S>,
        args: &[Value],
    ) -> Result<Handle<S>, FluentError> {
        let producer = self.slot.table.producer();
        self.transition(name, |history| {
            let next = producer
                .produce(history.present(), &mut |draft: &mut S| mutator(draft, args))
                .map_err(|source| FluentError::MutatorFailure {
                    member: name.to_string(),
                    source,
                })?;
            Ok(history.record(next))
        })
    }

    fn read(
        &self,
        name: &str,
        accessor: &AccessorFn<S>,
        args: &[Value],
    ) -> Result<Value, FluentError> {
        let claim = self.slot.guard.claim()?;
        let history = self.history();
        let value = accessor(history.present(), args).map_err(|source| {
            FluentError::AccessorFailure {
                member: name.to_string(),
                source,
            }
        })?;
        trace!(member = name, "Read accessor");
        if claim.commit() {
            debug!(member = name, "Handle locked");
        }
        Ok(value)
    }

    fn compute(&self, name: &str, getter: &GetterFn<S>) -> Result<Value, FluentError> {
        self.slot.guard.check()?;
        let history = self.history();
        trace!(member = name, "Read getter");
        Ok(getter(history.present()))
    }

    /// Run one history step and hand the result back according to the
    /// mutability mode.
    ///
    /// An immutable handle holds its claim across the step. The mutable
    /// modes share a record: the step runs against a snapshot and is swapped
    /// in only if the record still holds that snapshot, otherwise it is
    /// recomputed from the newer one.
    fn transition<F>(&self, member: &str, step: F) -> Result<Handle<S>, FluentError>
    where
        F: Fn(&History<S>) -> Result<History<S>, FluentError>,
    {
        let table = Arc::clone(&self.slot.table);
        let mode = table.options().mode;

        if !mode.is_mutable() {
            let claim = self.slot.guard.claim()?;
            let next = step(&self.history())?;
            advanced(member, &next);
            if claim.commit() {
                debug!(member, "Handle locked");
            }
            return Ok(Handle::root(table, next));
        }

        loop {
            let snapshot = self.history();
            let next = step(&snapshot)?;
            let mut record = self.lock_record();
            if !Arc::ptr_eq(&*record, &snapshot) {
                trace!(member, "Record replaced concurrently, retrying");
                continue;
            }
            advanced(member, &next);
            *record = Arc::new(next);
            drop(record);

            return Ok(if mode == Mutability::MutateInPlace {
                self.clone()
            } else {
                Handle::with_record(table, Arc::clone(&self.slot.record))
            });
        }
    }
}

fn advanced<S: State>(member: &str, history: &History<S>) {
    debug!(
        member,
        undo_depth = history.undo_depth(),
        redo_depth = history.redo_depth(),
        "Advanced handle"
    );
}

fn wrong_kind(name: &str, expected: MemberKind, found: MemberKind) -> FluentError {
    FluentError::WrongMemberKind {
        member: name.to_string(),
        expected,
        found,
    }
}

impl<S: State> fmt::Debug for Handle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history = self.history();
        f.debug_struct("Handle")
            .field("present", history.present())
            .field("undo_depth", &history.undo_depth())
            .field("redo_depth", &history.redo_depth())
            .field("locked", &self.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HandleBuilder;
    use crate::core::{HistoryLimit, Locking};
    use crate::descriptor::arg;
    use crate::error::{ErrorCode, OperationError};
    use crate::producer::Outcome;
    use serde_json::json;

    fn add(state: &mut Value, args: &[Value]) -> Result<Outcome<Value>, OperationError> {
        let amount: f64 = arg(args, 0)?;
        let value = state["value"].as_f64().unwrap_or_default() + amount;
        Ok(Outcome::json(json!({ "value": value })))
    }

    fn divide(state: &mut Value, args: &[Value]) -> Result<Outcome<Value>, OperationError> {
        let by: f64 = arg(args, 0)?;
        if by == 0.0 {
            return Err("division by zero".into());
        }
        let value = state["value"].as_f64().unwrap_or_default() / by;
        Ok(Outcome::json(json!({ "value": value })))
    }

    fn unwrap(state: &Value, _: &[Value]) -> Result<Value, OperationError> {
        Ok(state["value"].clone())
    }

    fn builder() -> HandleBuilder<Value> {
        HandleBuilder::new(json!({ "value": 0.0 }))
            .history(HistoryLimit::Limited(3))
            .mutator("add", add)
            .mutator("divide", divide)
            .accessor("unwrap", unwrap)
            .getter("value", |state: &Value| state["value"].clone())
            .constant("kind", "calculator")
    }

    #[test]
    fn lifecycle_chains_mutators() {
        let handle = builder().build().unwrap();
        let result = (0..5)
            .try_fold(handle, |handle, _| handle.mutate("add", &[json!(1)]))
            .and_then(|handle| handle.access("unwrap", &[]))
            .unwrap();
        assert_eq!(result, json!(5.0));
    }

    #[test]
    fn call_dispatches_every_kind() {
        let handle = builder().build().unwrap();

        let next = handle.call("add", &[json!(2)]).unwrap().into_handle().unwrap();
        assert_eq!(next.call("unwrap", &[]).unwrap().into_value(), Some(json!(2.0)));
        assert_eq!(next.call("value", &[]).unwrap().into_value(), Some(json!(2.0)));
        assert_eq!(next.call("kind", &[]).unwrap().into_value(), Some(json!("calculator")));

        let back = next.call("undo", &[]).unwrap().into_handle().unwrap();
        assert_eq!(back.get("value").unwrap(), json!(0.0));
        let forward = back.call("redo", &[json!(1)]).unwrap().into_handle().unwrap();
        assert_eq!(forward.get("value").unwrap(), json!(2.0));
    }

    #[test]
    fn typed_shortcuts_check_member_kind() {
        let handle = builder().build().unwrap();

        let err = handle.mutate("unwrap", &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WrongMemberKind);
        let err = handle.access("add", &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WrongMemberKind);
        let err = handle.get("add").unwrap_err();
        assert_eq!(err.code(), ErrorCode::WrongMemberKind);
        let err = handle.call("missing", &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownMember);
    }

    #[test]
    fn get_reads_named_constants() {
        let handle = builder().build().unwrap();
        assert_eq!(handle.get("kind").unwrap(), json!("calculator"));
        assert_eq!(handle.constant("kind"), Some(json!("calculator")));
    }

    #[test]
    fn mutator_failure_leaves_handle_usable() {
        let handle = builder()
            .locking(Locking::LockAfterUse)
            .build()
            .unwrap()
            .mutate("add", &[json!(4)])
            .unwrap();

        let err = handle.mutate("divide", &[json!(0)]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MutatorFailure);
        assert!(!handle.is_locked());
        assert_eq!(handle.get("value").unwrap(), json!(4.0));

        let halved = handle.mutate("divide", &[json!(2)]).unwrap();
        assert_eq!(halved.get("value").unwrap(), json!(2.0));
    }

    #[test]
    fn invalid_step_argument_is_rejected() {
        let handle = builder().build().unwrap();
        for bad in [json!(null), json!(-1), json!(1.1), json!("many")] {
            let err = handle.call("undo", &[bad.clone()]).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidStepCount);
            let err = handle.call("redo", &[bad]).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidStepCount);
        }
    }

    #[test]
    fn depth_tracking() {
        let handle = builder().build().unwrap();
        let next = handle.mutate("add", &[json!(1)]).unwrap();
        assert_eq!(handle.undo_depth(), 0);
        assert_eq!(next.undo_depth(), 1);
        let back = next.undo(Steps::Count(1)).unwrap();
        assert_eq!(back.undo_depth(), 0);
        assert_eq!(back.redo_depth(), 1);
    }

    #[test]
    fn debug_output_shows_present() {
        let handle = builder().build().unwrap();
        let text = format!("{handle:?}");
        assert!(text.contains("undo_depth: 0"));
        assert!(text.contains("locked: false"));
    }
}
