//! Builder for constructing fluent handles.

use crate::builder::error::BuildError;
use crate::builder::options::{Mutability, Options};
use crate::core::{Binding, History, HistoryLimit, Locking, State};
use crate::descriptor::{ConstantKey, Descriptor, MemberKind, OperationTable};
use crate::error::OperationError;
use crate::handle::Handle;
use crate::producer::{Outcome, Producer, ShallowMerge};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

const RESERVED: [&str; 2] = ["undo", "redo"];

/// Builder for constructing handles with a fluent API.
///
/// # Example
///
/// ```rust
/// use retrace::builder::HandleBuilder;
/// use retrace::core::{HistoryLimit, Steps};
/// use retrace::descriptor::arg;
/// use retrace::producer::Outcome;
/// use serde_json::{json, Value};
///
/// let counter = HandleBuilder::new(json!({ "value": 0 }))
///     .history(HistoryLimit::Limited(8))
///     .mutator("add", |state: &mut Value, args: &[Value]| {
///         let amount: i64 = arg(args, 0)?;
///         let value = state["value"].as_i64().unwrap_or_default() + amount;
///         Ok(Outcome::json(json!({ "value": value })))
///     })
///     .getter("value", |state: &Value| state["value"].clone())
///     .build()
///     .unwrap();
///
/// let two = counter.mutate("add", &[json!(1)])?.mutate("add", &[json!(1)])?;
/// assert_eq!(two.get("value")?, json!(2));
/// assert_eq!(two.undo(Steps::Count(1))?.get("value")?, json!(1));
/// # Ok::<(), retrace::FluentError>(())
/// ```
pub struct HandleBuilder<S: State> {
    initial: S,
    options: Options,
    producer: Option<Arc<dyn Producer<S>>>,
    members: Vec<(String, Descriptor<S>)>,
    constants: Vec<(ConstantKey, Value)>,
}

impl<S: State> HandleBuilder<S> {
    /// Create a builder around the initial state.
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            options: Options::default(),
            producer: None,
            members: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn history(mut self, limit: HistoryLimit) -> Self {
        self.options.history = limit;
        self
    }

    pub fn mode(mut self, mode: Mutability) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn locking(mut self, locking: Locking) -> Self {
        self.options.locking = locking;
        self
    }

    pub fn binding(mut self, binding: Binding) -> Self {
        self.options.binding = binding;
        self
    }

    /// Set the update strategy. Defaults to [`ShallowMerge`].
    pub fn producer<P>(mut self, producer: P) -> Self
    where
        P: Producer<S> + 'static,
    {
        self.producer = Some(Arc::new(producer));
        self
    }

    /// Add a fluent operation.
    pub fn mutator<F>(mut self, name: impl Into<String>, mutator: F) -> Self
    where
        F: Fn(&mut S, &[Value]) -> Result<Outcome<S>, OperationError> + Send + Sync + 'static,
    {
        self.members
            .push((name.into(), Descriptor::Mutator(Arc::new(mutator))));
        self
    }

    /// Add a read-only operation.
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&S, &[Value]) -> Result<Value, OperationError> + Send + Sync + 'static,
    {
        self.members
            .push((name.into(), Descriptor::Accessor(Arc::new(accessor))));
        self
    }

    /// Add a computed property.
    pub fn getter<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&S) -> Value + Send + Sync + 'static,
    {
        self.members
            .push((name.into(), Descriptor::Getter(Arc::new(getter))));
        self
    }

    /// Add a fixed field under a name or a [`Symbol`](crate::descriptor::Symbol).
    pub fn constant(mut self, key: impl Into<ConstantKey>, value: impl Into<Value>) -> Self {
        self.constants.push((key.into(), value.into()));
        self
    }

    /// Build the root handle.
    ///
    /// Every configuration problem is reported, not only the first one.
    pub fn build(self) -> Result<Handle<S>, BuildError> {
        self.validate()?;

        let mut members = BTreeMap::new();
        let mut symbols = HashMap::new();
        for (name, descriptor) in self.members {
            members.insert(name, descriptor);
        }
        for (key, value) in self.constants {
            match key {
                ConstantKey::Name(name) => {
                    members.insert(name, Descriptor::Constant(value));
                }
                ConstantKey::Symbol(symbol) => {
                    symbols.insert(symbol, value);
                }
            }
        }

        let producer = self
            .producer
            .unwrap_or_else(|| Arc::new(ShallowMerge) as Arc<dyn Producer<S>>);
        let table = OperationTable::new(members, symbols, producer, self.options);

        tracing::debug!(
            members = table.members().count(),
            symbols = table.symbols().count(),
            mode = ?self.options.mode,
            history = ?self.options.history,
            "Built fluent handle"
        );

        Ok(Handle::root(
            Arc::new(table),
            History::new(self.initial, self.options.history),
        ))
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();
        let mut names: HashSet<&str> = HashSet::new();
        let mut symbols = HashSet::new();

        let named = self
            .members
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor.kind()))
            .chain(self.constants.iter().filter_map(|(key, _)| match key {
                ConstantKey::Name(name) => Some((name.as_str(), MemberKind::Constant)),
                ConstantKey::Symbol(_) => None,
            }));

        for (name, kind) in named {
            let check = if name.is_empty() {
                Validation::fail(BuildError::EmptyName { kind })
            } else if RESERVED.contains(&name) {
                Validation::fail(BuildError::ReservedMember {
                    name: name.to_string(),
                })
            } else if !names.insert(name) {
                Validation::fail(BuildError::DuplicateMember {
                    name: name.to_string(),
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        for (key, _) in &self.constants {
            if let ConstantKey::Symbol(symbol) = key {
                let check = if symbols.insert(symbol) {
                    Validation::success(())
                } else {
                    Validation::fail(BuildError::DuplicateConstant {
                        key: key.to_string(),
                    })
                };
                checks.push(check);
            }
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => {
                let mut errors: Vec<BuildError> = errors.iter().cloned().collect();
                if errors.len() == 1 {
                    Err(errors.remove(0))
                } else {
                    Err(BuildError::Multiple(errors))
                }
            }
        }
    }
}

impl<S: State + Default> Default for HandleBuilder<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Symbol;
    use serde_json::json;

    fn noop_mutator(_: &mut Value, _: &[Value]) -> Result<Outcome<Value>, OperationError> {
        Ok(Outcome::Unchanged)
    }

    fn noop_accessor(_: &Value, _: &[Value]) -> Result<Value, OperationError> {
        Ok(Value::Null)
    }

    #[test]
    fn defaults_build() {
        let handle = HandleBuilder::<Value>::default().build().unwrap();
        assert_eq!(handle.state().unwrap(), Value::Null);
        assert_eq!(handle.options(), &Options::default());
    }

    #[test]
    fn builder_exposes_every_member() {
        let symbol = Symbol::new("test");
        let handle = HandleBuilder::new(json!({ "value": 1 }))
            .constant("constant", 2)
            .constant(&symbol, 3)
            .getter("value", |state: &Value| state["value"].clone())
            .mutator("f_method", noop_mutator)
            .accessor("m_method", noop_accessor)
            .build()
            .unwrap();

        assert_eq!(handle.kind("constant"), Some(MemberKind::Constant));
        assert_eq!(handle.kind("value"), Some(MemberKind::Getter));
        assert_eq!(handle.kind("f_method"), Some(MemberKind::Mutator));
        assert_eq!(handle.kind("m_method"), Some(MemberKind::Accessor));
        assert_eq!(handle.kind("undo"), Some(MemberKind::Undo));
        assert_eq!(handle.kind("redo"), Some(MemberKind::Redo));
        assert_eq!(handle.constant("constant"), Some(json!(2)));
        assert_eq!(handle.constant(&symbol), Some(json!(3)));
    }

    #[test]
    fn builder_rejects_reserved_names() {
        let result = HandleBuilder::new(json!({}))
            .mutator("undo", noop_mutator)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::ReservedMember { name }) if name == "undo"
        ));
    }

    #[test]
    fn builder_rejects_duplicates_across_maps() {
        let result = HandleBuilder::new(json!({}))
            .mutator("value", noop_mutator)
            .getter("value", |state: &Value| state.clone())
            .build();

        assert!(matches!(
            result,
            Err(BuildError::DuplicateMember { name }) if name == "value"
        ));
    }

    #[test]
    fn builder_accumulates_all_errors() {
        let symbol = Symbol::new("twice");
        let result = HandleBuilder::new(json!({}))
            .mutator("", noop_mutator)
            .accessor("redo", noop_accessor)
            .constant("a", 1)
            .constant("a", 2)
            .constant(&symbol, 1)
            .constant(&symbol, 2)
            .build();

        match result {
            Err(BuildError::Multiple(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, BuildError::EmptyName { kind: MemberKind::Mutator })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, BuildError::ReservedMember { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, BuildError::DuplicateMember { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, BuildError::DuplicateConstant { .. })));
            }
            Err(other) => panic!("Expected multiple errors, got {other}"),
            Ok(_) => panic!("Expected failure, got a handle"),
        }
    }

    #[test]
    fn builder_applies_options() {
        let handle = HandleBuilder::new(json!({}))
            .history(HistoryLimit::Unbounded)
            .mode(Mutability::MutateInPlace)
            .locking(Locking::LockAfterUse)
            .binding(Binding::DetachAllowed)
            .build()
            .unwrap();

        let options = handle.options();
        assert_eq!(options.history, HistoryLimit::Unbounded);
        assert_eq!(options.mode, Mutability::MutateInPlace);
        assert_eq!(options.locking, Locking::LockAfterUse);
        assert_eq!(options.binding, Binding::DetachAllowed);
    }
}
