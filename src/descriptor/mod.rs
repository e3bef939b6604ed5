//! Operation descriptors and the lookup table handles dispatch through.
//!
//! A handle's public surface is a single [`OperationTable`] built once at
//! construction: member name to [`Descriptor`], plus symbol-keyed constants.
//! Every handle derived from the same builder shares that table.

mod key;
mod table;

pub use key::{ConstantKey, Symbol};
pub use table::OperationTable;

use crate::core::State;
use crate::error::OperationError;
use crate::producer::Outcome;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Fluent operation: describes the next state from the current one.
pub type MutatorFn<S> =
    Arc<dyn Fn(&mut S, &[Value]) -> Result<Outcome<S>, OperationError> + Send + Sync>;

/// Read-only operation over the present state.
pub type AccessorFn<S> = Arc<dyn Fn(&S, &[Value]) -> Result<Value, OperationError> + Send + Sync>;

/// Zero-argument computed property.
pub type GetterFn<S> = Arc<dyn Fn(&S) -> Value + Send + Sync>;

/// Kind of a member exposed on a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Mutator,
    Accessor,
    Getter,
    Constant,
    Undo,
    Redo,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Mutator => "mutator",
            MemberKind::Accessor => "accessor",
            MemberKind::Getter => "getter",
            MemberKind::Constant => "constant",
            MemberKind::Undo => "undo",
            MemberKind::Redo => "redo",
        };
        f.write_str(name)
    }
}

/// Entry of the operation table.
pub enum Descriptor<S: State> {
    Mutator(MutatorFn<S>),
    Accessor(AccessorFn<S>),
    Getter(GetterFn<S>),
    Constant(Value),
    Undo,
    Redo,
}

impl<S: State> Descriptor<S> {
    pub fn kind(&self) -> MemberKind {
        match self {
            Descriptor::Mutator(_) => MemberKind::Mutator,
            Descriptor::Accessor(_) => MemberKind::Accessor,
            Descriptor::Getter(_) => MemberKind::Getter,
            Descriptor::Constant(_) => MemberKind::Constant,
            Descriptor::Undo => MemberKind::Undo,
            Descriptor::Redo => MemberKind::Redo,
        }
    }
}

impl<S: State> Clone for Descriptor<S> {
    fn clone(&self) -> Self {
        match self {
            Descriptor::Mutator(f) => Descriptor::Mutator(Arc::clone(f)),
            Descriptor::Accessor(f) => Descriptor::Accessor(Arc::clone(f)),
            Descriptor::Getter(f) => Descriptor::Getter(Arc::clone(f)),
            Descriptor::Constant(value) => Descriptor::Constant(value.clone()),
            Descriptor::Undo => Descriptor::Undo,
            Descriptor::Redo => Descriptor::Redo,
        }
    }
}

impl<S: State> fmt::Debug for Descriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Deserialize the argument at `index` for use inside an operation.
///
/// A missing argument deserializes from `null`, so `Option<T>` parameters
/// are optional.
///
/// ```rust
/// use retrace::descriptor::arg;
/// use serde_json::json;
///
/// let args = [json!(2.5), json!("label")];
/// let amount: f64 = arg(&args, 0).unwrap();
/// let label: String = arg(&args, 1).unwrap();
/// let extra: Option<i64> = arg(&args, 2).unwrap();
///
/// assert_eq!(amount, 2.5);
/// assert_eq!(label, "label");
/// assert_eq!(extra, None);
/// assert!(arg::<f64>(&args, 1).is_err());
/// ```
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T, OperationError> {
    let value = args.get(index).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| format!("argument {index}: {err}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_reports_kind() {
        let mutator: Descriptor<Value> = Descriptor::Mutator(Arc::new(
            |_: &mut Value, _: &[Value]| -> Result<Outcome<Value>, OperationError> {
                Ok(Outcome::Unchanged)
            },
        ));
        let getter: Descriptor<Value> =
            Descriptor::Getter(Arc::new(|state: &Value| -> Value { state.clone() }));

        assert_eq!(mutator.kind(), MemberKind::Mutator);
        assert_eq!(getter.kind(), MemberKind::Getter);
        assert_eq!(Descriptor::<Value>::Undo.kind(), MemberKind::Undo);
        assert_eq!(Descriptor::<Value>::Constant(json!(1)).kind(), MemberKind::Constant);
    }

    #[test]
    fn arg_reports_index_on_failure() {
        let err = arg::<i64>(&[json!("x")], 0).unwrap_err();
        assert!(err.to_string().starts_with("argument 0"));
    }

    #[test]
    fn missing_arg_is_null() {
        assert!(arg::<i64>(&[], 0).is_err());
        assert_eq!(arg::<Option<i64>>(&[], 0).unwrap(), None);
    }
}
