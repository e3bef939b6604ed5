//! Name -> descriptor lookup table shared by a family of handles.

use super::{ConstantKey, Descriptor, MemberKind, Symbol};
use crate::builder::Options;
use crate::core::State;
use crate::error::FluentError;
use crate::producer::Producer;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Operation set of a handle, built once and consulted by the dispatcher.
pub struct OperationTable<S: State> {
    members: BTreeMap<String, Descriptor<S>>,
    symbols: HashMap<Symbol, Value>,
    producer: Arc<dyn Producer<S>>,
    options: Options,
}

impl<S: State> OperationTable<S> {
    /// Assemble a table. `undo` and `redo` are always present.
    pub(crate) fn new(
        members: BTreeMap<String, Descriptor<S>>,
        symbols: HashMap<Symbol, Value>,
        producer: Arc<dyn Producer<S>>,
        options: Options,
    ) -> Self {
        let mut members = members;
        members.insert("undo".to_string(), Descriptor::Undo);
        members.insert("redo".to_string(), Descriptor::Redo);
        Self {
            members,
            symbols,
            producer,
            options,
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&Descriptor<S>, FluentError> {
        self.members
            .get(name)
            .ok_or_else(|| FluentError::UnknownMember {
                member: name.to_string(),
            })
    }

    pub fn kind(&self, name: &str) -> Option<MemberKind> {
        self.members.get(name).map(Descriptor::kind)
    }

    /// Constant value for a name or symbol key.
    pub fn constant(&self, key: &ConstantKey) -> Option<&Value> {
        match key {
            ConstantKey::Name(name) => match self.members.get(name) {
                Some(Descriptor::Constant(value)) => Some(value),
                _ => None,
            },
            ConstantKey::Symbol(symbol) => self.symbols.get(symbol),
        }
    }

    /// Named members in name order, including `undo` and `redo`.
    pub fn members(&self) -> impl Iterator<Item = (&str, MemberKind)> + '_ {
        self.members
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor.kind()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.keys()
    }

    pub fn producer(&self) -> &dyn Producer<S> {
        self.producer.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl<S: State> fmt::Debug for OperationTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("members", &self.members)
            .field("symbols", &self.symbols.len())
            .field("options", &self.options)
            .finish()
    }
}
