//! Keys for constant members.

use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Unique, non-string constant key.
///
/// Two symbols are equal only if one is a clone of the other; the
/// description is informational.
///
/// ```rust
/// use retrace::descriptor::Symbol;
///
/// let a = Symbol::new("calculator");
/// let b = Symbol::new("calculator");
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Clone, Debug)]
pub struct Symbol {
    id: Uuid,
    description: String,
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Key of a constant member: a plain name or a [`Symbol`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstantKey {
    Name(String),
    Symbol(Symbol),
}

impl From<&str> for ConstantKey {
    fn from(name: &str) -> Self {
        ConstantKey::Name(name.to_string())
    }
}

impl From<String> for ConstantKey {
    fn from(name: String) -> Self {
        ConstantKey::Name(name)
    }
}

impl From<Symbol> for ConstantKey {
    fn from(symbol: Symbol) -> Self {
        ConstantKey::Symbol(symbol)
    }
}

impl From<&Symbol> for ConstantKey {
    fn from(symbol: &Symbol) -> Self {
        ConstantKey::Symbol(symbol.clone())
    }
}

impl fmt::Display for ConstantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantKey::Name(name) => f.write_str(name),
            ConstantKey::Symbol(symbol) => symbol.fmt(f),
        }
    }
}
