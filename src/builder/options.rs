//! Configuration options shared by every handle built from one builder.

use crate::core::{Binding, HistoryLimit, Locking};
use serde::{Deserialize, Serialize};

/// How mutators, undo and redo hand back the next version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// Every transition yields a new handle wrapping a new history record.
    #[default]
    Immutable,
    /// The handle that served the call is updated and returned.
    MutateInPlace,
    /// Every transition yields a new handle, but all handles of the family
    /// alias one history record and observe each other's updates.
    SharedMutableRecord,
}

impl Mutability {
    pub fn is_mutable(&self) -> bool {
        !matches!(self, Mutability::Immutable)
    }
}

/// Handle options. Every field has a default, so partial JSON is accepted.
///
/// ```rust
/// use retrace::builder::{Mutability, Options};
/// use retrace::core::{HistoryLimit, Locking};
///
/// let options = Options::from_json(r#"{ "history": 8, "locking": "lock_after_use" }"#).unwrap();
///
/// assert_eq!(options.history, HistoryLimit::Limited(8));
/// assert_eq!(options.locking, Locking::LockAfterUse);
/// assert_eq!(options.mode, Mutability::Immutable);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Maximum retained past entries. `0` disables undo/redo.
    pub history: HistoryLimit,
    pub mode: Mutability,
    pub locking: Locking,
    pub binding: Binding,
}

impl Options {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
