//! Bounded undo/redo history.
//!
//! `History` keeps the present state between a bounded `past` and a
//! `future` that is only populated by undo. Every operation is pure: it
//! returns a new history and leaves the receiver untouched.

use super::state::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::mem;
use thiserror::Error;

/// Errors raised while moving through history or parsing its arguments.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistoryError {
    #[error("History is disabled")]
    Disabled,

    #[error("State history is empty (requested {requested} step(s), {available} available)")]
    Exhausted { requested: usize, available: usize },

    #[error("Expected zero, a positive integer, or infinity as step count (got {value})")]
    InvalidStepCount { value: String },

    #[error("Expected zero, a positive integer, or infinity as history limit (got {value})")]
    InvalidHistoryLimit { value: String },
}

/// Parsed numeric argument shared by [`Steps`] and [`HistoryLimit`].
enum Count {
    Finite(usize),
    Infinite,
}

impl Count {
    fn from_f64(value: f64) -> Option<Self> {
        if value == f64::INFINITY {
            Some(Count::Infinite)
        } else if value.is_nan() || value < 0.0 || value.fract() != 0.0 {
            None
        } else {
            // Saturating cast: anything beyond usize::MAX becomes usize::MAX,
            // which no history can satisfy.
            Some(Count::Finite(value as usize))
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => match number.as_u64() {
                Some(n) => Some(Count::Finite(usize::try_from(n).unwrap_or(usize::MAX))),
                None => number.as_f64().and_then(Count::from_f64),
            },
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "infinity" | "inf" | "all" | "unbounded" => Some(Count::Infinite),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Number of steps to move with undo or redo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steps {
    /// Move exactly this many steps.
    Count(usize),
    /// Move through every available entry.
    All,
}

impl Default for Steps {
    fn default() -> Self {
        Steps::Count(1)
    }
}

impl From<usize> for Steps {
    fn from(count: usize) -> Self {
        Steps::Count(count)
    }
}

impl Steps {
    /// Parse a numeric step count.
    ///
    /// Accepts zero, positive integers and positive infinity. NaN, negative
    /// and fractional values are rejected.
    ///
    /// ```rust
    /// use retrace::core::Steps;
    ///
    /// assert_eq!(Steps::from_f64(3.0), Ok(Steps::Count(3)));
    /// assert_eq!(Steps::from_f64(f64::INFINITY), Ok(Steps::All));
    /// assert!(Steps::from_f64(-1.0).is_err());
    /// assert!(Steps::from_f64(1.5).is_err());
    /// ```
    pub fn from_f64(value: f64) -> Result<Self, HistoryError> {
        match Count::from_f64(value) {
            Some(Count::Finite(n)) => Ok(Steps::Count(n)),
            Some(Count::Infinite) => Ok(Steps::All),
            None => Err(HistoryError::InvalidStepCount {
                value: value.to_string(),
            }),
        }
    }

    /// Parse an optional dynamic argument. A missing argument means one step.
    pub fn from_value(value: Option<&Value>) -> Result<Self, HistoryError> {
        let Some(value) = value else {
            return Ok(Steps::default());
        };
        match Count::from_value(value) {
            Some(Count::Finite(n)) => Ok(Steps::Count(n)),
            Some(Count::Infinite) => Ok(Steps::All),
            None => Err(HistoryError::InvalidStepCount {
                value: value.to_string(),
            }),
        }
    }
}

/// Maximum number of past entries retained.
///
/// `Limited(0)` disables history entirely. Serialized as a plain integer or
/// the string `"unbounded"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum HistoryLimit {
    Limited(usize),
    Unbounded,
}

impl Default for HistoryLimit {
    fn default() -> Self {
        HistoryLimit::Limited(0)
    }
}

impl HistoryLimit {
    pub fn from_f64(value: f64) -> Result<Self, HistoryError> {
        match Count::from_f64(value) {
            Some(Count::Finite(n)) => Ok(HistoryLimit::Limited(n)),
            Some(Count::Infinite) => Ok(HistoryLimit::Unbounded),
            None => Err(HistoryError::InvalidHistoryLimit {
                value: value.to_string(),
            }),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, HistoryError> {
        match Count::from_value(value) {
            Some(Count::Finite(n)) => Ok(HistoryLimit::Limited(n)),
            Some(Count::Infinite) => Ok(HistoryLimit::Unbounded),
            None => Err(HistoryError::InvalidHistoryLimit {
                value: value.to_string(),
            }),
        }
    }

    /// Whether undo/redo are available at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, HistoryLimit::Limited(0))
    }
}

impl TryFrom<Value> for HistoryLimit {
    type Error = HistoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        HistoryLimit::from_value(&value)
    }
}

impl From<HistoryLimit> for Value {
    fn from(limit: HistoryLimit) -> Self {
        match limit {
            HistoryLimit::Limited(n) => Value::from(n),
            HistoryLimit::Unbounded => Value::from("unbounded"),
        }
    }
}

/// Present state surrounded by bounded past and future sequences.
///
/// # Example
///
/// ```rust
/// use retrace::core::{History, HistoryLimit, Steps};
/// use serde_json::json;
///
/// let history = History::new(json!(0), HistoryLimit::Limited(2));
/// let history = history.record(json!(1)).record(json!(2)).record(json!(3));
///
/// // Only two past entries survive.
/// assert_eq!(history.undo_depth(), 2);
///
/// let rewound = history.undo(Steps::All).unwrap();
/// assert_eq!(rewound.present(), &json!(1));
///
/// let replayed = rewound.redo(Steps::Count(2)).unwrap();
/// assert_eq!(replayed.present(), &json!(3));
/// ```
#[derive(Clone, Debug)]
pub struct History<S: State> {
    present: S,
    past: VecDeque<S>,
    future: Vec<S>,
    limit: HistoryLimit,
}

impl<S: State> History<S> {
    /// Create a history with no past or future.
    pub fn new(present: S, limit: HistoryLimit) -> Self {
        Self {
            present,
            past: VecDeque::new(),
            future: Vec::new(),
            limit,
        }
    }

    pub fn present(&self) -> &S {
        &self.present
    }

    /// Past entries, oldest first.
    pub fn past(&self) -> &VecDeque<S> {
        &self.past
    }

    /// Future entries. The next state to redo is the last element.
    pub fn future(&self) -> &[S] {
        &self.future
    }

    pub fn limit(&self) -> HistoryLimit {
        self.limit
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Record a new present state, returning a new history.
    ///
    /// The previous present moves into `past`, the oldest entries beyond
    /// the limit are evicted and `future` is cleared. With history disabled
    /// only the present changes.
    pub fn record(&self, next: S) -> Self {
        if !self.limit.is_enabled() {
            return Self {
                present: next,
                past: VecDeque::new(),
                future: Vec::new(),
                limit: self.limit,
            };
        }

        let mut past = self.past.clone();
        past.push_back(self.present.clone());
        if let HistoryLimit::Limited(max) = self.limit {
            while past.len() > max {
                past.pop_front();
            }
        }

        Self {
            present: next,
            past,
            future: Vec::new(),
            limit: self.limit,
        }
    }

    /// Step back through `past`.
    pub fn undo(&self, steps: Steps) -> Result<Self, HistoryError> {
        self.shift(steps, false)
    }

    /// Step forward through `future`.
    pub fn redo(&self, steps: Steps) -> Result<Self, HistoryError> {
        self.shift(steps, true)
    }

    fn shift(&self, steps: Steps, forward: bool) -> Result<Self, HistoryError> {
        if !self.limit.is_enabled() {
            return Err(HistoryError::Disabled);
        }

        let available = if forward {
            self.future.len()
        } else {
            self.past.len()
        };
        let count = match steps {
            Steps::All => available,
            Steps::Count(requested) if requested > available => {
                return Err(HistoryError::Exhausted {
                    requested,
                    available,
                });
            }
            Steps::Count(requested) => requested,
        };

        let mut next = self.clone();
        for _ in 0..count {
            if forward {
                let Some(state) = next.future.pop() else {
                    break;
                };
                let previous = mem::replace(&mut next.present, state);
                next.past.push_back(previous);
            } else {
                let Some(state) = next.past.pop_back() else {
                    break;
                };
                let previous = mem::replace(&mut next.present, state);
                next.future.push(previous);
            }
        }
        Ok(next)
    }
}
