//! Errors surfaced by handle operations.

use crate::core::HistoryError;
use crate::descriptor::MemberKind;
use std::fmt;
use thiserror::Error;

/// Error type returned by caller-supplied mutators and accessors.
pub type OperationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable symbolic code for each failure kind.
///
/// Codes never change between releases, so embedders can branch on them
/// instead of matching messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unbound,
    Locked,
    HistoryDisabled,
    HistoryExhausted,
    InvalidStepCount,
    InvalidHistoryLimit,
    MutatorFailure,
    AccessorFailure,
    UnknownMember,
    WrongMemberKind,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unbound => "RETRACE_UNBOUND",
            ErrorCode::Locked => "RETRACE_LOCKED",
            ErrorCode::HistoryDisabled => "RETRACE_HISTORY_DISABLED",
            ErrorCode::HistoryExhausted => "RETRACE_HISTORY_EXHAUSTED",
            ErrorCode::InvalidStepCount => "RETRACE_INVALID_STEP_COUNT",
            ErrorCode::InvalidHistoryLimit => "RETRACE_INVALID_HISTORY_LIMIT",
            ErrorCode::MutatorFailure => "RETRACE_MUTATOR_FAILURE",
            ErrorCode::AccessorFailure => "RETRACE_ACCESSOR_FAILURE",
            ErrorCode::UnknownMember => "RETRACE_UNKNOWN_MEMBER",
            ErrorCode::WrongMemberKind => "RETRACE_WRONG_MEMBER_KIND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when operating a handle.
///
/// All of them are recoverable: a failed call leaves the handle unchanged
/// and unlocked.
#[derive(Debug, Error)]
pub enum FluentError {
    #[error("Unbound call to '{member}'")]
    Unbound { member: String },

    #[error("Handle is locked")]
    Locked,

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Mutator '{member}' failed: {source}")]
    MutatorFailure {
        member: String,
        #[source]
        source: OperationError,
    },

    #[error("Accessor '{member}' failed: {source}")]
    AccessorFailure {
        member: String,
        #[source]
        source: OperationError,
    },

    #[error("Unknown member '{member}'")]
    UnknownMember { member: String },

    #[error("Member '{member}' is a {found}, expected a {expected}")]
    WrongMemberKind {
        member: String,
        expected: MemberKind,
        found: MemberKind,
    },
}

impl FluentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FluentError::Unbound { .. } => ErrorCode::Unbound,
            FluentError::Locked => ErrorCode::Locked,
            FluentError::History(HistoryError::Disabled) => ErrorCode::HistoryDisabled,
            FluentError::History(HistoryError::Exhausted { .. }) => ErrorCode::HistoryExhausted,
            FluentError::History(HistoryError::InvalidStepCount { .. }) => {
                ErrorCode::InvalidStepCount
            }
            FluentError::History(HistoryError::InvalidHistoryLimit { .. }) => {
                ErrorCode::InvalidHistoryLimit
            }
            FluentError::MutatorFailure { .. } => ErrorCode::MutatorFailure,
            FluentError::AccessorFailure { .. } => ErrorCode::AccessorFailure,
            FluentError::UnknownMember { .. } => ErrorCode::UnknownMember,
            FluentError::WrongMemberKind { .. } => ErrorCode::WrongMemberKind,
        }
    }

    pub(crate) fn unbound(member: &str) -> Self {
        FluentError::Unbound {
            member: member.to_string(),
        }
    }
}
