//! Build errors for handle construction.

use crate::descriptor::MemberKind;
use thiserror::Error;

/// Errors that can occur when building a handle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("A {kind} was registered with an empty name")]
    EmptyName { kind: MemberKind },

    #[error("Member '{name}' is defined more than once")]
    DuplicateMember { name: String },

    #[error("Member name '{name}' is reserved")]
    ReservedMember { name: String },

    #[error("Constant {key} is defined more than once")]
    DuplicateConstant { key: String },

    #[error("{} configuration errors: {}", .0.len(), join(.0))]
    Multiple(Vec<BuildError>),
}

fn join(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
