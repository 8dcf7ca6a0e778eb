//! Failure modes of classification, dispatch and merging.

use thiserror::Error;

use crate::value::Value;

pub type Result<T, E = MergeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MergeError {
    /// An operand does not have the shape an operation requires.
    #[error("invalid argument: expected {expected}, found {found}")]
    InvalidArgument {
        expected: &'static str,
        found: String,
    },

    /// Pedantic classification found no matching type predicate.
    #[error("no type definition matches value {value}")]
    MissingType { value: Value },

    /// Pedantic dispatch found no rule for the classified pair.
    #[error("no merge rule for ({left}, {right}) while merging {left_value} with {right_value}")]
    MissingRule {
        left: String,
        right: String,
        left_value: Value,
        right_value: Value,
    },

    #[error("unknown type label '{0}'")]
    UnknownLabel(String),

    /// Strict mapping merge found unequal values under the same key.
    #[error("conflicting values ({existing} != {incoming}) found for key {key}")]
    KeyConflict {
        key: Value,
        existing: Value,
        incoming: Value,
    },
}

impl MergeError {
    pub(crate) fn invalid(expected: &'static str, found: &Value) -> Self {
        MergeError::InvalidArgument {
            expected,
            found: found.kind_name().to_string(),
        }
    }
}
