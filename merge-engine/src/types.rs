//! Shared vocabulary for the engine: type labels and strictness.

use serde::{Deserialize, Serialize};

/// Label every value falls back to in lenient mode.
pub const DEFAULT_LABEL: &str = "default";

/// Label for [`Value::List`](crate::Value::List).
pub const LIST_LABEL: &str = "list";
/// Label for [`Value::Tuple`](crate::Value::Tuple).
pub const TUPLE_LABEL: &str = "tuple";
/// Label for [`Value::Set`](crate::Value::Set).
pub const SET_LABEL: &str = "set";
/// Label for [`Value::Map`](crate::Value::Map).
pub const DICT_LABEL: &str = "dict";

/// Built-in kinds in the order the stock engines define them.
/// The last one defined has the highest priority.
pub const BUILTIN_LABELS: [&str; 4] = [LIST_LABEL, TUPLE_LABEL, SET_LABEL, DICT_LABEL];

/// How the engine reacts when it cannot classify a value or find a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unmatched values fall to [`DEFAULT_LABEL`], unmatched pairs to the
    /// `(default, default)` rule.
    #[default]
    Lenient,
    /// Missing types and missing rules are errors; mapping conflicts must
    /// be equal.
    Pedantic,
}

impl Strictness {
    pub fn is_pedantic(self) -> bool {
        self == Strictness::Pedantic
    }
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strictness::Lenient => write!(f, "lenient"),
            Strictness::Pedantic => write!(f, "pedantic"),
        }
    }
}
