//! # merge-engine
//!
//! Merges two values of possibly different shapes into one, with the
//! behavior chosen by type-driven dispatch instead of hard-coded checks.
//!
//! ## Approach
//!
//! 1. **Classification**: a [`Classifier`] holds an ordered list of
//!    `(label, predicate)` entries. The most recently defined predicate is
//!    tried first; the first match names the value's kind.
//!
//! 2. **Rule dispatch**: a [`RuleTable`] maps ordered pairs of kinds to a
//!    [`MergeFn`]. Registration can be commutative (both orderings), lookup
//!    never assumes symmetry.
//!
//! 3. **Built-ins**: sequence concatenation, set union, key-wise mapping
//!    merge and the pairing fallback that flattens both operands into a
//!    tuple in call order.
//!
//! 4. **Strictness**: lenient engines fall back to a `default` kind and the
//!    `(default, default)` rule. Pedantic engines fail with
//!    [`MergeError::MissingType`] / [`MergeError::MissingRule`] and only
//!    merge mappings whose shared keys agree.
//!
//! ## Example
//!
//! ```rust
//! use merge_engine::{create_default_engine, Value};
//!
//! let engine = create_default_engine();
//! let merged = engine
//!     .merge(
//!         &Value::map([("a", Value::map([("x", 1)])), ("b", Value::from(2))]),
//!         &Value::map([("a", Value::map([("y", 2)])), ("c", Value::from(3))]),
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     merged,
//!     Value::map([
//!         ("a", Value::map([("x", 1), ("y", 2)])),
//!         ("b", Value::from(2)),
//!         ("c", Value::from(3)),
//!     ])
//! );
//! ```

pub mod builtins;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod observer;
pub mod rules;
pub mod simple;
pub mod types;
pub mod value;

// Re-export primary public API
pub use builtins::{
    ConflictHandler, ListConcat, MapMerge, PairMerge, RecursiveMerge, RequireEqual, SetUnion,
    TupleConcat,
};
pub use classifier::{Classifier, TypePredicate};
pub use engine::{MergeEngine, create_default_engine, create_pedantic_engine};
pub use error::{MergeError, Result};
pub use observer::{MergeObserver, TracingObserver};
pub use rules::{MergeFn, RuleTable};
pub use simple::{DefaultResolver, Resolver, simple_merge};
pub use types::{DEFAULT_LABEL, Strictness};
pub use value::Value;
