//! Rule table: merge functions keyed by ordered pairs of type labels.
//!
//! Lookups are order-sensitive. A rule registered for `(a, b)` is only
//! visible for `(b, a)` when it was registered commutatively, which stores
//! the same function under both orderings.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builtins::PairMerge;
use crate::engine::MergeEngine;
use crate::error::{MergeError, Result};
use crate::types::{DEFAULT_LABEL, Strictness};
use crate::value::Value;

/// A binary merge behavior.
///
/// `engine` is the engine dispatching the call, so rules that need to merge
/// nested values recurse through the same configuration they were invoked
/// from. Plain closures `Fn(&Value, &Value) -> Result<Value>` implement this
/// trait and ignore the engine.
pub trait MergeFn: Send + Sync {
    fn merge(&self, engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value>;
}

impl<F> MergeFn for F
where
    F: Fn(&Value, &Value) -> Result<Value> + Send + Sync,
{
    fn merge(&self, _engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value> {
        self(a, b)
    }
}

pub struct RuleTable {
    rules: HashMap<String, HashMap<String, Arc<dyn MergeFn>>>,
    strictness: Strictness,
    /// Used by lenient lookups once `(default, default)` has been deleted.
    fallback: Arc<dyn MergeFn>,
}

impl RuleTable {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            rules: HashMap::new(),
            strictness,
            fallback: Arc::new(PairMerge),
        }
    }

    /// Store `rule` under `(left, right)`, and under `(right, left)` too when
    /// `commutative`, overwriting whatever was there.
    pub fn set(&mut self, left: &str, right: &str, rule: Arc<dyn MergeFn>, commutative: bool) {
        if commutative && left != right {
            self.insert(right, left, rule.clone());
        }
        self.insert(left, right, rule);
    }

    /// Remove `(left, right)`, and `(right, left)` when `commutative`.
    /// Absent entries are ignored.
    pub fn delete(&mut self, left: &str, right: &str, commutative: bool) {
        self.remove(left, right);
        if commutative {
            self.remove(right, left);
        }
    }

    /// Exact-match lookup, no fallback.
    pub fn get(&self, left: &str, right: &str) -> Option<&Arc<dyn MergeFn>> {
        self.rules.get(left).and_then(|row| row.get(right))
    }

    /// Lookup with the table's fallback policy.
    ///
    /// Lenient tables fall back to the `(default, default)` rule, or to the
    /// pairing merge when that rule is absent, so they always answer.
    /// Pedantic tables only return exact matches.
    pub fn lookup(&self, left: &str, right: &str) -> Option<&Arc<dyn MergeFn>> {
        match self.strictness {
            Strictness::Lenient => self
                .get(left, right)
                .or_else(|| self.get(DEFAULT_LABEL, DEFAULT_LABEL))
                .or(Some(&self.fallback)),
            Strictness::Pedantic => self.get(left, right),
        }
    }

    /// Like [`lookup`](Self::lookup), failing with
    /// [`MergeError::MissingRule`] that names the labels and the operands.
    pub fn resolve(
        &self,
        left: &str,
        right: &str,
        a: &Value,
        b: &Value,
    ) -> Result<&Arc<dyn MergeFn>> {
        self.lookup(left, right)
            .ok_or_else(|| MergeError::MissingRule {
                left: left.to_string(),
                right: right.to_string(),
                left_value: a.clone(),
                right_value: b.clone(),
            })
    }

    pub fn contains(&self, left: &str, right: &str) -> bool {
        self.get(left, right).is_some()
    }

    /// Every registered `(left, right)` pair, sorted.
    pub fn keys(&self) -> Vec<(String, String)> {
        let mut keys: Vec<_> = self
            .rules
            .iter()
            .flat_map(|(left, row)| row.keys().map(move |right| (left.clone(), right.clone())))
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, left: &str, right: &str, rule: Arc<dyn MergeFn>) {
        self.rules
            .entry(left.to_string())
            .or_default()
            .insert(right.to_string(), rule);
    }

    fn remove(&mut self, left: &str, right: &str) {
        if let Some(row) = self.rules.get_mut(left) {
            row.remove(right);
            if row.is_empty() {
                self.rules.remove(left);
            }
        }
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("keys", &self.keys())
            .field("strictness", &self.strictness)
            .finish()
    }
}
