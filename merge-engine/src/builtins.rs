//! Built-in merge behaviors.
//!
//! - [`PairMerge`]: the universal fallback. Normalizes both operands into
//!   sequences and concatenates them into a tuple, in call order.
//! - [`ListConcat`] / [`TupleConcat`]: sequence concatenation.
//! - [`SetUnion`]: set union.
//! - [`MapMerge`]: key-wise union, with a pluggable [`ConflictHandler`] for
//!   keys present on both sides.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::MergeEngine;
use crate::error::{MergeError, Result};
use crate::rules::MergeFn;
use crate::value::Value;

/// `a ++ b` after normalizing each side with [`Value::to_sequence`].
pub fn pair(a: &Value, b: &Value) -> Value {
    let mut items = a.to_sequence();
    items.extend(b.to_sequence());
    Value::Tuple(items)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PairMerge;

impl MergeFn for PairMerge {
    fn merge(&self, _engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value> {
        Ok(pair(a, b))
    }
}

/// Concatenates two lists, `a` then `b`. Duplicates are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListConcat;

impl MergeFn for ListConcat {
    fn merge(&self, _engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value> {
        match (a, b) {
            (Value::List(left), Value::List(right)) => {
                let mut items = Vec::with_capacity(left.len() + right.len());
                items.extend(left.iter().cloned());
                items.extend(right.iter().cloned());
                Ok(Value::List(items))
            }
            (Value::List(_), other) | (other, _) => Err(MergeError::invalid("list", other)),
        }
    }
}

/// Concatenates two tuples. Operands are normalized first, so a scalar or
/// another sequence kind routed here still flattens into the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleConcat;

impl MergeFn for TupleConcat {
    fn merge(&self, _engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value> {
        Ok(pair(a, b))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetUnion;

impl MergeFn for SetUnion {
    fn merge(&self, _engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value> {
        match (a, b) {
            (Value::Set(left), Value::Set(right)) => Ok(Value::Set(left | right)),
            (Value::Set(_), other) | (other, _) => Err(MergeError::invalid("set", other)),
        }
    }
}

/// Decides the value stored for a key present in both mappings.
pub trait ConflictHandler: Send + Sync {
    fn resolve(
        &self,
        engine: &MergeEngine,
        existing: &Value,
        incoming: &Value,
        key: &Value,
    ) -> Result<Value>;
}

impl<F> ConflictHandler for F
where
    F: Fn(&Value, &Value, &Value) -> Result<Value> + Send + Sync,
{
    fn resolve(
        &self,
        _engine: &MergeEngine,
        existing: &Value,
        incoming: &Value,
        key: &Value,
    ) -> Result<Value> {
        self(existing, incoming, key)
    }
}

/// Merges conflicting values through the dispatching engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveMerge;

impl ConflictHandler for RecursiveMerge {
    fn resolve(
        &self,
        engine: &MergeEngine,
        existing: &Value,
        incoming: &Value,
        _key: &Value,
    ) -> Result<Value> {
        engine.merge(existing, incoming)
    }
}

/// Accepts a conflict only when both values are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireEqual;

impl ConflictHandler for RequireEqual {
    fn resolve(
        &self,
        _engine: &MergeEngine,
        existing: &Value,
        incoming: &Value,
        key: &Value,
    ) -> Result<Value> {
        if existing != incoming {
            return Err(MergeError::KeyConflict {
                key: key.clone(),
                existing: existing.clone(),
                incoming: incoming.clone(),
            });
        }
        Ok(existing.clone())
    }
}

#[derive(Clone)]
pub struct MapMerge {
    conflicts: Arc<dyn ConflictHandler>,
}

impl MapMerge {
    pub fn new(conflicts: Arc<dyn ConflictHandler>) -> Self {
        Self { conflicts }
    }

    /// Conflicting values are merged by the engine itself.
    pub fn recursive() -> Self {
        Self::new(Arc::new(RecursiveMerge))
    }

    /// Conflicting values must be equal.
    pub fn strict() -> Self {
        Self::new(Arc::new(RequireEqual))
    }
}

impl MergeFn for MapMerge {
    fn merge(&self, engine: &MergeEngine, a: &Value, b: &Value) -> Result<Value> {
        let (left, right) = match (a, b) {
            (Value::Map(left), Value::Map(right)) => (left, right),
            (Value::Map(_), other) | (other, _) => return Err(MergeError::invalid("map", other)),
        };
        let mut merged: BTreeMap<Value, Value> = left.clone();
        for (key, incoming) in right {
            let value = match merged.get(key) {
                Some(existing) => self.conflicts.resolve(engine, existing, incoming, key)?,
                None => incoming.clone(),
            };
            merged.insert(key.clone(), value);
        }
        Ok(Value::Map(merged))
    }
}
