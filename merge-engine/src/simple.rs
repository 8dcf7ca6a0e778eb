//! Two-mapping merge with an explicit resolver.
//!
//! A standalone companion to the engine for the common case of combining
//! two mappings. Keys present on one side are copied. For a key present on
//! both, the resolver returns a partial mapping that is merged back into the
//! accumulator with the same resolver. The partial may be empty (the key is
//! dropped) or name other keys (which can cascade into further conflicts).
//! Without a resolver every shared key is a [`MergeError::KeyConflict`].

use crate::error::{MergeError, Result};
use crate::value::Value;

/// Produces a partial mapping for a key found in both inputs.
pub trait Resolver {
    fn resolve(&self, key: &Value, left: &Value, right: &Value) -> Result<Value>;
}

impl<F> Resolver for F
where
    F: Fn(&Value, &Value, &Value) -> Result<Value>,
{
    fn resolve(&self, key: &Value, left: &Value, right: &Value) -> Result<Value> {
        self(key, left, right)
    }
}

/// Recursively merges nested mappings and accepts equal values; anything
/// else is a conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl Resolver for DefaultResolver {
    fn resolve(&self, key: &Value, left: &Value, right: &Value) -> Result<Value> {
        if left.is_map() && right.is_map() {
            let merged = simple_merge(left, right, Some(self))?;
            return Ok(Value::map([(key.clone(), merged)]));
        }
        if left == right {
            return Ok(Value::map([(key.clone(), left.clone())]));
        }
        Err(MergeError::KeyConflict {
            key: key.clone(),
            existing: left.clone(),
            incoming: right.clone(),
        })
    }
}

/// Merge mapping `b` into a copy of mapping `a`.
///
/// The resolver receives the accumulator's current value for a shared key.
/// That is `a`'s value unless a partial returned for an earlier key already
/// rewrote it, in which case the resolver sees the rewritten value.
pub fn simple_merge(a: &Value, b: &Value, resolver: Option<&dyn Resolver>) -> Result<Value> {
    let left = a.as_map().ok_or_else(|| MergeError::invalid("map", a))?;
    let right = b.as_map().ok_or_else(|| MergeError::invalid("map", b))?;

    let mut merged = left.clone();
    for (key, incoming) in right {
        let Some(existing) = merged.remove(key) else {
            merged.insert(key.clone(), incoming.clone());
            continue;
        };
        let Some(resolver) = resolver else {
            return Err(MergeError::KeyConflict {
                key: key.clone(),
                existing,
                incoming: incoming.clone(),
            });
        };
        let partial = resolver.resolve(key, &existing, incoming)?;
        merged = match simple_merge(&Value::Map(merged), &partial, Some(resolver))? {
            Value::Map(m) => m,
            other => return Err(MergeError::invalid("map", &other)),
        };
    }
    Ok(Value::Map(merged))
}
