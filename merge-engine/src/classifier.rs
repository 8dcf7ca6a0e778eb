//! Type classification.
//!
//! A [`Classifier`] holds an ordered list of `(label, predicate)` entries.
//! Classification walks the list front to back and returns the label of the
//! first predicate that accepts the value. Defining a type puts it at the
//! front, so the most recently defined predicate wins when several match.

use std::fmt;
use std::sync::Arc;

use crate::error::{MergeError, Result};
use crate::types::{DEFAULT_LABEL, Strictness};
use crate::value::Value;

/// A test deciding whether a value belongs to a kind.
///
/// Implemented for any `Fn(&Value) -> bool`. A predicate that panics is not
/// caught; the panic unwinds through `classify` to its caller.
pub trait TypePredicate: Send + Sync {
    fn test(&self, value: &Value) -> bool;
}

impl<F> TypePredicate for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn test(&self, value: &Value) -> bool {
        self(value)
    }
}

struct TypeEntry {
    label: String,
    predicate: Arc<dyn TypePredicate>,
}

pub struct Classifier {
    entries: Vec<TypeEntry>,
    strictness: Strictness,
}

impl Classifier {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            entries: Vec::new(),
            strictness,
        }
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Label the value with the highest-priority matching type.
    ///
    /// Lenient classifiers answer [`DEFAULT_LABEL`] when nothing matches;
    /// pedantic ones fail with [`MergeError::MissingType`].
    pub fn classify(&self, value: &Value) -> Result<&str> {
        if let Some(entry) = self.entries.iter().find(|e| e.predicate.test(value)) {
            return Ok(entry.label.as_str());
        }
        match self.strictness {
            Strictness::Lenient => Ok(DEFAULT_LABEL),
            Strictness::Pedantic => Err(MergeError::MissingType {
                value: value.clone(),
            }),
        }
    }

    /// Register (or replace) the predicate for `label` at highest priority.
    pub fn define(&mut self, label: impl Into<String>, predicate: Arc<dyn TypePredicate>) {
        let label = label.into();
        self.entries.retain(|e| e.label != label);
        self.entries.insert(0, TypeEntry { label, predicate });
    }

    pub fn undefine(&mut self, label: &str) -> Result<()> {
        let pos = self
            .position(label)
            .ok_or_else(|| MergeError::UnknownLabel(label.to_string()))?;
        self.entries.remove(pos);
        Ok(())
    }

    /// Move the named labels to the front in the given order.
    ///
    /// Labels left out keep their previous relative order behind them.
    /// Names that are not defined are ignored.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        let mut front = Vec::with_capacity(self.entries.len());
        for label in order {
            if let Some(pos) = self.position(label.as_ref()) {
                front.push(self.entries.remove(pos));
            }
        }
        front.append(&mut self.entries);
        self.entries = front;
    }

    /// Labels in current priority order, highest first.
    pub fn list(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.label == label)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("labels", &self.list())
            .field("strictness", &self.strictness)
            .finish()
    }
}
