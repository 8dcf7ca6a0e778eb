//! The merge engine: a classifier and a rule table composed into one call.
//!
//! `merge(a, b)` labels both operands, looks up the rule for the ordered
//! label pair and runs it. Mapping rules recurse back into the same engine
//! for conflicting values, so nested data merges with whatever configuration
//! the engine currently has.
//!
//! Each engine owns its configuration. Two engines never share types or
//! rules, and mutating one leaves the other untouched.

use std::fmt;
use std::sync::Arc;

use crate::builtins::{ListConcat, MapMerge, PairMerge, SetUnion, TupleConcat};
use crate::classifier::{Classifier, TypePredicate};
use crate::error::{MergeError, Result};
use crate::observer::MergeObserver;
use crate::rules::{MergeFn, RuleTable};
use crate::types::{
    BUILTIN_LABELS, DEFAULT_LABEL, DICT_LABEL, LIST_LABEL, SET_LABEL, Strictness, TUPLE_LABEL,
};
use crate::value::Value;

pub struct MergeEngine {
    classifier: Classifier,
    rules: RuleTable,
    observer: Option<Arc<dyn MergeObserver>>,
}

impl MergeEngine {
    /// An engine with no type definitions.
    ///
    /// A lenient engine starts with the pairing merge registered for
    /// `(default, default)`, so it can already merge anything. A pedantic
    /// engine starts empty.
    pub fn new(strictness: Strictness) -> Self {
        let mut rules = RuleTable::new(strictness);
        if strictness == Strictness::Lenient {
            rules.set(DEFAULT_LABEL, DEFAULT_LABEL, Arc::new(PairMerge), true);
        }
        Self {
            classifier: Classifier::new(strictness),
            rules,
            observer: None,
        }
    }

    pub fn strictness(&self) -> Strictness {
        self.classifier.strictness()
    }

    pub fn with_observer(mut self, observer: Arc<dyn MergeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn MergeObserver>>) {
        self.observer = observer;
    }

    /// Merge two values.
    ///
    /// Inputs are never modified. Merging is not idempotent: with the stock
    /// rules `merge(1, 1)` is the tuple `(1, 1)`. Cyclic data is not
    /// supported; recursion depth follows the nesting depth of the inputs.
    pub fn merge(&self, a: &Value, b: &Value) -> Result<Value> {
        let left = self.classify(a)?;
        let right = self.classify(b)?;
        if let Some(observer) = &self.observer {
            observer.on_dispatch(left, right);
        }
        let rule = self.rules.resolve(left, right, a, b)?;
        rule.merge(self, a, b)
    }

    /// Fold the values left to right with [`merge`](Self::merge).
    pub fn merge_all<'a, I>(&self, values: I) -> Result<Value>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut values = values.into_iter();
        let first = values.next().ok_or(MergeError::InvalidArgument {
            expected: "at least one value",
            found: "nothing".to_string(),
        })?;
        values.try_fold(first.clone(), |acc, next| self.merge(&acc, next))
    }

    pub fn classify(&self, value: &Value) -> Result<&str> {
        let label = self.classifier.classify(value)?;
        if let Some(observer) = &self.observer {
            observer.on_classify(value, label);
        }
        Ok(label)
    }

    /// Define (or redefine) a kind at highest priority.
    pub fn define_type<P>(&mut self, label: impl Into<String>, predicate: P)
    where
        P: TypePredicate + 'static,
    {
        let label = label.into();
        tracing::debug!(label = %label, "defining type");
        self.classifier.define(label, Arc::new(predicate));
    }

    /// Remove a kind. Rules mentioning it stay in the table, unreachable
    /// until the label is defined again.
    pub fn undefine_type(&mut self, label: &str) -> Result<()> {
        self.classifier.undefine(label)?;
        tracing::debug!(label, "undefined type");
        Ok(())
    }

    /// Type labels in priority order, highest first. The implicit lenient
    /// `default` label is not listed.
    pub fn list_types(&self) -> Vec<String> {
        self.classifier.list()
    }

    /// See [`Classifier::reorder`].
    pub fn reorder_types<S: AsRef<str>>(&mut self, order: &[S]) {
        self.classifier.reorder(order);
    }

    /// Register `rule` for `(left, right)` and `(right, left)`.
    pub fn set_rule<F>(&mut self, left: &str, right: &str, rule: F)
    where
        F: MergeFn + 'static,
    {
        self.set_shared_rule(left, right, Arc::new(rule), true);
    }

    /// Register `rule` for `(left, right)` only.
    pub fn set_directed_rule<F>(&mut self, left: &str, right: &str, rule: F)
    where
        F: MergeFn + 'static,
    {
        self.set_shared_rule(left, right, Arc::new(rule), false);
    }

    pub fn set_shared_rule(
        &mut self,
        left: &str,
        right: &str,
        rule: Arc<dyn MergeFn>,
        commutative: bool,
    ) {
        tracing::debug!(left, right, commutative, "setting merge rule");
        self.rules.set(left, right, rule, commutative);
    }

    /// Remove the rules for `(left, right)` and `(right, left)`.
    pub fn delete_rule(&mut self, left: &str, right: &str) {
        self.delete_rule_with(left, right, true);
    }

    /// Remove the rule for `(left, right)` only.
    pub fn delete_directed_rule(&mut self, left: &str, right: &str) {
        self.delete_rule_with(left, right, false);
    }

    fn delete_rule_with(&mut self, left: &str, right: &str, commutative: bool) {
        tracing::debug!(left, right, commutative, "deleting merge rule");
        self.rules.delete(left, right, commutative);
    }

    /// Exact-match check, ignoring the lenient fallback.
    pub fn has_rule(&self, left: &str, right: &str) -> bool {
        self.rules.contains(left, right)
    }

    /// The rule registered for exactly `(left, right)`, if any.
    pub fn rule(&self, left: &str, right: &str) -> Option<&Arc<dyn MergeFn>> {
        self.rules.get(left, right)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    fn define_builtin_types(&mut self) {
        for label in BUILTIN_LABELS {
            let predicate: fn(&Value) -> bool = match label {
                LIST_LABEL => Value::is_list,
                TUPLE_LABEL => Value::is_tuple,
                SET_LABEL => Value::is_set,
                _ => Value::is_map,
            };
            self.classifier.define(label, Arc::new(predicate));
        }
    }

    /// Point every ordered pair of distinct `kinds` at the pairing merge.
    fn seed_pairing(&mut self, kinds: &[&str]) {
        let pairing: Arc<dyn MergeFn> = Arc::new(PairMerge);
        for left in kinds {
            for right in kinds {
                if left != right {
                    self.rules.set(left, right, pairing.clone(), false);
                }
            }
        }
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        create_default_engine()
    }
}

impl fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeEngine")
            .field("classifier", &self.classifier)
            .field("rules", &self.rules)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

/// The stock lenient engine.
///
/// Kinds `list`, `tuple`, `set` and `dict` (defined in that order, so `dict`
/// has the highest priority). Same-kind pairs concatenate, unite or merge
/// key-wise with recursive conflict resolution; every other pair, including
/// anything unclassified, falls to the pairing merge.
pub fn create_default_engine() -> MergeEngine {
    let mut engine = MergeEngine::new(Strictness::Lenient);
    engine.define_builtin_types();
    engine.rules.set(DICT_LABEL, DICT_LABEL, Arc::new(MapMerge::recursive()), true);
    engine.rules.set(TUPLE_LABEL, TUPLE_LABEL, Arc::new(TupleConcat), true);
    engine.rules.set(LIST_LABEL, LIST_LABEL, Arc::new(ListConcat), true);
    engine.rules.set(SET_LABEL, SET_LABEL, Arc::new(SetUnion), true);
    engine.seed_pairing(&[DEFAULT_LABEL, DICT_LABEL, TUPLE_LABEL, LIST_LABEL, SET_LABEL]);
    engine
}

/// The stock pedantic engine.
///
/// Same kinds and rules as [`create_default_engine`], minus anything for the
/// `default` label. Values matching no kind fail with `MissingType`, pairs
/// without a rule fail with `MissingRule`, and mappings only merge when
/// shared keys carry equal values.
pub fn create_pedantic_engine() -> MergeEngine {
    let mut engine = MergeEngine::new(Strictness::Pedantic);
    engine.define_builtin_types();
    engine.rules.set(DICT_LABEL, DICT_LABEL, Arc::new(MapMerge::strict()), true);
    engine.rules.set(TUPLE_LABEL, TUPLE_LABEL, Arc::new(TupleConcat), true);
    engine.rules.set(LIST_LABEL, LIST_LABEL, Arc::new(ListConcat), true);
    engine.rules.set(SET_LABEL, SET_LABEL, Arc::new(SetUnion), true);
    engine.seed_pairing(&[DICT_LABEL, TUPLE_LABEL, LIST_LABEL, SET_LABEL]);
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_new_lenient_engine_pairs_everything() {
        let engine = MergeEngine::new(Strictness::Lenient);
        assert!(engine.list_types().is_empty());
        let merged = engine.merge(&Value::list([1]), &Value::from(2)).unwrap();
        assert_eq!(merged, Value::tuple([1, 2]));
    }

    #[test]
    fn test_new_pedantic_engine_is_empty() {
        let engine = MergeEngine::new(Strictness::Pedantic);
        assert!(engine.rules().is_empty());
        assert!(matches!(
            engine.merge(&Value::from(1), &Value::from(2)),
            Err(MergeError::MissingType { .. })
        ));
    }

    #[test]
    fn test_default_engine_seeding() {
        let engine = create_default_engine();
        assert_eq!(engine.list_types(), vec!["dict", "set", "tuple", "list"]);
        // 5 diagonal + 20 off-diagonal
        assert_eq!(engine.rules().len(), 25);
        assert!(engine.has_rule("default", "list"));
        assert!(engine.has_rule("list", "default"));
    }

    #[test]
    fn test_pedantic_engine_seeding() {
        let engine = create_pedantic_engine();
        assert_eq!(engine.strictness(), Strictness::Pedantic);
        assert_eq!(engine.list_types(), vec!["dict", "set", "tuple", "list"]);
        assert_eq!(engine.rules().len(), 16);
        assert!(!engine.has_rule("default", "default"));
    }

    #[test]
    fn test_off_diagonal_override_is_honored() {
        let mut engine = create_default_engine();
        engine.set_directed_rule("list", "set", |a: &Value, _: &Value| -> Result<Value> {
            Ok(a.clone())
        });
        let list = Value::list([1]);
        let set = Value::set([2]);
        assert_eq!(engine.merge(&list, &set).unwrap(), list);
        assert_eq!(engine.merge(&set, &list).unwrap(), Value::tuple([2, 1]));
    }

    #[test]
    fn test_deleted_rule_falls_back_leniently() {
        let mut engine = create_default_engine();
        engine.delete_rule("list", "list");
        let merged = engine.merge(&Value::list([1]), &Value::list([2])).unwrap();
        assert_eq!(merged, Value::tuple([1, 2]));
    }

    #[test]
    fn test_lenient_survives_deleting_default_rule() {
        let mut engine = create_default_engine();
        engine.define_type("int", |v: &Value| matches!(v, Value::Int(_)));
        engine.delete_rule(DEFAULT_LABEL, DEFAULT_LABEL);
        assert!(!engine.has_rule(DEFAULT_LABEL, DEFAULT_LABEL));

        let merged = engine.merge(&Value::from(1), &Value::from(2)).unwrap();
        assert_eq!(merged, Value::tuple([1, 2]));
        let merged = engine.merge(&Value::from("a"), &Value::Null).unwrap();
        assert_eq!(merged, Value::tuple([Value::from("a"), Value::Null]));
    }

    #[test]
    fn test_rule_introspection() {
        let engine = create_default_engine();
        let set_rule = engine.rule("set", "set").unwrap();
        let merged = set_rule
            .merge(&engine, &Value::set([1]), &Value::set([2]))
            .unwrap();
        assert_eq!(merged, Value::set([1, 2]));
        assert!(engine.rule("set", "nope").is_none());

        let pedantic = create_pedantic_engine();
        assert!(pedantic.rule(DEFAULT_LABEL, DEFAULT_LABEL).is_none());
    }

    #[test]
    fn test_deleted_rule_fails_pedantically() {
        let mut engine = create_pedantic_engine();
        engine.delete_directed_rule("list", "set");
        assert!(engine.has_rule("set", "list"));
        let err = engine
            .merge(&Value::list([1]), &Value::set([2]))
            .unwrap_err();
        assert!(matches!(
            err,
            MergeError::MissingRule { ref left, ref right, .. } if left == "list" && right == "set"
        ));
    }

    #[test]
    fn test_undefined_type_leaves_rules_unreachable() {
        let mut engine = create_default_engine();
        engine.undefine_type("set").unwrap();
        assert!(engine.has_rule("set", "set"));
        let merged = engine.merge(&Value::set([1]), &Value::set([2])).unwrap();
        assert_eq!(merged, Value::tuple([1, 2]));
        assert!(matches!(
            engine.undefine_type("set"),
            Err(MergeError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_engines_are_independent() {
        let mut custom = create_default_engine();
        let stock = create_default_engine();
        custom.set_rule("set", "set", |a: &Value, b: &Value| -> Result<Value> {
            match (a, b) {
                (Value::Set(x), Value::Set(y)) => Ok(Value::Set(x & y)),
                _ => Ok(Value::Null),
            }
        });
        let a = Value::set([1, 2]);
        let b = Value::set([2, 3]);
        assert_eq!(custom.merge(&a, &b).unwrap(), Value::set([2]));
        assert_eq!(stock.merge(&a, &b).unwrap(), Value::set([1, 2, 3]));
    }

    #[test]
    fn test_recursion_uses_dispatching_engine() {
        let mut engine = create_default_engine();
        engine.define_type("int", |v: &Value| matches!(v, Value::Int(_)));
        engine.set_rule("int", "int", |a: &Value, b: &Value| -> Result<Value> {
            match (a, b) {
                (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x + y)),
                _ => unreachable!(),
            }
        });
        let merged = engine
            .merge(
                &Value::map([("n", Value::map([("m", 1)]))]),
                &Value::map([("n", Value::map([("m", 41)]))]),
            )
            .unwrap();
        assert_eq!(merged, Value::map([("n", Value::map([("m", 42)]))]));
    }

    #[test]
    fn test_merge_all_folds_left_to_right() {
        let engine = create_default_engine();
        let values = [Value::list([1]), Value::list([2]), Value::list([3])];
        assert_eq!(engine.merge_all(&values).unwrap(), Value::list([1, 2, 3]));
        assert_eq!(
            engine.merge_all(&values[..1]).unwrap(),
            Value::list([1])
        );
        let none: [Value; 0] = [];
        assert!(matches!(
            engine.merge_all(&none),
            Err(MergeError::InvalidArgument { .. })
        ));
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl MergeObserver for Recorder {
        fn on_classify(&self, _value: &Value, label: &str) {
            self.events.lock().unwrap().push(format!("classify:{label}"));
        }

        fn on_dispatch(&self, left: &str, right: &str) {
            self.events.lock().unwrap().push(format!("dispatch:{left}:{right}"));
        }
    }

    #[test]
    fn test_observer_is_opt_in() {
        let recorder = Arc::new(Recorder::default());
        let engine = create_default_engine().with_observer(recorder.clone());
        engine.merge(&Value::list([1]), &Value::from(2)).unwrap();
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["classify:list", "classify:default", "dispatch:list:default"]
        );
    }
}
