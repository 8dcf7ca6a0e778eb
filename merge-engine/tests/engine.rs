use merge_engine::{
    MergeError, Result, Strictness, Value, create_default_engine, create_pedantic_engine,
};

#[test]
fn test_same_kind_merges_preserve_kind() {
    let engine = create_default_engine();

    let lists = engine.merge(&Value::list([1, 2]), &Value::list([3])).unwrap();
    assert_eq!(lists, Value::list([1, 2, 3]));

    let tuples = engine.merge(&Value::tuple([1]), &Value::tuple([2])).unwrap();
    assert_eq!(tuples, Value::tuple([1, 2]));

    let sets = engine.merge(&Value::set([1]), &Value::set([2])).unwrap();
    assert!(sets.is_set());

    let maps = engine
        .merge(&Value::map([("a", 1)]), &Value::map([("b", 2)]))
        .unwrap();
    assert_eq!(maps, Value::map([("a", 1), ("b", 2)]));
}

#[test]
fn test_mixed_kinds_pair_in_call_order() {
    let engine = create_default_engine();
    let scalar = Value::from(1);
    let seq = Value::tuple(["a", "b"]);

    assert_eq!(
        engine.merge(&scalar, &seq).unwrap(),
        Value::tuple([Value::from(1), "a".into(), "b".into()])
    );
    assert_eq!(
        engine.merge(&seq, &scalar).unwrap(),
        Value::tuple([Value::from("a"), "b".into(), 1.into()])
    );
}

#[test]
fn test_mixed_kinds_are_not_commutative() {
    let engine = create_default_engine();
    let list = Value::list([1, 2]);
    let set = Value::set([3]);
    let forward = engine.merge(&list, &set).unwrap();
    let backward = engine.merge(&set, &list).unwrap();
    assert_eq!(forward, Value::tuple([1, 2, 3]));
    assert_eq!(backward, Value::tuple([3, 1, 2]));
    assert_ne!(forward, backward);
}

#[test]
fn test_map_with_sequence_wraps_map() {
    let engine = create_default_engine();
    let map = Value::map([("k", 1)]);
    let merged = engine.merge(&map, &Value::list([2])).unwrap();
    assert_eq!(merged, Value::tuple([map, Value::from(2)]));
}

#[test]
fn test_map_merge_is_key_order_independent() {
    let engine = create_default_engine();
    let a = Value::map([("x", 1), ("y", 2)]);
    let b = Value::map([("z", 3)]);
    assert_eq!(engine.merge(&a, &b).unwrap(), engine.merge(&b, &a).unwrap());
}

#[test]
fn test_recursive_map_merge() {
    let engine = create_default_engine();
    let a = Value::map([("a", Value::map([("x", 1)])), ("b", Value::from(2))]);
    let b = Value::map([("a", Value::map([("y", 2)])), ("c", Value::from(3))]);
    assert_eq!(
        engine.merge(&a, &b).unwrap(),
        Value::map([
            ("a", Value::map([("x", 1), ("y", 2)])),
            ("b", Value::from(2)),
            ("c", Value::from(3)),
        ])
    );
}

#[test]
fn test_conflicting_scalars_pair_inside_maps() {
    let engine = create_default_engine();
    let merged = engine
        .merge(&Value::map([("k", "a")]), &Value::map([("k", "b")]))
        .unwrap();
    assert_eq!(merged, Value::map([("k", Value::tuple(["a", "b"]))]));
}

#[test]
fn test_set_union_and_intersection_override() {
    let mut engine = create_default_engine();
    assert_eq!(
        engine
            .merge(&Value::set([1, 2, 3]), &Value::set([3, 4, 5]))
            .unwrap(),
        Value::set([1, 2, 3, 4, 5])
    );

    engine.set_rule("set", "set", |a: &Value, b: &Value| -> Result<Value> {
        match (a, b) {
            (Value::Set(x), Value::Set(y)) => Ok(Value::Set(x & y)),
            _ => Err(MergeError::InvalidArgument {
                expected: "set",
                found: format!("{} and {}", a.kind_name(), b.kind_name()),
            }),
        }
    });
    assert_eq!(
        engine
            .merge(&Value::set([1, 2, 3, 4]), &Value::set([3, 4, 5, 6]))
            .unwrap(),
        Value::set([3, 4])
    );
}

#[test]
fn test_merge_is_not_idempotent() {
    let engine = create_default_engine();
    let one = Value::from(1);
    assert_eq!(engine.merge(&one, &one).unwrap(), Value::tuple([1, 1]));
    assert_ne!(engine.merge(&one, &one).unwrap(), one);
}

#[test]
fn test_reorder_types() {
    let mut engine = create_default_engine();
    assert_eq!(engine.list_types(), vec!["dict", "set", "tuple", "list"]);
    engine.reorder_types(&["dict"]);
    assert_eq!(engine.list_types(), vec!["dict", "set", "tuple", "list"]);
    engine.reorder_types(&["list"]);
    assert_eq!(engine.list_types(), vec!["list", "dict", "set", "tuple"]);
}

#[test]
fn test_priority_decides_overlapping_kinds() {
    let mut engine = create_default_engine();
    engine.define_type("pair", |v: &Value| {
        matches!(v, Value::Tuple(items) if items.len() == 2)
    });
    engine.set_rule("pair", "pair", |a: &Value, _: &Value| -> Result<Value> {
        Ok(a.clone())
    });
    let a = Value::tuple([1, 2]);
    let b = Value::tuple([3, 4]);
    assert_eq!(engine.merge(&a, &b).unwrap(), a);

    engine.reorder_types(&["tuple"]);
    assert_eq!(engine.merge(&a, &b).unwrap(), Value::tuple([1, 2, 3, 4]));
}

#[test]
fn test_pedantic_key_conflict() {
    let engine = create_pedantic_engine();
    let err = engine
        .merge(&Value::map([("k", 1)]), &Value::map([("k", 2)]))
        .unwrap_err();
    assert!(matches!(err, MergeError::KeyConflict { .. }));
    assert!(err.to_string().contains("\"k\""));
}

#[test]
fn test_pedantic_equal_shared_keys_merge() {
    let engine = create_pedantic_engine();
    let merged = engine
        .merge(
            &Value::map([("k", 1), ("a", 2)]),
            &Value::map([("k", 1), ("b", 3)]),
        )
        .unwrap();
    assert_eq!(merged, Value::map([("a", 2), ("b", 3), ("k", 1)]));
}

#[test]
fn test_pedantic_missing_type() {
    let engine = create_pedantic_engine();
    let err = engine.merge(&Value::from(1), &Value::list([2])).unwrap_err();
    assert!(matches!(err, MergeError::MissingType { value } if value == Value::from(1)));
}

#[test]
fn test_pedantic_missing_rule_for_custom_kind() {
    let mut engine = create_pedantic_engine();
    engine.define_type("int", |v: &Value| matches!(v, Value::Int(_)));
    let err = engine.merge(&Value::from(1), &Value::from(2)).unwrap_err();
    assert!(matches!(
        err,
        MergeError::MissingRule { ref left, ref right, .. } if left == "int" && right == "int"
    ));
    assert!(err.to_string().contains("int"));
}

#[test]
fn test_pedantic_opt_in_default_kind() {
    let mut engine = create_pedantic_engine();
    engine.define_type("any", |_: &Value| true);
    engine.reorder_types(&["dict", "set", "tuple", "list"]);
    engine.set_rule("any", "any", merge_engine::PairMerge);
    assert_eq!(
        engine.merge(&Value::from(1), &Value::from(2)).unwrap(),
        Value::tuple([1, 2])
    );
    assert_eq!(engine.strictness(), Strictness::Pedantic);
}

#[test]
fn test_lenient_never_reports_missing() {
    let mut engine = create_default_engine();
    engine.define_type("odd", |_: &Value| true);
    let merged = engine.merge(&Value::from(1), &Value::from(2)).unwrap();
    assert_eq!(merged, Value::tuple([1, 2]));
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(create_default_engine());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                engine
                    .merge(&Value::list([i]), &Value::list([i + 1]))
                    .unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let i = i as i64;
        assert_eq!(handle.join().unwrap(), Value::list([i, i + 1]));
    }
}
