// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end round-trips through both wire formats.

use chrono::{FixedOffset, TimeZone};
use sciwire::formats::{json, msgpack};
use sciwire::{
    CoderRegistry, Config, DType, DateTimeCoder, Frame, FrameCoder, Map, MaskedArray, NdArray,
    SetCoder, TimeDelta, TimeDeltaCoder, Value, ValueSet,
};

/// A tree exercising every default coder plus plain containers.
fn kitchen_sink() -> Value {
    let timestamp = FixedOffset::east_opt(-5 * 3600)
        .expect("valid offset")
        .with_ymd_and_hms(2023, 11, 5, 1, 30, 0)
        .single()
        .expect("valid timestamp");

    let grid = NdArray::from_elems(vec![2, 3], &[0.5f64, 1.5, -2.5, 3.5, 4.5, 5.5])
        .expect("valid array");
    let masked = MaskedArray::new(
        NdArray::from_elems(vec![3], &[10i64, 20, 30]).expect("valid array"),
        vec![false, true, false],
    )
    .expect("valid mask");
    let labels = NdArray::from_values(
        vec![2],
        vec![Value::from("alpha"), Value::TimeDelta(TimeDelta::new(0, 90, 0))],
    )
    .expect("valid object array");

    let mut frame = Frame::new();
    frame
        .push_column("site", vec![Value::from("n1"), Value::from("n2")])
        .expect("string column");
    frame
        .push_column("value", vec![Value::from(0.125f64), Value::from(7i64)])
        .expect("mixed column");

    let tags: ValueSet = [Value::from("raw"), Value::from(3i64), Value::Null]
        .into_iter()
        .collect();

    let mut inner = Map::new();
    inner.insert("when".to_string(), Value::DateTime(timestamp));
    inner.insert(
        "window".to_string(),
        Value::TimeDelta(TimeDelta::new(0, 3600, 250)),
    );
    inner.insert("tags".to_string(), Value::Set(tags));

    let mut root = Map::new();
    root.insert("meta".to_string(), Value::Map(inner));
    root.insert("grid".to_string(), Value::Array(grid));
    root.insert("masked".to_string(), Value::Masked(masked));
    root.insert("labels".to_string(), Value::Array(labels));
    root.insert("frame".to_string(), Value::Frame(frame));
    root.insert("count".to_string(), Value::from(12i64));
    root.insert("blob".to_string(), Value::Bytes(vec![1, 2, 3, 4, 5]));
    Value::Map(root)
}

#[test]
fn test_kitchen_sink_roundtrip_json() {
    let config = Config::default();
    let tree = kitchen_sink();
    let text = json::to_string(&tree, &config).expect("serialize");
    assert_eq!(json::from_str(&text, &config).expect("deserialize"), tree);
}

#[test]
fn test_kitchen_sink_roundtrip_msgpack() {
    let config = Config::default();
    let tree = kitchen_sink();
    let bytes = msgpack::to_vec(&tree, &config).expect("serialize");
    assert_eq!(
        msgpack::from_slice(&bytes, &config).expect("deserialize"),
        tree
    );
}

#[test]
fn test_formats_agree_after_conversion() {
    // json -> value -> msgpack -> value: both decoded trees equal.
    let config = Config::default();
    let tree = kitchen_sink();
    let text = json::to_string(&tree, &config).expect("serialize json");
    let decoded = json::from_str(&text, &config).expect("deserialize json");
    let bytes = msgpack::to_vec(&decoded, &config).expect("serialize msgpack");
    assert_eq!(
        msgpack::from_slice(&bytes, &config).expect("deserialize msgpack"),
        tree
    );
}

#[test]
fn test_map_with_set_and_zero_array_both_formats() {
    // {"a": [1, 2, {4, 5, 6}], "b": <2x3 float64 zeros>}
    let config = Config::default();
    let set: ValueSet = [Value::from(4i64), Value::from(5i64), Value::from(6i64)]
        .into_iter()
        .collect();
    let mut root = Map::new();
    root.insert(
        "a".to_string(),
        Value::List(vec![Value::from(1i64), Value::from(2i64), Value::Set(set)]),
    );
    root.insert(
        "b".to_string(),
        Value::Array(NdArray::zeros(DType::F64, vec![2, 3]).expect("valid array")),
    );
    let tree = Value::Map(root);

    let text = json::to_string(&tree, &config).expect("serialize json");
    assert_eq!(json::from_str(&text, &config).expect("deserialize json"), tree);

    let bytes = msgpack::to_vec(&tree, &config).expect("serialize msgpack");
    assert_eq!(
        msgpack::from_slice(&bytes, &config).expect("deserialize msgpack"),
        tree
    );
}

#[test]
fn test_set_inside_object_array_inside_list() {
    // Container recursion, coder dispatch and nested envelope resolution in
    // one tree: the object-dtype array carries a set as one of its elements.
    let config = Config::default();
    let members: ValueSet = [Value::from(4i64), Value::from(5i64), Value::from(6i64)]
        .into_iter()
        .collect();
    let cells = NdArray::from_values(
        vec![2],
        vec![Value::Set(members), Value::from("plain")],
    )
    .expect("valid object array");

    let mut root = Map::new();
    root.insert(
        "runs".to_string(),
        Value::List(vec![Value::from(1i64), Value::Array(cells)]),
    );
    let tree = Value::Map(root);

    let text = json::to_string(&tree, &config).expect("serialize json");
    assert_eq!(json::from_str(&text, &config).expect("deserialize json"), tree);

    let bytes = msgpack::to_vec(&tree, &config).expect("serialize msgpack");
    assert_eq!(
        msgpack::from_slice(&bytes, &config).expect("deserialize msgpack"),
        tree
    );
}

#[test]
fn test_envelope_free_trees_are_idempotent() {
    let config = Config::default();
    let mut map = Map::new();
    map.insert("x".to_string(), Value::from(1i64));
    map.insert(
        "y".to_string(),
        Value::List(vec![Value::from("a"), Value::Null, Value::from(false)]),
    );
    let tree = Value::Map(map);

    let text = json::to_string(&tree, &config).expect("serialize");
    assert_eq!(json::from_str(&text, &config).expect("deserialize"), tree);
}

#[test]
fn test_forward_compat_unknown_tag_json() {
    let config = Config::default();
    let text = r#"{"payload":{"q":7,"~#type":"quaternion"}}"#;
    let value = json::from_str(text, &config).expect("deserialize");
    let payload = value
        .as_map()
        .and_then(|m| m.get("payload"))
        .and_then(Value::as_map)
        .expect("inert envelope kept as mapping");
    assert_eq!(payload.get("~#type"), Some(&Value::from("quaternion")));
    assert_eq!(payload.get("q"), Some(&Value::from(7i64)));

    // Re-encoding the inert mapping reproduces the same document.
    assert_eq!(json::to_string(&value, &config).expect("serialize"), text);
}

#[test]
fn test_fallback_gating_through_wire() {
    let slim =
        CoderRegistry::new(vec![Box::new(DateTimeCoder), Box::new(TimeDeltaCoder)])
            .expect("valid registry");
    let strict = Config::new().with_registry(slim);

    let set: ValueSet = [Value::from(1i64)].into_iter().collect();
    let tree = Value::Set(set);

    // Disabled: loud failure.
    let err = msgpack::to_vec(&tree, &strict).unwrap_err();
    assert!(err.to_string().contains("not supported"));

    // Enabled: round-trips within this build.
    let slim = CoderRegistry::new(vec![Box::new(DateTimeCoder), Box::new(TimeDeltaCoder)])
        .expect("valid registry");
    let lax = Config::new().with_registry(slim).with_opaque_fallback(true);
    let bytes = msgpack::to_vec(&tree, &lax).expect("serialize with fallback");
    assert_eq!(msgpack::from_slice(&bytes, &lax).expect("deserialize"), tree);
}

#[test]
fn test_custom_registry_subset_and_order() {
    // A registry with only set and frame coders: those round-trip, others fail.
    let registry = CoderRegistry::new(vec![Box::new(SetCoder), Box::new(FrameCoder)])
        .expect("valid registry");
    let config = Config::new().with_registry(registry);

    let set: ValueSet = [Value::from(2i64)].into_iter().collect();
    let text = json::to_string(&Value::Set(set.clone()), &config).expect("serialize");
    assert_eq!(
        json::from_str(&text, &config).expect("deserialize"),
        Value::Set(set)
    );

    let arr = NdArray::zeros(DType::U8, vec![1]).expect("valid array");
    assert!(json::to_string(&Value::Array(arr), &config).is_err());
}

#[test]
fn test_masked_array_decode_reconstructs_then_overlays() {
    let config = Config::default();
    let masked = MaskedArray::new(
        NdArray::from_elems(vec![2, 2], &[1.0f32, 2.0, 3.0, 4.0]).expect("valid array"),
        vec![true, false, false, true],
    )
    .expect("valid mask");
    let tree = Value::Masked(masked.clone());

    let bytes = msgpack::to_vec(&tree, &config).expect("serialize");
    let back = msgpack::from_slice(&bytes, &config).expect("deserialize");
    let Value::Masked(decoded) = back else {
        panic!("expected a masked array back");
    };
    assert_eq!(decoded.data(), masked.data());
    assert_eq!(decoded.mask(), masked.mask());
}

#[test]
fn test_stream_roundtrip_both_formats() {
    let config = Config::default();
    let tree = kitchen_sink();

    let mut json_buf = Vec::new();
    json::to_writer(&mut json_buf, &tree, &config).expect("write json stream");
    assert_eq!(
        json::from_reader(json_buf.as_slice(), &config).expect("read json stream"),
        tree
    );

    let mut mp_buf = Vec::new();
    msgpack::to_writer(&mut mp_buf, &tree, &config).expect("write msgpack stream");
    assert_eq!(
        msgpack::from_reader(mp_buf.as_slice(), &config).expect("read msgpack stream"),
        tree
    );
}

#[test]
fn test_file_roundtrip_both_formats() {
    let config = Config::default();
    let tree = kitchen_sink();
    let dir = tempfile::tempdir().expect("temp dir");

    let json_path = dir.path().join("tree.json");
    json::to_file(&json_path, &tree, &config).expect("write json file");
    assert_eq!(json::from_file(&json_path, &config).expect("read json file"), tree);

    let mpk_path = dir.path().join("tree.mpk");
    msgpack::to_file(&mpk_path, &tree, &config).expect("write msgpack file");
    assert_eq!(
        msgpack::from_file(&mpk_path, &config).expect("read msgpack file"),
        tree
    );
}
