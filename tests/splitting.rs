use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
fn small_document_comes_back_whole() {
    let value = json!({"a": 1});
    let parts = sisl::split(&value, 100).unwrap();
    assert_eq!(parts, vec!["{a: !int \"1\"}"]);
}

#[rstest]
fn exact_fit_is_not_split() {
    let value = json!({"a": 1});
    let full = sisl::encode(&value).unwrap();
    let parts = sisl::split(&value, full.len()).unwrap();
    assert_eq!(parts, vec![full]);
}

#[rstest]
fn one_byte_under_forces_a_split() {
    let value = json!({"abc": 2, "def": 3});
    let full = sisl::encode(&value).unwrap();
    let parts = sisl::split(&value, full.len() - 1).unwrap();
    assert!(parts.len() > 1);
}

#[rstest]
#[case(json!({"a": 1, "b": 2, "c": 3}), 18)]
#[case(json!({"x": 100, "y": 200, "z": 300}), 20)]
#[case(json!({"a": true, "b": false, "c": true}), 25)]
#[case(json!({"name": "Alice", "city": "NYC"}), 25)]
fn split_respects_budget_and_merges_back(#[case] value: Value, #[case] budget: usize) {
    let parts = sisl::split(&value, budget).unwrap();
    assert!(parts.len() > 1);
    for part in &parts {
        assert!(part.len() <= budget, "'{part}' exceeds {budget} bytes");
        // Every fragment is a complete document on its own.
        sisl::decode(part).unwrap();
    }
    assert_eq!(sisl::merge(&parts).unwrap(), value);
}

#[rstest]
fn many_keys_pack_greedily() {
    let mut object = serde_json::Map::new();
    for i in 0..10 {
        object.insert(format!("key{i}"), json!(i));
    }
    let value = Value::Object(object);

    let parts = sisl::split(&value, 40).unwrap();
    assert!(parts.len() > 1);
    for window in parts.windows(2) {
        // Greedy: no part could have absorbed the next part's first entry.
        assert!(window[0].len() <= 40);
    }
    assert_eq!(sisl::merge(&parts).unwrap(), value);
}

#[rstest]
fn budget_of_one_is_an_error() {
    let err = sisl::split(&json!({"a": 1, "b": 2}), 1).unwrap_err();
    assert_eq!(err.kind(), sisl::ErrorKind::Codec);
}

#[rstest]
fn budget_below_single_fragment_is_an_error() {
    let err = sisl::split(&json!({"key": "a rather long string"}), 10).unwrap_err();
    assert!(err.to_string().contains("max-length too small"));
}

#[rstest]
fn nested_values_split_along_paths() {
    let value = json!({"user": {"name": "Ada", "tags": ["a", "b"]}, "n": 1});
    let parts = sisl::split(&value, 40).unwrap();
    for part in &parts {
        assert!(part.len() <= 40);
    }
    assert_eq!(sisl::merge(&parts).unwrap(), value);
}

#[rstest]
fn split_then_merge_preserves_key_order() {
    let value = json!({"zebra": 1, "apple": 2, "mango": 3});
    let parts = sisl::split(&value, 20).unwrap();
    let merged = sisl::merge(&parts).unwrap();
    let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["zebra", "apple", "mango"]);
}

#[rstest]
fn empty_object_always_fits() {
    let parts = sisl::split(&json!({}), 2).unwrap();
    assert_eq!(parts, vec!["{}"]);
}
