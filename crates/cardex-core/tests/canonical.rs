use cardex_core::{canonical, MachineError};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn stable_json_bytes_are_key_order_deterministic() {
    let a = json!({"z": 2, "a": 1});
    let b = json!({"a": 1, "z": 2});
    let ba = canonical::stable_json_bytes(&a).expect("stable json a");
    let bb = canonical::stable_json_bytes(&b).expect("stable json b");
    assert_eq!(ba, bb);
}

#[test]
fn machine_error_serializes_details_sorted() {
    let err = MachineError::new("invalid_param", "bad value")
        .with_detail("value", "x")
        .with_detail("param", "cost_min");
    let text = serde_json::to_string(&err).expect("json");
    assert_eq!(
        text,
        r#"{"code":"invalid_param","message":"bad value","details":{"param":"cost_min","value":"x"}}"#
    );
    assert_eq!(err.to_string(), "invalid_param: bad value");
}

proptest! {
    #[test]
    fn stable_json_hash_ignores_insertion_order(a in "[a-z]{1,8}", b in "[a-z]{1,8}", av in any::<u32>(), bv in any::<u32>()) {
        prop_assume!(a != b);
        let mut first = serde_json::Map::new();
        first.insert(a.clone(), json!(av));
        first.insert(b.clone(), json!(bv));
        let mut second = serde_json::Map::new();
        second.insert(b, json!(bv));
        second.insert(a, json!(av));
        let h1 = canonical::stable_json_hash_hex(&first).expect("h1");
        let h2 = canonical::stable_json_hash_hex(&second).expect("h2");
        prop_assert_eq!(h1, h2);
    }
}
