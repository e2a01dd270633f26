use uns_state::counter::CounterMap;

#[test]
fn test_increment() {
    let mut c = CounterMap::new();
    c.increment("a");
    c.increment("a");
    assert_eq!(c.get("a"), 2);
    assert_eq!(c.get("missing"), 0);
}

#[test]
fn test_add_and_total() {
    let mut c = CounterMap::new();
    c.add("a", 5);
    c.add("b", 3);
    c.increment("b");
    assert_eq!(c.total(), 9);
    assert_eq!(c.len(), 2);
}

#[test]
fn test_preserves_first_seen_order() {
    let mut c = CounterMap::new();
    c.increment("zeta");
    c.increment("alpha");
    c.add("zeta", 10);
    let keys: Vec<&str> = c.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["zeta", "alpha"]);
}

#[test]
fn test_with_keys_starts_at_zero() {
    let c = CounterMap::with_keys(["copy", "search"]);
    assert!(c.contains("copy"));
    assert!(!c.contains("paste"));
    assert_eq!(c.total(), 0);
    assert!(!c.is_empty());
}

#[test]
fn test_serializes_as_ordered_object() {
    let mut c = CounterMap::new();
    c.add("b", 2);
    c.add("a", 1);
    assert_eq!(serde_json::to_string(&c).unwrap(), r#"{"b":2,"a":1}"#);
}

#[test]
fn test_add_saturates() {
    let mut c = CounterMap::new();
    c.add("a", u64::MAX);
    c.increment("a");
    assert_eq!(c.get("a"), u64::MAX);
}
