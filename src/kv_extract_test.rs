use super::*;

fn extract(bytes: &[u8]) -> Vec<KeyValue> {
    LogfmtExtractor.extract(bytes)
}

#[test]
fn bare_pairs() {
    let pairs = extract(b"level=error msg=timeout host=s1");
    assert_eq!(
        pairs,
        vec![
            KeyValue { key: "level".into(), value: "error".into() },
            KeyValue { key: "msg".into(), value: "timeout".into() },
            KeyValue { key: "host".into(), value: "s1".into() },
        ]
    );
}

#[test]
fn quoted_value_with_escapes() {
    let pairs = extract(br#"msg="quote: \" and slash: \\""#);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].key, "msg");
    assert_eq!(pairs[0].value, r#"quote: " and slash: \"#);
}

#[test]
fn requires_no_whitespace_around_equals() {
    let pairs = extract(b"key = value");
    assert!(pairs.is_empty());
}

#[test]
fn keys_and_values_are_lowercased() {
    let pairs = extract(b"ENV=PROD");
    assert_eq!(pairs[0].key, "env");
    assert_eq!(pairs[0].value, "prod");
}

#[test]
fn duplicate_pairs_are_preserved_in_order() {
    let pairs = extract(b"a=b a=b c=d");
    assert_eq!(pairs.len(), 3);
}

#[test]
fn combined_extractor_concatenates_sub_extractor_output() {
    let combined = CombinedExtractor::default_logfmt();
    let pairs = combined.extract(b"a=1 b=2");
    assert_eq!(pairs.len(), 2);
}
