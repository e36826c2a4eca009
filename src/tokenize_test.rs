use super::*;

#[test]
fn splits_on_whitespace_and_punctuation() {
    let tokens = tokenize(b"error: connection-refused to host/port!");
    assert_eq!(
        tokens,
        vec!["error", "connection-refused", "to", "host/port"]
    );
}

#[test]
fn discards_single_character_tokens() {
    let tokens = tokenize(b"a b cd e");
    assert_eq!(tokens, vec!["cd"]);
}

#[test]
fn lowercases_ascii_and_unicode() {
    let tokens = tokenize("ERROR Straße".as_bytes());
    assert_eq!(tokens, vec!["error", "straße"]);
}

#[test]
fn splits_on_invalid_utf8_and_control_bytes() {
    let mut bytes = b"abc".to_vec();
    bytes.push(0xFF);
    bytes.extend_from_slice(b"de\x01fg");
    let tokens = tokenize(&bytes);
    assert_eq!(tokens, vec!["abc", "de", "fg"]);
}

#[test]
fn deterministic_on_repeated_calls() {
    let input = b"repeated token stream with repeated words";
    assert_eq!(tokenize(input), tokenize(input));
}

#[test]
fn never_panics_on_random_bytes() {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let len = rng.gen_range(0..64);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let _ = tokenize(&bytes); // must not panic on arbitrary input
    }
}
