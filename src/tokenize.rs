//! Deterministic segmentation of raw bytes into lowercase tokens.
//!
//! [tokenize] depends only on its input bytes: any byte that is not a
//! UTF-8 letter, digit, or one of `_ - . /` splits a token, as does any
//! control byte or invalid UTF-8 sequence. Tokens shorter than two
//! characters are discarded.

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}

/// Tokenize a byte slice per the contract above. Invalid UTF-8 is treated
/// as a split point, never as an error.
pub fn tokenize(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        // `from_utf8_lossy` maps invalid sequences to U+FFFD, which is not
        // alphanumeric and therefore already acts as a split point.
        if !c.is_control() && is_token_char(c) {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            push_token(&mut tokens, &mut current);
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, &mut current);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    if current.chars().count() >= 2 {
        tokens.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
#[path = "tokenize_test.rs"]
mod tokenize_test;
