//! Array wire format: an ordered token list joined into one string.
//!
//! Tokens are escaped, joined on a fixed delimiter, then the whole result is
//! run through a printable-ASCII rotation. The rotation keeps the delimiter
//! and escape characters out of the range the identifier packing layer treats
//! specially; it is a reversible transposition, not a security measure.
//!
//! Invariant: `split_tokens(&join_tokens(tokens)) == tokens`, and the empty
//! list maps to the empty string.

use crate::error::CodecError;

/// Token separator inside a joined list. Disjoint from base-36 digits.
pub const DELIMITER: char = ',';

/// Escape character for literal delimiter/escape occurrences inside a token.
pub const ESCAPE: char = '~';

/// Rotation applied to printable ASCII after joining.
const SHIFT: u32 = 7;

const ASCII_LO: u32 = 0x20;
const ASCII_SPAN: u32 = 95;

fn rotate(c: char, offset: u32) -> char {
    let code = c as u32;
    if (ASCII_LO..ASCII_LO + ASCII_SPAN).contains(&code) {
        let shifted = ASCII_LO + (code - ASCII_LO + offset) % ASCII_SPAN;
        // Stays inside printable ASCII, always a valid scalar.
        char::from_u32(shifted).unwrap_or(c)
    } else {
        c
    }
}

fn shift_text(text: &str) -> String {
    text.chars().map(|c| rotate(c, SHIFT)).collect()
}

fn unshift_text(text: &str) -> String {
    text.chars().map(|c| rotate(c, ASCII_SPAN - SHIFT)).collect()
}

/// Join an ordered token list into one string.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    if tokens.is_empty() {
        return String::new();
    }
    let mut joined = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            joined.push(DELIMITER);
        }
        for c in token.as_ref().chars() {
            if c == DELIMITER || c == ESCAPE {
                joined.push(ESCAPE);
            }
            joined.push(c);
        }
    }
    shift_text(&joined)
}

/// Split a joined string back into its exact token list.
pub fn split_tokens(joined: &str) -> Result<Vec<String>, CodecError> {
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    let unshifted = unshift_text(joined);
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = unshifted.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.next() {
                Some(literal) => current.push(literal),
                None => {
                    return Err(CodecError::InvalidEncodedIdentifier(
                        "dangling escape".to_string(),
                    ))
                }
            }
        } else if c == DELIMITER {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    tokens.push(current);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(tokens: &[&str]) {
        let joined = join_tokens(tokens);
        let split = split_tokens(&joined).unwrap();
        assert_eq!(split, tokens);
    }

    #[test]
    fn test_empty_list_is_empty_string() {
        assert_eq!(join_tokens::<&str>(&[]), "");
        assert_eq!(split_tokens("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_round_trip_plain() {
        round_trip(&["a", "b", "c"]);
        round_trip(&["10", "zz", "-4"]);
    }

    #[test]
    fn test_round_trip_empty_tokens() {
        round_trip(&[""]);
        round_trip(&["", ""]);
        round_trip(&["a", "", "b"]);
    }

    #[test]
    fn test_round_trip_with_delimiters_inside_tokens() {
        round_trip(&["a,b", "c~d", ",,", "~~", "~,"]);
    }

    #[test]
    fn test_round_trip_non_ascii() {
        round_trip(&["héllo", "日本語", "a,é"]);
    }

    #[test]
    fn test_nested_join() {
        let inner = join_tokens(&["x", "y,z"]);
        let outer = join_tokens(&[inner.as_str(), "tail"]);
        let split = split_tokens(&outer).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split_tokens(&split[0]).unwrap(), vec!["x", "y,z"]);
        assert_eq!(split[1], "tail");
    }

    #[test]
    fn test_shift_moves_delimiter_bytes() {
        let joined = join_tokens(&["a", "b"]);
        assert!(!joined.contains(DELIMITER));
    }

    #[test]
    fn test_dangling_escape_rejected() {
        // A raw ESCAPE at the end of the unshifted text is malformed.
        let bad: String = format!("a{ESCAPE}")
            .chars()
            .map(|c| super::rotate(c, SHIFT))
            .collect();
        assert!(split_tokens(&bad).is_err());
    }
}
