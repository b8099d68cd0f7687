//! Base-36 integer text, the workhorse of every numeric token.
//!
//! Lowercase digits `0-9a-z`. Signed values carry a leading `-`. Parsing is
//! strict: empty input or any character outside the digit set yields `None`,
//! and callers decide whether that means "absent" or "malformed".

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode an unsigned integer as lowercase base-36 text.
pub fn encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = [0u8; 13];
    let mut at = buf.len();
    while value > 0 {
        at -= 1;
        buf[at] = DIGITS[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&buf[at..]).into_owned()
}

/// Encode a signed integer, with a leading `-` for negatives.
pub fn encode_i64(value: i64) -> String {
    if value < 0 {
        format!("-{}", encode_u64(value.unsigned_abs()))
    } else {
        encode_u64(value as u64)
    }
}

/// Parse lowercase base-36 text into an unsigned integer.
pub fn decode_u64(text: &str) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for byte in text.bytes() {
        let digit = match byte {
            b'0'..=b'9' => (byte - b'0') as u64,
            b'a'..=b'z' => (byte - b'a') as u64 + 10,
            _ => return None,
        };
        value = value.checked_mul(36)?.checked_add(digit)?;
    }
    Some(value)
}

/// Parse signed base-36 text.
pub fn decode_i64(text: &str) -> Option<i64> {
    if let Some(rest) = text.strip_prefix('-') {
        let magnitude = decode_u64(rest)?;
        if magnitude > i64::MAX as u64 + 1 {
            return None;
        }
        Some((magnitude as i128).checked_neg()? as i64)
    } else {
        let magnitude = decode_u64(text)?;
        i64::try_from(magnitude).ok()
    }
}
