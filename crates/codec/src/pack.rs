//! Reversible identifier packing.
//!
//! The platform counts identifier length in characters, so the packed form
//! squeezes two deflate-compressed bytes into each `char`. Pairs land in
//! `U+10000..=U+1FFFF` (no surrogates there) and an odd trailing byte in
//! `U+0100..=U+01FF`, which keeps decoding unambiguous. `unpack` rejects any
//! character outside those ranges, so identifiers not produced by this codec
//! fail loudly instead of decoding into garbage.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::CodecError;

const PAIR_BASE: u32 = 0x1_0000;
const ODD_BASE: u32 = 0x100;

/// Hard cap on the plain identifier payload, enforced on both sides:
/// `pack` refuses to mint anything bigger, so an inflated stream over the
/// cap can only be corrupt or foreign input.
pub const MAX_UNPACKED_BYTES: usize = 4096;

/// Pack text into the character-dense identifier form.
pub fn pack(text: &str) -> Result<String, CodecError> {
    if text.is_empty() {
        return Ok(String::new());
    }
    if text.len() > MAX_UNPACKED_BYTES {
        return Err(CodecError::StateTooLarge {
            len: text.len(),
            max: MAX_UNPACKED_BYTES,
        });
    }
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .and_then(|_| encoder.finish())
        .map(bytes_to_chars)
        .map_err(|e| CodecError::InvalidEncodedIdentifier(e.to_string()))
}

/// Reverse [`pack`], failing on anything this codec did not produce.
pub fn unpack(packed: &str) -> Result<String, CodecError> {
    if packed.is_empty() {
        return Ok(String::new());
    }
    let bytes = chars_to_bytes(packed)?;
    let mut inflated = Vec::new();
    DeflateDecoder::new(&bytes[..])
        .take(MAX_UNPACKED_BYTES as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(|e| CodecError::InvalidEncodedIdentifier(e.to_string()))?;
    if inflated.len() > MAX_UNPACKED_BYTES {
        return Err(CodecError::InvalidEncodedIdentifier(
            "inflated payload exceeds the size cap".to_string(),
        ));
    }
    String::from_utf8(inflated).map_err(|e| CodecError::InvalidEncodedIdentifier(e.to_string()))
}

fn bytes_to_chars(bytes: Vec<u8>) -> String {
    let mut out = String::with_capacity(bytes.len() / 2 + 1);
    let mut pairs = bytes.chunks_exact(2);
    for pair in &mut pairs {
        let code = PAIR_BASE + ((pair[0] as u32) << 8) + pair[1] as u32;
        // PAIR_BASE..PAIR_BASE+0x10000 holds no surrogates; always a scalar.
        if let Some(c) = char::from_u32(code) {
            out.push(c);
        }
    }
    if let [odd] = pairs.remainder() {
        if let Some(c) = char::from_u32(ODD_BASE + *odd as u32) {
            out.push(c);
        }
    }
    out
}

fn chars_to_bytes(packed: &str) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::with_capacity(packed.chars().count() * 2);
    let mut chars = packed.chars().peekable();
    while let Some(c) = chars.next() {
        let code = c as u32;
        if (PAIR_BASE..PAIR_BASE + 0x1_0000).contains(&code) {
            let packed_pair = code - PAIR_BASE;
            bytes.push((packed_pair >> 8) as u8);
            bytes.push((packed_pair & 0xff) as u8);
        } else if (ODD_BASE..ODD_BASE + 0x100).contains(&code) {
            if chars.peek().is_some() {
                return Err(CodecError::InvalidEncodedIdentifier(
                    "odd-byte marker before end of identifier".to_string(),
                ));
            }
            bytes.push((code - ODD_BASE) as u8);
        } else {
            return Err(CodecError::InvalidEncodedIdentifier(format!(
                "unexpected character U+{code:04X}"
            )));
        }
    }
    Ok(bytes)
}
