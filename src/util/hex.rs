//! Converting from and to hex strings.

use std::fmt;


/// Writes an octet sequence as upper case hex digits.
pub fn write<W: fmt::Write>(src: &[u8], dest: &mut W) -> fmt::Result {
    for &ch in src {
        let [high, low] = encode_u8(ch);
        dest.write_char(char::from(high))?;
        dest.write_char(char::from(low))?;
    }
    Ok(())
}

/// Encodes a single octet as two hex digits.
pub fn encode_u8(ch: u8) -> [u8; 2] {
    [DIGITS[usize::from(ch >> 4)], DIGITS[usize::from(ch & 0x0F)]]
}

/// Decodes a hex string of either case.
///
/// Returns `None` if the string has an odd length or contains anything
/// but hex digits.
pub fn decode(src: &str) -> Option<Vec<u8>> {
    let src = src.as_bytes();
    if src.len() % 2 != 0 {
        return None
    }
    src.chunks(2).map(|pair| {
        Some(decode_digit(pair[0])? << 4 | decode_digit(pair[1])?)
    }).collect()
}

/// Decodes a single hex digit.
pub fn decode_digit(ch: u8) -> Option<u8> {
    char::from(ch).to_digit(16).map(|digit| digit as u8)
}

const DIGITS: &[u8] = b"0123456789ABCDEF";


//============ Tests =========================================================
