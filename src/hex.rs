use crate::types::DecodeError;

/// Parse a 1 to 16 character lower-hex identifier into a u64.
///
/// Input must be exactly the hex digits: no whitespace, no `0x` prefix,
/// and no upper-case letters (the wire format is lower-hex only).
pub fn parse_id(hex: &str) -> Result<u64, DecodeError> {
    if hex.is_empty() || hex.len() > 16 {
        return Err(DecodeError::MalformedId(hex.to_string()));
    }
    let mut id: u64 = 0;
    for b in hex.bytes() {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => return Err(DecodeError::MalformedId(hex.to_string())),
        };
        id = id << 4 | u64::from(digit);
    }
    Ok(id)
}

/// Parse a 32 character lower-hex identifier into `(high, low)` words.
///
/// The first 16 characters form the high word and the last 16 the low
/// word, matching the numeric split of the 128-bit value.
pub fn parse_id128(hex: &str) -> Result<(u64, u64), DecodeError> {
    // The length is in bytes and the split below is at a byte index,
    // so multibyte input must be rejected before splitting.
    if hex.len() != 32 || !hex.is_ascii() {
        return Err(DecodeError::MalformedId(hex.to_string()));
    }
    let (high, low) = hex.split_at(16);
    Ok((parse_id(high)?, parse_id(low)?))
}
