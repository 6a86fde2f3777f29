//! Lowercase hex encoding and decoding for object ids.
//!
//! Decoding accepts both cases; encoding always emits lowercase, which is
//! what every git surface prints.

use crate::HashError;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

fn nibble(digit: u8, position: usize) -> Result<u8, HashError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(HashError::InvalidHex {
            position,
            character: digit as char,
        }),
    }
}

/// Hex-encode `bytes` into `buf`, which must hold exactly `2 * bytes.len()`.
///
/// # Panics
///
/// Panics on a length mismatch.
pub fn hex_encode(bytes: &[u8], buf: &mut [u8]) {
    assert_eq!(buf.len(), bytes.len() * 2, "hex buffer length mismatch");
    for (pair, &b) in buf.chunks_exact_mut(2).zip(bytes) {
        pair[0] = DIGITS[usize::from(b >> 4)];
        pair[1] = DIGITS[usize::from(b & 0xf)];
    }
}

/// Hex-encode `bytes` to an owned lowercase string.
pub fn hex_to_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(DIGITS[usize::from(b >> 4)] as char);
        out.push(DIGITS[usize::from(b & 0xf)] as char);
    }
    out
}

/// Decode `hex` into `buf`. `hex` must be exactly `2 * buf.len()` digits.
pub fn hex_decode(hex: &str, buf: &mut [u8]) -> Result<(), HashError> {
    let digits = hex.as_bytes();
    if digits.len() != buf.len() * 2 {
        return Err(HashError::InvalidHexLength {
            expected: buf.len() * 2,
            actual: digits.len(),
        });
    }
    for (i, out) in buf.iter_mut().enumerate() {
        let hi = nibble(digits[2 * i], 2 * i)?;
        let lo = nibble(digits[2 * i + 1], 2 * i + 1)?;
        *out = hi << 4 | lo;
    }
    Ok(())
}

/// Decode an even-length hex string to owned bytes.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, HashError> {
    if hex.len() % 2 != 0 {
        return Err(HashError::InvalidHexLength {
            expected: hex.len() + 1,
            actual: hex.len(),
        });
    }
    let mut out = vec![0u8; hex.len() / 2];
    hex_decode(hex, &mut out)?;
    Ok(out)
}
