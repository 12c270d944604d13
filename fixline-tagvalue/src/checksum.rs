/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The checksum covers every byte from `8=` up to, but excluding, the
//! `10=` field, summed modulo 256 and written as three zero-padded digits.

/// Calculates the FIX checksum for the given bytes.
///
/// # Example
/// ```
/// use fixline_tagvalue::calculate_checksum;
///
/// let checksum = calculate_checksum(b"8=FIX.4.2\x019=5\x0135=0\x01");
/// assert_eq!(checksum, 161);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Formats a checksum value as three ASCII digits.
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    [
        b'0' + checksum / 100,
        b'0' + (checksum / 10) % 10,
        b'0' + checksum % 10,
    ]
}

/// Parses the three digit checksum value of a `10=` field.
#[must_use]
pub fn parse_checksum(digits: &[u8]) -> Option<u8> {
    if digits.len() != 3 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
    u8::try_from(value).ok()
}

/// Returns true if `frame` ends with a `10=NNN<SOH>` trailer matching its
/// content.
#[must_use]
pub fn verify_trailer(frame: &[u8]) -> bool {
    const TRAILER_LEN: usize = 7; // 10=NNN<SOH>
    if frame.len() < TRAILER_LEN || !frame.ends_with(&[0x01]) {
        return false;
    }
    let start = frame.len() - TRAILER_LEN;
    if &frame[start..start + 3] != b"10=" {
        return false;
    }
    parse_checksum(&frame[start + 3..start + 6])
        .is_some_and(|declared| declared == calculate_checksum(&frame[..start]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum_empty() {
        assert_eq!(calculate_checksum(b""), 0);
    }

    #[test]
    fn test_calculate_checksum_wraps() {
        let data = vec![255u8; 1000];
        assert_eq!(calculate_checksum(&data), ((255u32 * 1000) % 256) as u8);
    }

    #[test]
    fn test_format_checksum() {
        assert_eq!(format_checksum(0), *b"000");
        assert_eq!(format_checksum(7), *b"007");
        assert_eq!(format_checksum(78), *b"078");
        assert_eq!(format_checksum(255), *b"255");
    }

    #[test]
    fn test_parse_checksum() {
        assert_eq!(parse_checksum(b"042"), Some(42));
        assert_eq!(parse_checksum(b"256"), None);
        assert_eq!(parse_checksum(b"4a2"), None);
        assert_eq!(parse_checksum(b"42"), None);
    }

    #[test]
    fn test_verify_trailer() {
        let body = b"8=FIX.4.2\x019=5\x0135=0\x01";
        let digits = format_checksum(calculate_checksum(body));
        let mut frame = body.to_vec();
        frame.extend_from_slice(b"10=");
        frame.extend_from_slice(&digits);
        frame.push(0x01);
        assert!(verify_trailer(&frame));

        let last_digit = frame.len() - 2;
        frame[last_digit] = if frame[last_digit] == b'9' { b'0' } else { frame[last_digit] + 1 };
        assert!(!verify_trailer(&frame));
    }
}
