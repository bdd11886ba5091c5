/*!
 * List Tokenizing
 * Pure helpers for comma-separated argument lists and C-style integers
 */

/// Split a comma-separated list into owned tokens
///
/// Empty tokens (",," or a trailing comma) are skipped, so `"A,,B,"` yields
/// two tokens. Whitespace is kept as part of the token. The input is never
/// modified.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse an integer the way C `atoi` does
///
/// Leading whitespace and one sign are accepted, then the longest run of
/// digits. Input without digits yields `0`; overflow saturates.
pub fn parse_c_int(token: &str) -> i32 {
    let trimmed = token.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(byte - b'0')).min(i64::from(i32::MAX) + 1);
    }

    let signed = if negative { -value } else { value };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
