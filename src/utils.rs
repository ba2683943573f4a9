/// General functions used across the project

use crate::error::GraphError;

/// Sign character for a signed segment id ('+' for zero and above).
pub fn sign_string(num: i64) -> &'static str {
    if num >= 0 { "+" } else { "-" }
}

/// Render a signed segment id with the sign at the end: 5 -> "5+", -6 -> "6-".
pub fn int_to_signed_string(num: i64) -> String {
    format!("{}{}", num.abs(), sign_string(num))
}

/// Parse a sign-suffixed segment id back into a signed integer.
pub fn signed_string_to_int(signed: &str) -> Result<i64, GraphError> {
    if signed.len() < 2 || !signed.is_ascii() {
        return Err(GraphError::new(&format!("invalid signed segment id '{}'", signed)));
    }
    let (digits, sign) = signed.split_at(signed.len() - 1);
    let num: i64 = digits
        .parse()
        .map_err(|_| GraphError::new(&format!("invalid signed segment id '{}'", signed)))?;
    match sign {
        "+" => Ok(num),
        "-" => Ok(-num),
        _ => Err(GraphError::new(&format!("invalid sign in segment id '{}'", signed))),
    }
}

/// One link of every reverse-complement twin pair is the canonical
/// representative, so writers emit each pair exactly once:
///   - both ids positive -> canonical
///   - both ids negative -> the twin is canonical
///   - a link that is its own twin (start == -end) -> canonical
///   - otherwise the one whose start has the larger absolute value
pub fn is_link_canonical(start: i64, end: i64) -> bool {
    if start > 0 && end > 0 {
        return true;
    }
    if start < 0 && end < 0 {
        return false;
    }
    if start == -end {
        return true;
    }
    start.abs() > end.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_string_round_trip() {
        for num in [1, -1, 5, -6, 250, -9999] {
            assert_eq!(signed_string_to_int(&int_to_signed_string(num)).unwrap(), num);
        }
        assert_eq!(int_to_signed_string(5), "5+");
        assert_eq!(int_to_signed_string(-6), "6-");
    }

    #[test]
    fn test_signed_string_parse_errors() {
        assert!(signed_string_to_int("5").is_err());
        assert!(signed_string_to_int("+").is_err());
        assert!(signed_string_to_int("five+").is_err());
        assert!(signed_string_to_int("5*").is_err());
    }

    #[test]
    fn test_link_canonicality() {
        assert!(is_link_canonical(5, 7));
        assert!(!is_link_canonical(-7, -5));
        assert!(is_link_canonical(5, -5));
        assert!(is_link_canonical(-7, 5));
        assert!(!is_link_canonical(-5, 7));
        assert!(is_link_canonical(7, -5));
    }
}
