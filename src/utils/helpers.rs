//! Helper functions and utilities
//!
//! Money in Wayfis is always an `i64` amount of minor units (kopecks).

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::utils::errors::{Result, WayfisError};

/// Minor units per ruble
pub const MINOR_UNITS: i64 = 100;

/// Largest amount a user may type, in whole rubles
pub const MAX_USER_AMOUNT_RUBLES: i64 = 10_000_000;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Convert whole rubles to minor units
pub fn rubles(amount: i64) -> i64 {
    amount * MINOR_UNITS
}

/// Format minor units with exactly two decimal places ("1999.00")
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / MINOR_UNITS as u64, abs % MINOR_UNITS as u64)
}

/// Format minor units for chat display ("1999 ₽", "1069.93 ₽")
pub fn format_rub(minor: i64) -> String {
    if minor % MINOR_UNITS == 0 {
        format!("{} ₽", minor / MINOR_UNITS)
    } else {
        format!("{} ₽", format_amount(minor))
    }
}

/// Parse a gateway decimal string ("1999.00", "10.5", "7") into minor units
pub fn parse_decimal_amount(value: &str) -> Option<i64> {
    let value = value.trim();
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    whole.checked_mul(MINOR_UNITS)?.checked_add(cents)
}

/// Parse a user-typed amount of whole rubles into minor units.
///
/// Rejects anything that is not a positive integer, is below `min_rubles`,
/// or exceeds [`MAX_USER_AMOUNT_RUBLES`].
pub fn parse_user_amount(text: &str, min_rubles: i64) -> Result<i64> {
    let amount: i64 = text
        .trim()
        .parse()
        .map_err(|_| WayfisError::InvalidAmount("enter a whole number of rubles".to_string()))?;

    if amount <= 0 {
        return Err(WayfisError::InvalidAmount("amount must be positive".to_string()));
    }
    if amount < min_rubles {
        return Err(WayfisError::InvalidAmount(format!("minimum amount is {} ₽", min_rubles)));
    }
    if amount > MAX_USER_AMOUNT_RUBLES {
        return Err(WayfisError::InvalidAmount(format!("maximum amount is {} ₽", MAX_USER_AMOUNT_RUBLES)));
    }

    Ok(amount * MINOR_UNITS)
}

/// `percent`% of `minor`, rounded half up to the nearest kopeck.
///
/// `None` when the intermediate product does not fit in an `i64`.
pub fn percent_of(minor: i64, percent: u32) -> Option<i64> {
    minor
        .checked_mul(i64::from(percent))?
        .checked_add(50)
        .map(|scaled| scaled / 100)
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Generate a random alphanumeric string
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_format_amount_two_decimals() {
        assert_eq!(format_amount(rubles(1999)), "1999.00");
        assert_eq!(format_amount(106_993), "1069.93");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-10_000), "-100.00");
    }

    #[test]
    fn test_format_rub() {
        assert_eq!(format_rub(rubles(1999)), "1999 ₽");
        assert_eq!(format_rub(7_050), "70.50 ₽");
    }

    #[test]
    fn test_parse_decimal_amount() {
        assert_eq!(parse_decimal_amount("1999.00"), Some(199_900));
        assert_eq!(parse_decimal_amount("10.5"), Some(1_050));
        assert_eq!(parse_decimal_amount("7"), Some(700));
        assert_eq!(parse_decimal_amount("1.234"), None);
        assert_eq!(parse_decimal_amount("-1.00"), None);
        assert_eq!(parse_decimal_amount("abc"), None);
    }

    #[test]
    fn test_parse_user_amount() {
        assert_eq!(parse_user_amount("1000", 100).unwrap(), 100_000);
        assert_eq!(parse_user_amount(" 250 ", 100).unwrap(), 25_000);
        assert_matches!(parse_user_amount("0", 0), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(parse_user_amount("-5", 0), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(parse_user_amount("ten", 0), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(parse_user_amount("99", 100), Err(WayfisError::InvalidAmount(_)));
    }

    #[test]
    fn test_parse_user_amount_rejects_huge_values() {
        assert_eq!(parse_user_amount("10000000", 100).unwrap(), rubles(MAX_USER_AMOUNT_RUBLES));
        assert_matches!(parse_user_amount("10000001", 100), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(parse_user_amount("20000000000000000", 100), Err(WayfisError::InvalidAmount(_)));
        assert_matches!(parse_user_amount("99999999999999999999", 100), Err(WayfisError::InvalidAmount(_)));
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        assert_eq!(percent_of(rubles(1000), 7), Some(rubles(70)));
        assert_eq!(percent_of(150, 7), Some(11));
        assert_eq!(percent_of(rubles(1000), 0), Some(0));
    }

    #[test]
    fn test_percent_of_overflow_is_none() {
        assert_eq!(percent_of(i64::MAX / 2, 7), None);
        assert_eq!(percent_of(2_000_000_000_000_000_000, 100), None);
    }

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("привет мир", 8), "приве...");
    }

    #[test]
    fn test_generate_random_string() {
        let token = generate_random_string(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    proptest! {
        #[test]
        fn formatted_amount_parses_back(minor in 0i64..1_000_000_000_000) {
            prop_assert_eq!(parse_decimal_amount(&format_amount(minor)), Some(minor));
        }

        #[test]
        fn commission_never_exceeds_amount(minor in 0i64..1_000_000_000, percent in 0u32..=100) {
            let fee = percent_of(minor, percent).unwrap();
            prop_assert!(fee >= 0);
            prop_assert!(fee <= minor);
        }
    }
}
