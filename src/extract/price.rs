//! Currency recognition and price normalization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Multi-currency price pattern: a leading symbol followed by a number
    /// (optionally suffixed K/M/B), or a number followed by a currency word.
    pub static ref CURRENCY_RE: Regex = Regex::new(
        r"(?i)(\$|€|£|₫|¥|₹|元|원|฿|₱|Rp|RM|৳)\s?[\d.,]+\s?[KMB]?|[\d.,]+\s?(usd|eur|gbp|vnd|đ|₫|yuan|won|baht|peso|rupiah|ringgit|taka|dollar|euro|pound)"
    )
    .expect("currency pattern is valid");
}

/// Normalize a price string to a number.
///
/// Handles both decimal conventions: in `1.234,56` the rightmost separator
/// is the decimal mark and the other groups thousands; in `1,234.56` the
/// roles swap. A lone comma is a decimal mark only when exactly two digits
/// follow it.
#[must_use]
pub fn normalize_price(price: &str) -> Option<f64> {
    let digits: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let has_dot = digits.contains('.');
    let has_comma = digits.contains(',');

    let normalized = if has_dot && has_comma {
        let last_comma = digits.rfind(',')?;
        let last_dot = digits.rfind('.')?;
        if last_comma > last_dot {
            // European: 1.234,56
            digits.replace('.', "").replace(',', ".")
        } else {
            // US: 1,234.56
            digits.replace(',', "")
        }
    } else if has_comma {
        let comma_count = digits.matches(',').count();
        if comma_count > 1 {
            digits.replace(',', "")
        } else {
            let tail_len = digits.split(',').next_back().map_or(0, str::len);
            if tail_len == 2 {
                // 12,99 reads as a decimal
                digits.replace(',', ".")
            } else {
                // 1,234 reads as thousands
                digits.replace(',', "")
            }
        }
    } else {
        digits
    };

    normalized.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_both_conventions() {
        assert_eq!(normalize_price("$1,234.56"), Some(1234.56));
        assert_eq!(normalize_price("€1.234,56"), Some(1234.56));
        assert_eq!(normalize_price("12,99"), Some(12.99));
        assert_eq!(normalize_price("1,234"), Some(1234.0));
        assert_eq!(normalize_price("abc"), None);
    }

    #[test]
    fn handles_multiple_thousands_groups() {
        assert_eq!(normalize_price("1,234,567"), Some(1_234_567.0));
        assert_eq!(normalize_price("2.345.678,90"), Some(2_345_678.90));
        // Dot-grouped integers with no decimal mark stay ambiguous.
        assert_eq!(normalize_price("₫1.234.567"), None);
    }

    #[test]
    fn currency_regex_matches_symbols_and_words() {
        assert!(CURRENCY_RE.is_match("$19.99"));
        assert!(CURRENCY_RE.is_match("€ 5,00"));
        assert!(CURRENCY_RE.is_match("1.200.000 vnd"));
        assert!(CURRENCY_RE.is_match("250 USD"));
        assert!(CURRENCY_RE.is_match("₫250000"));
        assert!(CURRENCY_RE.is_match("$1.2K"));
        assert!(!CURRENCY_RE.is_match("no numbers here"));
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(s in "\\PC*") {
            let _ = normalize_price(&s);
        }

        #[test]
        fn plain_integers_round_trip(n in 0u32..1_000_000) {
            prop_assert_eq!(normalize_price(&n.to_string()), Some(f64::from(n)));
        }
    }
}
