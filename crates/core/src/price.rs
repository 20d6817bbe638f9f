//! Display-price arithmetic.
//!
//! Retail prices are stored as display strings such as `"Rp.15.000"`, not
//! numbers. Percentage adjustments parse the digits back out of the string,
//! scale them, and reformat. The parse is lossy for non-standard strings, and
//! the scale truncates toward zero rather than rounding.

/// Extracts every ASCII digit from a display price and parses the result.
/// Returns `None` when the string contains no digits at all.
pub fn parse_digits(price: &str) -> Option<i64> {
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Applies a percentage change with truncating integer conversion.
/// `apply_percent(999, 10.0)` is 1098, not 1099.
pub fn apply_percent(amount: i64, percent: f64) -> i64 {
    (amount as f64 * (1.0 + percent / 100.0)) as i64
}

/// Formats an amount as a rupiah display string with `.` thousands
/// separators, e.g. `16500` becomes `"Rp.16.500"`.
pub fn format_rupiah(amount: i64) -> String {
    let (sign, digits) =
        if amount < 0 { ("-", amount.unsigned_abs().to_string()) } else { ("", amount.to_string()) };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("Rp.{sign}{grouped}")
}
