//! Amount parsing and formatting.
//!
//! Admins type amounts free-form ("₦2,000", "1500.50"). Payments store them as display
//! strings with thousands separators and exactly two decimals ("2,000.00"), and the
//! query layer parses those strings back for numeric sorting and totals.

/// Parses a free-form amount typed into a due form.
///
/// Everything except ASCII digits and `.` is dropped, then the longest leading decimal
/// is read (`"1.2.3"` reads as `1.2`). Returns `None` unless the result is a finite,
/// strictly positive number.
#[must_use]
pub fn parse_amount_input(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let amount = parse_leading_decimal(&cleaned)?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn parse_leading_decimal(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .nth(1)
        .map_or(s.len(), |(i, _)| i);
    let prefix = &s[..end];

    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Formats an amount with comma thousands separators and two decimals.
///
/// ```
/// use dues_ledger::core::amount::format_amount;
/// assert_eq!(format_amount(2000.0), "2,000.00");
/// assert_eq!(format_amount(1234567.891), "1,234,567.89");
/// ```
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

/// Parses a stored amount string back into a number by stripping thousands separators.
///
/// Returns `None` for strings that are not numbers once the commas are gone.
#[must_use]
pub fn parse_formatted_amount(formatted: &str) -> Option<f64> {
    let stripped: String = formatted.chars().filter(|c| *c != ',').collect();
    stripped
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}
