// Display formatting helpers.
//
// All numeric rendering for the grid, the status lines, and the CSV export
// goes through these functions so the three agree on formatting.
use num_format::{Locale, ToFormattedString};

/// Placeholder rendered for absent (null) values.
pub const NULL_CELL: &str = "—";

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Render a dollar amount with no decimal places, e.g. `$12,345` or
/// `-$1,200`.
pub fn format_currency(n: f64) -> String {
    let rounded = n.abs().round() as i64;
    let s = rounded.to_formatted_string(&Locale::en);
    if n < 0.0 && rounded != 0 {
        format!("-${}", s)
    } else {
        format!("${}", s)
    }
}

/// Render a 0..1 fraction as a percentage with one decimal, e.g. `42.5%`.
/// Values above 1.0 are legitimate (over-complete) and are not clamped.
pub fn format_percent(n: f64) -> String {
    format!("{:.1}%", n * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows fetched`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting_adds_separators_and_sign() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 2), "-42.00");
        assert_eq!(format_number(2.7, 0), "3");
    }

    #[test]
    fn currency_rounds_to_whole_dollars() {
        assert_eq!(format_currency(12345.67), "$12,346");
        assert_eq!(format_currency(-1200.2), "-$1,200");
        assert_eq!(format_currency(0.2), "$0");
    }

    #[test]
    fn percent_renders_fraction_unclamped() {
        assert_eq!(format_percent(0.425), "42.5%");
        assert_eq!(format_percent(1.08), "108.0%");
    }
}
