//! Utility functions for formatting and parsing
//!
//! Rounding is a display concern only: the calculators keep full precision
//! and these helpers round half away from zero when rendering.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Shown in place of a degenerate (undefined) figure
pub const NOT_AVAILABLE: &str = "n/a";

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// Include "US$ " prefix
    USD,
    /// No currency symbol (for table cells, calculations display)
    None,
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using Brazilian locale conventions:
/// - Thousands separator: `.` (period)
/// - Decimal separator: `,` (comma)
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `places` - Number of decimal places to round to
/// * `symbol` - Whether to include currency symbol
///
/// # Examples
/// ```
/// use importcost::utils::{format_number_br, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_number_br(dec!(1234.56), 2, CurrencySymbol::BRL), "R$ 1.234,56");
/// assert_eq!(format_number_br(dec!(5.4), 2, CurrencySymbol::None), "5,40");
/// ```
pub fn format_number_br(value: Decimal, places: u32, symbol: CurrencySymbol) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.*}", places as usize, rounded.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (formatted.as_str(), None),
    };

    // Add thousands separators (.) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::USD => "US$ ",
        CurrencySymbol::None => "",
    };

    match decimal_part {
        Some(decimals) => format!("{}{}{},{}", prefix, sign, with_separators, decimals),
        None => format!("{}{}{}", prefix, sign, with_separators),
    }
}

/// Format as Brazilian Real with symbol: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use importcost::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_number_br(value, 2, CurrencySymbol::BRL)
}

/// Format a figure that may be degenerate
pub fn format_optional_currency(value: Option<Decimal>) -> String {
    value
        .map(format_currency)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format a percentage with one decimal: "5,3%"
///
/// # Examples
/// ```
/// use importcost::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(5.3266)), "5,3%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_number_br(value, 1, CurrencySymbol::None))
}

/// Format a fraction (0.20) as a whole-number-when-possible percentage ("20%").
/// Fractions too large to scale render as `n/a`.
///
/// # Examples
/// ```
/// use importcost::utils::format_fraction_as_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_fraction_as_percent(dec!(0.3)), "30%");
/// assert_eq!(format_fraction_as_percent(dec!(0.175)), "17,5%");
/// ```
pub fn format_fraction_as_percent(fraction: Decimal) -> String {
    match fraction.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => format!("{}%", pct.normalize().to_string().replace('.', ",")),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Parse a decimal typed by a person, accepting both `5.40` and `5,40`.
///
/// With both separators present the last one is the decimal separator
/// (`1.234,56` and `1,234.56` are both 1234.56).
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    };

    Decimal::from_str(&normalized).ok()
}
