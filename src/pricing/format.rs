//! Display formatting for prices, currency amounts and user input parsing.

use crate::error::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Shown when a row's price or derived figures cannot be computed.
pub const INVALID_LABEL: &str = "Invalid";
/// Shown in the price column of a row with no coin configured.
pub const LOADING_LABEL: &str = "Loading...";
/// Shown when the exchange does not list an entered symbol.
pub const INVALID_PAIR_LABEL: &str = "Invalid coin pair";
/// Prefix of the aggregate net value label.
pub const NET_VALUE_PREFIX: &str = "NET VALUE - ";

/// Magnitude thresholds, highest first, paired with display decimals.
const PRICE_PRECISION: [(Decimal, u32); 7] = [
    (Decimal::ONE, 2),
    (Decimal::from_parts(1, 0, 0, false, 2), 3),
    (Decimal::from_parts(1, 0, 0, false, 3), 4),
    (Decimal::from_parts(1, 0, 0, false, 4), 5),
    (Decimal::from_parts(1, 0, 0, false, 5), 6),
    (Decimal::from_parts(1, 0, 0, false, 6), 7),
    (Decimal::from_parts(1, 0, 0, false, 7), 8),
];

/// Format a raw exchange price for the price column.
///
/// The first threshold the price reaches picks a fixed decimal count.
/// Rounded values of at least 1 get thousands separators. Returns `None`
/// for prices below the smallest threshold, zero or negative included.
pub fn format_price(raw: Decimal) -> Option<String> {
    let decimals = PRICE_PRECISION
        .iter()
        .find(|(threshold, _)| raw >= *threshold)
        .map(|(_, decimals)| *decimals)?;

    let rounded = raw.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
    let text = format!("{:.*}", decimals as usize, rounded);

    if rounded >= Decimal::ONE {
        Some(group_thousands(&text))
    } else {
        Some(text)
    }
}

/// The price cell text for a formatted price.
pub fn price_label(formatted: &str) -> String {
    format!("${formatted}")
}

/// Format a currency amount: whole amounts without a fraction, anything
/// else with exactly two decimals.
pub fn format_currency(value: Decimal) -> String {
    let text = if value.fract().is_zero() {
        value.trunc().normalize().to_string()
    } else {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        format!("{rounded:.2}")
    };
    format!("${}", group_thousands(&text))
}

/// Format an optional derived figure, `Invalid` when absent.
pub fn format_figure(value: Option<Decimal>) -> String {
    value.map_or_else(|| INVALID_LABEL.to_string(), format_currency)
}

/// Format the net value label.
pub fn format_net_value(value: Option<Decimal>) -> String {
    match value {
        Some(value) => format!("{NET_VALUE_PREFIX}{}", format_currency(value)),
        None => format!("{NET_VALUE_PREFIX}$0.00"),
    }
}

/// Insert `,` between groups of three integer digits.
///
/// Accepts an optional leading `-` and an optional fractional part, which
/// is passed through untouched.
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(number.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// Parse a user-entered amount such as `$1,250.50` or `DEPOSITED $300`.
///
/// Empty input is zero. Negative amounts are rejected.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let unlabeled = match trimmed.get(..9) {
        Some(label) if label.eq_ignore_ascii_case("DEPOSITED") => &trimmed[9..],
        _ => trimmed,
    };

    let cleaned: String = unlabeled
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let value: Decimal = cleaned
        .parse()
        .map_err(|_| Error::invalid_input(format!("'{trimmed}' is not a number")))?;
    if value < Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "'{trimmed}' is negative; amounts must be zero or more"
        )));
    }
    Ok(value)
}
