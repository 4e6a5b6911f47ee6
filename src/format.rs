//! Presentation helpers: BRL currency strings, percentages and period text.
//!
//! Calculations never read these strings back; they only decorate results.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{FinanceError, FinanceResult};
use crate::utils::round_cents;

/// Formats a value as Brazilian Real, e.g. `R$ 1.234,56` or `-R$ 500,00`.
pub fn format_money(value: Decimal) -> String {
    let rounded = round_cents(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (units, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{cents}")
}

/// Parses a currency string produced by [`format_money`] (or a plain number) back to a value.
pub fn parse_money(input: &str) -> FinanceResult<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, 'R' | '$' | '.') && !c.is_whitespace())
        .collect();
    let normalized = cleaned.replacen(',', ".", 1);

    Decimal::from_str(&normalized).map_err(|_| FinanceError::InvalidCurrency(input.to_string()))
}

/// Formats a ratio as a percentage with `decimals` places: `0.1234` → `12.34%`.
pub fn format_ratio(ratio: Decimal, decimals: usize) -> String {
    let percent = (ratio * dec!(100))
        .round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}%", decimals, percent)
}

/// Human readable term: `1 month`, `6 months`, `1 year`, `2 years and 3 months`.
pub fn format_period(months: u32) -> String {
    fn unit(count: u32, singular: &str, plural: &str) -> String {
        if count == 1 {
            format!("{count} {singular}")
        } else {
            format!("{count} {plural}")
        }
    }

    if months < 12 {
        return unit(months, "month", "months");
    }

    let years = unit(months / 12, "year", "years");
    match months % 12 {
        0 => years,
        rest => format!("{years} and {}", unit(rest, "month", "months")),
    }
}
