//! Rate conversions and small numeric helpers shared by the calculators.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, FinanceResult};
use crate::format::format_period;
use crate::validation::ensure_valid;

/// Days in a month for every holding-period calculation.
pub const DAYS_PER_MONTH: u32 = 30;

/// Compounding period of a percentage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePeriod {
    Annual,
    Monthly,
}

impl RatePeriod {
    /// Suffix used when printing a rate of this period, e.g. `10.75% a.a.`.
    pub fn suffix(self) -> &'static str {
        match self {
            RatePeriod::Annual => "a.a.",
            RatePeriod::Monthly => "a.m.",
        }
    }
}

/// Normalizes an annual interest rate percentage to a monthly decimal factor.
///
/// This function converts a rate like 10.5% per year into its equivalent monthly rate
/// (as a fraction, 0.0083...) for use in compound interest calculations.
pub fn normalize_annual_interest_rate(input: Decimal) -> Decimal {
    if input.is_zero() {
        return Decimal::ZERO;
    }
    let base = Decimal::ONE + input / dec!(100);
    let exponent = Decimal::ONE / dec!(12);

    base.powd(exponent) - Decimal::ONE
}

/// Converts a percentage rate between annual and monthly compounding.
///
/// Input and output are both percentages (12 for 12%). Converting a period to
/// itself returns the rate untouched.
pub fn convert_rate(rate: Decimal, from: RatePeriod, to: RatePeriod) -> FinanceResult<Decimal> {
    let base = Decimal::ONE + rate / dec!(100);
    if base < Decimal::ZERO {
        return Err(FinanceError::InvalidParameters(vec![format!(
            "Rate must be greater than -100%, got {rate}"
        )]));
    }

    match (from, to) {
        (RatePeriod::Annual, RatePeriod::Monthly) => {
            Ok(normalize_annual_interest_rate(rate) * dec!(100))
        }
        (RatePeriod::Monthly, RatePeriod::Annual) => {
            let annual = base.checked_powu(12).ok_or_else(|| FinanceError::Overflow {
                context: format!("monthly to annual conversion of {rate}%"),
            })?;
            Ok((annual - Decimal::ONE) * dec!(100))
        }
        _ => Ok(rate),
    }
}

/// `(1 + rate)^periods` with `rate` as a fraction.
pub(crate) fn compound_factor(rate: Decimal, periods: u32) -> FinanceResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(periods.into())
        .ok_or_else(|| FinanceError::Overflow {
            context: format!("compounding {rate} over {periods} periods"),
        })
}

/// `value × (1 + rate)^periods`, with `rate` as a fraction.
pub(crate) fn grow(value: Decimal, rate: Decimal, periods: u32) -> FinanceResult<Decimal> {
    value
        .checked_mul(compound_factor(rate, periods)?)
        .ok_or_else(|| FinanceError::Overflow {
            context: format!("growing {value} over {periods} periods"),
        })
}

/// Income tax (IR) rate, in percent, for fixed income held for `days` days.
///
/// | days     | rate  |
/// |----------|-------|
/// | ≤ 180    | 22.5% |
/// | ≤ 360    | 20%   |
/// | ≤ 720    | 17.5% |
/// | above    | 15%   |
pub fn calc_ir_rate(days: u32) -> Decimal {
    match days {
        0..=180 => dec!(22.5),
        181..=360 => dec!(20),
        361..=720 => dec!(17.5),
        _ => dec!(15),
    }
}

/// Percent difference of `value` relative to `base`; zero when `base` is zero.
pub fn percent_difference(value: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    (value - base) / base * dec!(100)
}

/// Rounds to cents, half away from zero.
pub(crate) fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Result of [`compound_interest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub capital: Decimal,
    /// Equivalent monthly rate, in percent.
    pub monthly_rate: Decimal,
    pub period: String,
    pub amount: Decimal,
    pub interest: Decimal,
}

/// Compounds `capital` monthly for `years` years at the monthly equivalent of `annual_rate`.
///
/// Amount and interest are rounded to cents.
pub fn compound_interest(
    capital: Decimal,
    annual_rate: Decimal,
    years: u32,
) -> FinanceResult<CompoundInterestResult> {
    ensure_valid(capital, annual_rate, Decimal::from(years))?;

    let months = years.checked_mul(12).ok_or_else(|| FinanceError::Overflow {
        context: format!("term of {years} years"),
    })?;
    let monthly_rate = convert_rate(annual_rate, RatePeriod::Annual, RatePeriod::Monthly)?;
    let amount = grow(capital, monthly_rate / dec!(100), months)?;

    Ok(CompoundInterestResult {
        capital,
        monthly_rate,
        period: format_period(months),
        amount: round_cents(amount),
        interest: round_cents(amount - capital),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_normalize_annual_interest_rate() {
        // 12% per year should be a bit less than 1% per month when compounded.
        // (1.12)^(1/12) - 1 = 0.009488...
        let monthly_rate = normalize_annual_interest_rate(dec!(12));
        assert!(monthly_rate > dec!(0.0094) && monthly_rate < dec!(0.0095));
    }

    #[test]
    fn test_convert_annual_to_monthly() {
        let monthly = convert_rate(dec!(12), RatePeriod::Annual, RatePeriod::Monthly).unwrap();
        assert_eq!(monthly.round_dp(3), dec!(0.949));
    }

    #[test]
    fn test_convert_monthly_to_annual() {
        let annual = convert_rate(dec!(1), RatePeriod::Monthly, RatePeriod::Annual).unwrap();
        assert_eq!(annual.round_dp(2), dec!(12.68));
    }

    #[test]
    fn test_convert_same_period_is_identity() {
        assert_eq!(
            convert_rate(dec!(10), RatePeriod::Annual, RatePeriod::Annual).unwrap(),
            dec!(10)
        );
        assert_eq!(
            convert_rate(dec!(1), RatePeriod::Monthly, RatePeriod::Monthly).unwrap(),
            dec!(1)
        );
    }

    #[test]
    fn test_convert_rejects_rate_below_minus_hundred() {
        assert!(convert_rate(dec!(-150), RatePeriod::Annual, RatePeriod::Monthly).is_err());
    }

    #[rstest]
    #[case(1, dec!(22.5))]
    #[case(180, dec!(22.5))]
    #[case(181, dec!(20))]
    #[case(360, dec!(20))]
    #[case(361, dec!(17.5))]
    #[case(720, dec!(17.5))]
    #[case(721, dec!(15))]
    #[case(1000, dec!(15))]
    fn test_calc_ir_rate_brackets(#[case] days: u32, #[case] expected: Decimal) {
        assert_eq!(calc_ir_rate(days), expected);
    }

    #[rstest]
    #[case(dec!(110), dec!(100), dec!(10))]
    #[case(dec!(90), dec!(100), dec!(-10))]
    #[case(dec!(100), dec!(100), dec!(0))]
    #[case(dec!(100), dec!(0), dec!(0))]
    fn test_percent_difference(
        #[case] value: Decimal,
        #[case] base: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(percent_difference(value, base), expected);
    }

    #[test]
    fn test_compound_interest_one_year() {
        // Twelve months at the monthly equivalent of 12% a.a. is 12% exactly.
        let result = compound_interest(dec!(1000), dec!(12), 1).unwrap();
        assert_eq!(result.amount, dec!(1120.00));
        assert_eq!(result.interest, dec!(120.00));
        assert_eq!(result.period, "1 year");
    }

    #[test]
    fn test_compound_factor_overflow_is_an_error() {
        assert!(matches!(
            compound_factor(dec!(1), 200),
            Err(FinanceError::Overflow { .. })
        ));
    }

    #[test]
    fn test_compound_interest_overflow_is_an_error() {
        assert!(matches!(
            compound_interest(Decimal::MAX, dec!(12), 1),
            Err(FinanceError::Overflow { .. })
        ));
    }

    #[test]
    fn test_compound_interest_rejects_zero_years() {
        assert!(matches!(
            compound_interest(dec!(1000), dec!(12), 0),
            Err(FinanceError::InvalidParameters(_))
        ));
    }
}
