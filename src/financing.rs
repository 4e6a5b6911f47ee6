//! Real estate financing under the two Brazilian amortization systems.
//!
//! - **SAC (Sistema de Amortização Constante)**: fixed amortization, decreasing payments.
//! - **Price (Sistema Francês de Amortização)**: fixed payments, growing amortization.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, FinanceResult};
use crate::format::{format_money, format_period, format_ratio};
use crate::utils::{RatePeriod, compound_factor, convert_rate, percent_difference};
use crate::validation::ensure_valid;

/// Number of installments kept at each end of the schedule summary.
pub const SUMMARY_WINDOW: u32 = 12;

/// Below this interest saving (in percent of the Price interest) Price is preferred.
pub const SMALL_SAVINGS_PERCENT: Decimal = dec!(5);

/// Above this gap between the first SAC installment and the Price installment
/// (in percent of the Price installment) Price is preferred.
pub const HIGH_FIRST_INSTALLMENT_PERCENT: Decimal = dec!(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmortizationSystem {
    #[serde(rename = "SAC")]
    Sac,
    Price,
}

impl AmortizationSystem {
    pub fn label(self) -> &'static str {
        match self {
            AmortizationSystem::Sac => "SAC",
            AmortizationSystem::Price => "Price",
        }
    }

    /// Short bullet points describing the system to an end user.
    pub fn characteristics(self) -> Vec<String> {
        let items: &[&str] = match self {
            AmortizationSystem::Sac => &[
                "Decreasing installments",
                "Lower total cost",
                "Higher first installment",
            ],
            AmortizationSystem::Price => &[
                "Fixed installments",
                "Easy planning",
                "Higher total cost",
            ],
        };
        items.iter().map(|item| item.to_string()).collect()
    }
}

impl fmt::Display for AmortizationSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One installment of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based installment number.
    pub installment: u32,
    /// Total paid in this installment (amortization + interest).
    pub payment: Decimal,
    /// The portion of the payment that covers interest.
    pub interest: Decimal,
    /// The portion that reduces the principal. Only reported for Price schedules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amortization: Option<Decimal>,
    /// Remaining balance after the payment; never negative.
    pub balance: Decimal,
}

/// First and last [`SUMMARY_WINDOW`] installments of a schedule.
///
/// Both windows are captured independently, so for terms shorter than twice the
/// window the same installments appear in both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub first_12: Vec<ScheduleEntry>,
    pub last_12: Vec<ScheduleEntry>,
}

struct ScheduleWindows {
    term: u32,
    summary: ScheduleSummary,
}

impl ScheduleWindows {
    fn new(term: u32) -> Self {
        Self {
            term,
            summary: ScheduleSummary::default(),
        }
    }

    fn record(&mut self, entry: ScheduleEntry) {
        if entry.installment <= SUMMARY_WINDOW {
            self.summary.first_12.push(entry.clone());
        }
        if entry.installment + SUMMARY_WINDOW > self.term {
            self.summary.last_12.push(entry);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Installments {
    /// SAC: installments fall from `first` to `last`.
    Decreasing { first: Decimal, last: Decimal },
    /// Price: every installment is the same.
    Fixed { installment: Decimal },
}

impl Installments {
    pub fn first(&self) -> Decimal {
        match self {
            Installments::Decreasing { first, .. } => *first,
            Installments::Fixed { installment } => *installment,
        }
    }

    pub fn last(&self) -> Decimal {
        match self {
            Installments::Decreasing { last, .. } => *last,
            Installments::Fixed { installment } => *installment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedLoan {
    pub system: String,
    pub principal: String,
    pub term: String,
    pub rate: String,
    pub total_interest: String,
    pub total_paid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_installment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_installment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_installment: Option<String>,
}

/// Result of a single financing schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub system: AmortizationSystem,
    /// The financed amount.
    pub principal: Decimal,
    pub term_months: u32,
    /// Annual rate as a fraction (12% is 0.12).
    pub annual_rate: Decimal,
    /// Equivalent monthly rate as a percentage.
    pub monthly_rate: Decimal,
    pub total_interest: Decimal,
    /// Always `principal + total_interest`.
    pub total_paid: Decimal,
    pub installments: Installments,
    pub summary: ScheduleSummary,
    pub formatted: FormattedLoan,
}

impl LoanResult {
    #[allow(clippy::too_many_arguments)]
    fn new(
        system: AmortizationSystem,
        principal: Decimal,
        term_months: u32,
        annual_rate: Decimal,
        monthly_rate: Decimal,
        total_interest: Decimal,
        installments: Installments,
        summary: ScheduleSummary,
    ) -> FinanceResult<Self> {
        let total_paid = principal
            .checked_add(total_interest)
            .ok_or_else(|| FinanceError::Overflow {
                context: format!("total paid on a principal of {principal}"),
            })?;
        let (first_installment, last_installment, fixed_installment) = match &installments {
            Installments::Decreasing { first, last } => {
                (Some(format_money(*first)), Some(format_money(*last)), None)
            }
            Installments::Fixed { installment } => (None, None, Some(format_money(*installment))),
        };

        let formatted = FormattedLoan {
            system: system.label().to_string(),
            principal: format_money(principal),
            term: format!("{} ({}x)", format_period(term_months), term_months),
            rate: format!("{}% {}", annual_rate.normalize(), RatePeriod::Annual.suffix()),
            total_interest: format_money(total_interest),
            total_paid: format_money(total_paid),
            first_installment,
            last_installment,
            fixed_installment,
        };

        Ok(Self {
            system,
            principal,
            term_months,
            annual_rate: annual_rate / dec!(100),
            monthly_rate,
            total_interest,
            total_paid,
            installments,
            summary,
            formatted,
        })
    }
}

fn term_in_months(years: u32) -> FinanceResult<u32> {
    years.checked_mul(12).ok_or_else(|| FinanceError::Overflow {
        context: format!("term of {years} years"),
    })
}

/// Balance after an amortization. The final installment settles the loan, so any
/// residue left by rounding is dropped there.
fn next_balance(balance: Decimal, amortization: Decimal, installment: u32, term: u32) -> Decimal {
    if installment == term {
        Decimal::ZERO
    } else {
        (balance - amortization).max(Decimal::ZERO)
    }
}

/// Calculates the financing using the SAC (Constant Amortization System).
///
/// The principal portion of every installment is `principal / months`, while the
/// interest portion decreases with the balance. The first and last installments
/// are reported analytically from the amortization and the monthly rate.
///
/// # Arguments
///
/// * `principal` - The financed amount.
/// * `annual_rate` - The annual interest rate as a percentage (e.g., 10.5 for 10.5%).
/// * `years` - The term in years.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidParameters`] with every violated constraint when
/// the principal is not positive, the rate is negative or the term is zero.
pub fn financing_sac(
    principal: Decimal,
    annual_rate: Decimal,
    years: u32,
) -> FinanceResult<LoanResult> {
    ensure_valid(principal, annual_rate, Decimal::from(years))?;

    let term = term_in_months(years)?;
    let monthly_rate = convert_rate(annual_rate, RatePeriod::Annual, RatePeriod::Monthly)?;
    let amortization = principal / Decimal::from(term);

    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut windows = ScheduleWindows::new(term);

    for installment in 1..=term {
        let interest = balance * (monthly_rate / dec!(100));
        let payment = amortization + interest;
        balance = next_balance(balance, amortization, installment, term);
        total_interest += interest;

        windows.record(ScheduleEntry {
            installment,
            payment,
            interest,
            amortization: None,
            balance,
        });
    }

    let installments = Installments::Decreasing {
        first: amortization + principal * monthly_rate / dec!(100),
        last: amortization + amortization * monthly_rate / dec!(100),
    };

    tracing::debug!(
        principal = %principal,
        term,
        total_interest = %total_interest,
        "computed SAC schedule"
    );

    LoanResult::new(
        AmortizationSystem::Sac,
        principal,
        term,
        annual_rate,
        monthly_rate,
        total_interest,
        installments,
        windows.summary,
    )
}

/// Calculates the financing using the Price table (fixed payments).
///
/// The Price table formula is: PMT = P * [i(1 + i)^n] / [(1 + i)^n – 1]
///
/// A zero rate degenerates to `P / n`.
///
/// # Errors
///
/// Same as [`financing_sac`]; also [`FinanceError::Overflow`] if `(1 + i)^n`
/// does not fit a decimal.
pub fn financing_price(
    principal: Decimal,
    annual_rate: Decimal,
    years: u32,
) -> FinanceResult<LoanResult> {
    ensure_valid(principal, annual_rate, Decimal::from(years))?;

    let term = term_in_months(years)?;
    let monthly_rate = convert_rate(annual_rate, RatePeriod::Annual, RatePeriod::Monthly)?;
    let rate = monthly_rate / dec!(100);

    let i_plus_1_pow_n = compound_factor(rate, term)?;
    let fixed_payment = if i_plus_1_pow_n == Decimal::ONE {
        principal / Decimal::from(term)
    } else {
        rate.checked_mul(i_plus_1_pow_n)
            .and_then(|numerator| principal.checked_mul(numerator))
            .ok_or_else(|| FinanceError::Overflow {
                context: format!("Price installment on a principal of {principal}"),
            })?
            / (i_plus_1_pow_n - Decimal::ONE)
    };

    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut windows = ScheduleWindows::new(term);

    for installment in 1..=term {
        let interest = balance * rate;
        let amortization = fixed_payment - interest;
        balance = next_balance(balance, amortization, installment, term);
        total_interest += interest;

        windows.record(ScheduleEntry {
            installment,
            payment: fixed_payment,
            interest,
            amortization: Some(amortization),
            balance,
        });
    }

    tracing::debug!(
        principal = %principal,
        term,
        installment = %fixed_payment,
        total_interest = %total_interest,
        "computed Price schedule"
    );

    LoanResult::new(
        AmortizationSystem::Price,
        principal,
        term,
        annual_rate,
        monthly_rate,
        total_interest,
        Installments::Fixed {
            installment: fixed_payment,
        },
        windows.summary,
    )
}

/// Which system to pick, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub system: AmortizationSystem,
    pub reason: String,
}

/// Picks the more suitable system from the totals of both schedules.
///
/// Price wins when SAC saves less than [`SMALL_SAVINGS_PERCENT`] of the Price
/// interest, or when the first SAC installment is more than
/// [`HIGH_FIRST_INSTALLMENT_PERCENT`] above the Price installment. Otherwise SAC wins.
pub fn get_recommendation(
    sac_interest: Decimal,
    price_interest: Decimal,
    first_sac_installment: Decimal,
    price_installment: Decimal,
) -> Recommendation {
    let savings_percent = -percent_difference(sac_interest, price_interest);
    let installment_gap = percent_difference(first_sac_installment, price_installment);

    if savings_percent < SMALL_SAVINGS_PERCENT {
        Recommendation {
            system: AmortizationSystem::Price,
            reason: "Small cost difference, fixed installments make planning easier".to_string(),
        }
    } else if installment_gap > HIGH_FIRST_INSTALLMENT_PERCENT {
        Recommendation {
            system: AmortizationSystem::Price,
            reason: "First SAC installment too high, may strain the budget".to_string(),
        }
    } else {
        Recommendation {
            system: AmortizationSystem::Sac,
            reason: format!(
                "Significant savings of {}",
                format_money(price_interest - sac_interest)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub principal: Decimal,
    pub years: u32,
    /// Annual rate as a percentage, as given.
    pub annual_rate: Decimal,
    pub term: String,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SacSummary {
    pub total_interest: Decimal,
    pub first_installment: Decimal,
    pub last_installment: Decimal,
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub total_interest: Decimal,
    pub fixed_installment: Decimal,
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedSavings {
    pub savings: String,
    pub savings_percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Price interest minus SAC interest.
    pub savings: Decimal,
    /// `savings` relative to the Price interest; zero when Price charges no interest.
    pub savings_ratio: Decimal,
    pub recommendation: Recommendation,
    pub formatted: FormattedSavings,
}

/// Side by side view of both systems for the same loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanComparison {
    pub scenario: Scenario,
    pub sac: SacSummary,
    pub price: PriceSummary,
    pub comparison: ComparisonSummary,
}

/// Runs both schedules for the same loan and recommends one of them.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidParameters`] before computing anything when the
/// parameters are invalid.
pub fn compare_financing(
    principal: Decimal,
    annual_rate: Decimal,
    years: u32,
) -> FinanceResult<LoanComparison> {
    let sac = financing_sac(principal, annual_rate, years)?;
    let price = financing_price(principal, annual_rate, years)?;

    let savings = price.total_interest - sac.total_interest;
    let savings_ratio = if price.total_interest.is_zero() {
        Decimal::ZERO
    } else {
        savings / price.total_interest
    };

    let recommendation = get_recommendation(
        sac.total_interest,
        price.total_interest,
        sac.installments.first(),
        price.installments.first(),
    );

    tracing::debug!(
        principal = %principal,
        years,
        savings = %savings,
        recommended = %recommendation.system,
        "compared SAC and Price"
    );

    Ok(LoanComparison {
        scenario: Scenario {
            principal,
            years,
            annual_rate,
            term: format_period(sac.term_months),
            rate: format!("{}% per year", annual_rate.normalize()),
        },
        sac: SacSummary {
            total_interest: sac.total_interest,
            first_installment: sac.installments.first(),
            last_installment: sac.installments.last(),
            characteristics: AmortizationSystem::Sac.characteristics(),
        },
        price: PriceSummary {
            total_interest: price.total_interest,
            fixed_installment: price.installments.first(),
            characteristics: AmortizationSystem::Price.characteristics(),
        },
        comparison: ComparisonSummary {
            savings,
            savings_ratio,
            recommendation,
            formatted: FormattedSavings {
                savings: format_money(savings),
                savings_percent: format_ratio(savings_ratio, 1),
            },
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedDownPayment {
    pub down_payment: String,
    pub down_payment_percent: String,
    pub financed_amount: String,
    pub sac_first_installment: String,
    pub sac_last_installment: String,
    pub sac_total_interest: String,
    pub price_installment: String,
    pub price_total_interest: String,
}

/// Financing comparison for a property bought with a down payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownPaymentSimulation {
    pub down_payment: Decimal,
    /// Down payment relative to the property value (0.25 for 25%).
    pub down_payment_ratio: Decimal,
    pub financed_amount: Decimal,
    pub sac: SacSummary,
    pub price: PriceSummary,
    pub recommendation: Recommendation,
    pub formatted: FormattedDownPayment,
}

/// Simulates financing `property_value - down_payment`.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidDownPayment`] when the property value is not
/// positive, the down payment is negative or it covers the whole property, and
/// [`FinanceError::InvalidParameters`] when the rate or term are invalid.
pub fn simulate_down_payment(
    property_value: Decimal,
    down_payment: Decimal,
    annual_rate: Decimal,
    years: u32,
) -> FinanceResult<DownPaymentSimulation> {
    let reason = if property_value <= Decimal::ZERO {
        Some("property value must be positive")
    } else if down_payment < Decimal::ZERO {
        Some("down payment cannot be negative")
    } else if down_payment >= property_value {
        Some("down payment must be lower than the property value")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(FinanceError::InvalidDownPayment {
            property_value,
            down_payment,
            reason: reason.to_string(),
        });
    }

    let financed_amount = property_value - down_payment;
    let comparison = compare_financing(financed_amount, annual_rate, years)?;
    let down_payment_ratio = down_payment / property_value;

    let formatted = FormattedDownPayment {
        down_payment: format_money(down_payment),
        down_payment_percent: format_ratio(down_payment_ratio, 0),
        financed_amount: format_money(financed_amount),
        sac_first_installment: format_money(comparison.sac.first_installment),
        sac_last_installment: format_money(comparison.sac.last_installment),
        sac_total_interest: format_money(comparison.sac.total_interest),
        price_installment: format_money(comparison.price.fixed_installment),
        price_total_interest: format_money(comparison.price.total_interest),
    };

    Ok(DownPaymentSimulation {
        down_payment,
        down_payment_ratio,
        financed_amount,
        sac: comparison.sac,
        price: comparison.price,
        recommendation: comparison.comparison.recommendation,
        formatted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_sac_happy_path() {
        let result = financing_sac(dec!(12000), dec!(12), 1).unwrap();

        assert_eq!(result.system, AmortizationSystem::Sac);
        assert_eq!(result.term_months, 12);
        assert_eq!(result.installments.first().round_dp(2), dec!(1113.87));
        assert_eq!(result.installments.last().round_dp(2), dec!(1009.49));
        assert_eq!(result.total_paid.round_dp(2), dec!(12740.13));
        assert_eq!(result.formatted.first_installment.as_deref(), Some("R$ 1.113,87"));
        assert_eq!(result.formatted.fixed_installment, None);
    }

    #[test]
    fn test_price_happy_path() {
        let result = financing_price(dec!(12000), dec!(12), 1).unwrap();

        assert_eq!(result.system, AmortizationSystem::Price);
        assert_eq!(result.installments.first().round_dp(2), dec!(1062.74));
        assert_eq!(result.total_paid.round_dp(2), dec!(12752.94));
        assert_eq!(result.formatted.fixed_installment.as_deref(), Some("R$ 1.062,74"));
        assert!(
            result
                .summary
                .first_12
                .iter()
                .all(|entry| entry.amortization.is_some())
        );
    }

    #[test]
    fn test_sac_two_years() {
        let result = financing_sac(dec!(100000), dec!(12), 2).unwrap();

        assert_eq!(result.principal, dec!(100000));
        assert_eq!(result.term_months, 24);
        assert_eq!(result.annual_rate, dec!(0.12));
        assert_eq!(result.summary.first_12.len(), 12);
        assert_eq!(result.summary.last_12.len(), 12);
        assert_eq!(result.summary.first_12[0].installment, 1);
        assert_eq!(result.summary.last_12[0].installment, 13);
        assert_eq!(result.formatted.term, "2 years (24x)");
        assert_eq!(result.formatted.rate, "12% a.a.");
        assert!(result.summary.first_12.iter().all(|entry| entry.amortization.is_none()));
    }

    #[test]
    fn test_windows_overlap_for_short_terms() {
        let result = financing_price(dec!(12000), dec!(12), 1).unwrap();

        assert_eq!(result.summary.first_12.len(), 12);
        assert_eq!(result.summary.last_12.len(), 12);
        assert_eq!(result.summary.first_12, result.summary.last_12);
    }

    #[test]
    fn test_sac_first_and_last_are_analytic() {
        let result = financing_sac(dec!(100000), dec!(12), 2).unwrap();
        let amortization = dec!(100000) / dec!(24);

        assert_eq!(
            result.installments.first(),
            amortization + dec!(100000) * result.monthly_rate / dec!(100)
        );
        assert_eq!(
            result.installments.last(),
            amortization + amortization * result.monthly_rate / dec!(100)
        );
    }

    #[rstest]
    #[case(dec!(12000), dec!(12), 1)]
    #[case(dec!(100000), dec!(12), 2)]
    #[case(dec!(100000), dec!(10), 10)]
    #[case(dec!(360000), dec!(10.5), 35)]
    #[case(dec!(50000), dec!(0), 5)]
    fn test_schedule_invariants(
        #[case] principal: Decimal,
        #[case] rate: Decimal,
        #[case] years: u32,
    ) {
        for result in [
            financing_sac(principal, rate, years).unwrap(),
            financing_price(principal, rate, years).unwrap(),
        ] {
            assert_eq!(result.total_paid, result.principal + result.total_interest);
            let last = result.summary.last_12.last().unwrap();
            assert_eq!(last.installment, years * 12);
            assert_eq!(last.balance, Decimal::ZERO);
            assert!(
                result
                    .summary
                    .first_12
                    .iter()
                    .chain(&result.summary.last_12)
                    .all(|entry| entry.balance >= Decimal::ZERO)
            );
        }
    }

    #[test]
    fn test_price_with_zero_rate_is_linear() {
        let result = financing_price(dec!(12000), dec!(0), 1).unwrap();

        assert_eq!(result.installments.first(), dec!(1000));
        assert_eq!(result.total_interest, Decimal::ZERO);
        assert_eq!(result.total_paid, dec!(12000));
    }

    #[test]
    fn test_price_amortization_grows() {
        let result = financing_price(dec!(100000), dec!(12), 2).unwrap();
        let first = &result.summary.first_12;

        assert!(first[0].amortization < first[11].amortization);
        assert_close(
            first[0].interest + first[0].amortization.unwrap(),
            first[0].payment,
            dec!(0.0000001),
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            financing_sac(Decimal::MAX, dec!(12), 1),
            Err(FinanceError::Overflow { .. })
        ));
        assert!(matches!(
            financing_price(Decimal::MAX, dec!(12), 1),
            Err(FinanceError::Overflow { .. })
        ));
        assert!(matches!(
            compare_financing(Decimal::MAX, dec!(12), 1),
            Err(FinanceError::Overflow { .. })
        ));
    }

    #[test]
    fn test_compare_rejects_invalid_parameters_with_every_message() {
        let err = compare_financing(dec!(0), dec!(-1), 0).unwrap_err();
        assert_eq!(err.messages().len(), 3);
    }

    #[rstest]
    #[case(dec!(-100000), dec!(12), 2)]
    #[case(dec!(100000), dec!(-12), 2)]
    #[case(dec!(100000), dec!(12), 0)]
    fn test_rejects_invalid_parameters(
        #[case] principal: Decimal,
        #[case] rate: Decimal,
        #[case] years: u32,
    ) {
        assert!(matches!(
            financing_sac(principal, rate, years),
            Err(FinanceError::InvalidParameters(_))
        ));
        assert!(matches!(
            financing_price(principal, rate, years),
            Err(FinanceError::InvalidParameters(_))
        ));
        assert!(matches!(
            compare_financing(principal, rate, years),
            Err(FinanceError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_rejection_lists_every_violation() {
        let err = financing_sac(dec!(0), dec!(-1), 0).unwrap_err();
        assert_eq!(err.messages().len(), 3);
    }

    #[test]
    fn test_compare_financing() {
        let result = compare_financing(dec!(100000), dec!(12), 2).unwrap();

        assert_eq!(result.scenario.principal, dec!(100000));
        assert_eq!(result.scenario.term, "2 years");
        assert_eq!(result.scenario.rate, "12% per year");
        assert_close(result.sac.total_interest, dec!(11860.99), dec!(0.01));
        assert_close(result.price.total_interest, dec!(12290.02), dec!(0.01));
        assert_eq!(
            result.comparison.savings,
            result.price.total_interest - result.sac.total_interest
        );
        // Savings of ~3.5% are below the threshold, so Price is preferred.
        assert_eq!(result.comparison.recommendation.system, AmortizationSystem::Price);
        assert_eq!(result.comparison.formatted.savings_percent, "3.5%");
    }

    #[test]
    fn test_compare_includes_characteristics() {
        let result = compare_financing(dec!(100000), dec!(12), 2).unwrap();

        assert!(result.sac.characteristics.contains(&"Decreasing installments".to_string()));
        assert!(result.sac.characteristics.contains(&"Lower total cost".to_string()));
        assert!(result.price.characteristics.contains(&"Fixed installments".to_string()));
        assert!(result.price.characteristics.contains(&"Easy planning".to_string()));
    }

    #[test]
    fn test_compare_recommends_sac_for_long_terms() {
        // ~13.4% savings with a first installment ~25.7% above Price.
        let result = compare_financing(dec!(100000), dec!(10), 10).unwrap();
        assert_eq!(result.comparison.recommendation.system, AmortizationSystem::Sac);
        assert!(result.comparison.recommendation.reason.contains("Significant savings"));
    }

    #[test]
    fn test_compare_with_zero_rate() {
        let result = compare_financing(dec!(100000), dec!(0), 2).unwrap();
        assert_eq!(result.comparison.savings, Decimal::ZERO);
        assert_eq!(result.comparison.savings_ratio, Decimal::ZERO);
        assert_eq!(result.comparison.recommendation.system, AmortizationSystem::Price);
    }

    #[test]
    fn test_recommends_price_when_savings_are_small() {
        let recommendation = get_recommendation(dec!(1000), dec!(1040), dec!(5000), dec!(4800));
        assert_eq!(recommendation.system, AmortizationSystem::Price);
        assert!(recommendation.reason.to_lowercase().contains("small"));
    }

    #[test]
    fn test_recommends_sac_when_savings_are_significant() {
        let recommendation = get_recommendation(dec!(1000), dec!(1200), dec!(5000), dec!(4800));
        assert_eq!(recommendation.system, AmortizationSystem::Sac);
        assert_eq!(recommendation.reason, "Significant savings of R$ 200,00");
    }

    #[test]
    fn test_recommends_price_when_first_sac_installment_is_too_high() {
        let recommendation = get_recommendation(dec!(1000), dec!(2000), dec!(7000), dec!(5000));
        assert_eq!(recommendation.system, AmortizationSystem::Price);
        assert!(recommendation.reason.contains("too high"));
    }

    #[test]
    fn test_simulate_down_payment() {
        let result = simulate_down_payment(dec!(200000), dec!(50000), dec!(12), 2).unwrap();

        assert_eq!(result.down_payment, dec!(50000));
        assert_eq!(result.down_payment_ratio, dec!(0.25));
        assert_eq!(result.financed_amount, dec!(150000));
        assert_eq!(result.formatted.down_payment_percent, "25%");
        assert_eq!(result.formatted.financed_amount, "R$ 150.000,00");

        let direct = compare_financing(dec!(150000), dec!(12), 2).unwrap();
        assert_eq!(result.sac, direct.sac);
        assert_eq!(result.price, direct.price);
        assert_eq!(result.recommendation, direct.comparison.recommendation);
    }

    #[test]
    fn test_simulate_down_payment_ratio() {
        let result = simulate_down_payment(dec!(100000), dec!(30000), dec!(12), 2).unwrap();
        assert_eq!(result.down_payment_ratio, dec!(0.3));
    }

    #[test]
    fn test_simulate_without_down_payment() {
        let result = simulate_down_payment(dec!(100000), dec!(0), dec!(12), 2).unwrap();
        assert_eq!(result.down_payment_ratio, Decimal::ZERO);
        assert_eq!(result.financed_amount, dec!(100000));
    }

    #[rstest]
    #[case(dec!(0), dec!(0))]
    #[case(dec!(100000), dec!(-1))]
    #[case(dec!(100000), dec!(100000))]
    #[case(dec!(100000), dec!(150000))]
    fn test_rejects_invalid_down_payment(
        #[case] property_value: Decimal,
        #[case] down_payment: Decimal,
    ) {
        assert!(matches!(
            simulate_down_payment(property_value, down_payment, dec!(12), 2),
            Err(FinanceError::InvalidDownPayment { .. })
        ));
    }

    #[test]
    fn test_down_payment_with_invalid_rate() {
        assert!(matches!(
            simulate_down_payment(dec!(100000), dec!(10000), dec!(-1), 2),
            Err(FinanceError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_calculations_are_idempotent() {
        assert_eq!(
            compare_financing(dec!(250000), dec!(9.5), 20).unwrap(),
            compare_financing(dec!(250000), dec!(9.5), 20).unwrap()
        );
    }

    #[test]
    fn test_result_serializes() {
        let result = financing_sac(dec!(12000), dec!(12), 1).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["system"], "SAC");
        assert_eq!(json["installments"]["kind"], "decreasing");
        assert!(json["summary"]["first_12"][0].get("amortization").is_none());
    }
}
