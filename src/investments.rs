//! Fixed income yield projections: Poupança, Tesouro Selic and CDBs.
//!
//! Tesouro Selic and CDB income pays IR on the regressive table of
//! [`calc_ir_rate`]; Poupança is exempt. Holding periods use 30-day months.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, FinanceResult};
use crate::format::{format_money, format_period, format_ratio};
use crate::rates::{FormattedRates, RateSource};
use crate::utils::{DAYS_PER_MONTH, RatePeriod, calc_ir_rate, convert_rate, grow};
use crate::validation::ensure_valid;

pub const DEFAULT_CDI_PERCENT: Decimal = dec!(100);

/// CDB percentages compared by default.
pub const DEFAULT_CDB_OPTIONS: [Decimal; 3] = [dec!(100), dec!(110), dec!(120)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instrument {
    Savings,
    TesouroSelic,
    /// CDB paying `percent_of_cdi`% of the CDI (120 for 120%).
    Cdb { percent_of_cdi: Decimal },
}

impl Instrument {
    pub fn label(&self) -> String {
        match self {
            Instrument::Savings => "Poupança".to_string(),
            Instrument::TesouroSelic => "Tesouro Selic".to_string(),
            Instrument::Cdb { percent_of_cdi } => {
                format!("CDB {}% CDI", percent_of_cdi.normalize())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedYield {
    pub initial_value: String,
    pub period: String,
    pub rate: String,
    pub gross_amount: String,
    pub tax_rate: String,
    pub income_tax: String,
    pub net_amount: String,
    pub net_yield: String,
    pub yield_ratio: String,
}

/// Projection of a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldResult {
    pub instrument: Instrument,
    pub label: String,
    pub initial_value: Decimal,
    pub months: u32,
    /// Rate applied, as a fraction, compounded per `rate_period`.
    pub rate: Decimal,
    pub rate_period: RatePeriod,
    pub gross_amount: Decimal,
    pub gross_yield: Decimal,
    /// IR rate as a fraction (0.2 for 20%); zero when exempt.
    pub tax_rate: Decimal,
    pub income_tax: Decimal,
    /// `gross_amount - income_tax`.
    pub net_amount: Decimal,
    pub net_yield: Decimal,
    /// `net_yield / initial_value`.
    pub yield_ratio: Decimal,
    pub tax_exempt: bool,
    pub notes: String,
    pub formatted: FormattedYield,
}

impl YieldResult {
    fn option(&self) -> InvestmentOption {
        InvestmentOption {
            name: self.label.clone(),
            net_yield: self.net_yield,
            yield_ratio: self.yield_ratio,
        }
    }
}

/// An instrument reduced to what the ranking needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOption {
    pub name: String,
    pub net_yield: Decimal,
    pub yield_ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOption {
    pub name: String,
    pub net_yield: Decimal,
    pub yield_ratio: Decimal,
    /// Net yield above the worst compared option.
    pub advantage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonScenario {
    pub value: Decimal,
    pub months: u32,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedOptions {
    pub savings: InvestmentOption,
    pub tesouro_selic: InvestmentOption,
    pub cdbs: Vec<InvestmentOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldComparison {
    pub scenario: ComparisonScenario,
    pub options: ComparedOptions,
    /// Every option, highest net yield first.
    pub ranking: Vec<InvestmentOption>,
    pub best_option: BestOption,
    pub rates_used: FormattedRates,
}

/// Sorts by net yield, highest first. Ties keep their input order.
pub fn rank_options(options: &[InvestmentOption]) -> Vec<InvestmentOption> {
    let mut ranking = options.to_vec();
    ranking.sort_by(|a, b| b.net_yield.cmp(&a.net_yield));
    ranking
}

/// Investment calculator reading benchmark rates from `R`.
///
/// Pass a [`crate::rates::RatesManager`] (or a reference to one) for live rates,
/// or a fixed [`crate::rates::RateSet`].
pub struct InvestmentCalc<R> {
    rates: R,
}

impl<R: RateSource> InvestmentCalc<R> {
    pub fn new(rates: R) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &R {
        &self.rates
    }

    /// Poupança: compounds the monthly savings rate; exempt from IR and IOF.
    pub fn investment_savings(&self, value: Decimal, months: u32) -> FinanceResult<YieldResult> {
        let savings_rate = self.rates.savings_rate();
        ensure_valid(value, savings_rate, Decimal::from(months))?;

        let monthly_rate = savings_rate / dec!(100);
        let gross_amount = grow(value, monthly_rate, months)?;
        let gross_yield = gross_amount - value;
        let yield_ratio = gross_yield / value;

        Ok(YieldResult {
            instrument: Instrument::Savings,
            label: Instrument::Savings.label(),
            initial_value: value,
            months,
            rate: monthly_rate,
            rate_period: RatePeriod::Monthly,
            gross_amount,
            gross_yield,
            tax_rate: Decimal::ZERO,
            income_tax: Decimal::ZERO,
            net_amount: gross_amount,
            net_yield: gross_yield,
            yield_ratio,
            tax_exempt: true,
            notes: "Exempt from income tax and IOF".to_string(),
            formatted: FormattedYield {
                initial_value: format_money(value),
                period: format_period(months),
                rate: format!(
                    "{} {}",
                    format_ratio(monthly_rate, 2),
                    RatePeriod::Monthly.suffix()
                ),
                gross_amount: format_money(gross_amount),
                tax_rate: "exempt".to_string(),
                income_tax: format_money(Decimal::ZERO),
                net_amount: format_money(gross_amount),
                net_yield: format_money(gross_yield),
                yield_ratio: format_ratio(yield_ratio, 2),
            },
        })
    }

    /// Tesouro Selic: the Selic compounded monthly, taxed on the regressive table.
    pub fn investment_tesouro_selic(
        &self,
        value: Decimal,
        months: u32,
    ) -> FinanceResult<YieldResult> {
        let selic = self.rates.short_term_rate();
        ensure_valid(value, selic, Decimal::from(months))?;

        taxed_yield(Instrument::TesouroSelic, value, months, selic)
    }

    /// CDB paying `percent_of_cdi`% of the CDI (see [`DEFAULT_CDI_PERCENT`]).
    pub fn investment_cdb(
        &self,
        value: Decimal,
        months: u32,
        percent_of_cdi: Decimal,
    ) -> FinanceResult<YieldResult> {
        ensure_valid(value, percent_of_cdi, Decimal::from(months))?;

        let annual_rate = self.rates.interbank_rate() * percent_of_cdi / dec!(100);
        taxed_yield(Instrument::Cdb { percent_of_cdi }, value, months, annual_rate)
    }

    /// Ranks Poupança, Tesouro Selic and one CDB per entry of `cdb_options`
    /// (see [`DEFAULT_CDB_OPTIONS`]) by net yield.
    pub fn compare_investments(
        &self,
        value: Decimal,
        months: u32,
        cdb_options: &[Decimal],
    ) -> FinanceResult<YieldComparison> {
        let savings = self.investment_savings(value, months)?.option();
        let tesouro_selic = self.investment_tesouro_selic(value, months)?.option();
        let cdbs = cdb_options
            .iter()
            .map(|percent| self.investment_cdb(value, months, *percent).map(|cdb| cdb.option()))
            .collect::<FinanceResult<Vec<_>>>()?;

        let mut all_options = vec![savings.clone(), tesouro_selic.clone()];
        all_options.extend(cdbs.iter().cloned());

        let ranking = rank_options(&all_options);
        let best = ranking[0].clone();
        let worst_yield = all_options
            .iter()
            .map(|option| option.net_yield)
            .min()
            .unwrap_or(best.net_yield);

        tracing::debug!(
            value = %value,
            months,
            best = %best.name,
            net_yield = %best.net_yield,
            "ranked investment options"
        );

        Ok(YieldComparison {
            scenario: ComparisonScenario {
                value,
                months,
                period: format_period(months),
            },
            options: ComparedOptions {
                savings,
                tesouro_selic,
                cdbs,
            },
            best_option: BestOption {
                advantage: best.net_yield - worst_yield,
                name: best.name,
                net_yield: best.net_yield,
                yield_ratio: best.yield_ratio,
            },
            ranking,
            rates_used: self.rates.rate_set().formatted(),
        })
    }
}

fn taxed_yield(
    instrument: Instrument,
    value: Decimal,
    months: u32,
    annual_rate: Decimal,
) -> FinanceResult<YieldResult> {
    let monthly_rate =
        convert_rate(annual_rate, RatePeriod::Annual, RatePeriod::Monthly)? / dec!(100);
    let gross_amount = grow(value, monthly_rate, months)?;
    let gross_yield = gross_amount - value;

    let days = months.saturating_mul(DAYS_PER_MONTH);
    let tax_percent = calc_ir_rate(days);
    let income_tax = gross_yield * tax_percent / dec!(100);
    let net_yield = gross_yield - income_tax;
    let net_amount = value + net_yield;
    let yield_ratio = net_yield / value;
    let rate = annual_rate / dec!(100);

    Ok(YieldResult {
        label: instrument.label(),
        instrument,
        initial_value: value,
        months,
        rate,
        rate_period: RatePeriod::Annual,
        gross_amount,
        gross_yield,
        tax_rate: tax_percent / dec!(100),
        income_tax,
        net_amount,
        net_yield,
        yield_ratio,
        tax_exempt: false,
        notes: format!(
            "Regressive taxation: {}% income tax after {} days",
            tax_percent.normalize(),
            days
        ),
        formatted: FormattedYield {
            initial_value: format_money(value),
            period: format_period(months),
            rate: format!("{} {}", format_ratio(rate, 2), RatePeriod::Annual.suffix()),
            gross_amount: format_money(gross_amount),
            tax_rate: format!("{}%", tax_percent.normalize()),
            income_tax: format_money(income_tax),
            net_amount: format_money(net_amount),
            net_yield: format_money(net_yield),
            yield_ratio: format_ratio(yield_ratio, 2),
        },
    })
}

/// Balance at a sampled month of a contribution simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    pub month: u32,
    pub balance: Decimal,
    pub total_contributed: Decimal,
    /// `balance - total_contributed`.
    pub accumulated_yield: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedContributions {
    pub initial_value: String,
    pub monthly_contribution: String,
    pub period: String,
    pub annual_rate: String,
    pub total_contributed: String,
    pub gross_amount: String,
    pub gross_yield: String,
    pub income_tax: String,
    pub net_amount: String,
    pub net_yield: String,
    pub net_yield_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionSimulation {
    pub initial_value: Decimal,
    pub monthly_contribution: Decimal,
    pub months: u32,
    /// Annual rate as a fraction.
    pub annual_rate: Decimal,
    /// Initial value plus every monthly contribution.
    pub total_contributed: Decimal,
    pub gross_amount: Decimal,
    pub gross_yield: Decimal,
    /// IR rate as a fraction; zero when tax is not applied.
    pub tax_rate: Decimal,
    pub income_tax: Decimal,
    pub net_amount: Decimal,
    pub net_yield: Decimal,
    /// `net_yield / total_contributed`.
    pub net_yield_ratio: Decimal,
    /// Months 1 to 12, every 12th month after that, and the final month.
    pub snapshots: Vec<MonthlySnapshot>,
    pub formatted: FormattedContributions,
}

/// Grows `initial_value` at `annual_rate` (% a.a., compounded monthly), adding
/// `monthly_contribution` at the end of every month, the last one included.
///
/// With `apply_tax` the gross yield pays IR on the regressive table for the
/// whole term; the tax is never negative.
pub fn simulate_monthly_contributions(
    initial_value: Decimal,
    monthly_contribution: Decimal,
    months: u32,
    annual_rate: Decimal,
    apply_tax: bool,
) -> FinanceResult<ContributionSimulation> {
    ensure_valid(initial_value, annual_rate, Decimal::from(months))?;

    let monthly_rate =
        convert_rate(annual_rate, RatePeriod::Annual, RatePeriod::Monthly)? / dec!(100);
    let growth = Decimal::ONE + monthly_rate;

    let mut balance = initial_value;
    let mut total_contributed = initial_value;
    let mut snapshots = Vec::new();

    for month in 1..=months {
        balance = balance
            .checked_mul(growth)
            .and_then(|grown| grown.checked_add(monthly_contribution))
            .ok_or_else(|| FinanceError::Overflow {
                context: format!("contribution balance at month {month}"),
            })?;
        total_contributed = total_contributed
            .checked_add(monthly_contribution)
            .ok_or_else(|| FinanceError::Overflow {
                context: format!("total contributed at month {month}"),
            })?;

        if month <= 12 || month % 12 == 0 || month == months {
            snapshots.push(MonthlySnapshot {
                month,
                balance,
                total_contributed,
                accumulated_yield: balance - total_contributed,
            });
        }
    }

    let gross_yield = balance - total_contributed;
    let tax_rate = if apply_tax {
        calc_ir_rate(months.saturating_mul(DAYS_PER_MONTH)) / dec!(100)
    } else {
        Decimal::ZERO
    };
    let income_tax = (gross_yield * tax_rate).max(Decimal::ZERO);
    let net_yield = gross_yield - income_tax;
    let net_amount = balance - income_tax;
    let net_yield_ratio = if total_contributed.is_zero() {
        Decimal::ZERO
    } else {
        net_yield / total_contributed
    };

    tracing::debug!(
        months,
        total_contributed = %total_contributed,
        gross_amount = %balance,
        income_tax = %income_tax,
        "simulated monthly contributions"
    );

    Ok(ContributionSimulation {
        initial_value,
        monthly_contribution,
        months,
        annual_rate: annual_rate / dec!(100),
        total_contributed,
        gross_amount: balance,
        gross_yield,
        tax_rate,
        income_tax,
        net_amount,
        net_yield,
        net_yield_ratio,
        snapshots,
        formatted: FormattedContributions {
            initial_value: format_money(initial_value),
            monthly_contribution: format_money(monthly_contribution),
            period: format_period(months),
            annual_rate: format!("{}%", annual_rate.normalize()),
            total_contributed: format_money(total_contributed),
            gross_amount: format_money(balance),
            gross_yield: format_money(gross_yield),
            income_tax: format_money(income_tax),
            net_amount: format_money(net_amount),
            net_yield: format_money(net_yield),
            net_yield_ratio: format_ratio(net_yield_ratio, 2),
        },
    })
}
