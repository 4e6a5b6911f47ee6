//! Cost of rolling over an unpaid credit card statement (crédito rotativo).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::format::format_money;

/// Revolving interest charged when the caller does not give one, % a.m.
pub const DEFAULT_REVOLVING_MONTHLY_RATE: Decimal = dec!(15);

/// IOF charged on the revolving balance.
pub const IOF_RATE: Decimal = dec!(0.0038);

/// Share of the revolving balance above which the cost is flagged as high.
const HIGH_COST_RATIO: Decimal = dec!(0.1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostAlert {
    High,
    Ok,
}

impl CostAlert {
    pub fn label(self) -> &'static str {
        match self {
            CostAlert::High => "high cost",
            CostAlert::Ok => "ok",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRevolving {
    pub statement_amount: String,
    pub amount_paid: String,
    pub revolving_balance: String,
    pub interest: String,
    pub iof: String,
    pub total_cost: String,
    pub next_statement_amount: String,
    pub alert: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevolvingBalanceResult {
    PaidInFull {
        status: String,
        revolving_balance: Decimal,
        total_cost: Decimal,
    },
    Revolving {
        statement_amount: Decimal,
        amount_paid: Decimal,
        revolving_balance: Decimal,
        interest: Decimal,
        iof: Decimal,
        /// `interest + iof`.
        total_cost: Decimal,
        /// `revolving_balance + total_cost`.
        next_statement_amount: Decimal,
        alert: CostAlert,
        formatted: FormattedRevolving,
    },
}

impl RevolvingBalanceResult {
    pub fn revolving_balance(&self) -> Decimal {
        match self {
            RevolvingBalanceResult::PaidInFull { revolving_balance, .. }
            | RevolvingBalanceResult::Revolving { revolving_balance, .. } => *revolving_balance,
        }
    }

    pub fn total_cost(&self) -> Decimal {
        match self {
            RevolvingBalanceResult::PaidInFull { total_cost, .. }
            | RevolvingBalanceResult::Revolving { total_cost, .. } => *total_cost,
        }
    }
}

/// Interest and IOF for one month of revolving credit on whatever was left
/// unpaid. `monthly_rate` is in percent (see [`DEFAULT_REVOLVING_MONTHLY_RATE`]).
pub fn calc_revolving_balance(
    statement_amount: Decimal,
    amount_paid: Decimal,
    monthly_rate: Decimal,
) -> RevolvingBalanceResult {
    if amount_paid >= statement_amount {
        return RevolvingBalanceResult::PaidInFull {
            status: "Statement paid in full".to_string(),
            revolving_balance: Decimal::ZERO,
            total_cost: Decimal::ZERO,
        };
    }

    let revolving_balance = statement_amount - amount_paid;
    let interest = revolving_balance * monthly_rate / dec!(100);
    let iof = revolving_balance * IOF_RATE;
    let total_cost = interest + iof;
    let next_statement_amount = revolving_balance + total_cost;
    let alert = if total_cost > revolving_balance * HIGH_COST_RATIO {
        CostAlert::High
    } else {
        CostAlert::Ok
    };

    tracing::debug!(
        revolving_balance = %revolving_balance,
        total_cost = %total_cost,
        alert = alert.label(),
        "calculated revolving balance"
    );

    RevolvingBalanceResult::Revolving {
        statement_amount,
        amount_paid,
        revolving_balance,
        interest,
        iof,
        total_cost,
        next_statement_amount,
        alert,
        formatted: FormattedRevolving {
            statement_amount: format_money(statement_amount),
            amount_paid: format_money(amount_paid),
            revolving_balance: format_money(revolving_balance),
            interest: format_money(interest),
            iof: format_money(iof),
            total_cost: format_money(total_cost),
            next_statement_amount: format_money(next_statement_amount),
            alert: alert.label().to_string(),
        },
    }
}
