//! `br_consumer_finance` is a Rust library for Brazilian consumer finance calculations.
//!
//! It covers three areas:
//! - **Financing**: real estate loans under the two amortization systems used in Brazil,
//!   **SAC** (Sistema de Amortização Constante, decreasing installments) and
//!   **Price** (Sistema Francês de Amortização, fixed installments), their comparison,
//!   a recommendation between them and down payment simulations.
//! - **Investments**: net yield of Poupança, Tesouro Selic and CDBs after the
//!   regressive income tax, ranking between them and monthly contribution plans.
//! - **Credit card**: the cost of rolling over an unpaid statement.
//!
//! Benchmark rates (Selic, CDI, savings) come from a [`rates::RateSource`]: either a
//! fixed [`rates::RateSet`] or a [`rates::RatesManager`] refreshed from the BCB and an
//! exchange rate API.
//!
//! ## Usage
//!
//! Add `br_consumer_finance` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! br_consumer_finance = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then compare both amortization systems and a few investments:
//!
//! ```rust
//! use br_consumer_finance::investments::{DEFAULT_CDB_OPTIONS, InvestmentCalc};
//! use br_consumer_finance::rates::RateSet;
//! use br_consumer_finance::compare_financing;
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     match compare_financing(dec!(360_000), dec!(10.5), 35) {
//!         Ok(result) => {
//!             println!("SAC First Payment:   {:.2}", result.sac.first_installment);
//!             println!("SAC Last Payment:    {:.2}", result.sac.last_installment);
//!             println!("Price Fixed Payment: {:.2}", result.price.fixed_installment);
//!             println!("Recommended:         {}", result.comparison.recommendation.system);
//!         }
//!         Err(e) => {
//!             eprintln!("Error comparing financing: {}", e);
//!         }
//!     }
//!
//!     let calc = InvestmentCalc::new(RateSet::default());
//!     let comparison = calc
//!         .compare_investments(dec!(10_000), 12, &DEFAULT_CDB_OPTIONS)
//!         .unwrap();
//!     println!("Best option: {}", comparison.best_option.name);
//! }
//! ```

pub mod config;
pub mod credit_card;
pub mod error;
pub mod financing;
pub mod format;
pub mod investments;
pub mod rates;
pub mod utils;
pub mod validation;

pub use credit_card::{RevolvingBalanceResult, calc_revolving_balance};
pub use error::{FinanceError, FinanceResult};
pub use financing::{
    AmortizationSystem, LoanComparison, LoanResult, compare_financing, financing_price,
    financing_sac, get_recommendation, simulate_down_payment,
};
pub use investments::{
    InvestmentCalc, YieldComparison, YieldResult, simulate_monthly_contributions,
};
pub use rates::{RateSet, RateSource, RatesManager};
