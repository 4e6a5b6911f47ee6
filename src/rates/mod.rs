//! Market benchmark rates used by the investment calculator.
//!
//! [`RatesManager`] keeps the last known [`RateSet`] and refreshes it on demand
//! from a [`RateFeed`]. A refresh never fails: whatever cannot be fetched keeps
//! its previous value.

mod feed;

pub use feed::{HttpRateFeed, RateFeed, parse_dollar_response, parse_selic_response};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::RatesConfig;
use crate::utils::RatePeriod;

/// Selic at or below which savings pay 70% of Selic instead of the fixed 0.5% a.m.
pub const SAVINGS_RULE_THRESHOLD: Decimal = dec!(8.5);

/// CDI tracks the Selic at this ratio after a refresh.
pub const CDI_TO_SELIC: Decimal = dec!(0.9);

/// Benchmark rates, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSet {
    /// Selic, % a.a.
    pub selic: Decimal,
    /// CDI interbank rate, % a.a.
    pub cdi: Decimal,
    /// IPCA inflation, % a.a.
    pub ipca: Decimal,
    /// USD quote in BRL.
    pub dollar: Decimal,
    /// Savings (poupança), % a.m.
    pub savings: Decimal,
}

impl Default for RateSet {
    fn default() -> Self {
        Self {
            selic: dec!(10.75),
            cdi: dec!(10.5),
            ipca: dec!(4.5),
            dollar: dec!(5.20),
            savings: dec!(0.5),
        }
    }
}

/// Display strings for a [`RateSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedRates {
    pub selic: String,
    pub cdi: String,
    pub ipca: String,
    pub dollar: String,
    pub savings: String,
}

fn two_places(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

impl RateSet {
    pub fn formatted(&self) -> FormattedRates {
        let annual = RatePeriod::Annual.suffix();
        FormattedRates {
            selic: format!("{}% {annual}", self.selic.normalize()),
            cdi: format!("{}% {annual}", two_places(self.cdi)),
            ipca: format!("{}% {annual}", self.ipca.normalize()),
            dollar: format!("R$ {}", two_places(self.dollar)),
            savings: format!("{}% {}", two_places(self.savings), RatePeriod::Monthly.suffix()),
        }
    }

    /// Recomputes the rates that follow the Selic: CDI, and savings under the
    /// savings rule (70% of Selic, monthly, when Selic ≤ 8.5%; 0.5% a.m. otherwise).
    pub fn derive_from_selic(&mut self) {
        self.cdi = self.selic * CDI_TO_SELIC;
        self.savings = if self.selic <= SAVINGS_RULE_THRESHOLD {
            self.selic * dec!(0.7) / dec!(12)
        } else {
            dec!(0.5)
        };
    }
}

/// Read access to the current benchmark rates.
pub trait RateSource {
    /// Selic, % a.a.
    fn short_term_rate(&self) -> Decimal;
    /// CDI, % a.a.
    fn interbank_rate(&self) -> Decimal;
    /// Savings, % a.m.
    fn savings_rate(&self) -> Decimal;
    fn rate_set(&self) -> RateSet;
}

impl RateSource for RateSet {
    fn short_term_rate(&self) -> Decimal {
        self.selic
    }

    fn interbank_rate(&self) -> Decimal {
        self.cdi
    }

    fn savings_rate(&self) -> Decimal {
        self.savings
    }

    fn rate_set(&self) -> RateSet {
        *self
    }
}

impl<R: RateSource + ?Sized> RateSource for &R {
    fn short_term_rate(&self) -> Decimal {
        (**self).short_term_rate()
    }

    fn interbank_rate(&self) -> Decimal {
        (**self).interbank_rate()
    }

    fn savings_rate(&self) -> Decimal {
        (**self).savings_rate()
    }

    fn rate_set(&self) -> RateSet {
        (**self).rate_set()
    }
}

/// Cached rates plus the feed that refreshes them.
pub struct RatesManager<F = HttpRateFeed> {
    rates: RateSet,
    feed: F,
}

impl RatesManager<HttpRateFeed> {
    /// Manager over the configured HTTP endpoints, starting from the configured defaults.
    ///
    /// No request is made until [`RatesManager::refresh_all`].
    pub fn from_config(config: &RatesConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.defaults, HttpRateFeed::new(config)?))
    }
}

impl<F: RateFeed> RatesManager<F> {
    pub fn new(defaults: RateSet, feed: F) -> Self {
        Self {
            rates: defaults,
            feed,
        }
    }

    /// Builds a manager and refreshes it once.
    pub async fn create(defaults: RateSet, feed: F) -> Self {
        let mut manager = Self::new(defaults, feed);
        manager.refresh_all().await;
        manager
    }

    /// Fetches Selic and the USD quote concurrently and returns the resulting set.
    ///
    /// Failures are logged and the previous value is kept; CDI and savings are
    /// always re-derived from whatever Selic ends up in the set.
    pub async fn refresh_all(&mut self) -> RateSet {
        let (selic, dollar) = tokio::join!(self.feed.fetch_selic(), self.feed.fetch_dollar());

        if let Some(selic) = accept("Selic", selic, self.rates.selic) {
            self.rates.selic = selic;
        }
        if let Some(dollar) = accept("USD/BRL", dollar, self.rates.dollar) {
            self.rates.dollar = dollar;
        }
        self.rates.derive_from_selic();

        tracing::info!(
            selic = %self.rates.selic,
            cdi = %self.rates.cdi,
            savings = %self.rates.savings,
            dollar = %self.rates.dollar,
            "benchmark rates refreshed"
        );

        self.rates
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }
}

fn accept(name: &str, fetched: anyhow::Result<Decimal>, current: Decimal) -> Option<Decimal> {
    match fetched {
        Ok(value) if value > Decimal::ZERO => Some(value),
        Ok(value) => {
            tracing::warn!(
                rate = name,
                %value,
                %current,
                "ignoring non-positive rate, keeping current value"
            );
            None
        }
        Err(error) => {
            tracing::warn!(
                rate = name,
                error = %error,
                %current,
                "rate fetch failed, keeping current value"
            );
            None
        }
    }
}

impl<F> RateSource for RatesManager<F> {
    fn short_term_rate(&self) -> Decimal {
        self.rates.selic
    }

    fn interbank_rate(&self) -> Decimal {
        self.rates.cdi
    }

    fn savings_rate(&self) -> Decimal {
        self.rates.savings
    }

    fn rate_set(&self) -> RateSet {
        self.rates
    }
}
