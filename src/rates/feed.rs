use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::RatesConfig;

/// Source of fresh benchmark values for [`super::RatesManager`].
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Current Selic, % a.a.
    async fn fetch_selic(&self) -> anyhow::Result<Decimal>;
    /// Current USD quote in BRL.
    async fn fetch_dollar(&self) -> anyhow::Result<Decimal>;
}

/// One observation of a BCB SGS series: `{"data": "01/01/2024", "valor": "11.25"}`.
#[derive(Debug, Deserialize)]
struct SgsObservation {
    valor: Decimal,
}

#[derive(Debug, Deserialize)]
struct ExchangeRates {
    rates: QuoteTable,
}

#[derive(Debug, Deserialize)]
struct QuoteTable {
    #[serde(rename = "BRL")]
    brl: Option<Decimal>,
}

/// Extracts the Selic from a BCB SGS response body.
pub fn parse_selic_response(body: &str) -> anyhow::Result<Decimal> {
    let observations: Vec<SgsObservation> =
        serde_json::from_str(body).context("malformed Selic response")?;
    let latest = observations.first().context("Selic series is empty")?;

    Ok(latest.valor)
}

/// Extracts the BRL quote from an exchange-rate response body.
pub fn parse_dollar_response(body: &str) -> anyhow::Result<Decimal> {
    let response: ExchangeRates =
        serde_json::from_str(body).context("malformed exchange rate response")?;

    response.rates.brl.context("exchange rate response has no BRL quote")
}

/// Fetches the rates over HTTPS with a per request timeout.
pub struct HttpRateFeed {
    client: reqwest::Client,
    selic_url: String,
    dollar_url: String,
}

impl HttpRateFeed {
    pub fn new(config: &RatesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            selic_url: config.selic_url.clone(),
            dollar_url: config.dollar_url.clone(),
        })
    }

    async fn get_body(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            anyhow::bail!("{} answered {}", url, response.status())
        }
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    async fn fetch_selic(&self) -> anyhow::Result<Decimal> {
        let body = self.get_body(&self.selic_url).await?;
        parse_selic_response(&body)
    }

    async fn fetch_dollar(&self) -> anyhow::Result<Decimal> {
        let body = self.get_body(&self.dollar_url).await?;
        parse_dollar_response(&body)
    }
}
