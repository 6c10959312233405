use crate::core::rates::{CurrencyRate, CurrencyRateProvider, iso_name};
use crate::providers::util::http_client;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

/// Public rate feed: `GET /bank/currency` returns every pair the bank
/// quotes, keyed by ISO 4217 numeric codes.
pub struct MonobankProvider {
    base_url: String,
    currencies: Vec<u16>,
    base: u16,
}

impl MonobankProvider {
    pub fn new(base_url: &str, currencies: Vec<u16>, base: u16) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            currencies,
            base,
        }
    }
}

fn price(item: &Value, field: &str) -> Option<Decimal> {
    item.get(field)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v > 0.0)
        .and_then(Decimal::from_f64_retain)
        .map(|d| d.round_dp(2))
}

fn code(item: &Value, field: &str) -> Option<u16> {
    item.get(field)
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
}

/// Picks the tracked pairs out of the feed, in tracked order. Entries with
/// unreadable codes are skipped; unreadable prices become `None`.
fn select_rates(items: &[Value], currencies: &[u16], base: u16) -> Vec<CurrencyRate> {
    currencies
        .iter()
        .filter_map(|wanted| {
            items.iter().find(|item| {
                code(item, "currencyCodeA") == Some(*wanted)
                    && code(item, "currencyCodeB") == Some(base)
            })
        })
        .filter_map(|item| {
            let currency_code = code(item, "currencyCodeA")?;
            Some(CurrencyRate {
                currency: iso_name(currency_code)
                    .map_or_else(|| currency_code.to_string(), str::to_string),
                currency_code,
                base_code: base,
                buy: price(item, "rateBuy"),
                sell: price(item, "rateSell"),
            })
        })
        .collect()
}

#[async_trait]
impl CurrencyRateProvider for MonobankProvider {
    #[instrument(name = "MonobankRateFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<Vec<CurrencyRate>> {
        let url = format!("{}/bank/currency", self.base_url);
        debug!("Requesting currency rates from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(anyhow!("Rate provider limit reached, try again later"));
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for currency rates", status));
        }

        let text = response.text().await?;
        let items: Vec<Value> = serde_json::from_str(&text)
            .context("Failed to parse JSON response for currency rates")?;

        let rates = select_rates(&items, &self.currencies, self.base);
        debug!(count = rates.len(), "Selected tracked currency rates");
        Ok(rates)
    }
}
