//! Currency rate abstractions and the cache entry format.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ISO 4217 numeric codes for the currencies the rate widget can show.
const ISO_CODES: &[(&str, u16)] = &[
    ("USD", 840),
    ("EUR", 978),
    ("UAH", 980),
    ("GBP", 826),
    ("PLN", 985),
    ("CHF", 756),
    ("JPY", 392),
    ("CZK", 203),
    ("CAD", 124),
];

pub fn iso_code(currency: &str) -> Option<u16> {
    ISO_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(currency))
        .map(|(_, code)| *code)
}

pub fn iso_name(code: u16) -> Option<&'static str> {
    ISO_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Buy/sell quote for one currency against the base currency.
///
/// `None` prices mean the provider did not publish a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub currency: String,
    pub currency_code: u16,
    pub base_code: u16,
    pub buy: Option<Decimal>,
    pub sell: Option<Decimal>,
}

/// Persisted form of the last successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCacheEntry {
    pub rates: Vec<CurrencyRate>,
    pub fetched_at_ms: i64,
}

impl RateCacheEntry {
    /// An entry stamped in the future (clock moved back, corrupt data) is
    /// never fresh.
    pub fn is_fresh(&self, now_ms: i64, window: Duration) -> bool {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let age = now_ms.saturating_sub(self.fetched_at_ms);
        (0..window_ms).contains(&age)
    }

    pub fn snapshot(&self, stale: bool) -> RateSnapshot {
        RateSnapshot {
            rates: self.rates.clone(),
            fetched_at_ms: self.fetched_at_ms,
            stale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSnapshot {
    pub rates: Vec<CurrencyRate>,
    pub fetched_at_ms: i64,
    /// Set when the rates are past their freshness window because a
    /// refresh failed.
    pub stale: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RateState {
    #[default]
    Empty,
    Loading,
    Ready(RateSnapshot),
    StaleFallback(RateSnapshot),
    Error(String),
}

impl RateState {
    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        match self {
            RateState::Ready(s) | RateState::StaleFallback(s) => Some(s),
            _ => None,
        }
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<Vec<CurrencyRate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_freshness_window() {
        let now = 1_700_000_000_000;
        let entry = |age_min: i64| RateCacheEntry {
            rates: vec![],
            fetched_at_ms: now - age_min * 60_000,
        };
        assert!(entry(0).is_fresh(now, HOUR));
        assert!(entry(59).is_fresh(now, HOUR));
        assert!(!entry(60).is_fresh(now, HOUR));
        assert!(!entry(61).is_fresh(now, HOUR));
    }

    #[test]
    fn test_future_timestamp_is_stale() {
        let now = 1_700_000_000_000;
        let entry = |fetched_at_ms| RateCacheEntry {
            rates: vec![],
            fetched_at_ms,
        };
        assert!(!entry(now + 1).is_fresh(now, HOUR));
        assert!(!entry(i64::MAX).is_fresh(now, HOUR));
        assert!(!entry(now).is_fresh(now, Duration::ZERO));
    }

    #[test]
    fn test_iso_lookup() {
        assert_eq!(iso_code("usd"), Some(840));
        assert_eq!(iso_name(978), Some("EUR"));
        assert_eq!(iso_code("XXX"), None);
        assert_eq!(iso_name(1), None);
    }

    #[test]
    fn test_state_snapshot() {
        let snapshot = RateSnapshot {
            rates: vec![],
            fetched_at_ms: 1,
            stale: true,
        };
        assert!(RateState::Loading.snapshot().is_none());
        assert_eq!(
            RateState::StaleFallback(snapshot.clone()).snapshot(),
            Some(&snapshot)
        );
    }
}
