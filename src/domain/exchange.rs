use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BASE_CURRENCY;

/// Conversion rates from a currency code to the base currency.
/// `1 unit of code = rate units of CNY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates(BTreeMap<String, Decimal>);

impl ExchangeRates {
    /// An empty table. Every currency then converts at 1.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Rate for `currency`, or 1 when the table has no entry for it.
    pub fn rate_for(&self, currency: &str) -> Decimal {
        self.0.get(currency).copied().unwrap_or(Decimal::ONE)
    }

    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.0.get(currency).copied()
    }

    pub fn insert(&mut self, currency: impl Into<String>, rate: Decimal) {
        self.0.insert(currency.into(), rate);
    }

    /// Overwrite or add every rate in `updates`, keeping the others.
    pub fn merge(&mut self, updates: &ExchangeRates) {
        for (code, rate) in &updates.0 {
            self.0.insert(code.clone(), *rate);
        }
    }

    /// First currency whose rate is zero or negative, if any.
    pub fn first_non_positive(&self) -> Option<(&str, Decimal)> {
        self.0
            .iter()
            .find(|(_, rate)| **rate <= Decimal::ZERO)
            .map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert("USD".to_string(), Decimal::new(70, 1));
        rates.insert("EUR".to_string(), Decimal::new(80, 1));
        rates.insert("HKD".to_string(), Decimal::new(9, 1));
        rates.insert(BASE_CURRENCY.to_string(), Decimal::new(10, 1));
        Self(rates)
    }
}

impl FromIterator<(String, Decimal)> for ExchangeRates {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
