use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Entry, ExchangeRates};

/// Income, expenses and net income in the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub budget: Decimal,
    pub net_income: Decimal,
}

/// Compute totals over a set of entries.
///
/// Each amount is converted with the rate of its currency (1 when the table
/// lacks it). Income entries add to income, everything else to expenses.
/// Net income = income - expenses - budget: the budget counts as money
/// already committed, so a larger budget lowers net income.
///
/// Fails with `AmountOverflow` when a converted amount or a sum leaves the
/// range of `Decimal`.
pub fn compute_totals(
    entries: &[Entry],
    rates: &ExchangeRates,
    budget: Decimal,
) -> Result<Totals, AmountOverflow> {
    let (total_income, total_expenses) = entries.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expenses), entry| {
            let converted = entry.converted_amount(rates).ok_or(AmountOverflow)?;
            if entry.is_income() {
                Ok((income.checked_add(converted).ok_or(AmountOverflow)?, expenses))
            } else {
                Ok((income, expenses.checked_add(converted).ok_or(AmountOverflow)?))
            }
        },
    )?;

    let net_income = total_income
        .checked_sub(total_expenses)
        .and_then(|net| net.checked_sub(budget))
        .ok_or(AmountOverflow)?;

    Ok(Totals {
        total_income,
        total_expenses,
        budget,
        net_income,
    })
}

/// Totals do not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountOverflow;

impl std::fmt::Display for AmountOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "amounts are too large to total in {}", super::BASE_CURRENCY)
    }
}

impl std::error::Error for AmountOverflow {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Income,
    Expenses,
    Budget,
    Net,
    Deficit,
    Surplus,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Income => "income",
            Bucket::Expenses => "expenses",
            Bucket::Budget => "budget",
            Bucket::Net => "net",
            Bucket::Deficit => "deficit",
            Bucket::Surplus => "surplus",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketValue {
    pub bucket: Bucket,
    pub value: Decimal,
}

impl BucketValue {
    fn new(bucket: Bucket, value: Decimal) -> Self {
        Self { bucket, value }
    }
}

impl Totals {
    /// Income, expenses, budget and net income side by side.
    pub fn bar_breakdown(&self) -> Vec<BucketValue> {
        vec![
            BucketValue::new(Bucket::Income, self.total_income),
            BucketValue::new(Bucket::Expenses, self.total_expenses),
            BucketValue::new(Bucket::Budget, self.budget),
            BucketValue::new(Bucket::Net, self.net_income),
        ]
    }

    /// Income and expenses, plus a deficit or surplus slice when net income
    /// is not zero.
    pub fn pie_breakdown(&self) -> Vec<BucketValue> {
        let mut slices = vec![
            BucketValue::new(Bucket::Income, self.total_income),
            BucketValue::new(Bucket::Expenses, self.total_expenses),
        ];
        if self.net_income < Decimal::ZERO {
            slices.push(BucketValue::new(Bucket::Deficit, self.net_income.abs()));
        } else if self.net_income > Decimal::ZERO {
            slices.push(BucketValue::new(Bucket::Surplus, self.net_income));
        }
        slices
    }
}
