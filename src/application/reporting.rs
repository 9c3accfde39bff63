use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{BucketValue, PeriodType, Totals};

/// Totals plus the two chart views derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsReport {
    pub base_currency: String,
    pub entry_count: usize,
    pub totals: Totals,
    pub bar: Vec<BucketValue>,
    pub pie: Vec<BucketValue>,
}

impl TotalsReport {
    pub fn new(base_currency: impl Into<String>, entry_count: usize, totals: Totals) -> Self {
        Self {
            base_currency: base_currency.into(),
            entry_count,
            bar: totals.bar_breakdown(),
            pie: totals.pie_breakdown(),
            totals,
        }
    }
}

/// How a plan is doing, from the entries dated inside its window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStatus {
    pub index: usize,
    pub plan_type: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub spending_limit: Decimal,
    pub saving_goal: Decimal,
    pub income: Decimal,
    pub spent: Decimal,
    pub remaining_limit: Decimal,
    pub saved: Decimal,
    pub over_limit: bool,
    pub goal_reached: bool,
}

/// One row of an entry listing, amounts converted to the base currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRow {
    pub index: usize,
    pub date: NaiveDate,
    pub kind: String,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub converted_amount: Decimal,
    pub invoice: String,
}
