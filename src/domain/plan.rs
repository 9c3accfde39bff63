use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Weekly,
    Monthly,
    Yearly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Some(PeriodType::Weekly),
            "monthly" => Some(PeriodType::Monthly),
            "yearly" => Some(PeriodType::Yearly),
            _ => None,
        }
    }

    /// First and last day (both inclusive) of the period containing `date`.
    /// Weeks run Monday to Sunday.
    pub fn period_containing(&self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            PeriodType::Weekly => {
                let weekday = date.weekday().num_days_from_monday() as i64;
                let start = date - Duration::days(weekday);
                Some((start, start + Duration::days(6)))
            }
            PeriodType::Monthly => {
                let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
                let next_month = if date.month() == 12 {
                    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)?
                };
                Some((start, next_month.pred_opt()?))
            }
            PeriodType::Yearly => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31)?;
                Some((start, end))
            }
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit and saving goal over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_type: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub spending_limit: Decimal,
    pub saving_goal: Decimal,
}

impl Plan {
    pub fn new(
        plan_type: PeriodType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        spending_limit: Decimal,
        saving_goal: Decimal,
    ) -> Self {
        Self {
            plan_type,
            start_date,
            end_date,
            spending_limit,
            saving_goal,
        }
    }

    /// True when `date` falls inside the plan window, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
