// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use tally::application::{LedgerService, NewEntry, NewPlan};
use tempfile::TempDir;

/// Helper to create a service backed by a ledger file in a temporary directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let (service, _) = LedgerService::open(temp_dir.path().join("ledger.json"))?;
    Ok((service, temp_dir))
}

/// Write raw JSON to `dir/name` and return the path
pub fn write_ledger(dir: &Path, name: &str, json: &Value) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(json)?)?;
    Ok(path)
}

/// Read a ledger file back as raw JSON
pub fn read_ledger(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Entry form with no invoice
pub fn entry_form(
    kind: &str,
    amount: &str,
    currency: &str,
    category: &str,
    date: &str,
) -> NewEntry {
    NewEntry {
        kind: kind.to_string(),
        amount: amount.to_string(),
        currency: currency.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        invoice_kind: None,
        invoice_info: None,
    }
}

pub fn plan_form(
    plan_type: &str,
    start: &str,
    end: Option<&str>,
    limit: &str,
    goal: &str,
) -> NewPlan {
    NewPlan {
        plan_type: plan_type.to_string(),
        start_date: start.to_string(),
        end_date: end.map(str::to_string),
        spending_limit: limit.to_string(),
        saving_goal: goal.to_string(),
    }
}

/// Test fixture: a small ledger with one income and one foreign expense
pub struct StandardEntries;

impl StandardEntries {
    /// Salary of 1000 CNY and a 200 USD expense
    pub fn record_basic(service: &mut LedgerService) -> Result<()> {
        service.record_entry(entry_form("income", "1000", "CNY", "salary", "2024-01-31"))?;
        service.record_entry(entry_form("expense", "200", "USD", "travel", "2024-02-03"))?;
        Ok(())
    }

    /// Three CNY expenses labelled a, b and c
    pub fn record_abc(service: &mut LedgerService) -> Result<()> {
        for (category, date) in [("a", "2024-03-01"), ("b", "2024-03-02"), ("c", "2024-03-03")] {
            service.record_entry(entry_form("expense", "10", "CNY", category, date))?;
        }
        Ok(())
    }
}

/// A path whose parent is a regular file, so nothing can be written there
pub fn unwritable_path(dir: &Path) -> Result<PathBuf> {
    let blocker = dir.join("blocker");
    fs::write(&blocker, "not a directory")?;
    Ok(blocker.join("nested").join("ledger.json"))
}
